//! Persisted map format shared by the runtime grid and the map editor.
//!
//! A map is an ordered list of per-hex records stored as JSON. Record order is
//! kept as-is through load and save.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::coords::HexCoord;
use super::tile::{HexState, HexTile, ResourceKind};

/// Failure while reading or writing a map file.
#[derive(Debug, Error)]
pub enum MapFileError {
    /// The file could not be read or written.
    #[error("map file i/o: {0}")]
    Io(#[from] std::io::Error),
    /// The contents are not a valid map (bad JSON, negative cost, unknown kind).
    #[error("map file parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Starting state of a hex. There is no persisted `Unlocking` state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialState {
    /// Must be paid for.
    #[default]
    Locked,
    /// Already claimed at game start.
    Unlocked,
}

/// A resource placed inside a hex, relative to its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpawn {
    /// What the node yields.
    pub kind: ResourceKind,
    /// Offset from the hex center: `[world x, world z]`.
    pub offset: [f32; 2],
    /// Rotation about Y, in degrees.
    #[serde(default)]
    pub rotation_deg: f32,
}

impl ResourceSpawn {
    /// Creates a spawn entry.
    pub fn new(kind: ResourceKind, offset: Vec2, rotation_deg: f32) -> Self {
        Self {
            kind,
            offset: offset.to_array(),
            rotation_deg,
        }
    }

    /// World position of this spawn for a hex centered at `hex_center`.
    pub fn world_position(&self, hex_center: Vec3) -> Vec3 {
        hex_center + Vec3::new(self.offset[0], 0.0, self.offset[1])
    }

    /// Y rotation as a quaternion.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.rotation_deg.to_radians())
    }
}

/// One persisted hex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexSaveData {
    /// Cell address.
    pub coord: HexCoord,
    /// State when the map is loaded.
    #[serde(default)]
    pub initial_state: InitialState,
    /// Wood needed to unlock.
    #[serde(default)]
    pub wood_cost: u32,
    /// Stone needed to unlock.
    #[serde(default)]
    pub stone_cost: u32,
    /// Keep this hex invisible even next to unlocked territory.
    #[serde(default)]
    pub start_hidden: bool,
    /// Resources placed in this hex.
    #[serde(default)]
    pub spawns: Vec<ResourceSpawn>,
}

impl HexSaveData {
    /// A locked, free, visible hex with no spawns.
    pub fn new(coord: HexCoord) -> Self {
        Self {
            coord,
            initial_state: InitialState::Locked,
            wood_cost: 0,
            stone_cost: 0,
            start_hidden: false,
            spawns: Vec::new(),
        }
    }

    /// Runtime tile with state and cost taken from this record. Zero costs are omitted.
    pub fn to_runtime_tile(&self) -> HexTile {
        let mut tile = HexTile::new(self.coord);
        tile.state = match self.initial_state {
            InitialState::Locked => HexState::Locked,
            InitialState::Unlocked => HexState::Unlocked,
        };
        if self.wood_cost > 0 {
            tile.unlock_cost.insert(ResourceKind::Wood, self.wood_cost);
        }
        if self.stone_cost > 0 {
            tile.unlock_cost.insert(ResourceKind::Stone, self.stone_cost);
        }
        tile
    }
}

/// A whole map: the ordered hex records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HexMapData {
    /// Every hex in the map, in authoring order.
    pub hexes: Vec<HexSaveData>,
}

impl HexMapData {
    /// Parses a map from JSON text.
    pub fn from_json(text: &str) -> Result<Self, MapFileError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty-printed JSON text.
    pub fn to_json(&self) -> Result<String, MapFileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a map file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapFileError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Writes a map file, replacing any existing one.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MapFileError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Record for `coord`, if present.
    pub fn get(&self, coord: HexCoord) -> Option<&HexSaveData> {
        self.hexes.iter().find(|h| h.coord == coord)
    }

    /// Mutable record for `coord`, if present.
    pub fn get_mut(&mut self, coord: HexCoord) -> Option<&mut HexSaveData> {
        self.hexes.iter_mut().find(|h| h.coord == coord)
    }

    /// Total resource spawns across all hexes.
    pub fn spawn_count(&self) -> usize {
        self.hexes.iter().map(|h| h.spawns.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "hexes": [
            { "coord": { "q": 2, "r": 0 }, "initial_state": "unlocked" },
            {
                "coord": { "q": 2, "r": 1 },
                "wood_cost": 12,
                "stone_cost": 4,
                "start_hidden": true,
                "spawns": [ { "kind": "stone", "offset": [1.0, -2.0], "rotation_deg": 90.0 } ]
            }
        ]
    }"#;

    #[test]
    fn parses_records_with_defaults() {
        let map = HexMapData::from_json(SAMPLE).unwrap();
        assert_eq!(map.hexes.len(), 2);
        let first = &map.hexes[0];
        assert_eq!(first.initial_state, InitialState::Unlocked);
        assert_eq!(first.wood_cost, 0);
        assert!(!first.start_hidden);
        assert!(first.spawns.is_empty());

        let second = map.get(HexCoord::new(2, 1)).unwrap();
        assert!(second.start_hidden);
        assert_eq!(second.spawns[0].kind, ResourceKind::Stone);
        assert_eq!(map.spawn_count(), 1);
    }

    #[test]
    fn json_roundtrip_keeps_record_order() {
        let map = HexMapData::from_json(SAMPLE).unwrap();
        let again = HexMapData::from_json(&map.to_json().unwrap()).unwrap();
        assert_eq!(map, again);
        let coords: Vec<_> = again.hexes.iter().map(|h| h.coord).collect();
        assert_eq!(coords, vec![HexCoord::new(2, 0), HexCoord::new(2, 1)]);
    }

    #[test]
    fn negative_cost_is_rejected() {
        let text = r#"{ "hexes": [ { "coord": { "q": 0, "r": 0 }, "wood_cost": -3 } ] }"#;
        assert!(matches!(
            HexMapData::from_json(text),
            Err(MapFileError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = HexMapData::load("/definitely/not/here/map.json");
        assert!(matches!(result, Err(MapFileError::Io(_))));
    }

    #[test]
    fn runtime_tile_skips_zero_costs() {
        let mut record = HexSaveData::new(HexCoord::new(3, 3));
        record.stone_cost = 7;
        let tile = record.to_runtime_tile();
        assert_eq!(tile.state, HexState::Locked);
        assert_eq!(tile.unlock_cost.len(), 1);
        assert_eq!(tile.cost(ResourceKind::Stone), 7);
    }

    #[test]
    fn spawn_world_position_adds_offset() {
        let spawn = ResourceSpawn::new(ResourceKind::Wood, Vec2::new(3.0, -3.0), 0.0);
        let p = spawn.world_position(Vec3::new(10.0, 0.0, 5.0));
        assert_eq!(p, Vec3::new(13.0, 0.0, 2.0));
    }

    #[test]
    fn save_then_load_file() {
        let path = std::env::temp_dir().join(format!("hex_map_{}.json", std::process::id()));
        let map = HexMapData::from_json(SAMPLE).unwrap();
        map.save(&path).unwrap();
        let loaded = HexMapData::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(map, loaded);
    }
}
