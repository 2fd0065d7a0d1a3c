//! Authoring model for map files.
//!
//! [`MapEditor`] edits a [`HexMapData`] in place: hexes are created, deleted and
//! tuned through a selection, resources are placed by world position. The
//! runtime grid is only ever read, when syncing missing hexes into the map.

use std::path::Path;

use bevy::prelude::*;
use thiserror::Error;

use crate::territory::map_data::{HexSaveData, InitialState, MapFileError, ResourceSpawn};
use crate::territory::tile::{HexState, ResourceKind};
use crate::territory::{HexCoord, HexGrid, HexMapData, HexMetrics};

/// A rejected edit. The map is left unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// The operation needs a selected hex.
    #[error("no hex selected")]
    NoSelection,
    /// No record exists at the coordinate.
    #[error("hex {0} is not in the map")]
    Missing(HexCoord),
    /// A record already exists at the coordinate.
    #[error("hex {0} already exists")]
    Exists(HexCoord),
    /// The selected hex has no spawn at this index.
    #[error("no spawn #{0} in the selected hex")]
    NoSpawn(usize),
}

/// Map under edit plus the current selection.
#[derive(Debug, Clone)]
pub struct MapEditor {
    map: HexMapData,
    metrics: HexMetrics,
    selected: Option<HexCoord>,
}

impl MapEditor {
    /// Edits `map`, placing spawns with `metrics`.
    pub fn new(map: HexMapData, metrics: HexMetrics) -> Self {
        Self {
            map,
            metrics,
            selected: None,
        }
    }

    /// Opens a map file for editing.
    pub fn load(path: impl AsRef<Path>, metrics: HexMetrics) -> Result<Self, MapFileError> {
        Ok(Self::new(HexMapData::load(path)?, metrics))
    }

    /// Opens a map file, or starts an empty map when the file does not exist yet.
    pub fn open_or_new(path: impl AsRef<Path>, metrics: HexMetrics) -> Result<Self, MapFileError> {
        match HexMapData::load(path) {
            Ok(map) => Ok(Self::new(map, metrics)),
            Err(MapFileError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::new(HexMapData::default(), metrics))
            }
            Err(err) => Err(err),
        }
    }

    /// Writes the map file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MapFileError> {
        self.map.save(path)?;
        info!(
            "saved {} hexes with {} spawns",
            self.map.hexes.len(),
            self.spawn_count()
        );
        Ok(())
    }

    /// The map being edited.
    pub fn map(&self) -> &HexMapData {
        &self.map
    }

    /// Selected coordinate.
    pub fn selected(&self) -> Option<HexCoord> {
        self.selected
    }

    /// Record of the selected hex.
    pub fn selected_record(&self) -> Option<&HexSaveData> {
        self.map.get(self.selected?)
    }

    fn selected_mut(&mut self) -> Result<&mut HexSaveData, EditError> {
        let coord = self.selected.ok_or(EditError::NoSelection)?;
        self.map.get_mut(coord).ok_or(EditError::Missing(coord))
    }

    /// Selects an existing hex.
    pub fn select(&mut self, coord: HexCoord) -> Result<(), EditError> {
        if self.map.get(coord).is_none() {
            return Err(EditError::Missing(coord));
        }
        self.selected = Some(coord);
        Ok(())
    }

    /// Clears the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Adds a locked, free hex and selects it.
    pub fn create_hex(&mut self, coord: HexCoord) -> Result<(), EditError> {
        if self.map.get(coord).is_some() {
            return Err(EditError::Exists(coord));
        }
        self.map.hexes.push(HexSaveData::new(coord));
        self.selected = Some(coord);
        Ok(())
    }

    /// Removes the selected hex and clears the selection.
    pub fn delete_hex(&mut self) -> Result<HexSaveData, EditError> {
        let coord = self.selected.ok_or(EditError::NoSelection)?;
        let index = self
            .map
            .hexes
            .iter()
            .position(|h| h.coord == coord)
            .ok_or(EditError::Missing(coord))?;
        self.selected = None;
        Ok(self.map.hexes.remove(index))
    }

    /// Sets the selected hex's starting state.
    pub fn set_initial_state(&mut self, state: InitialState) -> Result<(), EditError> {
        self.selected_mut()?.initial_state = state;
        Ok(())
    }

    /// Sets the selected hex's unlock cost.
    pub fn set_costs(&mut self, wood: u32, stone: u32) -> Result<(), EditError> {
        let record = self.selected_mut()?;
        record.wood_cost = wood;
        record.stone_cost = stone;
        Ok(())
    }

    /// Sets whether the selected hex stays hidden next to owned territory.
    pub fn set_start_hidden(&mut self, hidden: bool) -> Result<(), EditError> {
        self.selected_mut()?.start_hidden = hidden;
        Ok(())
    }

    /// Places a resource at a world position inside an existing hex.
    ///
    /// Returns the hex and the new spawn's index in it.
    pub fn place_spawn(
        &mut self,
        kind: ResourceKind,
        world: Vec3,
    ) -> Result<(HexCoord, usize), EditError> {
        let coord = self.metrics.world_to_hex(world);
        let center = self.metrics.hex_to_world(coord);
        let record = self.map.get_mut(coord).ok_or(EditError::Missing(coord))?;
        let offset = Vec2::new(world.x - center.x, world.z - center.z);
        record.spawns.push(ResourceSpawn::new(kind, offset, 0.0));
        Ok((coord, record.spawns.len() - 1))
    }

    /// Moves a spawn of the selected hex to a new world position.
    pub fn move_spawn(&mut self, index: usize, world: Vec3) -> Result<(), EditError> {
        let coord = self.selected.ok_or(EditError::NoSelection)?;
        let center = self.metrics.hex_to_world(coord);
        let spawn = self
            .selected_mut()?
            .spawns
            .get_mut(index)
            .ok_or(EditError::NoSpawn(index))?;
        spawn.offset = [world.x - center.x, world.z - center.z];
        Ok(())
    }

    /// Removes a spawn from the selected hex.
    pub fn remove_spawn(&mut self, index: usize) -> Result<ResourceSpawn, EditError> {
        let record = self.selected_mut()?;
        if index >= record.spawns.len() {
            return Err(EditError::NoSpawn(index));
        }
        Ok(record.spawns.remove(index))
    }

    /// Total spawns across the map.
    pub fn spawn_count(&self) -> usize {
        self.map.spawn_count()
    }

    /// Appends records for grid hexes the map lacks. Returns how many were added.
    ///
    /// New records take state, cost, hidden flag and spawn list from the grid.
    pub fn sync_from_grid(&mut self, grid: &HexGrid) -> usize {
        let mut added = 0;
        for (coord, tile, visual) in grid.get_all_hexes() {
            if self.map.get(coord).is_some() {
                continue;
            }
            self.map.hexes.push(HexSaveData {
                initial_state: if tile.state == HexState::Unlocked {
                    InitialState::Unlocked
                } else {
                    InitialState::Locked
                },
                wood_cost: tile.cost(ResourceKind::Wood),
                stone_cost: tile.cost(ResourceKind::Stone),
                start_hidden: visual.start_hidden,
                spawns: grid.get_spawn_data(coord).to_vec(),
                ..HexSaveData::new(coord)
            });
            added += 1;
        }
        debug!(
            "synced {added} hexes from the grid, {} in map",
            self.map.hexes.len()
        );
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::territory::NullVisuals;
    use crate::territory::scatter::SpawnScatter;

    fn editor() -> MapEditor {
        MapEditor::new(HexMapData::default(), HexMetrics::default())
    }

    // ── hexes ───────────────────────────────────────────────────────

    #[test]
    fn create_select_delete() {
        let mut ed = editor();
        let c = HexCoord::new(1, 2);
        assert_eq!(ed.select(c), Err(EditError::Missing(c)));
        ed.create_hex(c).unwrap();
        assert_eq!(ed.selected(), Some(c));
        assert_eq!(ed.create_hex(c), Err(EditError::Exists(c)));

        let removed = ed.delete_hex().unwrap();
        assert_eq!(removed.coord, c);
        assert_eq!(ed.selected(), None);
        assert!(ed.map().hexes.is_empty());
        assert_eq!(ed.delete_hex(), Err(EditError::NoSelection));
    }

    #[test]
    fn edits_apply_to_selection() {
        let mut ed = editor();
        assert_eq!(ed.set_costs(1, 1), Err(EditError::NoSelection));
        ed.create_hex(HexCoord::ORIGIN).unwrap();
        ed.set_initial_state(InitialState::Unlocked).unwrap();
        ed.set_costs(12, 3).unwrap();
        ed.set_start_hidden(true).unwrap();

        let record = ed.selected_record().unwrap();
        assert_eq!(record.initial_state, InitialState::Unlocked);
        assert_eq!((record.wood_cost, record.stone_cost), (12, 3));
        assert!(record.start_hidden);
    }

    #[test]
    fn deselect_keeps_map() {
        let mut ed = editor();
        ed.create_hex(HexCoord::new(0, 1)).unwrap();
        ed.deselect();
        assert!(ed.selected_record().is_none());
        assert_eq!(ed.map().hexes.len(), 1);
    }

    // ── spawns ──────────────────────────────────────────────────────

    #[test]
    fn place_spawn_stores_offset_from_center() {
        let m = HexMetrics::default();
        let mut ed = editor();
        let c = HexCoord::new(1, 0);
        let world = m.hex_to_world(c) + Vec3::new(1.0, 0.0, -2.0);
        assert_eq!(
            ed.place_spawn(ResourceKind::Wood, world),
            Err(EditError::Missing(c))
        );

        ed.create_hex(c).unwrap();
        assert_eq!(ed.place_spawn(ResourceKind::Wood, world), Ok((c, 0)));
        assert_eq!(ed.place_spawn(ResourceKind::Stone, world), Ok((c, 1)));
        let spawn = &ed.selected_record().unwrap().spawns[0];
        assert!((spawn.offset[0] - 1.0).abs() < 1e-4);
        assert!((spawn.offset[1] + 2.0).abs() < 1e-4);
        assert_eq!(ed.spawn_count(), 2);
    }

    #[test]
    fn move_and_remove_spawn() {
        let m = HexMetrics::default();
        let mut ed = editor();
        ed.create_hex(HexCoord::ORIGIN).unwrap();
        ed.place_spawn(ResourceKind::Stone, Vec3::new(1.0, 0.0, 1.0))
            .unwrap();

        ed.move_spawn(0, m.hex_to_world(HexCoord::ORIGIN) + Vec3::new(-2.0, 0.0, 0.5))
            .unwrap();
        assert_eq!(ed.selected_record().unwrap().spawns[0].offset, [-2.0, 0.5]);
        assert_eq!(ed.move_spawn(3, Vec3::ZERO), Err(EditError::NoSpawn(3)));

        assert_eq!(ed.remove_spawn(1), Err(EditError::NoSpawn(1)));
        let removed = ed.remove_spawn(0).unwrap();
        assert_eq!(removed.kind, ResourceKind::Stone);
        assert_eq!(ed.spawn_count(), 0);
    }

    // ── grid sync & files ───────────────────────────────────────────

    #[test]
    fn sync_adds_only_missing_hexes() {
        let mut grid = HexGrid::new(HexMetrics::default(), NullVisuals);
        grid.generate(1, None);

        let mut ed = editor();
        ed.create_hex(HexCoord::new(1, 0)).unwrap();
        ed.set_costs(99, 0).unwrap();

        assert_eq!(ed.sync_from_grid(&grid), 8);
        assert_eq!(ed.sync_from_grid(&grid), 0);
        assert_eq!(ed.map().hexes.len(), 9);

        let kept = ed.map().get(HexCoord::new(1, 0)).unwrap();
        assert_eq!(kept.wood_cost, 99);
        let origin = ed.map().get(HexCoord::ORIGIN).unwrap();
        assert_eq!(origin.initial_state, InitialState::Unlocked);
        let ring = ed.map().get(HexCoord::new(0, 1)).unwrap();
        assert_eq!(ring.wood_cost, 10);
    }

    #[test]
    fn sync_carries_grid_spawns() {
        let mut grid = HexGrid::new(HexMetrics::default(), NullVisuals);
        grid.generate(1, Some(&SpawnScatter::new(7, 3, 25.0, 3)));

        let mut ed = editor();
        ed.sync_from_grid(&grid);
        let origin = ed.map().get(HexCoord::ORIGIN).unwrap();
        assert_eq!(origin.spawns.len(), 3);
        assert_eq!(ed.spawn_count(), grid_spawn_total(&grid));
    }

    fn grid_spawn_total(grid: &HexGrid) -> usize {
        grid.get_all_hexes()
            .map(|(coord, _, _)| grid.get_spawn_data(coord).len())
            .sum()
    }

    #[test]
    fn open_or_new_starts_empty_for_missing_file() {
        let path =
            std::env::temp_dir().join(format!("hex_editor_missing_{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let ed = MapEditor::open_or_new(&path, HexMetrics::default()).unwrap();
        assert!(ed.map().hexes.is_empty());
    }

    #[test]
    fn open_or_new_reports_bad_json() {
        let path =
            std::env::temp_dir().join(format!("hex_editor_bad_{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let result = MapEditor::open_or_new(&path, HexMetrics::default());
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(MapFileError::Parse(_))));
    }

    #[test]
    fn save_and_reopen() {
        let path = std::env::temp_dir().join(format!("hex_editor_{}.json", std::process::id()));
        let mut ed = editor();
        ed.create_hex(HexCoord::new(-1, 3)).unwrap();
        ed.set_start_hidden(true).unwrap();
        ed.save(&path).unwrap();

        let reopened = MapEditor::load(&path, HexMetrics::default()).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(reopened.map(), ed.map());
        assert_eq!(reopened.selected(), None);
    }
}
