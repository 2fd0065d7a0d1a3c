//! The territory grid: tile records, unlock state machine, and fog-of-war reveal.
//!
//! [`HexGrid`] owns every [`HexTile`] and its [`TileVisual`] flags. Rendering is
//! pushed out through a [`VisualSink`], gameplay notifications through
//! subscribed listeners. Nothing here touches the ECS world directly.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::coords::{HexCoord, HexMetrics};
use super::map_data::{HexMapData, HexSaveData, InitialState, ResourceSpawn};
use super::scatter::SpawnScatter;
use super::tile::{HexState, HexTile, ResourceKind};

/// Per-tile presentation flags, kept separate from gameplay state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct TileVisual {
    /// Has been shown to the player at least once.
    pub revealed: bool,
    /// Locked and adjacent to owned territory.
    pub unlockable: bool,
    /// Current payment target.
    pub highlighted: bool,
    /// Never revealed by neighbors; only reaching `Unlocked` shows it.
    pub start_hidden: bool,
}

/// Receiver of presentation commands for tile faces.
pub trait VisualSink: Send + Sync {
    /// A tile was created; its face starts hidden.
    fn spawn(&mut self, coord: HexCoord, world: Vec3, tile: &HexTile);
    /// A tile was removed.
    fn despawn(&mut self, coord: HexCoord);
    /// Show the face at full size without animation.
    fn show_immediate(&mut self, coord: HexCoord);
    /// Grow the face in after `delay` seconds.
    fn animate_appear(&mut self, coord: HexCoord, delay: f32);
    /// Restyle the face for the tile's current state.
    fn update_state(&mut self, coord: HexCoord, tile: &HexTile, visual: &TileVisual);
    /// Toggle the payment-target highlight.
    fn set_highlight(&mut self, coord: HexCoord, highlighted: bool);
}

/// Sink that drops every command. Used headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullVisuals;

impl VisualSink for NullVisuals {
    fn spawn(&mut self, _coord: HexCoord, _world: Vec3, _tile: &HexTile) {}
    fn despawn(&mut self, _coord: HexCoord) {}
    fn show_immediate(&mut self, _coord: HexCoord) {}
    fn animate_appear(&mut self, _coord: HexCoord, _delay: f32) {}
    fn update_state(&mut self, _coord: HexCoord, _tile: &HexTile, _visual: &TileVisual) {}
    fn set_highlight(&mut self, _coord: HexCoord, _highlighted: bool) {}
}

/// Gameplay notifications raised by the grid.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum TerritoryEvent {
    /// A tile entered `Unlocking`.
    UnlockStarted(HexCoord),
    /// A payment was accepted.
    UnlockProgress {
        /// Tile that was paid.
        coord: HexCoord,
        /// Fraction of total cost now paid.
        progress: f32,
    },
    /// A tile became `Unlocked`. Fires exactly once per tile.
    Unlocked(HexCoord),
}

impl TerritoryEvent {
    /// The tile this event concerns.
    pub fn coord(&self) -> HexCoord {
        match *self {
            TerritoryEvent::UnlockStarted(c) => c,
            TerritoryEvent::UnlockProgress { coord, .. } => coord,
            TerritoryEvent::Unlocked(c) => c,
        }
    }
}

/// Handle returned by [`HexGrid::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&TerritoryEvent) + Send + Sync>;

/// All tiles of the playable area.
#[derive(Resource)]
pub struct HexGrid {
    metrics: HexMetrics,
    reveal_stagger: f32,
    tiles: HashMap<HexCoord, HexTile>,
    visuals: HashMap<HexCoord, TileVisual>,
    spawns: HashMap<HexCoord, Vec<ResourceSpawn>>,
    order: Vec<HexCoord>,
    sink: Box<dyn VisualSink>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl HexGrid {
    /// Empty grid rendering through `sink`.
    pub fn new(metrics: HexMetrics, sink: impl VisualSink + 'static) -> Self {
        Self {
            metrics,
            reveal_stagger: 0.0,
            tiles: HashMap::new(),
            visuals: HashMap::new(),
            spawns: HashMap::new(),
            order: Vec::new(),
            sink: Box::new(sink),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Seconds between successive appear animations of one reveal batch.
    pub fn with_reveal_stagger(mut self, stagger: f32) -> Self {
        self.reveal_stagger = stagger.max(0.0);
        self
    }

    /// Cell dimensions used for world conversion.
    pub fn metrics(&self) -> HexMetrics {
        self.metrics
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the grid has no tiles.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registers a listener for every subsequent [`TerritoryEvent`].
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&TerritoryEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: TerritoryEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    /// Removes every tile and despawns its face.
    pub fn clear(&mut self) {
        for coord in std::mem::take(&mut self.order) {
            self.sink.despawn(coord);
        }
        self.tiles.clear();
        self.visuals.clear();
        self.spawns.clear();
    }

    /// Procedural mode: a square window `q, r ∈ [-radius, radius]` with
    /// distance-scaled costs. The origin starts unlocked.
    pub fn generate(&mut self, radius: i32, scatter: Option<&SpawnScatter>) {
        self.clear();
        for q in -radius..=radius {
            for r in -radius..=radius {
                let coord = HexCoord::new(q, r);
                let cost = HexTile::calculate_cost(coord.distance(HexCoord::ORIGIN));
                self.insert_tile(HexTile::with_cost(coord, cost), false);
                if let Some(scatter) = scatter {
                    let spawns = scatter.spawns_for(coord, &self.metrics);
                    self.set_spawn_data(coord, spawns);
                }
            }
        }

        let origin = HexCoord::ORIGIN;
        if let Some(tile) = self.tiles.get_mut(&origin) {
            tile.state = HexState::Unlocked;
            self.show(origin);
            self.refresh_visual(origin);
            self.reveal_neighbors(origin);
        }
        info!("generated {} hexes with radius {radius}", self.len());
    }

    /// Authored mode: one tile per record, in record order.
    ///
    /// Duplicate coordinates keep the first record. Reveal runs only after
    /// every tile exists, so record order never hides a neighbor.
    pub fn load_from_data(&mut self, data: &HexMapData) {
        self.clear();
        let mut unlocked = Vec::new();
        for record in &data.hexes {
            if !self.insert_tile(record.to_runtime_tile(), record.start_hidden) {
                warn!("duplicate hex {} in map data, keeping the first", record.coord);
                continue;
            }
            self.set_spawn_data(record.coord, record.spawns.clone());
            if record.initial_state == InitialState::Unlocked {
                unlocked.push(record.coord);
            }
        }

        for &coord in &unlocked {
            self.show(coord);
            self.refresh_visual(coord);
        }
        for &coord in &unlocked {
            self.reveal_neighbors(coord);
        }
        info!(
            "loaded {} hexes ({} unlocked, {} spawns)",
            self.len(),
            unlocked.len(),
            data.spawn_count()
        );
    }

    /// Snapshot as map data, in tile order. `Unlocking` is stored as locked.
    pub fn to_map_data(&self) -> HexMapData {
        let hexes = self
            .get_all_hexes()
            .map(|(coord, tile, visual)| HexSaveData {
                coord,
                initial_state: if tile.state == HexState::Unlocked {
                    InitialState::Unlocked
                } else {
                    InitialState::Locked
                },
                wood_cost: tile.cost(ResourceKind::Wood),
                stone_cost: tile.cost(ResourceKind::Stone),
                start_hidden: visual.start_hidden,
                spawns: self.get_spawn_data(coord).to_vec(),
            })
            .collect();
        HexMapData { hexes }
    }

    fn insert_tile(&mut self, tile: HexTile, start_hidden: bool) -> bool {
        let coord = tile.coord;
        if self.tiles.contains_key(&coord) {
            return false;
        }
        self.sink
            .spawn(coord, self.metrics.hex_to_world(coord), &tile);
        self.visuals.insert(
            coord,
            TileVisual {
                start_hidden,
                ..default()
            },
        );
        self.tiles.insert(coord, tile);
        self.order.push(coord);
        true
    }

    /// Adds a tile and shows it at once. Returns false if the cell is taken.
    pub fn add_tile(&mut self, tile: HexTile) -> bool {
        let coord = tile.coord;
        if !self.insert_tile(tile, false) {
            return false;
        }
        self.show(coord);
        self.refresh_visual(coord);
        true
    }

    /// Removes a tile with its spawns and face.
    pub fn remove_tile(&mut self, coord: HexCoord) -> Option<HexTile> {
        let tile = self.tiles.remove(&coord)?;
        self.visuals.remove(&coord);
        self.spawns.remove(&coord);
        self.order.retain(|c| *c != coord);
        self.sink.despawn(coord);
        Some(tile)
    }

    fn show(&mut self, coord: HexCoord) {
        if let Some(visual) = self.visuals.get_mut(&coord) {
            visual.revealed = true;
            self.sink.show_immediate(coord);
        }
    }

    fn refresh_visual(&mut self, coord: HexCoord) {
        if let (Some(tile), Some(visual)) = (self.tiles.get(&coord), self.visuals.get(&coord)) {
            self.sink.update_state(coord, tile, visual);
        }
    }

    /// Tile at `coord`.
    pub fn get_tile(&self, coord: HexCoord) -> Option<&HexTile> {
        self.tiles.get(&coord)
    }

    /// Presentation flags at `coord`.
    pub fn get_visual(&self, coord: HexCoord) -> Option<&TileVisual> {
        self.visuals.get(&coord)
    }

    /// Every tile in insertion order.
    pub fn get_all_hexes(&self) -> impl Iterator<Item = (HexCoord, &HexTile, &TileVisual)> {
        self.order
            .iter()
            .filter_map(|c| Some((*c, self.tiles.get(c)?, self.visuals.get(c)?)))
    }

    /// Resources placed in the tile, empty if none.
    pub fn get_spawn_data(&self, coord: HexCoord) -> &[ResourceSpawn] {
        self.spawns.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replaces the resources placed in a tile.
    pub fn set_spawn_data(&mut self, coord: HexCoord, spawns: Vec<ResourceSpawn>) {
        if spawns.is_empty() {
            self.spawns.remove(&coord);
        } else {
            self.spawns.insert(coord, spawns);
        }
    }

    /// Center of a cell on the ground plane.
    pub fn hex_to_world(&self, coord: HexCoord) -> Vec3 {
        self.metrics.hex_to_world(coord)
    }

    /// Cell under a world position.
    pub fn world_to_hex(&self, pos: Vec3) -> HexCoord {
        self.metrics.world_to_hex(pos)
    }

    /// Locked and touching at least one unlocked tile.
    pub fn can_unlock(&self, coord: HexCoord) -> bool {
        self.tiles
            .get(&coord)
            .is_some_and(|t| t.state == HexState::Locked)
            && coord.neighbors().iter().any(|n| {
                self.tiles
                    .get(n)
                    .is_some_and(|t| t.state == HexState::Unlocked)
            })
    }

    /// Tiles for which [`Self::can_unlock`] holds, in tile order.
    pub fn get_unlockable_tiles(&self) -> Vec<HexCoord> {
        self.order
            .iter()
            .copied()
            .filter(|c| self.can_unlock(*c))
            .collect()
    }

    /// Tiles that accept payment now or can start accepting it.
    pub fn get_payable_tiles(&self) -> Vec<HexCoord> {
        self.order
            .iter()
            .copied()
            .filter(|c| {
                self.tiles
                    .get(c)
                    .is_some_and(|t| t.state == HexState::Unlocking)
                    || self.can_unlock(*c)
            })
            .collect()
    }

    /// Moves an unlockable tile into `Unlocking`. False otherwise.
    pub fn start_unlocking(&mut self, coord: HexCoord) -> bool {
        if !self.can_unlock(coord) {
            return false;
        }
        if let Some(tile) = self.tiles.get_mut(&coord) {
            tile.state = HexState::Unlocking;
        }
        self.refresh_visual(coord);
        self.emit(TerritoryEvent::UnlockStarted(coord));
        true
    }

    /// Pays `amount` of `kind` toward an `Unlocking` tile.
    ///
    /// Rejected (returns false, nothing changes) unless
    /// `0 < amount <= remaining(kind)`. Completing the cost unlocks the tile.
    pub fn add_payment(&mut self, coord: HexCoord, kind: ResourceKind, amount: u32) -> bool {
        let Some(tile) = self.tiles.get_mut(&coord) else {
            return false;
        };
        if tile.state != HexState::Unlocking {
            return false;
        }
        let remaining = tile.remaining(kind);
        if amount == 0 || amount > remaining {
            debug!("rejected payment of {amount} {kind:?} at {coord}, {remaining} owed");
            return false;
        }
        tile.add_payment(kind, amount);
        let progress = tile.progress();
        let complete = tile.is_fully_paid();

        self.refresh_visual(coord);
        self.emit(TerritoryEvent::UnlockProgress { coord, progress });
        if complete {
            self.complete_unlock(coord);
        }
        true
    }

    fn complete_unlock(&mut self, coord: HexCoord) {
        if let Some(tile) = self.tiles.get_mut(&coord) {
            tile.state = HexState::Unlocked;
        }
        let hidden = match self.visuals.get_mut(&coord) {
            Some(visual) => {
                visual.unlockable = false;
                !visual.revealed
            }
            None => false,
        };
        if hidden {
            self.show(coord);
        }
        self.refresh_visual(coord);
        self.reveal_neighbors(coord);
        info!("hex {coord} unlocked");
        self.emit(TerritoryEvent::Unlocked(coord));
    }

    /// Reveals locked, non-hidden neighbors of `coord` and marks them unlockable.
    ///
    /// Newly revealed faces animate in with staggered delays; already revealed
    /// ones are only restyled.
    pub fn reveal_neighbors(&mut self, coord: HexCoord) {
        let mut staggered = 0u32;
        for n in coord.neighbors() {
            let Some(tile) = self.tiles.get(&n) else {
                continue;
            };
            if tile.state != HexState::Locked {
                continue;
            }
            let Some(visual) = self.visuals.get_mut(&n) else {
                continue;
            };
            if visual.start_hidden {
                continue;
            }
            visual.unlockable = true;
            let newly_revealed = !visual.revealed;
            visual.revealed = true;
            self.sink.update_state(n, tile, visual);
            if newly_revealed {
                self.sink
                    .animate_appear(n, staggered as f32 * self.reveal_stagger);
                staggered += 1;
            }
        }
    }

    /// Sets or clears the payment-target highlight.
    pub fn set_highlight(&mut self, coord: HexCoord, highlighted: bool) {
        let Some(visual) = self.visuals.get_mut(&coord) else {
            return;
        };
        visual.highlighted = highlighted;
        self.sink.set_highlight(coord, highlighted);
        self.refresh_visual(coord);
    }
}
