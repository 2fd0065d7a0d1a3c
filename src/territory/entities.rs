use std::sync::{Arc, Mutex};

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::coords::HexCoord;
use super::grid::{TerritoryEvent, TileVisual, VisualSink};
use super::tile::{HexState, HexTile};

/// Styling inputs for one hex face, captured when the grid restyles it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceStyle {
    pub state: HexState,
    pub progress: f32,
    pub unlockable: bool,
    pub highlighted: bool,
}

/// Presentation command recorded by [`QueuedVisuals`].
#[derive(Debug, Clone, PartialEq)]
pub enum VisualCommand {
    Spawn { coord: HexCoord, world: Vec3 },
    Despawn(HexCoord),
    Show(HexCoord),
    Appear { coord: HexCoord, delay: f32 },
    Restyle { coord: HexCoord, style: FaceStyle },
    Highlight { coord: HexCoord, on: bool },
}

type Shared<T> = Arc<Mutex<Vec<T>>>;

/// Drains a shared queue, tolerating a poisoned lock.
pub(super) fn drain<T>(queue: &Shared<T>) -> Vec<T> {
    match queue.lock() {
        Ok(mut q) => std::mem::take(&mut *q),
        Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
    }
}

fn push<T>(queue: &Shared<T>, item: T) {
    match queue.lock() {
        Ok(mut q) => q.push(item),
        Err(poisoned) => poisoned.into_inner().push(item),
    }
}

/// [`VisualSink`] that records commands for [`VisualQueue`] consumers.
pub struct QueuedVisuals(pub(super) Shared<VisualCommand>);

impl VisualSink for QueuedVisuals {
    fn spawn(&mut self, coord: HexCoord, world: Vec3, _tile: &HexTile) {
        push(&self.0, VisualCommand::Spawn { coord, world });
    }

    fn despawn(&mut self, coord: HexCoord) {
        push(&self.0, VisualCommand::Despawn(coord));
    }

    fn show_immediate(&mut self, coord: HexCoord) {
        push(&self.0, VisualCommand::Show(coord));
    }

    fn animate_appear(&mut self, coord: HexCoord, delay: f32) {
        push(&self.0, VisualCommand::Appear { coord, delay });
    }

    fn update_state(&mut self, coord: HexCoord, tile: &HexTile, visual: &TileVisual) {
        let style = FaceStyle {
            state: tile.state,
            progress: tile.progress(),
            unlockable: visual.unlockable,
            highlighted: visual.highlighted,
        };
        push(&self.0, VisualCommand::Restyle { coord, style });
    }

    fn set_highlight(&mut self, coord: HexCoord, highlighted: bool) {
        push(&self.0, VisualCommand::Highlight { coord, on: highlighted });
    }
}

/// Consumer side of [`QueuedVisuals`].
#[derive(Resource, Clone)]
pub struct VisualQueue(pub(super) Shared<VisualCommand>);

/// Grid events waiting to be written as messages.
#[derive(Resource, Clone)]
pub struct PendingTerritoryEvents(pub(super) Shared<TerritoryEvent>);

impl PendingTerritoryEvents {
    pub(super) fn record(&self, event: TerritoryEvent) {
        push(&self.0, event);
    }
}

/// Marker on hex face entities.
#[derive(Component, Reflect)]
pub struct HexFace {
    /// The cell this face draws.
    pub coord: HexCoord,
}

/// Delayed grow-in of a newly revealed face.
#[derive(Component)]
pub struct AppearAnimation {
    pub(super) delay: Timer,
    pub(super) grow: Timer,
}

impl AppearAnimation {
    pub(super) fn new(delay: f32, duration: f32) -> Self {
        Self {
            delay: Timer::from_seconds(delay.max(0.0), TimerMode::Once),
            grow: Timer::from_seconds(duration.max(0.001), TimerMode::Once),
        }
    }
}

/// Fan mesh shared by every face.
#[derive(Resource)]
pub struct HexFaceMesh(pub(super) Handle<Mesh>);

/// Entity and own material of a spawned face.
pub struct FaceHandles {
    pub(super) entity: Entity,
    pub(super) material: Handle<StandardMaterial>,
}

/// Maps hex coordinates to their face entity.
#[derive(Resource, Default)]
pub struct HexFaces {
    /// Lookup from cell to face.
    pub map: HashMap<HexCoord, FaceHandles>,
}
