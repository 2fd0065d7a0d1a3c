use std::time::Duration;

use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::territory::HexCoord;
use crate::territory::payment::payment_interval;
use crate::territory::tile::ResourceKind;

/// A harvestable node placed from a hex's spawn data.
///
/// Each gather spends one hit; at zero hits the node is depleted until its
/// respawn timer runs out.
#[derive(Component, Reflect, Debug, Clone)]
pub struct ResourceNode {
    /// What gathering yields.
    pub kind: ResourceKind,
    /// Hits available when fresh.
    pub total_hits: u32,
    /// Hits left before depletion.
    pub remaining_hits: u32,
    /// Base yield per hit, before the multiplier.
    pub yield_per_hit: u32,
    /// No hits left; hidden and skipped by gathering.
    pub depleted: bool,
    respawn: Timer,
}

impl ResourceNode {
    /// A fresh node. `total_hits` is at least 1.
    pub fn new(kind: ResourceKind, total_hits: u32, yield_per_hit: u32, respawn_secs: f32) -> Self {
        let total_hits = total_hits.max(1);
        Self {
            kind,
            total_hits,
            remaining_hits: total_hits,
            yield_per_hit,
            depleted: false,
            respawn: Timer::from_seconds(respawn_secs.max(0.0), TimerMode::Once),
        }
    }

    /// Spends one hit and returns `ceil(yield_per_hit * multiplier)`. 0 when depleted.
    pub fn gather(&mut self, multiplier: f32) -> u32 {
        if self.depleted {
            return 0;
        }
        self.remaining_hits = self.remaining_hits.saturating_sub(1);
        if self.remaining_hits == 0 {
            self.depleted = true;
            self.respawn.reset();
        }
        (self.yield_per_hit as f32 * multiplier.max(0.0)).ceil() as u32
    }

    /// Advances the respawn clock of a depleted node. True when it refills.
    pub fn tick_respawn(&mut self, delta: Duration) -> bool {
        if !self.depleted {
            return false;
        }
        self.respawn.tick(delta);
        if !self.respawn.is_finished() {
            return false;
        }
        self.depleted = false;
        self.remaining_hits = self.total_hits;
        true
    }

    /// Visual size relative to fresh: shrinks with spent hits, never below 0.1.
    pub fn scale_factor(&self) -> f32 {
        (self.remaining_hits as f32 / self.total_hits as f32).max(0.1)
    }
}

/// Current gather target and the gather clock.
#[derive(Resource, Debug)]
pub struct GatherController {
    target: Option<Entity>,
    timer: Timer,
}

impl GatherController {
    /// Gathers `rate` times per second.
    pub fn new(rate: f64) -> Self {
        Self {
            target: None,
            timer: Timer::new(payment_interval(rate), TimerMode::Repeating),
        }
    }

    /// Node being gathered.
    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    /// Switches target; the clock restarts only when it actually changes.
    pub fn retarget(&mut self, target: Option<Entity>) {
        if target != self.target {
            self.target = target;
            self.timer.reset();
        }
    }

    /// Gathers due this frame. Zero without a target.
    pub fn tick(&mut self, delta: Duration) -> u32 {
        if self.target.is_none() {
            return 0;
        }
        self.timer.tick(delta);
        self.timer.times_finished_this_tick()
    }
}

/// Hexes whose nodes have already been spawned.
#[derive(Resource, Default)]
pub struct PopulatedHexes(HashSet<HexCoord>);

impl PopulatedHexes {
    /// Marks `coord` as populated. False if it already was.
    pub fn claim(&mut self, coord: HexCoord) -> bool {
        self.0.insert(coord)
    }
}

/// Shared meshes and materials for node entities.
#[derive(Resource)]
pub struct NodeAssets {
    pub(super) tree: Handle<Mesh>,
    pub(super) rock: Handle<Mesh>,
    pub(super) wood: Handle<StandardMaterial>,
    pub(super) stone: Handle<StandardMaterial>,
    pub(super) ore: Handle<StandardMaterial>,
}

impl NodeAssets {
    /// Mesh and material for a node of `kind`.
    pub(super) fn for_kind(&self, kind: ResourceKind) -> (Handle<Mesh>, Handle<StandardMaterial>) {
        match kind {
            ResourceKind::Wood => (self.tree.clone(), self.wood.clone()),
            ResourceKind::Stone => (self.rock.clone(), self.stone.clone()),
            _ => (self.rock.clone(), self.ore.clone()),
        }
    }
}
