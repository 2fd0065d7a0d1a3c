//! Resource nodes placed inside unlocked hexes, and the auto-gather loop that
//! drains them into the [`Backpack`](crate::inventory::Backpack).

mod entities;
mod systems;

pub use entities::{GatherController, ResourceNode};

use bevy::prelude::*;

use crate::GameState;

/// Per-plugin configuration for gathering.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct GatherConfig {
    /// Gathers per second while a node is in reach.
    pub gather_rate: f64,
    /// Reach from the player on the ground plane.
    pub gather_radius: f32,
    /// Scales every node's yield per hit (rounded up).
    pub yield_multiplier: f32,
    /// Hits a fresh node survives.
    pub total_hits: u32,
    /// Base resources per hit.
    pub yield_per_hit: u32,
    /// Seconds a depleted node waits before refilling.
    pub respawn_secs: f32,
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            gather_rate: 1.0,
            gather_radius: 2.0,
            yield_multiplier: 1.0,
            total_hits: 3,
            yield_per_hit: 1,
            respawn_secs: 30.0,
        }
    }
}

/// Spawns resource nodes and gathers from them.
pub struct GatherPlugin(pub GatherConfig);

impl Plugin for GatherPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<ResourceNode>()
            .register_type::<GatherConfig>()
            .insert_resource(self.0.clone())
            .insert_resource(GatherController::new(self.0.gather_rate))
            .init_resource::<entities::PopulatedHexes>()
            .add_systems(Startup, systems::setup_node_assets)
            .add_systems(
                Update,
                (
                    systems::populate_unlocked_hexes,
                    systems::gather_nearby.run_if(in_state(GameState::Running)),
                    systems::respawn_nodes,
                    systems::sync_node_visuals,
                )
                    .chain(),
            );
    }
}
