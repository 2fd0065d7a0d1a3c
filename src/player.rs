//! Third-person walker with a trailing camera.
//!
//! WASD + Shift + scroll zoom. Writes to [`PlayerPos`](crate::PlayerPos) for
//! payment and gathering to consume. Spawns the Camera3d entity with bloom.

mod entities;
mod systems;

pub use entities::{FollowCamera, Player};

use bevy::prelude::*;

use crate::GameState;

/// Per-plugin configuration for the player controller.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct PlayerConfig {
    /// Walking speed in world-units per second.
    pub move_speed: f32,
    /// Speed while Shift is held.
    pub sprint_speed: f32,
    /// Camera height above the player at zoom 1.
    pub camera_height: f32,
    /// Camera distance behind the player at zoom 1.
    pub camera_distance: f32,
    /// Zoom change per scroll line, in tenths.
    pub scroll_sensitivity: f32,
    /// Closest zoom factor.
    pub min_zoom: f32,
    /// Farthest zoom factor.
    pub max_zoom: f32,
    /// Per-frame lerp factor of the follow camera.
    pub follow_lerp: f32,
    /// Bloom post-processing intensity.
    pub bloom_intensity: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            sprint_speed: 8.0,
            camera_height: 14.0,
            camera_distance: 12.0,
            scroll_sensitivity: 1.0,
            min_zoom: 0.4,
            max_zoom: 3.0,
            follow_lerp: 0.12,
            bloom_intensity: 0.3,
        }
    }
}

/// Walking avatar and follow camera.
pub struct PlayerPlugin(pub PlayerConfig);

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Player>()
            .register_type::<FollowCamera>()
            .register_type::<PlayerConfig>()
            .insert_resource(self.0.clone())
            .init_resource::<entities::CameraZoom>()
            .add_systems(Startup, systems::spawn_player)
            .add_systems(
                Update,
                (systems::walk.run_if(in_state(GameState::Running)), systems::follow_camera).chain(),
            );
    }
}
