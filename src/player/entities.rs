use bevy::ecs::system::SystemParam;
use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;

use super::PlayerConfig;
use crate::PlayerPos;

/// Marker for the walking avatar.
#[derive(Component, Reflect)]
pub struct Player;

/// Marker for the camera that trails the avatar.
#[derive(Component, Reflect)]
pub struct FollowCamera;

/// Camera distance multiplier driven by the scroll wheel.
#[derive(Resource, Reflect)]
pub struct CameraZoom(pub f32);

impl Default for CameraZoom {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Everything [`super::systems::walk`] reads or writes besides the avatar.
#[derive(SystemParam)]
pub struct PlayerInput<'w, 's> {
    pub keys: Res<'w, ButtonInput<KeyCode>>,
    pub scroll: MessageReader<'w, 's, MouseWheel>,
    pub time: Res<'w, Time>,
    pub cfg: Res<'w, PlayerConfig>,
    pub player: ResMut<'w, PlayerPos>,
    pub zoom: ResMut<'w, CameraZoom>,
}
