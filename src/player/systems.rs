use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::MouseScrollUnit;
use bevy::post_process::bloom::{Bloom, BloomCompositeMode};
use bevy::prelude::*;
use bevy::render::view::Hdr;

use super::PlayerConfig;
use super::entities::{CameraZoom, FollowCamera, Player, PlayerInput};
use crate::PlayerPos;

const AVATAR_HALF_HEIGHT: f32 = 0.9;

/// Spawns the avatar capsule and the follow camera with HDR and bloom.
pub fn spawn_player(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cfg: Res<PlayerConfig>,
) {
    commands.spawn((
        Name::new("Player"),
        Player,
        Mesh3d(meshes.add(Capsule3d::new(0.4, 1.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.9, 0.55, 0.2),
            emissive: LinearRgba::rgb(0.6, 0.3, 0.05),
            ..default()
        })),
        Transform::from_xyz(0.0, AVATAR_HALF_HEIGHT, 0.0),
    ));

    commands.spawn((
        Name::new("Camera"),
        FollowCamera,
        Camera3d::default(),
        Hdr,
        Tonemapping::TonyMcMapface,
        Bloom {
            intensity: cfg.bloom_intensity,
            composite_mode: BloomCompositeMode::Additive,
            ..Bloom::NATURAL
        },
        Transform::from_translation(camera_offset(&cfg, 1.0)).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Camera position relative to the player at the given zoom.
fn camera_offset(cfg: &PlayerConfig, zoom: f32) -> Vec3 {
    Vec3::new(0.0, cfg.camera_height, cfg.camera_distance) * zoom
}

/// Unit direction on the xz plane for the held WASD keys. W walks away from the camera.
pub fn movement_direction(keys: &ButtonInput<KeyCode>) -> Vec3 {
    let mut direction = Vec3::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        direction.z -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        direction.z += 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }
    direction.normalize_or_zero()
}

/// WASD walking with Shift to sprint, scroll to zoom. Writes to [`PlayerPos`].
pub fn walk(mut input: PlayerInput, mut query: Query<&mut Transform, With<Player>>) {
    let direction = movement_direction(&input.keys);
    if direction != Vec3::ZERO {
        let speed = if input.keys.pressed(KeyCode::ShiftLeft) {
            input.cfg.sprint_speed
        } else {
            input.cfg.move_speed
        };
        let delta = direction * speed * input.time.delta_secs();
        input.player.pos += delta;
    }

    for ev in input.scroll.read() {
        let lines = match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / 40.0,
        };
        let zoom = input.zoom.0 - lines * input.cfg.scroll_sensitivity * 0.1;
        input.zoom.0 = zoom.clamp(input.cfg.min_zoom, input.cfg.max_zoom);
    }

    if let Ok(mut transform) = query.single_mut() {
        transform.translation = input.player.pos + Vec3::Y * AVATAR_HALF_HEIGHT;
        if direction != Vec3::ZERO {
            transform.look_to(direction, Vec3::Y);
        }
    }
}

/// Eases the camera toward its offset behind the player.
pub fn follow_camera(
    player: Res<PlayerPos>,
    zoom: Res<CameraZoom>,
    cfg: Res<PlayerConfig>,
    mut query: Query<&mut Transform, With<FollowCamera>>,
) {
    let Ok(mut transform) = query.single_mut() else {
        return;
    };
    let target = player.pos + camera_offset(&cfg, zoom.0);
    transform.translation = transform.translation.lerp(target, cfg.follow_lerp);
    transform.look_at(player.pos, Vec3::Y);
}
