use bevy::prelude::*;

use super::TerritoryConfig;
use super::entities::{
    AppearAnimation, FaceHandles, FaceStyle, HexFace, HexFaceMesh, HexFaces,
    PendingTerritoryEvents, VisualCommand, VisualQueue, drain,
};
use super::grid::{HexGrid, TerritoryEvent};
use super::payment::PaymentController;
use super::tile::HexState;
use crate::PlayerPos;
use crate::inventory::Backpack;
use crate::math;

const UNLOCKED_COLOR: [f32; 3] = [0.3, 0.6, 0.25];
const LOCKED_COLOR: [f32; 3] = [0.1, 0.1, 0.12];
const UNLOCKABLE_COLOR: [f32; 3] = [0.2, 0.25, 0.4];
const UNLOCKING_COLOR: [f32; 3] = [0.6, 0.5, 0.2];

/// Albedo and glow for a face in the given style.
fn face_colors(style: &FaceStyle) -> (Color, LinearRgba) {
    let [r, g, b] = match style.state {
        HexState::Unlocked => UNLOCKED_COLOR,
        HexState::Unlocking => math::lerp_rgb(UNLOCKABLE_COLOR, UNLOCKING_COLOR, style.progress),
        HexState::Locked if style.unlockable => UNLOCKABLE_COLOR,
        HexState::Locked => LOCKED_COLOR,
    };
    let glow = if style.highlighted {
        LinearRgba::rgb(0.4, 0.4, 0.15)
    } else {
        match style.state {
            HexState::Unlocking => {
                let k = 0.5 + style.progress.clamp(0.0, 1.0) * 0.5;
                LinearRgba::rgb(0.2 * k, 0.2 * k, 0.05 * k)
            }
            HexState::Locked if style.unlockable => LinearRgba::rgb(0.03, 0.03, 0.06),
            _ => LinearRgba::BLACK,
        }
    };
    (Color::srgb(r, g, b), glow)
}

/// Runs the payment controller against the player's position.
pub fn pay_for_nearby_hex(
    time: Res<Time>,
    player: Res<PlayerPos>,
    mut grid: ResMut<HexGrid>,
    mut controller: ResMut<PaymentController>,
    mut backpack: ResMut<Backpack>,
) {
    controller.tick(time.delta(), player.pos, &mut grid, &mut backpack);
}

/// Writes buffered grid events as [`TerritoryEvent`] messages.
pub fn forward_territory_events(
    pending: Res<PendingTerritoryEvents>,
    mut writer: MessageWriter<TerritoryEvent>,
) {
    for event in drain(&pending.0) {
        writer.write(event);
    }
}

pub fn log_territory_events(mut events: MessageReader<TerritoryEvent>) {
    for event in events.read() {
        match event {
            TerritoryEvent::UnlockStarted(coord) => info!("started unlocking {coord}"),
            TerritoryEvent::UnlockProgress { coord, progress } => {
                debug!("{coord} is {:.0}% paid", progress * 100.0);
            }
            TerritoryEvent::Unlocked(coord) => info!("territory grew to {coord}"),
        }
    }
}

/// Applies queued [`VisualCommand`]s to hex face entities.
pub fn apply_visual_commands(
    mut commands: Commands,
    queue: Res<VisualQueue>,
    mesh: Res<HexFaceMesh>,
    cfg: Res<TerritoryConfig>,
    mut faces: ResMut<HexFaces>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for command in drain(&queue.0) {
        match command {
            VisualCommand::Spawn { coord, world } => {
                if let Some(old) = faces.map.remove(&coord) {
                    commands.entity(old.entity).despawn();
                }
                let material = materials.add(StandardMaterial {
                    base_color: Color::srgb(LOCKED_COLOR[0], LOCKED_COLOR[1], LOCKED_COLOR[2]),
                    perceptual_roughness: 0.9,
                    cull_mode: None,
                    ..default()
                });
                let entity = commands
                    .spawn((
                        Name::new(format!("Hex {coord}")),
                        HexFace { coord },
                        Mesh3d(mesh.0.clone()),
                        MeshMaterial3d(material.clone()),
                        Transform::from_translation(world),
                        Visibility::Hidden,
                    ))
                    .id();
                faces.map.insert(coord, FaceHandles { entity, material });
            }
            VisualCommand::Despawn(coord) => {
                if let Some(face) = faces.map.remove(&coord) {
                    commands.entity(face.entity).despawn();
                }
            }
            VisualCommand::Show(coord) => {
                if let Some(face) = faces.map.get(&coord) {
                    commands
                        .entity(face.entity)
                        .remove::<AppearAnimation>()
                        .insert(Visibility::Visible);
                }
            }
            VisualCommand::Appear { coord, delay } => {
                if let Some(face) = faces.map.get(&coord) {
                    commands.entity(face.entity).insert(AppearAnimation::new(
                        delay,
                        cfg.reveal.appear_duration,
                    ));
                }
            }
            VisualCommand::Restyle { coord, style } => {
                let Some(face) = faces.map.get(&coord) else {
                    continue;
                };
                if let Some(mat) = materials.get_mut(&face.material) {
                    let (base, glow) = face_colors(&style);
                    mat.base_color = base;
                    mat.emissive = glow;
                }
            }
            VisualCommand::Highlight { coord, on } => {
                let Some(face) = faces.map.get(&coord) else {
                    continue;
                };
                if on && let Some(mat) = materials.get_mut(&face.material) {
                    mat.emissive = LinearRgba::rgb(0.4, 0.4, 0.15);
                }
            }
        }
    }
}

/// Waits out each face's reveal delay, then grows it in with an ease-out curve.
pub fn animate_appear(
    mut commands: Commands,
    time: Res<Time>,
    mut faces: Query<(Entity, &mut AppearAnimation, &mut Transform, &mut Visibility)>,
) {
    for (entity, mut anim, mut transform, mut visibility) in &mut faces {
        anim.delay.tick(time.delta());
        if !anim.delay.is_finished() {
            transform.scale = Vec3::ZERO;
            continue;
        }
        *visibility = Visibility::Visible;
        anim.grow.tick(time.delta());
        let t = math::ease_out_cubic(anim.grow.fraction());
        transform.scale = Vec3::splat(t.max(0.001));
        if anim.grow.is_finished() {
            transform.scale = Vec3::ONE;
            commands.entity(entity).remove::<AppearAnimation>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(state: HexState, progress: f32, unlockable: bool, highlighted: bool) -> FaceStyle {
        FaceStyle {
            state,
            progress,
            unlockable,
            highlighted,
        }
    }

    #[test]
    fn locked_color_depends_on_unlockable() {
        let (hidden, glow) = face_colors(&style(HexState::Locked, 0.0, false, false));
        assert_eq!(hidden, Color::srgb(0.1, 0.1, 0.12));
        assert_eq!(glow, LinearRgba::BLACK);
        let (frontier, _) = face_colors(&style(HexState::Locked, 0.0, true, false));
        assert_eq!(frontier, Color::srgb(0.2, 0.25, 0.4));
    }

    #[test]
    fn unlocking_color_follows_progress() {
        let (start, _) = face_colors(&style(HexState::Unlocking, 0.0, false, false));
        let (done, _) = face_colors(&style(HexState::Unlocking, 1.0, false, false));
        assert_eq!(start, Color::srgb(0.2, 0.25, 0.4));
        let done = done.to_srgba();
        assert!((done.red - 0.6).abs() < 1e-5);
        assert!((done.green - 0.5).abs() < 1e-5);
        assert!((done.blue - 0.2).abs() < 1e-5);
    }

    #[test]
    fn highlight_overrides_glow() {
        let (_, glow) = face_colors(&style(HexState::Unlocked, 1.0, false, true));
        assert_eq!(glow, LinearRgba::rgb(0.4, 0.4, 0.15));
    }
}
