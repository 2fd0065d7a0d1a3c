use std::sync::Arc;

use bevy::asset::RenderAssetUsages;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;

use super::coords::{HEX_FAN_INDICES, hex_fan_vertices};
use super::entities::{HexFaceMesh, PendingTerritoryEvents, QueuedVisuals, VisualQueue};
use super::grid::HexGrid;
use super::map_data::HexMapData;
use super::payment::PaymentController;
use super::{TerritoryConfig, generate_procedural};

// ── Startup ─────────────────────────────────────────────────────────

/// Builds the [`HexGrid`] (authored map if configured, procedural otherwise),
/// its ECS bridges, the shared face mesh, and the payment controller.
pub fn build_territory(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    cfg: Res<TerritoryConfig>,
) {
    let queue = VisualQueue(Arc::default());
    let pending = PendingTerritoryEvents(Arc::default());

    let mut grid = HexGrid::new(cfg.grid.metrics(), QueuedVisuals(queue.0.clone()))
        .with_reveal_stagger(cfg.reveal.stagger);
    let listener = pending.clone();
    grid.subscribe(move |event| listener.record(*event));

    match cfg.map_path.as_deref().map(|path| (path, HexMapData::load(path))) {
        Some((_, Ok(map))) => grid.load_from_data(&map),
        Some((path, Err(err))) => {
            error!("could not load map {path}: {err}; generating a procedural grid");
            generate_procedural(&cfg.grid, &mut grid);
        }
        None => generate_procedural(&cfg.grid, &mut grid),
    }

    let face_radius = cfg.grid.hex_size * cfg.grid.face_scale;
    let positions: Vec<[f32; 3]> = hex_fan_vertices(face_radius)
        .iter()
        .map(|v| v.to_array())
        .collect();
    let uvs: Vec<[f32; 2]> = hex_fan_vertices(0.5)
        .iter()
        .map(|v| [v.x + 0.5, v.z + 0.5])
        .collect();
    let mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, vec![[0.0_f32, 1.0, 0.0]; 7])
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U16(HEX_FAN_INDICES.to_vec()));

    commands.insert_resource(HexFaceMesh(meshes.add(mesh)));
    commands.insert_resource(PaymentController::new(
        cfg.payment.payment_rate,
        cfg.payment.detection_radius,
    ));
    commands.insert_resource(grid);
    commands.insert_resource(queue);
    commands.insert_resource(pending);
}

/// Sun light over the grid.
pub fn spawn_light(mut commands: Commands) {
    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(20.0, 40.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
