use bevy::prelude::*;

use super::GatherConfig;
use super::entities::{GatherController, NodeAssets, PopulatedHexes, ResourceNode};
use crate::PlayerPos;
use crate::inventory::Backpack;
use crate::math::nearest_within;
use crate::territory::tile::{HexState, ResourceKind};
use crate::territory::{HexCoord, HexGrid, TerritoryEvent};

/// Builds the shared node meshes and materials.
pub fn setup_node_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(NodeAssets {
        tree: meshes.add(Cone::new(0.8, 2.5)),
        rock: meshes.add(Sphere::new(0.7)),
        wood: materials.add(Color::srgb(0.2, 0.5, 0.15)),
        stone: materials.add(Color::srgb(0.5, 0.5, 0.55)),
        ore: materials.add(Color::srgb(0.55, 0.35, 0.25)),
    });
}

/// Spawns nodes for hexes that are unlocked at startup or become unlocked later.
pub fn populate_unlocked_hexes(
    mut commands: Commands,
    grid: Res<HexGrid>,
    assets: Res<NodeAssets>,
    cfg: Res<GatherConfig>,
    mut populated: ResMut<PopulatedHexes>,
    mut events: MessageReader<TerritoryEvent>,
    mut initialized: Local<bool>,
) {
    let mut fresh: Vec<HexCoord> = events
        .read()
        .filter_map(|e| match e {
            TerritoryEvent::Unlocked(c) => Some(*c),
            _ => None,
        })
        .collect();
    if !*initialized {
        *initialized = true;
        fresh.extend(
            grid.get_all_hexes()
                .filter(|(_, tile, _)| tile.state == HexState::Unlocked)
                .map(|(coord, _, _)| coord),
        );
    }

    for coord in fresh {
        if !populated.claim(coord) {
            continue;
        }
        let center = grid.hex_to_world(coord);
        for spawn in grid.get_spawn_data(coord) {
            let (mesh, material) = assets.for_kind(spawn.kind);
            let lift = if spawn.kind == ResourceKind::Wood { 1.25 } else { 0.4 };
            commands.spawn((
                Name::new(format!("{} node {coord}", spawn.kind.display_name())),
                ResourceNode::new(spawn.kind, cfg.total_hits, cfg.yield_per_hit, cfg.respawn_secs),
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::from_translation(spawn.world_position(center) + Vec3::Y * lift)
                    .with_rotation(spawn.rotation()),
            ));
        }
    }
}

/// Gathers from the nearest live node in reach into the backpack.
pub fn gather_nearby(
    time: Res<Time>,
    player: Res<PlayerPos>,
    cfg: Res<GatherConfig>,
    mut controller: ResMut<GatherController>,
    mut backpack: ResMut<Backpack>,
    mut nodes: Query<(Entity, &Transform, &mut ResourceNode)>,
) {
    let nearest = nearest_within(
        player.pos,
        cfg.gather_radius,
        nodes
            .iter()
            .filter(|(_, _, node)| !node.depleted)
            .map(|(entity, transform, _)| (entity, transform.translation)),
    );
    controller.retarget(nearest);
    let Some(target) = controller.target() else {
        return;
    };

    let hits = controller.tick(time.delta());
    let Ok((_, _, mut node)) = nodes.get_mut(target) else {
        return;
    };
    for _ in 0..hits {
        if node.depleted {
            break;
        }
        let amount = node.gather(cfg.yield_multiplier);
        backpack.add(node.kind, amount);
        debug!("gathered {amount} {:?}", node.kind);
    }
}

/// Refills depleted nodes whose respawn time is up.
pub fn respawn_nodes(time: Res<Time>, mut nodes: Query<&mut ResourceNode>) {
    for mut node in &mut nodes {
        if node.depleted && node.tick_respawn(time.delta()) {
            debug!("{:?} node respawned", node.kind);
        }
    }
}

/// Hides depleted nodes and shrinks worn ones.
pub fn sync_node_visuals(
    mut nodes: Query<(&ResourceNode, &mut Transform, &mut Visibility), Changed<ResourceNode>>,
) {
    for (node, mut transform, mut visibility) in &mut nodes {
        *visibility = if node.depleted {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
        transform.scale = Vec3::splat(node.scale_factor());
    }
}
