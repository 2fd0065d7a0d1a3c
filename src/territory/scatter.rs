//! Noise-driven placement of resource nodes for procedural grids.

use std::f32::consts::TAU;

use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::coords::{HexCoord, HexMetrics};
use super::map_data::ResourceSpawn;
use super::tile::ResourceKind;
use crate::math::map_noise_to_range;

/// Starter layout at the origin for a cell of size 5: two trees and a rock.
const STARTER_SPAWNS: [(ResourceKind, f32, f32); 3] = [
    (ResourceKind::Wood, 3.0, -3.0),
    (ResourceKind::Wood, -3.0, -3.0),
    (ResourceKind::Stone, -3.0, 2.0),
];

/// Noise-driven resource placement for procedural grids.
///
/// Density noise picks how many nodes a hex gets, placement noise picks where
/// inside the hex they sit. Same seed, same layout.
pub struct SpawnScatter {
    density: Fbm<Perlin>,
    placement: Fbm<Perlin>,
    scale: f64,
    max_per_hex: u32,
}

impl SpawnScatter {
    /// Creates a scatter from a seed; `scale` divides world units before sampling.
    pub fn new(seed: u32, octaves: usize, scale: f64, max_per_hex: u32) -> Self {
        Self {
            density: Fbm::new(seed).set_octaves(octaves),
            placement: Fbm::new(seed.wrapping_add(1)).set_octaves(octaves),
            scale: scale.max(f64::EPSILON),
            max_per_hex,
        }
    }

    /// Spawns for one hex. The origin always gets the fixed starter layout.
    pub fn spawns_for(&self, coord: HexCoord, metrics: &HexMetrics) -> Vec<ResourceSpawn> {
        if coord == HexCoord::ORIGIN {
            let k = metrics.size / 5.0;
            return STARTER_SPAWNS
                .iter()
                .map(|&(kind, x, z)| ResourceSpawn::new(kind, Vec2::new(x, z) * k, 0.0))
                .collect();
        }

        let center = metrics.hex_to_world(coord);
        let x = center.x as f64 / self.scale;
        let z = center.z as f64 / self.scale;
        let count = map_noise_to_range(self.density.get([x, z]), 0.0, self.max_per_hex as f32 + 1.0)
            .floor()
            .clamp(0.0, self.max_per_hex as f32) as u32;

        (0..count)
            .map(|i| {
                let k = 7.31 * (i + 1) as f64;
                let angle = map_noise_to_range(self.placement.get([x + k, z - k]), 0.0, TAU);
                let reach = map_noise_to_range(self.placement.get([x - k, z + k]), 0.25, 0.7);
                let pick = self.density.get([x + k, z + k]);
                let kind = if pick >= 0.0 {
                    ResourceKind::Wood
                } else {
                    ResourceKind::Stone
                };
                let offset = Vec2::from_angle(angle) * reach * metrics.size;
                let rotation = map_noise_to_range(pick, 0.0, 360.0);
                ResourceSpawn::new(kind, offset, rotation)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_gets_starter_layout() {
        let scatter = SpawnScatter::new(7, 3, 20.0, 3);
        let spawns = scatter.spawns_for(HexCoord::ORIGIN, &HexMetrics::new(10.0));
        assert_eq!(spawns.len(), 3);
        assert_eq!(spawns[0].kind, ResourceKind::Wood);
        assert_eq!(spawns[0].offset, [6.0, -6.0]);
        assert_eq!(spawns[2].kind, ResourceKind::Stone);
    }

    #[test]
    fn scatter_is_deterministic() {
        let m = HexMetrics::default();
        let a = SpawnScatter::new(99, 3, 12.0, 4);
        let b = SpawnScatter::new(99, 3, 12.0, 4);
        for q in -4..=4 {
            for r in -4..=4 {
                let c = HexCoord::new(q, r);
                assert_eq!(a.spawns_for(c, &m), b.spawns_for(c, &m));
            }
        }
    }

    #[test]
    fn spawns_stay_inside_their_hex() {
        let m = HexMetrics::new(5.0);
        let scatter = SpawnScatter::new(3, 4, 9.0, 3);
        for q in -6..=6 {
            for r in -6..=6 {
                let c = HexCoord::new(q, r);
                let spawns = scatter.spawns_for(c, &m);
                if c != HexCoord::ORIGIN {
                    assert!(spawns.len() <= 3);
                }
                for s in spawns {
                    let d = Vec2::from(s.offset).length();
                    assert!(d <= m.size, "{c}: offset {d} outside hex");
                    assert!(matches!(s.kind, ResourceKind::Wood | ResourceKind::Stone));
                }
            }
        }
    }

    #[test]
    fn zero_max_means_no_scatter() {
        let scatter = SpawnScatter::new(1, 2, 10.0, 0);
        assert!(
            scatter
                .spawns_for(HexCoord::new(3, -2), &HexMetrics::default())
                .is_empty()
        );
    }
}
