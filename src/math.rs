//! Pure computation helpers extracted for testability.
//!
//! All functions in this module are free of Bevy ECS dependencies and operate
//! on plain numeric / `Vec3` inputs, making them straightforward to unit-test.

use bevy::prelude::{Vec2, Vec3};

/// Maps a noise value from the standard `[-1, 1]` range into `[min, max]`.
///
/// Noise generators (e.g. `Fbm<Perlin>`) produce values centred around zero.
/// This linearly rescales to an arbitrary output range.
///
/// # Examples
/// ```
/// # use hex_territory::math::map_noise_to_range;
/// assert_eq!(map_noise_to_range(-1.0, 0.0, 10.0), 0.0);
/// assert_eq!(map_noise_to_range( 1.0, 0.0, 10.0), 10.0);
/// assert_eq!(map_noise_to_range( 0.0, 2.0, 6.0),  4.0);
/// ```
pub fn map_noise_to_range(noise_val: f64, min: f32, max: f32) -> f32 {
    min + ((noise_val as f32 + 1.0) / 2.0) * (max - min)
}

/// Cubic ease-out curve: fast start, gentle deceleration.
///
/// `t` should be in `[0, 1]`. Returns `1 - (1 - t)^3`.
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Component-wise linear blend of two RGB triples, `t` clamped to `[0, 1]`.
pub fn lerp_rgb(from: [f32; 3], to: [f32; 3], t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    std::array::from_fn(|i| from[i] + (to[i] - from[i]) * t)
}

/// Distance between two points projected onto the xz ground plane.
pub fn ground_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x, a.z).distance(Vec2::new(b.x, b.z))
}

/// The candidate closest to `origin` on the ground plane, if any lies strictly
/// within `radius`. The first of equally distant candidates wins.
pub fn nearest_within<T>(
    origin: Vec3,
    radius: f32,
    candidates: impl IntoIterator<Item = (T, Vec3)>,
) -> Option<T> {
    let mut best: Option<(T, f32)> = None;
    for (item, pos) in candidates {
        let dist = ground_distance(origin, pos);
        if dist >= radius {
            continue;
        }
        if best.as_ref().is_none_or(|(_, d)| dist < *d) {
            best = Some((item, dist));
        }
    }
    best.map(|(item, _)| item)
}
