use std::f64::consts::{PI, TAU};

use glam::{DVec2, DVec3};

/// Map normalized spherical coordinates to a unit direction.
///
/// `u` is longitude / 2π and `v` is colatitude / π, both in `[0, 1]`.
/// `(0.5, 0.5)` maps to world-forward.
pub fn spherical_to_vector(u: f64, v: f64) -> DVec3 {
    let (sin_lon, cos_lon) = (TAU * u).sin_cos();
    let (sin_colat, cos_colat) = (PI * v).sin_cos();
    DVec3::new(-sin_lon * sin_colat, -cos_colat, -cos_lon * sin_colat)
}

/// Inverse of [`spherical_to_vector`]: texture coordinate of a unit direction.
///
/// The result lies in `[0, 1] x [0, 1]`. `y` is clamped into `[-1, 1]` before
/// `asin` so that slightly denormalized input cannot produce NaN.
pub fn texture_coordinate(direction: DVec3) -> DVec2 {
    let u = 0.5 + direction.x.atan2(direction.z) / TAU;
    let v = 0.5 + direction.y.clamp(-1.0, 1.0).asin() / PI;
    DVec2::new(u, v)
}
