//! Closed-form volume and centroid of a sphere filled from the bottom.
//!
//! `depth` is measured upward from the lowest point of the sphere and is
//! clamped to `[0, 2R]`. Both functions are total: zero or negative radii
//! give an empty sphere.

use std::f32::consts::PI;

use crate::constants::FILL_RATIO_EPSILON;

/// Volume of the part of a sphere of radius `radius` lying below a plane
/// `depth` above its bottom.
pub fn filled_sphere_volume(radius: f32, depth: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    let depth = depth.clamp(0.0, 2.0 * radius);
    let d = depth - radius;
    let r2 = radius * radius;

    (PI * (r2 * depth - r2 * radius / 3.0 - d * d * d / 3.0)).max(0.0)
}

pub fn full_sphere_volume(radius: f32) -> f32 {
    filled_sphere_volume(radius, 2.0 * radius)
}

/// Vertical offset, from the sphere center, of the centroid of the filled
/// part. `-R` (the bottom) when nothing is filled, 0 when full.
pub fn filled_sphere_centroid_offset(radius: f32, depth: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    let depth = depth.clamp(0.0, 2.0 * radius);
    let volume = filled_sphere_volume(radius, depth);
    if volume / full_sphere_volume(radius) <= FILL_RATIO_EPSILON {
        return -radius;
    }

    let r = radius;
    let r2 = r * r;
    let r4 = r2 * r2;
    let d = depth - r;
    let d2 = d * d;

    let moment = depth * r2 * r - r * d2 * d / 3.0 - r4 / 3.0 + r2 * d2 / 2.0 - r4 / 2.0
        - d2 * d2 / 4.0
        + r4 / 4.0;
    // Cancellation near empty can push t slightly out of range
    let t = (PI / 2.0 * moment / (r * volume)).clamp(0.0, 1.0);

    2.0 * r * t - r
}
