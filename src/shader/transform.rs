//! Coordinate transformation functions.

use std::f32::consts::PI;

/// Convert polar coordinates to Cartesian.
#[inline]
pub fn polar_to_cart(r: f32, theta: f32) -> (f32, f32) {
    (r * theta.cos(), r * theta.sin())
}

/// Points along a circular arc.
///
/// Angles are in degrees, measured clockwise from the +x axis in screen
/// space (y grows downward). Returns `segments + 1` points including both
/// ends.
pub fn arc_points(
    cx: f32,
    cy: f32,
    radius: f32,
    start_deg: f32,
    sweep_deg: f32,
    segments: usize,
) -> Vec<(f32, f32)> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let t = (start_deg + sweep_deg * i as f32 / segments as f32) * PI / 180.0;
            let (dx, dy) = polar_to_cart(radius, t);
            (cx + dx, cy + dy)
        })
        .collect()
}

/// Horizontal shear: rows near the top move right by up to `factor × height`.
///
/// Returns the sheared x coordinate for a point at row `y` of a block that
/// is `height` rows tall. Used for synthetic italics.
#[inline]
pub fn shear_x(x: f32, y: f32, factor: f32, height: f32) -> f32 {
    x + factor * (height - y)
}
