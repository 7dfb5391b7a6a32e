//! Distance functions for analytic shapes.

/// Euclidean distance between two points.
#[inline]
pub fn dist(x: f32, y: f32, cx: f32, cy: f32) -> f32 {
    let dx = x - cx;
    let dy = y - cy;
    (dx * dx + dy * dy).sqrt()
}

/// Distance from a point to a line segment.
///
/// Returns the shortest distance from point (px, py) to the line segment
/// defined by endpoints (x1, y1) and (x2, y2).
pub fn dist_to_segment(px: f32, py: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let len_sq = dx * dx + dy * dy;

    if len_sq < 1e-10 {
        // Degenerate segment (point)
        return dist(px, py, x1, y1);
    }

    // Project point onto line, clamping to segment
    let t = ((px - x1) * dx + (py - y1) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);

    dist(px, py, x1 + t * dx, y1 + t * dy)
}

/// Signed distance to a rounded rectangle.
///
/// The rectangle spans `[x0, x1] × [y0, y1]` with corner radius `r` (clamped
/// to half the shorter side). Negative inside, zero on the outline, positive
/// outside.
///
/// ```text
///   ╭────────╮     d < 0 inside
///   │   -    │     d = 0 on the edge
///   ╰────────╯  +  d > 0 outside
/// ```
pub fn sd_rounded_rect(px: f32, py: f32, x0: f32, y0: f32, x1: f32, y1: f32, r: f32) -> f32 {
    let hw = (x1 - x0) / 2.0;
    let hh = (y1 - y0) / 2.0;
    let r = r.clamp(0.0, hw.min(hh).max(0.0));
    let cx = x0 + hw;
    let cy = y0 + hh;

    // Fold into the first quadrant, measure against the inner box
    let qx = (px - cx).abs() - (hw - r);
    let qy = (py - cy).abs() - (hh - r);
    let outside = dist(qx.max(0.0), qy.max(0.0), 0.0, 0.0);
    let inside = qx.max(qy).min(0.0);
    outside + inside - r
}
