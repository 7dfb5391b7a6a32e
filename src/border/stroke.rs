//! Frame strokes and corner masks.

use crate::geometry::CanvasSpec;
use crate::render::Surface;
use crate::shader::{Dash, arc_points};
use image::Rgba;

/// Straight segments used to approximate one rounded corner of a mask.
pub const CORNER_ARC_SEGMENTS: usize = 10;

/// The four canvas corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];
}

/// Polygon that covers the square corner outside a rounded corner of
/// radius `radius`.
///
/// Two straight edges along the canvas sides meet at the corner point; the
/// arc closes the shape. The radius is clamped to half the shorter side so
/// opposite arcs can meet but never cross.
pub fn corner_mask_polygon(corner: Corner, radius: u32, canvas: CanvasSpec) -> Vec<(f32, f32)> {
    let r = radius.min(canvas.min_side() / 2) as f32;
    let w = canvas.width as f32;
    let h = canvas.height as f32;

    // Corner point, arc center, arc start angle (screen space, clockwise)
    let (corner_pt, center, start) = match corner {
        Corner::TopLeft => ((0.0, 0.0), (r, r), 180.0),
        Corner::TopRight => ((w, 0.0), (w - r, r), 270.0),
        Corner::BottomRight => ((w, h), (w - r, h - r), 0.0),
        Corner::BottomLeft => ((0.0, h), (r, h - r), 90.0),
    };

    let mut points = Vec::with_capacity(CORNER_ARC_SEGMENTS + 2);
    points.push(corner_pt);
    points.extend(arc_points(center.0, center.1, r, start, 90.0, CORNER_ARC_SEGMENTS));
    points
}

/// Paint all four corner masks.
pub(super) fn fill_corner_masks(surface: &mut Surface, canvas: CanvasSpec, radius: u32, fill: Rgba<u8>) {
    for corner in Corner::ALL {
        let poly = corner_mask_polygon(corner, radius, canvas);
        surface.fill_polygon(&poly, fill);
    }
}

/// Draw `count` concentric 1px rounded-rectangle strokes, the first inset
/// by `inset` from the canvas edge.
///
/// Each ring keeps the corner centers of the outermost one, so its radius
/// shrinks by one pixel per step inward and the band stays uniformly wide
/// around the corners.
pub(super) fn stroke_frame(
    surface: &mut Surface,
    canvas: CanvasSpec,
    inset: u32,
    count: u32,
    radius: u32,
    color: Rgba<u8>,
    dash: Option<Dash>,
) {
    let max_x = canvas.width as i64 - 1;
    let max_y = canvas.height as i64 - 1;

    for i in 0..count {
        let o = (inset + i) as i64;
        let (x1, y1, x2, y2) = (o, o, max_x - o, max_y - o);
        if x2 < x1 || y2 < y1 {
            break;
        }
        let half_side = ((x2 - x1).min(y2 - y1) / 2) as u32;
        let r = radius.saturating_sub(i).min(half_side) as i64;
        stroke_ring(surface, x1, y1, x2, y2, r, color, dash);
    }
}

/// One 1px ring. Pixel coordinates are inclusive; straight edges run between
/// the arcs and carry the dash pattern, arcs are continuous.
#[allow(clippy::too_many_arguments)]
fn stroke_ring(
    surface: &mut Surface,
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
    r: i64,
    color: Rgba<u8>,
    dash: Option<Dash>,
) {
    let on = |k: i64| dash.is_none_or(|d| d.is_on(k as f32));

    // Top and bottom edges
    for x in x1 + r..=x2 - r {
        if on(x - x1 - r) {
            surface.fill_rect(x, y1, 1, 1, color);
            surface.fill_rect(x, y2, 1, 1, color);
        }
    }
    // Left and right edges
    for y in y1 + r..=y2 - r {
        if on(y - y1 - r) {
            surface.fill_rect(x1, y, 1, 1, color);
            surface.fill_rect(x2, y, 1, 1, color);
        }
    }

    if r <= 0 {
        return;
    }

    // Arc centers in continuous space: pixel (x, y) is centered at (x+.5, y+.5)
    let rf = r as f32;
    let segments = CORNER_ARC_SEGMENTS.max(r as usize / 2);
    let arcs = [
        ((x1 + r) as f32 + 0.5, (y1 + r) as f32 + 0.5, 180.0),
        ((x2 - r) as f32 + 0.5, (y1 + r) as f32 + 0.5, 270.0),
        ((x2 - r) as f32 + 0.5, (y2 - r) as f32 + 0.5, 0.0),
        ((x1 + r) as f32 + 0.5, (y2 - r) as f32 + 0.5, 90.0),
    ];
    for (cx, cy, start) in arcs {
        let pts = arc_points(cx, cy, rf, start, 90.0, segments);
        surface.stroke_polyline(&pts, 1.0, color);
    }
}
