//! # Resolution-Independent Geometry
//!
//! Every position and length in a scene is stored against a *reference*
//! canvas (the one the user arranged things on). Rendering at any other size
//! goes through the conversions in this module.
//!
//! ```text
//!   reference 600x800                 export 1242x1660
//!   ┌──────────┐  scale_x = 2.07      ┌────────────────────┐
//!   │   ●(300, │  scale_y = 2.075     │        ●(621,      │
//!   │    400)  │ ───────────────────▶ │         830)       │
//!   └──────────┘                      └────────────────────┘
//! ```
//!
//! Positions scale per axis. Lengths that must not skew (stroke widths, font
//! sizes, pattern pitch) use a single uniform factor, see [`Scale::uniform`].
//!
//! The drag-handle math of the interactive editor lives here as well, so it
//! can be tested without any UI toolkit.

use crate::error::FrameError;
use serde::{Deserialize, Deserializer, Serialize};

/// Width × height of a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
}

impl CanvasSpec {
    /// Create a canvas, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self, FrameError> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    /// Fail with [`FrameError::InvalidCanvas`] if either side is zero.
    ///
    /// Canvases built by deserialization skip [`CanvasSpec::new`], so every
    /// renderer calls this before touching pixels.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::InvalidCanvas(format!(
                "canvas must have positive dimensions, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn min_side(&self) -> u32 {
        self.width.min(self.height)
    }
}

/// A point in canvas pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in canvas pixels (top-left origin).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size centered on `center`.
    pub fn centered(center: Point, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// True when the interiors overlap. Touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Scale origin and size independently per axis.
    pub fn scaled(&self, scale: Scale) -> Rect {
        let origin = scale_point(Point::new(self.x, self.y), scale.x, scale.y);
        Rect::new(origin.x, origin.y, self.width * scale.x, self.height * scale.y)
    }
}

/// Independent X/Y scale factors from one canvas to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    pub const IDENTITY: Scale = Scale { x: 1.0, y: 1.0 };

    /// Factors that map coordinates on `from` onto `to`.
    pub fn between(from: CanvasSpec, to: CanvasSpec) -> Result<Scale, FrameError> {
        from.validate()?;
        to.validate()?;
        Ok(Scale {
            x: to.width as f32 / from.width as f32,
            y: to.height as f32 / from.height as f32,
        })
    }

    /// Single factor for lengths that must not distort: the larger axis.
    pub fn uniform(&self) -> f32 {
        self.x.max(self.y)
    }

    /// Mean of both axes, used for sticker sizes.
    pub fn average(&self) -> f32 {
        (self.x + self.y) / 2.0
    }
}

/// Map a point onto another canvas with per-axis factors.
#[inline]
pub fn scale_point(p: Point, scale_x: f32, scale_y: f32) -> Point {
    Point::new(p.x * scale_x, p.y * scale_y)
}

/// Scale a stroke-like length by a single factor.
///
/// Rounds to whole pixels; anything positive stays at least 1px so a thin
/// border never vanishes on a small preview.
#[inline]
pub fn scale_uniform(length: u32, scale: f32) -> u32 {
    if length == 0 {
        return 0;
    }
    ((length as f32 * scale).round() as u32).max(1)
}

/// Read a pixel length that may arrive negative or oversized from hand-edited
/// JSON and clamp it into `0..=u32::MAX`.
pub(crate) fn deserialize_clamped_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if raw.is_nan() {
        return Ok(0);
    }
    Ok(raw.round().clamp(0.0, u32::MAX as f64) as u32)
}

/// Express a canvas position as fractions of its width and height.
pub fn to_relative(pos: Point, canvas: CanvasSpec) -> Result<(f32, f32), FrameError> {
    canvas.validate()?;
    Ok((pos.x / canvas.width as f32, pos.y / canvas.height as f32))
}

/// Inverse of [`to_relative`].
pub fn from_relative(rel: (f32, f32), canvas: CanvasSpec) -> Result<Point, FrameError> {
    canvas.validate()?;
    Ok(Point::new(rel.0 * canvas.width as f32, rel.1 * canvas.height as f32))
}

/// Move a centered placement onto a resized canvas.
///
/// The center follows each axis; the size follows the averaged scale so
/// glyphs keep their proportions.
pub fn rescale_placement(
    center: Point,
    size: u32,
    from: CanvasSpec,
    to: CanvasSpec,
) -> Result<(Point, u32), FrameError> {
    let scale = Scale::between(from, to)?;
    let center = scale_point(center, scale.x, scale.y);
    let size = (size as f32 * scale.average()).round().max(1.0) as u32;
    Ok((center, size))
}

/// Fit `content` inside `canvas` minus `margin` on each side, centered,
/// keeping the aspect ratio.
pub fn contain(content: (u32, u32), canvas: CanvasSpec, margin: u32) -> Rect {
    let avail_w = canvas.width.saturating_sub(margin * 2).max(1) as f32;
    let avail_h = canvas.height.saturating_sub(margin * 2).max(1) as f32;
    let ratio = content.0.max(1) as f32 / content.1.max(1) as f32;

    let (w, h) = if ratio > avail_w / avail_h {
        (avail_w, (avail_w / ratio).floor().max(1.0))
    } else {
        ((avail_h * ratio).floor().max(1.0), avail_h)
    };

    Rect::centered(
        Point::new(canvas.width as f32 / 2.0, canvas.height as f32 / 2.0),
        w,
        h,
    )
}

/// The eight resize handles around a selection.
///
/// ```text
///  nw ── n ── ne
///  │          │
///  w          e
///  │          │
///  sw ── s ── se
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    Nw,
    N,
    Ne,
    W,
    E,
    Sw,
    S,
    Se,
}

/// Smallest and largest sticker size reachable by dragging.
pub const STICKER_SIZE_RANGE: (u32, u32) = (12, 200);

/// Clamp on the per-drag image resize factor.
pub const IMAGE_FACTOR_RANGE: (f32, f32) = (0.3, 3.0);

/// Minimum image side after a resize drag.
pub const MIN_IMAGE_SIDE: u32 = 50;

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::Nw,
        Handle::N,
        Handle::Ne,
        Handle::W,
        Handle::E,
        Handle::Sw,
        Handle::S,
        Handle::Se,
    ];

    /// Where this handle sits on a bounding box.
    pub fn position(self, bbox: &Rect) -> Point {
        let cx = bbox.x + bbox.width / 2.0;
        let cy = bbox.y + bbox.height / 2.0;
        match self {
            Handle::Nw => Point::new(bbox.x, bbox.y),
            Handle::N => Point::new(cx, bbox.y),
            Handle::Ne => Point::new(bbox.right(), bbox.y),
            Handle::W => Point::new(bbox.x, cy),
            Handle::E => Point::new(bbox.right(), cy),
            Handle::Sw => Point::new(bbox.x, bbox.bottom()),
            Handle::S => Point::new(cx, bbox.bottom()),
            Handle::Se => Point::new(bbox.right(), bbox.bottom()),
        }
    }

    /// Handles with a south or east component grow the selection when
    /// dragged toward positive coordinates.
    pub fn grows_forward(self) -> bool {
        matches!(
            self,
            Handle::Ne | Handle::E | Handle::Sw | Handle::S | Handle::Se
        )
    }

    /// The handle whose square (of half-size `tolerance`) contains `p`.
    pub fn hit(bbox: &Rect, p: Point, tolerance: f32) -> Option<Handle> {
        Handle::ALL.into_iter().find(|h| {
            let c = h.position(bbox);
            (p.x - c.x).abs() <= tolerance && (p.y - c.y).abs() <= tolerance
        })
    }
}

/// New sticker size after dragging `handle` by (dx, dy).
pub fn sticker_size_after_drag(size: u32, handle: Handle, dx: i32, dy: i32) -> u32 {
    let delta = if handle.grows_forward() {
        dx.max(dy).div_euclid(3)
    } else {
        dx.min(dy).div_euclid(3)
    };
    let (lo, hi) = STICKER_SIZE_RANGE;
    (size as i64 + delta as i64).clamp(lo as i64, hi as i64) as u32
}

/// New image size after dragging `handle` by (dx, dy).
pub fn image_size_after_drag(size: (u32, u32), handle: Handle, dx: i32, dy: i32) -> (u32, u32) {
    let factor = if handle.grows_forward() {
        1.0 + dx.max(dy) as f32 / 200.0
    } else {
        1.0 - (-dx).max(-dy) as f32 / 200.0
    };
    let factor = factor.clamp(IMAGE_FACTOR_RANGE.0, IMAGE_FACTOR_RANGE.1);
    let w = ((size.0 as f32 * factor) as u32).max(MIN_IMAGE_SIDE);
    let h = ((size.1 as f32 * factor) as u32).max(MIN_IMAGE_SIDE);
    (w, h)
}
