//! Block measurement and placement on the canvas.
//!
//! ```text
//!   ┌ canvas ─────────────────────────────────┐
//!   │  margin + safe_y                         │
//!   │ ┌ top ─────────┐                         │
//!   │ └──────────────┘                         │
//!   │            ┌ center ───────┐             │
//!   │            └───────────────┘             │
//!   │                        ┌ bottom ──────┐  │
//!   │                        └──────────────┘  │
//!   │  2·margin + safe_y                       │
//!   └──────────────────────────────────────────┘
//! ```
//!
//! The vertical position is clamped so a tall block never climbs above
//! `margin + safe_y`, i.e. into the top border band.

use super::font::{Measure, SizedFont};
use super::wrap::{WrappedLine, wrap};
use super::{Align, Anchor};
use crate::geometry::CanvasSpec;

/// Gap between lines as a share of the font size.
pub const LINE_SPACING: f32 = 0.3;

/// Wrapped and measured text, before rasterization.
#[derive(Debug, Clone)]
pub struct TextLayout {
    pub font: SizedFont,
    pub lines: Vec<WrappedLine>,
    /// Measured width of each line, indent included.
    pub widths: Vec<f32>,
    pub line_height: f32,
    pub spacing: f32,
    pub block_width: f32,
    pub block_height: f32,
}

impl TextLayout {
    /// Wrap and measure `content`. `None` when there is nothing visible.
    pub fn new(content: &str, font: SizedFont, max_width: f32, indent: bool) -> Option<Self> {
        if content.trim().is_empty() {
            return None;
        }
        let lines = wrap(content, &font, max_width, indent);
        let widths: Vec<f32> = lines.iter().map(|l| font.measure(&l.text)).collect();
        let block_width = widths.iter().copied().fold(0.0, f32::max);
        let line_height = font.line_height();
        if block_width <= 0.0 || line_height <= 0.0 {
            return None;
        }
        let spacing = font.px() * LINE_SPACING;
        let n = lines.len() as f32;
        let block_height = line_height * n + spacing * (n - 1.0);
        Some(Self {
            font,
            lines,
            widths,
            line_height,
            spacing,
            block_width,
            block_height,
        })
    }

    /// Top of line `i` relative to the block.
    pub fn line_top(&self, i: usize) -> f32 {
        i as f32 * (self.line_height + self.spacing)
    }

    /// Left of line `i` relative to the block, after alignment.
    pub fn line_left(&self, i: usize, align: Align) -> f32 {
        let w = self.widths.get(i).copied().unwrap_or(0.0);
        match align {
            Align::Left => 0.0,
            Align::Center => (self.block_width - w) / 2.0,
            Align::Right => self.block_width - w,
        }
    }
}

/// Where a text box of `size` goes on `canvas`.
///
/// `margin` and `safe` are already scaled to the canvas. A custom anchor
/// puts the box's top-left corner at the relative position as given.
pub fn place(
    size: (f32, f32),
    canvas: CanvasSpec,
    anchor: Anchor,
    align: Align,
    custom_pos: (f32, f32),
    margin: f32,
    safe: (f32, f32),
) -> (f32, f32) {
    let (w, h) = (canvas.width as f32, canvas.height as f32);
    let (bw, bh) = size;

    let y = match anchor {
        Anchor::Custom => {
            let rx = custom_pos.0.clamp(0.0, 1.0);
            let ry = custom_pos.1.clamp(0.0, 1.0);
            return (rx * w, ry * h);
        }
        Anchor::Top => margin + safe.1,
        Anchor::Center => (h - bh) / 2.0,
        Anchor::Bottom => h - bh - 2.0 * margin - safe.1,
    };
    let x = match align {
        Align::Left => margin + safe.0,
        Align::Center => (w - bw) / 2.0,
        Align::Right => w - bw - margin - safe.0,
    };
    (x, y.max(margin + safe.1))
}
