//! # Border Renderer
//!
//! Draws the decorative frame: corner masks, the frame stroke and an
//! optional motif clipped to the frame band.
//!
//! ```text
//!  ┌──────────────────────────────┐ ◀─ outer edge (canvas edge)
//!  │▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒│
//!  │▒▒┌────────────────────────┐▒▒│ ◀─ inner edge, inset by width_px
//!  │▒▒│                        │▒▒│
//!  │▒▒│        content         │▒▒│    ▒ = band: the only area a
//!  │▒▒│                        │▒▒│        motif may touch
//!  │▒▒└────────────────────────┘▒▒│
//!  │▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒│
//!  └──────────────────────────────┘
//! ```
//!
//! ## Draw order
//!
//! 1. Corner masks (when `corner_radius_px > 0`) in the outer fill color
//! 2. Frame stroke (solid, dashed, dotted or double)
//! 3. Band motif through the band mask
//!
//! The masks go first so the stroke is never clipped by them.
//!
//! ## Clamping
//!
//! Nothing in a [`BorderSpec`] can make rendering fail. The radius is capped
//! at a quarter of the shorter canvas side, the frame width at half of it,
//! and motif pitches at a 2px minimum.

mod icons;
mod motif;
mod stroke;

pub use icons::Icon;
pub use stroke::{CORNER_ARC_SEGMENTS, Corner, corner_mask_polygon};

use crate::color::Rgb;
use crate::error::FrameError;
use crate::geometry::{CanvasSpec, deserialize_clamped_u32, scale_uniform};
use crate::render::Surface;
use crate::shader::{Dash, fill_coverage, sd_rounded_rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bands narrower than this get no motif.
pub const MIN_MOTIF_BAND: u32 = 3;

/// Stroke style of the frame outline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    /// 10px on, 5px off
    Dashed,
    /// 3px on, 3px off
    Dotted,
    /// Two strokes of a third of the width each, with the rest as a gap
    Double,
}

impl LineStyle {
    pub const ALL: [LineStyle; 4] = [
        LineStyle::Solid,
        LineStyle::Dashed,
        LineStyle::Dotted,
        LineStyle::Double,
    ];

    /// Dash pattern for straight edges, `None` for continuous strokes.
    pub fn dash(self) -> Option<Dash> {
        match self {
            LineStyle::Dashed => Some(Dash::new(10.0, 5.0)),
            LineStyle::Dotted => Some(Dash::new(3.0, 3.0)),
            LineStyle::Solid | LineStyle::Double => None,
        }
    }
}

/// Motif drawn inside the frame band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderPattern {
    #[default]
    None,
    Stripe,
    Dots,
    Grid,
    Wave,
    Heart,
    Club,
    Triangle,
    Diamond,
}

impl BorderPattern {
    pub const ALL: [BorderPattern; 9] = [
        BorderPattern::None,
        BorderPattern::Stripe,
        BorderPattern::Dots,
        BorderPattern::Grid,
        BorderPattern::Wave,
        BorderPattern::Heart,
        BorderPattern::Club,
        BorderPattern::Triangle,
        BorderPattern::Diamond,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BorderPattern::None => "none",
            BorderPattern::Stripe => "stripe",
            BorderPattern::Dots => "dots",
            BorderPattern::Grid => "grid",
            BorderPattern::Wave => "wave",
            BorderPattern::Heart => "heart",
            BorderPattern::Club => "club",
            BorderPattern::Triangle => "triangle",
            BorderPattern::Diamond => "diamond",
        }
    }

    /// The icon drawn by the four icon motifs.
    pub fn icon(self) -> Option<Icon> {
        match self {
            BorderPattern::Heart => Some(Icon::Heart),
            BorderPattern::Club => Some(Icon::Club),
            BorderPattern::Triangle => Some(Icon::Triangle),
            BorderPattern::Diamond => Some(Icon::Diamond),
            _ => None,
        }
    }
}

impl fmt::Display for BorderPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BorderPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BorderPattern::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown border pattern '{}'", s))
    }
}

/// Everything needed to draw a frame.
///
/// All pixel fields are relative to the scene's reference canvas; use
/// [`BorderSpec::scaled`] before rendering at another size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderSpec {
    /// Frame band width. 0 draws no frame.
    #[serde(deserialize_with = "deserialize_clamped_u32")]
    pub width_px: u32,
    /// Corner radius. Masks the canvas corners even without a frame.
    #[serde(deserialize_with = "deserialize_clamped_u32")]
    pub corner_radius_px: u32,
    pub color: Rgb,
    pub line_style: LineStyle,
    pub pattern: BorderPattern,
    pub pattern_color: Rgb,
    #[serde(deserialize_with = "deserialize_clamped_u32")]
    pub pattern_size_px: u32,
}

impl Default for BorderSpec {
    /// Light-blue 30px frame with a white grid.
    fn default() -> Self {
        Self {
            width_px: 30,
            corner_radius_px: 0,
            color: Rgb::from_u32(0xBBDEFB),
            line_style: LineStyle::Solid,
            pattern: BorderPattern::Grid,
            pattern_color: Rgb::WHITE,
            pattern_size_px: 10,
        }
    }
}

impl BorderSpec {
    /// A spec that draws nothing.
    pub fn none() -> Self {
        Self {
            width_px: 0,
            corner_radius_px: 0,
            pattern: BorderPattern::None,
            ..Self::default()
        }
    }

    /// Scale every pixel field by one uniform factor.
    pub fn scaled(&self, scale: f32) -> Self {
        Self {
            width_px: scale_uniform(self.width_px, scale),
            corner_radius_px: scale_uniform(self.corner_radius_px, scale),
            pattern_size_px: scale_uniform(self.pattern_size_px, scale),
            ..self.clone()
        }
    }

    /// Corner radius after clamping to a quarter of the shorter side.
    pub fn effective_radius(&self, canvas: CanvasSpec) -> u32 {
        self.corner_radius_px.min(canvas.min_side() / 4)
    }

    /// Frame width after clamping to half of the shorter side.
    pub fn effective_width(&self, canvas: CanvasSpec) -> u32 {
        self.width_px.min(canvas.min_side() / 2)
    }
}

/// Coverage of the frame band: the area between the outer rounded edge and
/// the inner edge inset by the frame width.
///
/// The inner radius shrinks with the inset so the band keeps a constant
/// width around the corners.
#[derive(Debug, Clone, Copy)]
pub struct BandMask {
    width: f32,
    height: f32,
    band: f32,
    outer_radius: f32,
    inner_radius: f32,
}

impl BandMask {
    pub fn new(canvas: CanvasSpec, band: u32, radius: u32) -> Self {
        Self {
            width: canvas.width as f32,
            height: canvas.height as f32,
            band: band as f32,
            outer_radius: radius as f32,
            inner_radius: radius.saturating_sub(band) as f32,
        }
    }

    /// Coverage in [0, 1] of pixel (x, y), sampled at its center.
    pub fn coverage(&self, x: u32, y: u32) -> f32 {
        let px = x as f32 + 0.5;
        let py = y as f32 + 0.5;
        let outer = sd_rounded_rect(px, py, 0.0, 0.0, self.width, self.height, self.outer_radius);
        let inner = sd_rounded_rect(
            px,
            py,
            self.band,
            self.band,
            self.width - self.band,
            self.height - self.band,
            self.inner_radius,
        );
        fill_coverage(outer) * (1.0 - fill_coverage(inner))
    }

    /// True when the pixel center lies in the band.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.coverage(x, y) >= 0.5
    }
}

/// Draw the frame described by `spec` onto `surface`.
///
/// `outer_fill` paints the corner masks, normally the scene background
/// color, so rounded corners read as the canvas itself being rounded.
pub fn render_border(
    surface: &mut Surface,
    spec: &BorderSpec,
    canvas: CanvasSpec,
    outer_fill: Rgb,
) -> Result<(), FrameError> {
    canvas.validate()?;
    if spec.width_px == 0 && spec.corner_radius_px == 0 {
        return Ok(());
    }

    let radius = spec.effective_radius(canvas);
    if radius > 0 {
        stroke::fill_corner_masks(surface, canvas, radius, outer_fill.to_rgba());
    }

    let width = spec.effective_width(canvas);
    if width == 0 {
        return Ok(());
    }

    let color = spec.color.to_rgba();
    let dash = spec.line_style.dash();
    match spec.line_style {
        // Below 3px there is no room for two rings and a gap
        LineStyle::Double if width >= 3 => {
            let outer = (width / 3).max(1);
            let inner = (width / 3).max(1);
            let gap = width.saturating_sub(outer + inner);
            let inset = outer + gap;
            stroke::stroke_frame(surface, canvas, 0, outer, radius, color, dash);
            stroke::stroke_frame(
                surface,
                canvas,
                inset,
                inner,
                radius.saturating_sub(inset),
                color,
                dash,
            );
        }
        _ => stroke::stroke_frame(surface, canvas, 0, width, radius, color, dash),
    }

    if spec.pattern != BorderPattern::None && width >= MIN_MOTIF_BAND {
        log::debug!(
            "border motif {} in {}px band (pitch {})",
            spec.pattern,
            width,
            spec.pattern_size_px
        );
        motif::render_motif(surface, canvas, spec, width, radius)?;
    }
    Ok(())
}
