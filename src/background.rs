//! # Background Renderer
//!
//! The bottom of the layer stack: a solid color or a stretched photo, then
//! an optional full-canvas pattern.
//!
//! | Pattern      | Geometry                                                 |
//! |--------------|----------------------------------------------------------|
//! | `stripe`     | 45° diagonals, pitch `2·p`                               |
//! | `dots`       | staggered circles, pitch `2·p`, radius `p/3`             |
//! | `grid`       | orthogonal lines, pitch `2·p`                            |
//! | `horizontal` | horizontal lines, pitch `2·p`                            |
//! | `vertical`   | vertical lines, pitch `2·p`                              |
//! | `punch_hole` | ruled lines, a red margin line and a column of holes     |
//!
//! `p` is `pattern_pitch_px` clamped between 2px and the longest canvas side. Unlike border motifs,
//! patterns cover the whole canvas without masking.

use crate::color::Rgb;
use crate::error::FrameError;
use crate::geometry::{CanvasSpec, deserialize_clamped_u32, scale_uniform};
use crate::render::{Surface, pattern_pitch};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Margin line of the notebook paper pattern.
const MARGIN_RED: Rgb = Rgb::from_u32(0xE57373);

/// What fills the canvas before any pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundMode {
    #[default]
    Color,
    /// Stretched photo; falls back to the color when none is supplied.
    Image,
    Pattern,
}

/// Full-canvas background patterns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundPattern {
    #[default]
    None,
    Stripe,
    Dots,
    Grid,
    Horizontal,
    Vertical,
    PunchHole,
}

impl BackgroundPattern {
    pub const ALL: [BackgroundPattern; 7] = [
        BackgroundPattern::None,
        BackgroundPattern::Stripe,
        BackgroundPattern::Dots,
        BackgroundPattern::Grid,
        BackgroundPattern::Horizontal,
        BackgroundPattern::Vertical,
        BackgroundPattern::PunchHole,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BackgroundPattern::None => "none",
            BackgroundPattern::Stripe => "stripe",
            BackgroundPattern::Dots => "dots",
            BackgroundPattern::Grid => "grid",
            BackgroundPattern::Horizontal => "horizontal",
            BackgroundPattern::Vertical => "vertical",
            BackgroundPattern::PunchHole => "punch_hole",
        }
    }
}

impl fmt::Display for BackgroundPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackgroundPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackgroundPattern::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown background pattern '{}'", s))
    }
}

/// Everything needed to draw the background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundSpec {
    pub mode: BackgroundMode,
    pub color: Rgb,
    pub pattern_id: BackgroundPattern,
    pub pattern_color: Rgb,
    /// Relative to the reference canvas.
    #[serde(deserialize_with = "deserialize_clamped_u32")]
    pub pattern_pitch_px: u32,
    /// Photo used in [`BackgroundMode::Image`]. Decoding happens outside the
    /// renderer; see [`crate::scene::SceneAssets`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        Self {
            mode: BackgroundMode::Color,
            color: Rgb::WHITE,
            pattern_id: BackgroundPattern::None,
            pattern_color: Rgb::from_u32(0xE0E0E0),
            pattern_pitch_px: 10,
            image: None,
        }
    }
}

impl BackgroundSpec {
    /// Plain color, no pattern.
    pub fn solid(color: Rgb) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Scale the pattern pitch by one uniform factor.
    pub fn scaled(&self, scale: f32) -> Self {
        Self {
            pattern_pitch_px: scale_uniform(self.pattern_pitch_px, scale),
            ..self.clone()
        }
    }

    /// Pattern pitch clamped to the 2px minimum and the canvas's longest side.
    fn pitch(&self, canvas: CanvasSpec) -> u32 {
        pattern_pitch(self.pattern_pitch_px, canvas)
    }
}

/// Fill `surface` with the background described by `spec`: the base fill,
/// then the pattern.
///
/// `image` is the decoded photo for [`BackgroundMode::Image`].
pub fn render_background(
    surface: &mut Surface,
    spec: &BackgroundSpec,
    canvas: CanvasSpec,
    image: Option<&RgbaImage>,
) -> Result<(), FrameError> {
    fill_background(surface, spec, canvas, image)?;
    render_pattern(surface, spec, canvas)
}

/// The base fill alone: the color, or the photo stretched to the canvas
/// with Lanczos resampling.
pub fn fill_background(
    surface: &mut Surface,
    spec: &BackgroundSpec,
    canvas: CanvasSpec,
    image: Option<&RgbaImage>,
) -> Result<(), FrameError> {
    canvas.validate()?;
    surface.fill(spec.color.to_rgba());

    if spec.mode == BackgroundMode::Image {
        match image {
            Some(img) => {
                let stretched = imageops::resize(img, canvas.width, canvas.height, FilterType::Lanczos3);
                surface.composite(&stretched, 0, 0);
            }
            None => log::debug!("background image mode without an image, using color"),
        }
    }
    Ok(())
}

/// The full-canvas pattern alone, over whatever is already on `surface`.
pub fn render_pattern(surface: &mut Surface, spec: &BackgroundSpec, canvas: CanvasSpec) -> Result<(), FrameError> {
    canvas.validate()?;
    let p = spec.pitch(canvas);
    let color = spec.pattern_color.to_rgba();
    match spec.pattern_id {
        BackgroundPattern::None => {}
        BackgroundPattern::Stripe => stripes(surface, canvas, p * 2, color),
        BackgroundPattern::Dots => dots(surface, canvas, p, color),
        BackgroundPattern::Grid => {
            vertical_lines(surface, canvas, p * 2, color);
            horizontal_lines(surface, canvas, 0, p * 2, color);
        }
        BackgroundPattern::Horizontal => horizontal_lines(surface, canvas, 0, p * 2, color),
        BackgroundPattern::Vertical => vertical_lines(surface, canvas, p * 2, color),
        BackgroundPattern::PunchHole => punch_hole(surface, canvas, spec, p, color),
    }
    Ok(())
}

fn stripes(surface: &mut Surface, canvas: CanvasSpec, step: u32, color: Rgba<u8>) {
    let w = canvas.width as i64;
    let h = canvas.height as i64;
    let mut i = -h;
    while i < w + h {
        surface.stroke_line(i as f32, 0.0, (i + h) as f32, h as f32, 1.0, color);
        i += step as i64;
    }
}

/// Odd rows shift by half a pitch.
fn dots(surface: &mut Surface, canvas: CanvasSpec, p: u32, color: Rgba<u8>) {
    let spacing = p * 2;
    let radius = (p / 3).max(1) as f32;
    let (w, h) = (canvas.width, canvas.height);

    for (row, y) in (0..h + spacing).step_by(spacing as usize).enumerate() {
        let offset = if row % 2 == 1 { spacing / 2 } else { 0 };
        for x in (offset..w + spacing).step_by(spacing as usize) {
            surface.fill_circle(x as f32, y as f32, radius, color);
        }
    }
}

fn vertical_lines(surface: &mut Surface, canvas: CanvasSpec, step: u32, color: Rgba<u8>) {
    for x in (0..canvas.width).step_by(step as usize) {
        surface.fill_rect(x as i64, 0, 1, canvas.height as i64, color);
    }
}

fn horizontal_lines(surface: &mut Surface, canvas: CanvasSpec, start: u32, step: u32, color: Rgba<u8>) {
    for y in (start..canvas.height).step_by(step as usize) {
        surface.fill_rect(0, y as i64, canvas.width as i64, 1, color);
    }
}

/// Ruled notebook paper.
///
/// ```text
///   ┆ o ┃──────────────
///   ┆   ┃──────────────
///   ┆ o ┃──────────────
///   ┆   ┃──────────────
///   ┆ o ┃──────────────
/// ```
///
/// Rules start one pitch down, the margin sits at an eighth of the width
/// (at least three pitches in), and the holes are centered in the margin:
/// four on tall canvases, three otherwise. Holes show the background color
/// with a pattern-colored rim.
fn punch_hole(surface: &mut Surface, canvas: CanvasSpec, spec: &BackgroundSpec, p: u32, color: Rgba<u8>) {
    let (w, h) = (canvas.width, canvas.height);
    horizontal_lines(surface, canvas, p * 2, p * 2, color);

    let margin_x = (w / 8).max(p * 3).min(w.saturating_sub(1));
    surface.fill_rect(margin_x as i64, 0, 1, h as i64, MARGIN_RED.to_rgba());

    let holes = if h as f32 > w as f32 * 1.2 { 4 } else { 3 };
    let radius = (margin_x as f32 / 4.0).min(h as f32 / (holes as f32 * 4.0)).max(1.0);
    let hole_x = margin_x as f32 / 2.0;
    let cell = h as f32 / holes as f32;
    for i in 0..holes {
        let cy = (i as f32 + 0.5) * cell;
        surface.fill_circle(hole_x, cy, radius + 1.0, color);
        surface.fill_circle(hole_x, cy, radius, spec.color.to_rgba());
    }
}
