//! # Text Layout & Rendering
//!
//! Turns a [`TextLayer`] into a positioned RGBA image for one canvas.
//!
//! ## Pipeline
//!
//! ```text
//!   TextLayer ──▶ resolve font ──▶ wrap ──▶ measure ──▶ rasterize ──▶ place
//!                 (size × scale)   (greedy,  (block     (highlights,   (anchor ×
//!                                  clusters)  w × h)     shadow, bold,  align,
//!                                                        stroke, under- clamp)
//!                                                        line, italic)
//! ```
//!
//! Every pixel quantity in the layer (font size, margin, stroke width,
//! shadow offset) is scaled by [`TextFrame::scale`] first, so the same layer
//! renders proportionally on a preview and on the export canvas.
//!
//! Decorations are bounded after scaling: the font size by [`MAX_SIZE_PT`],
//! the stroke by half the font size and the shadow offset by the canvas.
//!
//! Empty content, or content that measures to nothing, yields `None`. Text
//! never fails a render.
//!
//! ## Modules
//!
//! - [`font`]: font families, fallback chain, glyph rasterization
//! - [`wrap`]: grapheme clusters and greedy wrapping
//! - [`highlight`]: keyword matching and highlight decorations
//! - [`layout`]: block measurement and placement

pub mod font;
pub mod highlight;
pub mod layout;
mod raster;
pub mod wrap;

pub use font::{FontId, SizedFont};
pub use highlight::{HighlightColor, HighlightMatch, HighlightStyle};
pub use layout::TextLayout;
pub use raster::ITALIC_SHEAR;

use crate::color::Rgb;
use crate::geometry::{CanvasSpec, Rect, deserialize_clamped_u32};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Longest content a text layer holds, in characters.
pub const MAX_CONTENT_CHARS: usize = 150;

/// Padding the wrap budget reserves on each side of the layer, in
/// reference pixels.
pub const LAYER_PADDING: f32 = 8.0;

/// Synthetic-bold redraw offset as a share of the font size.
pub const BOLD_OFFSET: f32 = 0.02;

/// Largest font size a layer renders at, in reference points.
pub const MAX_SIZE_PT: u32 = 500;

/// Widest stroke as a share of the scaled font size.
pub const MAX_STROKE_RATIO: f32 = 0.5;

/// Horizontal alignment of lines and of the block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical anchor of the block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Top,
    Center,
    #[default]
    Bottom,
    /// Use `custom_pos`
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSpec {
    pub enabled: bool,
    pub color: Rgb,
    pub offset: (i32, i32),
}

impl Default for ShadowSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Rgb::from_u32(0x808080),
            offset: (2, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeSpec {
    pub enabled: bool,
    pub color: Rgb,
    #[serde(deserialize_with = "deserialize_clamped_u32")]
    pub width_px: u32,
}

impl Default for StrokeSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Rgb::WHITE,
            width_px: 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSpec {
    pub enabled: bool,
    pub keywords: Vec<String>,
    pub color: HighlightColor,
}

/// The single styled text layer of a scene.
///
/// Pixel fields are relative to the scene's reference canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLayer {
    pub content: String,
    pub font_id: FontId,
    #[serde(deserialize_with = "deserialize_clamped_u32")]
    pub size_pt: u32,
    pub color: Rgb,
    pub align: Align,
    pub anchor: Anchor,
    /// Relative (x, y) in [0, 1], used with [`Anchor::Custom`]
    pub custom_pos: (f32, f32),
    #[serde(deserialize_with = "deserialize_clamped_u32")]
    pub margin_px: u32,
    pub first_line_indent: bool,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub shadow: ShadowSpec,
    pub stroke: StrokeSpec,
    pub highlight: HighlightSpec,
    /// Hidden layers keep their slot but are not drawn
    pub visible: bool,
}

impl Default for TextLayer {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_id: FontId::Sans,
            size_pt: 48,
            color: Rgb::BLACK,
            align: Align::Center,
            anchor: Anchor::Bottom,
            custom_pos: (0.5, 0.5),
            margin_px: 20,
            first_line_indent: false,
            bold: false,
            italic: false,
            underline: false,
            shadow: ShadowSpec::default(),
            stroke: StrokeSpec::default(),
            highlight: HighlightSpec::default(),
            visible: true,
        }
    }
}

impl TextLayer {
    /// A default-styled layer with `content`.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// The same styling with other content, as used for per-image overrides.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }

    /// Font size capped at [`MAX_SIZE_PT`].
    pub fn clamped_size_pt(&self) -> u32 {
        self.size_pt.min(MAX_SIZE_PT)
    }

    /// Content cut to [`MAX_CONTENT_CHARS`].
    pub fn clamped_content(&self) -> &str {
        match self.content.char_indices().nth(MAX_CONTENT_CHARS) {
            Some((idx, _)) => &self.content[..idx],
            None => &self.content,
        }
    }
}

/// Canvas-side inputs of one text render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFrame {
    pub canvas: CanvasSpec,
    /// `canvas.width / reference.width`
    pub scale: f32,
    /// Distance kept from the canvas edges on top of the margin: scaled
    /// border width plus a fixed margin.
    pub safe_margin: (f32, f32),
}

impl TextFrame {
    /// A frame with no border to avoid.
    pub fn plain(canvas: CanvasSpec) -> Self {
        Self {
            canvas,
            scale: 1.0,
            safe_margin: (0.0, 0.0),
        }
    }
}

/// A rasterized text layer, positioned on its canvas.
#[derive(Debug, Clone)]
pub struct RenderedText {
    pub image: RgbaImage,
    /// Top-left of `image` on the canvas.
    pub x: i64,
    pub y: i64,
    /// The text block on the canvas, without the decoration padding.
    pub block: Rect,
    pub lines: usize,
    pub highlights: Vec<HighlightMatch>,
}

impl RenderedText {
    /// Area of the canvas the image covers.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.x as f32,
            self.y as f32,
            self.image.width() as f32,
            self.image.height() as f32,
        )
    }
}

/// Wrap and measure `layer` for `frame` without rasterizing.
pub fn layout_text(layer: &TextLayer, frame: &TextFrame) -> Option<TextLayout> {
    frame.canvas.validate().ok()?;
    let scale = frame.scale.max(f32::EPSILON);
    let font = SizedFont::resolve(layer.font_id, layer.clamped_size_pt() as f32 * scale);
    let max_width = wrap::max_text_width(
        frame.canvas.width as f32,
        frame.canvas.height as f32,
        layer.margin_px as f32 * scale,
        frame.safe_margin.0,
        LAYER_PADDING * scale,
    );
    TextLayout::new(layer.clamped_content(), font, max_width, layer.first_line_indent)
}

/// Render `layer` onto a transparent image positioned for `frame`.
pub fn render_text(layer: &TextLayer, frame: &TextFrame) -> Option<RenderedText> {
    let layout = layout_text(layer, frame)?;
    let scale = frame.scale.max(f32::EPSILON);
    let px = layout.font.px();

    let highlights = if layer.highlight.enabled {
        highlight::find_matches(
            layer.clamped_content(),
            &layer.highlight.keywords,
            layer.highlight.color,
        )
    } else {
        Vec::new()
    };

    // Stroke stays under half the glyph size; the shadow never leaves the canvas
    let stroke_w = (layer.stroke.width_px as f32 * scale).min(px * MAX_STROKE_RATIO);
    let (cw, ch) = (frame.canvas.width as f32, frame.canvas.height as f32);
    let shadow_dx = (layer.shadow.offset.0 as f32 * scale).clamp(-cw, cw);
    let shadow_dy = (layer.shadow.offset.1 as f32 * scale).clamp(-ch, ch);

    let style = raster::Style {
        color: layer.color,
        align: layer.align,
        bold_offset: if layer.bold { (px * BOLD_OFFSET).max(1.0) } else { 0.0 },
        italic: layer.italic,
        underline: layer.underline,
        stroke: (layer.stroke.enabled && layer.stroke.width_px > 0)
            .then(|| (layer.stroke.color, stroke_w)),
        shadow: layer.shadow.enabled.then(|| (layer.shadow.color, shadow_dx, shadow_dy)),
    };

    let (image, pad) = raster::rasterize(&layout, &style, &highlights)?;
    let box_w = image.width() as f32 - pad.left - pad.right;
    let box_h = layout.block_height;

    let (bx, by) = layout::place(
        (box_w, box_h),
        frame.canvas,
        layer.anchor,
        layer.align,
        layer.custom_pos,
        layer.margin_px as f32 * scale,
        frame.safe_margin,
    );
    let x = (bx - pad.left).round() as i64;
    let y = (by - pad.top).round() as i64;
    log::debug!(
        "text: {} line(s), {} highlight(s), block {:.0}x{:.0} at ({}, {})",
        layout.lines.len(),
        highlights.len(),
        box_w,
        box_h,
        x,
        y
    );

    Some(RenderedText {
        image,
        x,
        y,
        block: Rect::new(x as f32 + pad.left, y as f32 + pad.top, box_w, box_h),
        lines: layout.lines.len(),
        highlights,
    })
}
