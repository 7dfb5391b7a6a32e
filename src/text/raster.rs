//! Text rasterization.
//!
//! All glyphs of the block go into one coverage [`Mask`]; the decorations
//! are then painted from it back to front:
//!
//! 1. keyword highlights
//! 2. drop shadow (the mask, offset)
//! 3. stroke (the mask, dilated)
//! 4. fill (the mask, with the synthetic-bold copy merged in)
//! 5. underline
//!
//! Painting each pass over the whole block keeps a highlight on one line
//! from covering the glyphs of the line above. Italic shears the finished
//! image last.

use super::highlight::{HighlightMatch, draw_highlight};
use super::layout::TextLayout;
use super::wrap::INDENT;
use super::{Align, font::Measure};
use crate::color::Rgb;
use crate::geometry::CanvasSpec;
use crate::render::Surface;
use crate::shader::shear_x;
use image::{Rgba, RgbaImage};

/// Horizontal shear of synthetic italics.
pub const ITALIC_SHEAR: f32 = 0.2;

/// Decorations, already scaled to the target canvas.
#[derive(Debug, Clone)]
pub(super) struct Style {
    pub color: Rgb,
    pub align: Align,
    pub bold_offset: f32,
    pub italic: bool,
    pub underline: bool,
    /// Color and width
    pub stroke: Option<(Rgb, f32)>,
    /// Color and (dx, dy)
    pub shadow: Option<(Rgb, f32, f32)>,
}

/// Space around the block inside the rendered image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Padding {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Per-pixel glyph coverage over the whole text image.
struct Mask {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Mask {
    fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    fn max(&mut self, x: i64, y: i64, c: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if c > self.data[idx] {
            self.data[idx] = c.min(1.0);
        }
    }

    fn covered(&self) -> impl Iterator<Item = (i64, i64, f32)> + '_ {
        self.data.iter().enumerate().filter(|(_, c)| **c > 0.0).map(|(i, c)| {
            ((i % self.width) as i64, (i / self.width) as i64, *c)
        })
    }

    /// Grow the coverage by a disc of `radius` pixels.
    fn dilate(&self, radius: f32) -> Mask {
        let mut out = Mask {
            width: self.width,
            height: self.height,
            data: vec![0.0; self.data.len()],
        };
        let reach = radius.ceil() as i64 + 1;
        let mut kernel = Vec::new();
        for oy in -reach..=reach {
            for ox in -reach..=reach {
                let d = ((ox * ox + oy * oy) as f32).sqrt();
                let w = (radius + 0.5 - d).clamp(0.0, 1.0);
                if w > 0.0 {
                    kernel.push((ox, oy, w));
                }
            }
        }
        for (x, y, c) in self.covered() {
            for &(ox, oy, w) in &kernel {
                out.max(x + ox, y + oy, c * w);
            }
        }
        out
    }

    fn paint(&self, surface: &mut Surface, color: Rgb, dx: f32, dy: f32) {
        let (dx, dy) = (dx.round() as i64, dy.round() as i64);
        let color = color.to_rgba();
        for (x, y, c) in self.covered() {
            surface.blend(x + dx, y + dy, color, c);
        }
    }
}

/// Rasterize `layout` with `style`. Returns the image and the padding
/// around the text box inside it.
pub(super) fn rasterize(
    layout: &TextLayout,
    style: &Style,
    highlights: &[HighlightMatch],
) -> Option<(RgbaImage, Padding)> {
    let font = &layout.font;
    let px = font.px();
    let stroke = style.stroke.map_or(0.0, |(_, w)| w);
    let (sdx, sdy) = style.shadow.map_or((0.0, 0.0), |(_, dx, dy)| (dx, dy));
    let compensation = if style.italic { ITALIC_SHEAR * layout.block_height } else { 0.0 };

    let pad = Padding {
        left: (2.0 * stroke + (-sdx).max(0.0)).ceil(),
        top: (2.0 * stroke + (-sdy).max(0.0)).ceil(),
        right: (2.0 * stroke + sdx.max(0.0) + style.bold_offset).ceil(),
        bottom: (2.0 * stroke + sdy.max(0.0)).ceil(),
    };
    let width = (pad.left + layout.block_width + compensation + pad.right).ceil() as u32;
    let height = (pad.top + layout.block_height + pad.bottom).ceil() as u32;
    let canvas = CanvasSpec::new(width, height).ok()?;
    let mut surface = Surface::transparent(canvas).ok()?;
    let mut mask = Mask::new(width, height);

    let indent_width = font.measure(INDENT);
    let underline_gap = (px * 0.08).max(1.0);
    let underline_h = (px * 0.06).max(1.0);
    let mut underlines = Vec::new();

    for (i, line) in layout.lines.iter().enumerate() {
        let top = pad.top + layout.line_top(i);
        let baseline = top + font.ascent();
        let mut left = pad.left + layout.line_left(i, style.align);
        if style.italic {
            left += ITALIC_SHEAR * layout.line_top(i);
        }
        let body_left = left + if line.indented { indent_width } else { 0.0 };

        // (1) highlights, behind everything
        let body: Vec<char> = line.body().chars().collect();
        for m in highlights {
            let start = m.start.max(line.source.start);
            let end = m.end.min(line.source.end);
            if start >= end {
                continue;
            }
            let prefix = |n: usize| -> f32 {
                let s: String = body.iter().take(n).collect();
                font.measure(&s)
            };
            let x0 = body_left + prefix(start - line.source.start);
            let x1 = body_left + prefix(end - line.source.start);
            draw_highlight(&mut surface, m.style, m.color, x0, x1, top, layout.line_height);
        }

        font.draw(&line.text, left, baseline, |x, y, c| mask.max(x, y, c));
        if style.bold_offset > 0.0 {
            font.draw(&line.text, left + style.bold_offset, baseline, |x, y, c| mask.max(x, y, c));
        }

        if style.underline {
            underlines.push((body_left, left + layout.widths[i], baseline + underline_gap));
        }
    }

    if let Some((color, dx, dy)) = style.shadow {
        mask.paint(&mut surface, color, dx, dy);
    }
    if let Some((color, w)) = style.stroke {
        mask.dilate(w).paint(&mut surface, color, 0.0, 0.0);
    }
    mask.paint(&mut surface, style.color, 0.0, 0.0);

    let ink = style.color.to_rgba();
    for (x0, x1, y) in underlines {
        surface.fill_rect_f(x0, y, x1, y + underline_h, ink);
    }

    let image = surface.into_image();
    if style.italic {
        Some((shear(&image, ITALIC_SHEAR), pad))
    } else {
        Some((image, pad))
    }
}

/// Shear rows to the right, the top row most. Rows are resampled with
/// linear interpolation on premultiplied color.
fn shear(img: &RgbaImage, factor: f32) -> RgbaImage {
    let h = img.height();
    let extra = (factor * h as f32).ceil() as u32;
    let w = img.width();
    let mut out = RgbaImage::new(w + extra, h);

    let sample = |x: i64, y: u32| -> [f32; 4] {
        if x < 0 || x >= w as i64 {
            return [0.0; 4];
        }
        let p = img.get_pixel(x as u32, y);
        let a = p[3] as f32 / 255.0;
        [p[0] as f32 * a, p[1] as f32 * a, p[2] as f32 * a, a]
    };

    for y in 0..h {
        let shift = shear_x(0.0, y as f32 + 0.5, factor, h as f32);
        for x in 0..w + extra {
            let src = x as f32 - shift;
            let x0 = src.floor();
            let t = src - x0;
            let a = sample(x0 as i64, y);
            let b = sample(x0 as i64 + 1, y);
            let mix: [f32; 4] = std::array::from_fn(|k| a[k] * (1.0 - t) + b[k] * t);
            let alpha = mix[3];
            if alpha <= 0.0 {
                continue;
            }
            let un = |v: f32| (v / alpha).round().clamp(0.0, 255.0) as u8;
            out.put_pixel(
                x,
                y,
                Rgba([un(mix[0]), un(mix[1]), un(mix[2]), (alpha * 255.0).round() as u8]),
            );
        }
    }
    out
}
