//! # Raster Surface
//!
//! An RGBA canvas with the handful of anti-aliased drawing primitives the
//! renderers need: rectangles, lines, polylines, circles, rounded rectangles
//! and filled polygons.
//!
//! Coordinates are continuous: pixel `(x, y)` covers `[x, x+1) × [y, y+1)`
//! and is sampled at its center `(x + 0.5, y + 0.5)`. Axis-aligned
//! rectangles snap to whole pixels so frame bands stay exactly as wide as
//! requested.
//!
//! Shapes made of several parts first accumulate coverage in a window
//! (taking the max where parts overlap), then blend once, so the joints of a
//! polyline never double-darken.

use super::composer::{self, over};
use crate::color::Rgb;
use crate::error::FrameError;
use crate::geometry::CanvasSpec;
use crate::shader::{aa_edge, dist_to_segment, fill_coverage, sd_rounded_rect};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{Rgba, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// JPEG quality used for every export.
pub const JPEG_QUALITY: u8 = 95;

/// Output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Alpha-preserving
    Png,
    /// Alpha flattened onto white
    Jpeg,
}

impl OutputFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, FrameError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => Ok(OutputFormat::Png),
            Some("jpg") | Some("jpeg") => Ok(OutputFormat::Jpeg),
            other => Err(FrameError::Encode(format!(
                "unsupported output extension {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }
}

/// Per-pixel coverage over a bounded window of a surface.
struct Coverage {
    x0: i64,
    y0: i64,
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Coverage {
    /// Window `[x0, x1) × [y0, y1)` clipped to a `w × h` surface.
    fn window(x0: i64, y0: i64, x1: i64, y1: i64, w: u32, h: u32) -> Option<Self> {
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(w as i64);
        let y1 = y1.min(h as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let width = (x1 - x0) as usize;
        let height = (y1 - y0) as usize;
        Some(Self {
            x0,
            y0,
            width,
            height,
            data: vec![0.0; width * height],
        })
    }

    #[inline]
    fn max(&mut self, x: i64, y: i64, c: f32) {
        if c <= 0.0 {
            return;
        }
        let lx = x - self.x0;
        let ly = y - self.y0;
        if lx < 0 || ly < 0 || lx >= self.width as i64 || ly >= self.height as i64 {
            return;
        }
        let idx = ly as usize * self.width + lx as usize;
        if c > self.data[idx] {
            self.data[idx] = c.min(1.0);
        }
    }

    #[inline]
    fn add(&mut self, x: i64, y: i64, c: f32) {
        let lx = x - self.x0;
        let ly = y - self.y0;
        if lx < 0 || ly < 0 || lx >= self.width as i64 || ly >= self.height as i64 {
            return;
        }
        let idx = ly as usize * self.width + lx as usize;
        self.data[idx] = (self.data[idx] + c).min(1.0);
    }
}

/// An RGBA render target.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// New surface of `canvas` size filled with `fill`.
    pub fn new(canvas: CanvasSpec, fill: Rgba<u8>) -> Result<Self, FrameError> {
        canvas.validate()?;
        Ok(Self {
            pixels: RgbaImage::from_pixel(canvas.width, canvas.height, fill),
        })
    }

    /// Fully transparent surface, used as a scratch layer.
    pub fn transparent(canvas: CanvasSpec) -> Result<Self, FrameError> {
        Self::new(canvas, Rgba([0, 0, 0, 0]))
    }

    /// Wrap an existing image.
    pub fn from_image(pixels: RgbaImage) -> Result<Self, FrameError> {
        CanvasSpec {
            width: pixels.width(),
            height: pixels.height(),
        }
        .validate()?;
        Ok(Self { pixels })
    }

    pub fn canvas(&self) -> CanvasSpec {
        CanvasSpec {
            width: self.pixels.width(),
            height: self.pixels.height(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Blend one pixel with the given coverage. Out-of-bounds is ignored.
    #[inline]
    pub fn blend(&mut self, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let p = self.pixels.get_pixel_mut(x as u32, y as u32);
        *p = over(*p, color, coverage);
    }

    /// Overwrite every pixel.
    pub fn fill(&mut self, color: Rgba<u8>) {
        for p in self.pixels.pixels_mut() {
            *p = color;
        }
    }

    fn apply(&mut self, cov: &Coverage, color: Rgba<u8>) {
        for ly in 0..cov.height {
            for lx in 0..cov.width {
                let c = cov.data[ly * cov.width + lx];
                if c > 0.0 {
                    self.blend(cov.x0 + lx as i64, cov.y0 + ly as i64, color, c);
                }
            }
        }
    }

    /// Fill whole pixels `[x, x+w) × [y, y+h)`.
    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Rgba<u8>) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width() as i64);
        let y1 = (y + h).min(self.height() as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, 1.0);
            }
        }
    }

    /// Fill a rectangle given in continuous coordinates, with fractional
    /// coverage on partially covered edge pixels.
    pub fn fill_rect_f(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba<u8>) {
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        let Some(mut cov) = Coverage::window(
            x0.floor() as i64,
            y0.floor() as i64,
            x1.ceil() as i64,
            y1.ceil() as i64,
            self.width(),
            self.height(),
        ) else {
            return;
        };
        for py in cov.y0..cov.y0 + cov.height as i64 {
            let cy = (y1.min(py as f32 + 1.0) - y0.max(py as f32)).clamp(0.0, 1.0);
            for px in cov.x0..cov.x0 + cov.width as i64 {
                let cx = (x1.min(px as f32 + 1.0) - x0.max(px as f32)).clamp(0.0, 1.0);
                cov.max(px, py, cx * cy);
            }
        }
        self.apply(&cov, color);
    }

    /// Anti-aliased line segment of the given width.
    ///
    /// A single segment visits each pixel once, so it blends directly
    /// without a coverage window. Long diagonals stay cheap.
    pub fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Rgba<u8>) {
        if width <= 0.0 {
            return;
        }
        walk_segment(x1, y1, x2, y2, width / 2.0, |px, py, c| {
            if c > 0.0 {
                self.blend(px, py, color, c);
            }
        });
    }

    /// Anti-aliased open polyline of the given width.
    pub fn stroke_polyline(&mut self, points: &[(f32, f32)], width: f32, color: Rgba<u8>) {
        if points.len() < 2 || width <= 0.0 {
            return;
        }
        let half = width / 2.0;
        let reach = half + 1.5;

        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let Some(mut cov) = Coverage::window(
            (min_x - reach).floor() as i64,
            (min_y - reach).floor() as i64,
            (max_x + reach).ceil() as i64,
            (max_y + reach).ceil() as i64,
            self.width(),
            self.height(),
        ) else {
            return;
        };

        for seg in points.windows(2) {
            let (ax, ay) = seg[0];
            let (bx, by) = seg[1];
            walk_segment(ax, ay, bx, by, half, |px, py, c| cov.max(px, py, c));
        }
        self.apply(&cov, color);
    }

    /// Anti-aliased filled circle.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
        if radius <= 0.0 {
            return;
        }
        let Some(mut cov) = Coverage::window(
            (cx - radius - 1.0).floor() as i64,
            (cy - radius - 1.0).floor() as i64,
            (cx + radius + 1.0).ceil() as i64,
            (cy + radius + 1.0).ceil() as i64,
            self.width(),
            self.height(),
        ) else {
            return;
        };
        for py in cov.y0..cov.y0 + cov.height as i64 {
            for px in cov.x0..cov.x0 + cov.width as i64 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt() - radius;
                cov.max(px, py, fill_coverage(d));
            }
        }
        self.apply(&cov, color);
    }

    /// Anti-aliased filled rounded rectangle spanning `[x0, x1] × [y0, y1]`.
    pub fn fill_rounded_rect(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        radius: f32,
        color: Rgba<u8>,
    ) {
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        let Some(mut cov) = Coverage::window(
            x0.floor() as i64 - 1,
            y0.floor() as i64 - 1,
            x1.ceil() as i64 + 1,
            y1.ceil() as i64 + 1,
            self.width(),
            self.height(),
        ) else {
            return;
        };
        for py in cov.y0..cov.y0 + cov.height as i64 {
            for px in cov.x0..cov.x0 + cov.width as i64 {
                let d = sd_rounded_rect(px as f32 + 0.5, py as f32 + 0.5, x0, y0, x1, y1, radius);
                cov.max(px, py, fill_coverage(d));
            }
        }
        self.apply(&cov, color);
    }

    /// Filled polygon (even-odd rule), anti-aliased with four sub-scanlines
    /// per pixel row and exact horizontal span coverage.
    pub fn fill_polygon(&mut self, points: &[(f32, f32)], color: Rgba<u8>) {
        const SUB: usize = 4;
        if points.len() < 3 {
            return;
        }
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let Some(mut cov) = Coverage::window(
            min_x.floor() as i64,
            min_y.floor() as i64,
            max_x.ceil() as i64 + 1,
            max_y.ceil() as i64 + 1,
            self.width(),
            self.height(),
        ) else {
            return;
        };

        let weight = 1.0 / SUB as f32;
        let mut crossings: Vec<f32> = Vec::new();
        for py in cov.y0..cov.y0 + cov.height as i64 {
            for s in 0..SUB {
                let sy = py as f32 + (s as f32 + 0.5) * weight;
                crossings.clear();
                for i in 0..points.len() {
                    let (ax, ay) = points[i];
                    let (bx, by) = points[(i + 1) % points.len()];
                    if (ay <= sy && by > sy) || (by <= sy && ay > sy) {
                        let t = (sy - ay) / (by - ay);
                        crossings.push(ax + t * (bx - ax));
                    }
                }
                crossings.sort_by(|a, b| a.total_cmp(b));
                for span in crossings.chunks_exact(2) {
                    let (xa, xb) = (span[0], span[1]);
                    let first = xa.floor() as i64;
                    let last = xb.ceil() as i64;
                    for px in first..last {
                        let overlap = (xb.min(px as f32 + 1.0) - xa.max(px as f32)).clamp(0.0, 1.0);
                        cov.add(px, py, overlap * weight);
                    }
                }
            }
        }
        self.apply(&cov, color);
    }

    /// Composite another image with its top-left corner at (x, y).
    pub fn composite(&mut self, src: &RgbaImage, x: i64, y: i64) {
        composer::composite_at(&mut self.pixels, src, x, y);
    }

    /// Composite a same-sized layer through a per-pixel mask.
    pub fn composite_masked<M>(&mut self, layer: &Surface, mask: M)
    where
        M: Fn(u32, u32) -> f32,
    {
        composer::composite_masked(&mut self.pixels, &layer.pixels, mask);
    }

    /// Encode into `writer`. JPEG output is flattened onto white first.
    pub fn encode<W: Write>(&self, format: OutputFormat, writer: W) -> Result<(), FrameError> {
        let result = match format {
            OutputFormat::Png => self.pixels.write_with_encoder(PngEncoder::new(writer)),
            OutputFormat::Jpeg => {
                let flat = composer::flatten_onto(&self.pixels, Rgb::WHITE);
                flat.write_with_encoder(JpegEncoder::new_with_quality(writer, JPEG_QUALITY))
            }
        };
        result.map_err(|e| FrameError::Encode(format!("failed to encode {:?}: {}", format, e)))
    }

    /// Save to `path`, choosing PNG or JPEG from the extension.
    pub fn save(&self, path: &Path) -> Result<(), FrameError> {
        let format = OutputFormat::from_path(path)?;
        let file = File::create(path)
            .map_err(|e| FrameError::Encode(format!("cannot create {}: {}", path.display(), e)))?;
        let mut writer = BufWriter::new(file);
        self.encode(format, &mut writer)?;
        writer
            .flush()
            .map_err(|e| FrameError::Encode(format!("cannot write {}: {}", path.display(), e)))
    }
}

/// Visit the pixels near one segment with their coverage, walking the major
/// axis so only pixels close to the segment are evaluated.
fn walk_segment<F>(ax: f32, ay: f32, bx: f32, by: f32, half: f32, mut visit: F)
where
    F: FnMut(i64, i64, f32),
{
    let dx = bx - ax;
    let dy = by - ay;
    let steep = dy.abs() > dx.abs();
    let reach = (half + 1.5).ceil() as i64;

    // Parameterise along the major axis
    let (a_major, b_major) = if steep { (ay, by) } else { (ax, bx) };
    let lo = (a_major.min(b_major) - half - 1.0).floor() as i64;
    let hi = (a_major.max(b_major) + half + 1.0).ceil() as i64;
    let span = if steep { dy } else { dx };

    for m in lo..=hi {
        let mc = m as f32 + 0.5;
        let t = if span.abs() < 1e-6 {
            0.0
        } else {
            ((mc - a_major) / span).clamp(0.0, 1.0)
        };
        let minor_center = if steep { ax + t * dx } else { ay + t * dy };
        let mc0 = minor_center.floor() as i64;
        for n in mc0 - reach..=mc0 + reach {
            let (px, py) = if steep { (n, m) } else { (m, n) };
            let d = dist_to_segment(px as f32 + 0.5, py as f32 + 0.5, ax, ay, bx, by);
            visit(px, py, aa_edge(d, half - 0.5, 1.0));
        }
    }
}
