//! # Photo Adjustments
//!
//! Edits of a placed photo, stored as data on the placement and applied
//! while compositing. The decoded source is never modified.
//!
//! ```text
//!   source ──▶ rotate ──▶ flip ──▶ resize to rect ──▶ filters ──▶ brightness ──▶ contrast ──▶ saturation
//! ```
//!
//! ## Tonal factors
//!
//! | Factor       | `0.0` gives          | `1.0`     | `2.0`               |
//! |--------------|----------------------|-----------|---------------------|
//! | `brightness` | black                | unchanged | twice as bright     |
//! | `contrast`   | flat mean gray       | unchanged | twice the spread    |
//! | `saturation` | grayscale            | unchanged | twice as saturated  |
//!
//! Each factor blends between the image and a degenerate version of it;
//! values are clamped to [`FACTOR_RANGE`]. Alpha is never changed.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Accepted range of the tonal factors.
pub const FACTOR_RANGE: (f32, f32) = (0.0, 2.0);

/// Gaussian sigma of the blur filter at scale 1.
pub const BLUR_SIGMA: f32 = 1.5;

const SMOOTH: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];
const SHARPEN: [f32; 9] = [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0];
const EDGE: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];
const EDGE_INVERSE: [f32; 9] = [1.0, 1.0, 1.0, 1.0, -8.0, 1.0, 1.0, 1.0, 1.0];
const EMBOSS_RISE: [f32; 9] = [-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
const EMBOSS_FALL: [f32; 9] = [1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0];

/// Clockwise quarter turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    fn quarters(self) -> u8 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 1,
            Rotation::Cw180 => 2,
            Rotation::Cw270 => 3,
        }
    }

    fn from_quarters(q: u8) -> Self {
        match q % 4 {
            0 => Rotation::None,
            1 => Rotation::Cw90,
            2 => Rotation::Cw180,
            _ => Rotation::Cw270,
        }
    }

    /// Rotation by `degrees` clockwise. Only multiples of 90 are accepted;
    /// negative values turn counter-clockwise.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        (degrees % 90 == 0).then(|| Self::from_quarters((degrees / 90).rem_euclid(4) as u8))
    }

    /// One more quarter turn.
    pub fn turned(self, clockwise: bool) -> Self {
        Self::from_quarters(self.quarters() + if clockwise { 1 } else { 3 })
    }

    /// True when width and height trade places.
    pub fn swaps_axes(self) -> bool {
        self.quarters() % 2 == 1
    }
}

/// Pixel filters, applied after resizing in the order they were switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    Blur,
    Sharpen,
    Smooth,
    Grayscale,
    Contour,
    Emboss,
    Edge,
}

impl Filter {
    pub const ALL: [Filter; 7] = [
        Filter::Blur,
        Filter::Sharpen,
        Filter::Smooth,
        Filter::Grayscale,
        Filter::Contour,
        Filter::Emboss,
        Filter::Edge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Filter::Blur => "blur",
            Filter::Sharpen => "sharpen",
            Filter::Smooth => "smooth",
            Filter::Grayscale => "grayscale",
            Filter::Contour => "contour",
            Filter::Emboss => "emboss",
            Filter::Edge => "edge",
        }
    }

    /// Apply to `img`. `scale` grows the blur radius with the canvas.
    pub fn apply(self, img: &RgbaImage, scale: f32) -> RgbaImage {
        match self {
            Filter::Blur => keep_alpha(img, imageops::blur(img, BLUR_SIGMA * scale.max(0.1))),
            Filter::Sharpen => convolve(img, &SHARPEN),
            Filter::Smooth => convolve(img, &SMOOTH),
            Filter::Grayscale => keep_alpha(img, DynamicImage::ImageRgba8(img.clone()).grayscale().to_rgba8()),
            Filter::Contour => {
                let mut out = convolve(img, &EDGE_INVERSE);
                imageops::invert(&mut out);
                keep_alpha(img, out)
            }
            Filter::Emboss => emboss(img),
            Filter::Edge => convolve(img, &EDGE),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("unknown filter '{}'", s))
    }
}

/// Everything done to one photo after decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageAdjustments {
    pub rotation: Rotation,
    /// Mirror left to right, after the rotation
    pub flip_h: bool,
    /// Mirror top to bottom, after the rotation
    pub flip_v: bool,
    pub filters: Vec<Filter>,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
}

impl Default for ImageAdjustments {
    fn default() -> Self {
        Self {
            rotation: Rotation::None,
            flip_h: false,
            flip_v: false,
            filters: Vec::new(),
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
        }
    }
}

impl ImageAdjustments {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Turn the photo as it currently looks by a quarter.
    ///
    /// With exactly one mirror applied, turning the visible image clockwise
    /// turns the source counter-clockwise.
    pub fn rotate(&mut self, clockwise: bool) {
        let mirrored = self.flip_h != self.flip_v;
        self.rotation = self.rotation.turned(clockwise != mirrored);
    }

    /// Mirror the photo as it currently looks.
    pub fn flip(&mut self, horizontal: bool) {
        if horizontal {
            self.flip_h = !self.flip_h;
        } else {
            self.flip_v = !self.flip_v;
        }
    }

    /// Switch `filter` on or off. Returns whether it is now on.
    pub fn toggle_filter(&mut self, filter: Filter) -> bool {
        match self.filters.iter().position(|f| *f == filter) {
            Some(i) => {
                self.filters.remove(i);
                false
            }
            None => {
                self.filters.push(filter);
                true
            }
        }
    }

    /// Back to the photo as decoded.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Size of a `dims` source after rotation.
    pub fn oriented_dims(&self, dims: (u32, u32)) -> (u32, u32) {
        if self.rotation.swaps_axes() { (dims.1, dims.0) } else { dims }
    }

    /// Rotation and mirrors only.
    pub fn orient(&self, src: &RgbaImage) -> RgbaImage {
        let mut img = match self.rotation {
            Rotation::None => src.clone(),
            Rotation::Cw90 => imageops::rotate90(src),
            Rotation::Cw180 => imageops::rotate180(src),
            Rotation::Cw270 => imageops::rotate270(src),
        };
        if self.flip_h {
            imageops::flip_horizontal_in_place(&mut img);
        }
        if self.flip_v {
            imageops::flip_vertical_in_place(&mut img);
        }
        img
    }

    /// The full pipeline: orient, resize to `size` with Lanczos, then filters
    /// and tonal factors.
    pub fn render(&self, src: &RgbaImage, size: (u32, u32), scale: f32) -> RgbaImage {
        let oriented;
        let base = if self.rotation == Rotation::None && !self.flip_h && !self.flip_v {
            src
        } else {
            oriented = self.orient(src);
            &oriented
        };
        let mut img = imageops::resize(base, size.0, size.1, FilterType::Lanczos3);

        for filter in &self.filters {
            img = filter.apply(&img, scale);
        }
        self.apply_tones(&mut img);
        img
    }

    /// Brightness, contrast and saturation, in that order.
    pub fn apply_tones(&self, img: &mut RgbaImage) {
        let clamp = |f: f32| if f.is_nan() { 1.0 } else { f.clamp(FACTOR_RANGE.0, FACTOR_RANGE.1) };
        let (brightness, contrast, saturation) =
            (clamp(self.brightness), clamp(self.contrast), clamp(self.saturation));

        if brightness != 1.0 {
            enhance(img, brightness, |_| 0.0);
        }
        if contrast != 1.0 {
            let mean = mean_luma(img);
            enhance(img, contrast, |_| mean);
        }
        if saturation != 1.0 {
            enhance(img, saturation, luma);
        }
    }
}

/// ITU-R 601 luma of one pixel.
fn luma(p: &Rgba<u8>) -> f32 {
    0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32
}

fn mean_luma(img: &RgbaImage) -> f32 {
    let n = img.width() as u64 * img.height() as u64;
    if n == 0 {
        return 0.0;
    }
    (img.pixels().map(|p| luma(p) as f64).sum::<f64>() / n as f64).round() as f32
}

/// Blend every color channel away from a gray `degenerate` level by `factor`.
fn enhance<F: Fn(&Rgba<u8>) -> f32>(img: &mut RgbaImage, factor: f32, degenerate: F) {
    for p in img.pixels_mut() {
        let d = degenerate(p);
        for c in 0..3 {
            let v = d + factor * (p[c] as f32 - d);
            p[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Copy the alpha channel of `src` back onto `filtered`.
fn keep_alpha(src: &RgbaImage, mut filtered: RgbaImage) -> RgbaImage {
    for (out, orig) in filtered.pixels_mut().zip(src.pixels()) {
        out[3] = orig[3];
    }
    filtered
}

/// 3×3 kernel with edge pixels replicated, so the outermost row and column
/// are filtered like the rest.
fn convolve(img: &RgbaImage, kernel: &[f32; 9]) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return img.clone();
    }
    let padded = RgbaImage::from_fn(w + 2, h + 2, |x, y| {
        *img.get_pixel(x.saturating_sub(1).min(w - 1), y.saturating_sub(1).min(h - 1))
    });
    let filtered = imageops::filter3x3(&padded, kernel);
    keep_alpha(img, imageops::crop_imm(&filtered, 1, 1, w, h).to_image())
}

/// Difference to the top-left neighbour around mid gray. The kernel sums to
/// zero, so the signed response is taken as a rising and a falling half.
fn emboss(img: &RgbaImage) -> RgbaImage {
    let rise = convolve(img, &EMBOSS_RISE);
    let fall = convolve(img, &EMBOSS_FALL);
    let mut out = img.clone();
    for ((o, r), f) in out.pixels_mut().zip(rise.pixels()).zip(fall.pixels()) {
        for c in 0..3 {
            o[c] = (128 + r[c] as i32 - f[c] as i32).clamp(0, 255) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const A: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const B: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const C: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const D: Rgba<u8> = Rgba([255, 255, 0, 255]);

    /// 2×2 with four distinct corners:
    /// ```text
    ///   A B
    ///   C D
    /// ```
    fn corners() -> RgbaImage {
        RgbaImage::from_fn(2, 2, |x, y| match (x, y) {
            (0, 0) => A,
            (1, 0) => B,
            (0, 1) => C,
            _ => D,
        })
    }

    fn row(img: &RgbaImage, y: u32) -> Vec<Rgba<u8>> {
        (0..img.width()).map(|x| *img.get_pixel(x, y)).collect()
    }

    #[test]
    fn test_rotation_degrees() {
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::Cw90));
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Cw270));
        assert_eq!(Rotation::from_degrees(540), Some(Rotation::Cw180));
        assert_eq!(Rotation::from_degrees(45), None);
        assert!(Rotation::Cw270.swaps_axes());
        assert!(!Rotation::Cw180.swaps_axes());
        assert_eq!(Rotation::None.turned(false), Rotation::Cw270);
    }

    #[test]
    fn test_orient_clockwise() {
        let mut adj = ImageAdjustments::default();
        adj.rotate(true);
        let img = adj.orient(&corners());
        assert_eq!(row(&img, 0), vec![C, A]);
        assert_eq!(row(&img, 1), vec![D, B]);
        assert_eq!(adj.oriented_dims((4, 3)), (3, 4));
    }

    #[test]
    fn test_rotate_after_flip_matches_sequential_edits() {
        // Mirror first, then turn what is on screen
        let mut adj = ImageAdjustments::default();
        adj.flip(true);
        adj.rotate(true);
        let expected = imageops::rotate90(&imageops::flip_horizontal(&corners()));
        assert_eq!(adj.orient(&corners()), expected);

        // Two mirrors are a half turn and do not reverse the direction
        let mut both = ImageAdjustments::default();
        both.flip(true);
        both.flip(false);
        both.rotate(true);
        let expected = imageops::rotate90(&imageops::rotate180(&corners()));
        assert_eq!(both.orient(&corners()), expected);
    }

    #[test]
    fn test_toggle_filter() {
        let mut adj = ImageAdjustments::default();
        assert!(adj.toggle_filter(Filter::Blur));
        assert!(adj.toggle_filter(Filter::Edge));
        assert!(!adj.toggle_filter(Filter::Blur));
        assert_eq!(adj.filters, vec![Filter::Edge]);
        assert!(!adj.is_identity());
        adj.reset();
        assert!(adj.is_identity());
    }

    #[test]
    fn test_brightness_and_saturation() {
        let mut img = RgbaImage::from_pixel(3, 3, Rgba([100, 50, 200, 128]));
        ImageAdjustments {
            brightness: 0.5,
            ..ImageAdjustments::default()
        }
        .apply_tones(&mut img);
        assert_eq!(*img.get_pixel(1, 1), Rgba([50, 25, 100, 128]));

        let mut gray = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 0, 255]));
        ImageAdjustments {
            saturation: 0.0,
            ..ImageAdjustments::default()
        }
        .apply_tones(&mut gray);
        let p = gray.get_pixel(0, 0);
        assert!(p[0] == p[1] && p[1] == p[2], "{:?}", p);
    }

    #[test]
    fn test_zero_contrast_is_flat() {
        let mut img = RgbaImage::from_fn(4, 1, |x, _| Rgba([(x * 60) as u8, (x * 60) as u8, (x * 60) as u8, 255]));
        ImageAdjustments {
            contrast: 0.0,
            ..ImageAdjustments::default()
        }
        .apply_tones(&mut img);
        let first = *img.get_pixel(0, 0);
        assert!(img.pixels().all(|p| *p == first));
        assert_eq!(first[0], 90);
    }

    #[test]
    fn test_factors_clamped() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([100, 100, 100, 255]));
        ImageAdjustments {
            brightness: 50.0,
            ..ImageAdjustments::default()
        }
        .apply_tones(&mut img);
        // Clamped to 2.0, not 50
        assert_eq!(*img.get_pixel(0, 0), Rgba([200, 200, 200, 255]));
    }

    #[test]
    fn test_filters_keep_flat_images_and_alpha() {
        let flat = RgbaImage::from_pixel(5, 4, Rgba([90, 120, 150, 200]));
        for filter in [Filter::Smooth, Filter::Sharpen, Filter::Blur] {
            let out = filter.apply(&flat, 1.0);
            assert_eq!(out.dimensions(), (5, 4));
            for p in out.pixels() {
                for c in 0..3 {
                    assert!((p[c] as i32 - flat.get_pixel(0, 0)[c] as i32).abs() <= 1, "{} {:?}", filter, p);
                }
                assert_eq!(p[3], 200, "{}", filter);
            }
        }
        // No edges anywhere, including the outer ring
        let edges = Filter::Edge.apply(&flat, 1.0);
        assert!(edges.pixels().all(|p| p[0] == 0 && p[3] == 200));
        let contour = Filter::Contour.apply(&flat, 1.0);
        assert!(contour.pixels().all(|p| p[0] == 255 && p[3] == 200));
        let emboss = Filter::Emboss.apply(&flat, 1.0);
        assert!(emboss.pixels().all(|p| p[0] == 128));
    }

    #[test]
    fn test_edge_finds_a_step() {
        let img = RgbaImage::from_fn(6, 3, |x, _| if x < 3 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) });
        let edges = Filter::Edge.apply(&img, 1.0);
        assert_eq!(edges.get_pixel(0, 1)[0], 0);
        assert!(edges.get_pixel(3, 1)[0] > 200);
    }

    #[test]
    fn test_grayscale_filter() {
        let out = Filter::Grayscale.apply(&corners(), 1.0);
        for p in out.pixels() {
            assert!(p[0] == p[1] && p[1] == p[2]);
            assert_eq!(p[3], 255);
        }
    }

    #[test]
    fn test_render_resizes_oriented_source() {
        let src = RgbaImage::from_pixel(4, 2, A);
        let adj = ImageAdjustments {
            rotation: Rotation::Cw90,
            ..ImageAdjustments::default()
        };
        let out = adj.render(&src, (10, 20), 1.0);
        assert_eq!(out.dimensions(), (10, 20));
        assert_eq!(*out.get_pixel(5, 10), A);
    }

    #[test]
    fn test_json_defaults() {
        let adj: ImageAdjustments = serde_json::from_str(r#"{"rotation": "cw90", "filters": ["emboss"]}"#).unwrap();
        assert_eq!(adj.rotation, Rotation::Cw90);
        assert_eq!(adj.filters, vec![Filter::Emboss]);
        assert_eq!(adj.brightness, 1.0);
        assert!(ImageAdjustments::default().is_identity());
        for f in Filter::ALL {
            assert_eq!(f.name().parse::<Filter>().unwrap(), f);
        }
    }
}
