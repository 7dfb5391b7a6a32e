//! Pixel compositing.
//!
//! All layers are straight (non-premultiplied) RGBA. Every stamp onto a
//! surface goes through [`over`] with a coverage factor, so anti-aliased
//! edges, 160/255 highlight washes and masked band motifs share one blend.

use crate::color::Rgb;
use image::{Rgba, RgbaImage, RgbImage};

/// Porter-Duff source-over of `src` onto `dst`, with `src` alpha further
/// scaled by `coverage` in [0, 1].
#[inline]
pub fn over(dst: Rgba<u8>, src: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let sa = (src[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let s = src[c] as f32;
        let d = dst[c] as f32;
        let v = (s * sa + d * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

/// Composite `src` onto `dst` with its top-left corner at (x, y).
///
/// Parts of `src` falling outside `dst` are dropped.
pub fn composite_at(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    let (dw, dh) = (dst.width() as i64, dst.height() as i64);
    for (sx, sy, px) in src.enumerate_pixels() {
        let tx = x + sx as i64;
        let ty = y + sy as i64;
        if tx < 0 || ty < 0 || tx >= dw || ty >= dh || px[3] == 0 {
            continue;
        }
        let d = dst.get_pixel_mut(tx as u32, ty as u32);
        *d = over(*d, *px, 1.0);
    }
}

/// Composite a same-sized layer through a per-pixel mask in [0, 1].
pub fn composite_masked<M>(dst: &mut RgbaImage, src: &RgbaImage, mask: M)
where
    M: Fn(u32, u32) -> f32,
{
    let w = dst.width().min(src.width());
    let h = dst.height().min(src.height());
    for y in 0..h {
        for x in 0..w {
            let px = *src.get_pixel(x, y);
            if px[3] == 0 {
                continue;
            }
            let m = mask(x, y);
            if m <= 0.0 {
                continue;
            }
            let d = dst.get_pixel_mut(x, y);
            *d = over(*d, px, m);
        }
    }
}

/// Drop the alpha channel by compositing onto an opaque background.
pub fn flatten_onto(img: &RgbaImage, background: Rgb) -> RgbImage {
    let base = background.to_rgba();
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let p = over(base, *img.get_pixel(x, y), 1.0);
        image::Rgb([p[0], p[1], p[2]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_opaque_replaces() {
        let out = over(Rgba([10, 20, 30, 255]), Rgba([200, 100, 50, 255]), 1.0);
        assert_eq!(out, Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn test_over_zero_coverage_keeps_dst() {
        let dst = Rgba([10, 20, 30, 255]);
        assert_eq!(over(dst, Rgba([200, 100, 50, 255]), 0.0), dst);
    }

    #[test]
    fn test_over_half_alpha_on_white() {
        let out = over(Rgba([255, 255, 255, 255]), Rgba([0, 0, 0, 128]), 1.0);
        assert!((out[0] as i32 - 127).abs() <= 1);
        assert_eq!(out[3], 255);
    }

    #[test]
    fn test_over_onto_transparent() {
        let out = over(Rgba([0, 0, 0, 0]), Rgba([255, 0, 0, 160]), 1.0);
        assert_eq!(out, Rgba([255, 0, 0, 160]));
    }

    #[test]
    fn test_composite_at_clips() {
        let mut dst = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let src = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]));
        composite_at(&mut dst, &src, 2, -1);
        assert_eq!(*dst.get_pixel(3, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*dst.get_pixel(3, 1), Rgba([255, 255, 255, 255]));
        assert_eq!(*dst.get_pixel(1, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*dst.get_pixel(3, 2), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_composite_masked() {
        let mut dst = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        let src = RgbaImage::from_pixel(2, 1, Rgba([255, 255, 255, 255]));
        composite_masked(&mut dst, &src, |x, _| if x == 0 { 1.0 } else { 0.0 });
        assert_eq!(*dst.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*dst.get_pixel(1, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_flatten_onto_white() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let flat = flatten_onto(&img, Rgb::WHITE);
        assert_eq!(*flat.get_pixel(0, 0), image::Rgb([255, 255, 255]));
    }
}
