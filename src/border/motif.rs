//! Band motifs.
//!
//! Each motif is drawn across the whole canvas onto a transparent scratch
//! layer, then composited through the [`BandMask`] so only the frame band
//! keeps it. The grid is the one exception, see [`grid`].

use super::{BandMask, BorderPattern, BorderSpec, Icon};
use crate::error::FrameError;
use crate::geometry::CanvasSpec;
use crate::render::{Surface, pattern_pitch};
use image::Rgba;
use std::f32::consts::PI;

/// Fixed step between diagonal stripes.
const STRIPE_STEP: i64 = 6;

pub(super) fn render_motif(
    surface: &mut Surface,
    canvas: CanvasSpec,
    spec: &BorderSpec,
    band: u32,
    radius: u32,
) -> Result<(), FrameError> {
    let mut layer = Surface::transparent(canvas)?;
    let color = spec.pattern_color.to_rgba();
    let size = pattern_pitch(spec.pattern_size_px, canvas);

    match spec.pattern {
        BorderPattern::None => return Ok(()),
        BorderPattern::Stripe => stripes(&mut layer, canvas, color),
        BorderPattern::Dots => dots(&mut layer, canvas, band, size, color),
        BorderPattern::Grid => grid(surface, &mut layer, canvas, band, size, color),
        BorderPattern::Wave => waves(&mut layer, canvas, band, color),
        BorderPattern::Heart | BorderPattern::Club | BorderPattern::Triangle | BorderPattern::Diamond => {
            if let Some(icon) = spec.pattern.icon() {
                icons(&mut layer, canvas, band, size, icon, color);
            }
        }
    }

    let mask = BandMask::new(canvas, band, radius);
    surface.composite_masked(&layer, |x, y| mask.coverage(x, y));
    Ok(())
}

/// 45° diagonals at a fixed 6px step.
fn stripes(layer: &mut Surface, canvas: CanvasSpec, color: Rgba<u8>) {
    let w = canvas.width as i64;
    let h = canvas.height as i64;
    let mut i = -h;
    while i < w + h {
        layer.stroke_line(i as f32, 0.0, (i + h) as f32, h as f32, 1.0, color);
        i += STRIPE_STEP;
    }
}

/// Staggered dot lattice with the first row and column centered in the band.
fn dots(layer: &mut Surface, canvas: CanvasSpec, band: u32, size: u32, color: Rgba<u8>) {
    let pitch = size.max(8) as f32 * 2.0;
    let radius = (size as f32 / 4.0).max(2.0);
    let start = band as f32 / 2.0;
    let (w, h) = (canvas.width as f32, canvas.height as f32);

    let mut row = 0usize;
    let mut y = start;
    while y < h + pitch {
        let offset = if row % 2 == 1 { pitch / 2.0 } else { 0.0 };
        let mut x = start + offset;
        while x < w + pitch {
            layer.fill_circle(x, y, radius, color);
            x += pitch;
        }
        y += pitch;
        row += 1;
    }
}

/// Orthogonal grid at `size` pitch.
///
/// Lines whose position falls within one band width of an edge are drawn
/// whole and unmasked; the rest go through the band mask and only keep
/// their ends. With rounded corners this lets the near-edge lines run into
/// the inner corner area, which is the expected look.
fn grid(
    surface: &mut Surface,
    layer: &mut Surface,
    canvas: CanvasSpec,
    band: u32,
    size: u32,
    color: Rgba<u8>,
) {
    let (w, h) = (canvas.width as i64, canvas.height as i64);
    let bw = band as i64;
    let step = size as usize;

    for x in (0..w).step_by(step) {
        if x < bw || x > w - bw {
            surface.fill_rect(x, 0, 1, h, color);
        } else {
            layer.fill_rect(x, 0, 1, h, color);
        }
    }
    for y in (0..h).step_by(step) {
        if y < bw || y > h - bw {
            surface.fill_rect(0, y, w, 1, color);
        } else {
            layer.fill_rect(0, y, w, 1, color);
        }
    }
}

/// One sine polyline per edge, centered in the band.
fn waves(layer: &mut Surface, canvas: CanvasSpec, band: u32, color: Rgba<u8>) {
    let bw = band as f32;
    let amplitude = (bw / 4.0).max(2.0);
    let wavelength = (bw * 2.0).max(10.0);
    let (w, h) = (canvas.width as f32, canvas.height as f32);
    let wave = |t: f32| amplitude * (t / wavelength * 2.0 * PI).sin();

    let along = |len: f32| (0..=(len as usize / 2)).map(|i| i as f32 * 2.0);

    let top: Vec<_> = along(w).map(|x| (x, bw / 2.0 + wave(x))).collect();
    let bottom: Vec<_> = along(w).map(|x| (x, h - bw / 2.0 + wave(x))).collect();
    let left: Vec<_> = along(h).map(|y| (bw / 2.0 + wave(y), y)).collect();
    let right: Vec<_> = along(h).map(|y| (w - bw / 2.0 + wave(y), y)).collect();

    for line in [top, bottom, left, right] {
        layer.stroke_polyline(&line, 1.0, color);
    }
}

/// Icons along each edge. The ideal pitch is twice the pattern size; each
/// edge rounds its icon count so the last icon ends exactly at the edge end.
fn icons(layer: &mut Surface, canvas: CanvasSpec, band: u32, size: u32, icon: Icon, color: Rgba<u8>) {
    let bw = band as f32;
    let ideal = (size * 2) as f32;
    let icon_size = (size as f32).min(bw * 0.8);
    let (w, h) = (canvas.width as f32, canvas.height as f32);

    for x in even_positions(w, ideal) {
        icon.draw(layer, x, bw / 2.0, icon_size, color);
        icon.draw(layer, x, h - bw / 2.0, icon_size, color);
    }
    // Side bands run between the top and bottom bands
    let side = h - 2.0 * bw;
    for y in even_positions(side, ideal) {
        icon.draw(layer, bw / 2.0, bw + y, icon_size, color);
        icon.draw(layer, w - bw / 2.0, bw + y, icon_size, color);
    }
}

/// Centers of `round(total / ideal)` equal cells spanning `total`.
fn even_positions(total: f32, ideal: f32) -> impl Iterator<Item = f32> {
    let count = if total <= 0.0 || ideal <= 0.0 {
        0
    } else {
        ((total / ideal).round() as usize).max(1)
    };
    let pitch = if count > 0 { total / count as f32 } else { 0.0 };
    (0..count).map(move |i| (i as f32 + 0.5) * pitch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_positions_land_evenly() {
        let pts: Vec<f32> = even_positions(100.0, 30.0).collect();
        // 100/30 rounds to 3 cells of 33.3
        assert_eq!(pts.len(), 3);
        assert!((pts[0] - 16.666).abs() < 0.01);
        assert!((pts[2] - 83.333).abs() < 0.01);
    }

    #[test]
    fn test_even_positions_degenerate() {
        assert_eq!(even_positions(0.0, 10.0).count(), 0);
        assert_eq!(even_positions(3.0, 10.0).count(), 1);
    }

    #[test]
    fn test_grid_quirk_draws_whole_edge_lines() {
        let c = CanvasSpec::new(100, 100).unwrap();
        let white = Rgba([255, 255, 255, 255]);
        let red = Rgba([255, 0, 0, 255]);
        let mut s = Surface::new(c, white).unwrap();
        let mut layer = Surface::transparent(c).unwrap();
        grid(&mut s, &mut layer, c, 20, 10, red);
        // x = 10 is inside the left band: whole line straight onto the surface
        assert_eq!(s.pixel(10, 50), red);
        // x = 50 sits in the middle: only on the scratch layer
        assert_eq!(s.pixel(50, 50), white);
        assert_eq!(layer.pixel(50, 50), red);
    }
}
