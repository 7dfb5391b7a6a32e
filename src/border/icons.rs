//! Vector icons for the heart / club / triangle / diamond motifs.
//!
//! Each icon is built from filled polygons and circles sized to fit a
//! `size × size` box around its center.

use crate::render::Surface;
use image::Rgba;
use std::f32::consts::PI;

/// Icon shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Heart,
    Club,
    Triangle,
    Diamond,
}

/// Sample count for the heart outline.
const HEART_SEGMENTS: usize = 48;

impl Icon {
    /// Draw the icon centered at (cx, cy), fitting a `size` box.
    pub fn draw(self, surface: &mut Surface, cx: f32, cy: f32, size: f32, color: Rgba<u8>) {
        if size <= 0.0 {
            return;
        }
        let h = size / 2.0;
        match self {
            Icon::Heart => surface.fill_polygon(&heart(cx, cy, size), color),
            Icon::Triangle => {
                surface.fill_polygon(&[(cx, cy - h), (cx + h, cy + h), (cx - h, cy + h)], color)
            }
            Icon::Diamond => surface.fill_polygon(
                &[(cx, cy - h), (cx + h * 0.7, cy), (cx, cy + h), (cx - h * 0.7, cy)],
                color,
            ),
            Icon::Club => {
                // Three leaves and a flared stem
                let r = size * 0.22;
                surface.fill_circle(cx, cy - h + r, r, color);
                surface.fill_circle(cx - r * 1.1, cy - r * 0.1, r, color);
                surface.fill_circle(cx + r * 1.1, cy - r * 0.1, r, color);
                surface.fill_polygon(
                    &[
                        (cx - size * 0.06, cy - r * 0.4),
                        (cx + size * 0.06, cy - r * 0.4),
                        (cx + size * 0.2, cy + h),
                        (cx - size * 0.2, cy + h),
                    ],
                    color,
                );
            }
        }
    }
}

/// Classic parametric heart, scaled into the box.
///
/// x = 16 sin³t, y = 13 cos t − 5 cos 2t − 2 cos 3t − cos 4t
fn heart(cx: f32, cy: f32, size: f32) -> Vec<(f32, f32)> {
    // The raw curve spans x ∈ [-16, 16] and y ∈ [-17, 12]
    let k = size / 34.0;
    (0..HEART_SEGMENTS)
        .map(|i| {
            let t = i as f32 / HEART_SEGMENTS as f32 * 2.0 * PI;
            let x = 16.0 * t.sin().powi(3);
            let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
            (cx + x * k, cy - (y + 2.5) * k)
        })
        .collect()
}
