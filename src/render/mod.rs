//! # Rendering Module
//!
//! The raster layer every renderer draws into.
//!
//! ## Modules
//!
//! - [`surface`]: RGBA surface with anti-aliased primitives and PNG/JPEG output
//! - [`composer`]: source-over compositing, masks, alpha flattening
//!
//! ## Usage Example
//!
//! ```
//! use passepartout::geometry::CanvasSpec;
//! use passepartout::render::Surface;
//! use passepartout::color::Rgb;
//!
//! let canvas = CanvasSpec::new(64, 64)?;
//! let mut surface = Surface::new(canvas, Rgb::WHITE.to_rgba())?;
//! surface.fill_circle(32.0, 32.0, 10.0, Rgb::from_u32(0xFF2D55).to_rgba());
//! assert_eq!(surface.pixel(32, 32), Rgb::from_u32(0xFF2D55).to_rgba());
//! # Ok::<(), passepartout::FrameError>(())
//! ```

pub mod composer;
pub mod surface;

pub use surface::{OutputFormat, Surface};

use crate::geometry::CanvasSpec;

/// Smallest pitch any repeating motif is drawn at. Keeps motif counts
/// bounded by canvas size no matter what pitch a spec asks for.
pub const MIN_PATTERN_PITCH: u32 = 2;

/// Clamp a requested motif pitch into `MIN_PATTERN_PITCH..=longest side`.
///
/// A pitch beyond the canvas draws at most one motif anyway, and the upper
/// bound keeps the pitch multiples renderers derive from it in range.
pub fn pattern_pitch(requested: u32, canvas: CanvasSpec) -> u32 {
    let longest = canvas.width.max(canvas.height).max(MIN_PATTERN_PITCH);
    requested.clamp(MIN_PATTERN_PITCH, longest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_pitch_bounds() {
        let c = CanvasSpec { width: 300, height: 200 };
        assert_eq!(pattern_pitch(0, c), MIN_PATTERN_PITCH);
        assert_eq!(pattern_pitch(12, c), 12);
        assert_eq!(pattern_pitch(3_000_000_000, c), 300);
        assert_eq!(pattern_pitch(u32::MAX, CanvasSpec { width: 1, height: 1 }), MIN_PATTERN_PITCH);
    }
}
