//! # Canvas Presets
//!
//! Output sizes the export can target.
//!
//! | Id                | Size      | DPI | Use                         |
//! |-------------------|-----------|-----|-----------------------------|
//! | `one_inch`        | 295×413   | 300 | 1-inch ID photo             |
//! | `two_inch`        | 413×626   | 300 | 2-inch ID photo             |
//! | `square`          | 800×800   | 72  | 1:1 post                    |
//! | `xiaohongshu`     | 1242×1660 | 72  | 3:4 social post (default)   |
//! | `wide`            | 1920×1080 | 72  | 16:9 poster                 |
//! | `tall`            | 1080×1920 | 72  | 9:16 poster                 |
//!
//! ## Usage
//!
//! ```
//! use passepartout::config::CanvasPreset;
//!
//! let preset = CanvasPreset::by_name("xiaohongshu").unwrap();
//! let canvas = preset.canvas();
//! assert_eq!((canvas.width, canvas.height), (1242, 1660));
//! ```

use crate::geometry::CanvasSpec;

/// A named output size.
///
/// The DPI only matters for print sizes; screen presets carry 72.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasPreset {
    /// Lookup key
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub dpi: u16,
}

impl CanvasPreset {
    /// # 1-inch ID Photo
    ///
    /// 25×35mm at 300 DPI.
    pub const ONE_INCH: Self = Self {
        id: "one_inch",
        name: "1-inch ID photo",
        width: 295,
        height: 413,
        dpi: 300,
    };

    /// # 2-inch ID Photo
    ///
    /// 35×53mm at 300 DPI.
    pub const TWO_INCH: Self = Self {
        id: "two_inch",
        name: "2-inch ID photo",
        width: 413,
        height: 626,
        dpi: 300,
    };

    pub const SQUARE: Self = Self {
        id: "square",
        name: "Square 1:1",
        width: 800,
        height: 800,
        dpi: 72,
    };

    /// # Xiaohongshu 3:4
    ///
    /// The default export size.
    pub const XIAOHONGSHU: Self = Self {
        id: "xiaohongshu",
        name: "Xiaohongshu 3:4",
        width: 1242,
        height: 1660,
        dpi: 72,
    };

    pub const WIDE: Self = Self {
        id: "wide",
        name: "Poster 16:9",
        width: 1920,
        height: 1080,
        dpi: 72,
    };

    pub const TALL: Self = Self {
        id: "tall",
        name: "Poster 9:16",
        width: 1080,
        height: 1920,
        dpi: 72,
    };

    pub const ALL: [CanvasPreset; 6] = [
        Self::ONE_INCH,
        Self::TWO_INCH,
        Self::SQUARE,
        Self::XIAOHONGSHU,
        Self::WIDE,
        Self::TALL,
    ];

    /// Look a preset up by id, ignoring case.
    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.id.eq_ignore_ascii_case(name))
    }

    /// Preset ids, in table order.
    pub fn list() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.id).collect()
    }

    #[inline]
    pub fn canvas(&self) -> CanvasSpec {
        CanvasSpec {
            width: self.width,
            height: self.height,
        }
    }

    #[inline]
    pub fn dots_per_mm(&self) -> f32 {
        self.dpi as f32 / 25.4
    }

    /// Physical size in millimeters at the preset's DPI.
    pub fn size_mm(&self) -> (f32, f32) {
        let dpmm = self.dots_per_mm();
        (self.width as f32 / dpmm, self.height as f32 / dpmm)
    }
}

impl Default for CanvasPreset {
    fn default() -> Self {
        Self::XIAOHONGSHU
    }
}
