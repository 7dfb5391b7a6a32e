//! Font resolution and glyph rasterization.
//!
//! A [`FontId`] names a family; [`SizedFont::resolve`] turns it into a face
//! at a pixel size. Resolution never fails:
//!
//! ```text
//!   $PASSEPARTOUT_FONT ──▶ family candidates ──▶ generic candidates ──▶ Spleen bitmap
//! ```
//!
//! Outline faces go through ab_glyph. The bitmap face is Spleen 12×24,
//! scaled by nearest neighbour; wide (CJK, full-width) characters take two
//! cells and draw a box when Spleen has no glyph for them.

use ab_glyph::{Font as _, FontArc, ScaleFont, point};
use serde::{Deserialize, Serialize};
use spleen_font::{FONT_12X24, PSF2Font};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Environment variable naming a font file tried before any candidate.
pub const FONT_ENV: &str = "PASSEPARTOUT_FONT";

/// Spleen cell size the bitmap face scales from.
const CELL_W: f32 = 12.0;
const CELL_H: f32 = 24.0;

/// Share of the bitmap cell above the baseline.
const BITMAP_ASCENT: f32 = 0.8;

/// Font families a text layer can ask for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontId {
    /// Sans-serif with CJK coverage
    #[default]
    Sans,
    /// Song / Times style
    Serif,
    /// Kai / brush style
    Script,
    Mono,
    /// The built-in Spleen face, independent of installed fonts
    Bitmap,
}

impl FontId {
    pub const ALL: [FontId; 5] = [
        FontId::Sans,
        FontId::Serif,
        FontId::Script,
        FontId::Mono,
        FontId::Bitmap,
    ];

    /// System font files tried in order for this family.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            FontId::Sans => &[
                "/System/Library/Fonts/PingFang.ttc",
                "/System/Library/Fonts/STHeiti Light.ttc",
                "C:\\Windows\\Fonts\\msyh.ttc",
                "C:\\Windows\\Fonts\\simhei.ttf",
                "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
                "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
                "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
            ],
            FontId::Serif => &[
                "/System/Library/Fonts/Supplemental/Songti.ttc",
                "C:\\Windows\\Fonts\\simsun.ttc",
                "/usr/share/fonts/opentype/noto/NotoSerifCJK-Regular.ttc",
                "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
            ],
            FontId::Script => &[
                "/System/Library/Fonts/Supplemental/Kaiti.ttc",
                "C:\\Windows\\Fonts\\simkai.ttf",
                "/usr/share/fonts/truetype/arphic/ukai.ttc",
            ],
            FontId::Mono => &[
                "/System/Library/Fonts/Menlo.ttc",
                "C:\\Windows\\Fonts\\consola.ttf",
                "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
            ],
            FontId::Bitmap => &[],
        }
    }
}

/// Last-resort outline fonts shared by every family.
const GENERIC_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Helvetica.ttc",
    "C:\\Windows\\Fonts\\arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
];

/// Anything that can report the advance width of a string.
///
/// Word-wrap only needs this, so it can be tested with a fixed-width stub.
pub trait Measure {
    fn measure(&self, text: &str) -> f32;
}

#[derive(Clone)]
enum Face {
    Outline(FontArc),
    Bitmap,
}

/// A resolved face at a pixel size.
#[derive(Clone)]
pub struct SizedFont {
    face: Face,
    px: f32,
}

impl std::fmt::Debug for SizedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.face {
            Face::Outline(_) => "outline",
            Face::Bitmap => "bitmap",
        };
        f.debug_struct("SizedFont")
            .field("face", &kind)
            .field("px", &self.px)
            .finish()
    }
}

static LOADED: OnceLock<Mutex<HashMap<FontId, Option<FontArc>>>> = OnceLock::new();

fn load_file(path: &Path) -> Option<FontArc> {
    let data = std::fs::read(path).ok()?;
    match FontArc::try_from_vec(data) {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("font {} unreadable: {}", path.display(), e);
            None
        }
    }
}

fn find_outline(id: FontId) -> Option<FontArc> {
    let env = std::env::var(FONT_ENV).ok();
    env.iter()
        .map(String::as_str)
        .chain(id.candidates().iter().copied())
        .chain(GENERIC_CANDIDATES.iter().copied())
        .find_map(|p| {
            let font = load_file(Path::new(p))?;
            log::debug!("font {:?} resolved to {}", id, p);
            Some(font)
        })
}

fn outline_for(id: FontId) -> Option<FontArc> {
    let cache = LOADED.get_or_init(|| Mutex::new(HashMap::new()));
    let Ok(mut map) = cache.lock() else {
        return find_outline(id);
    };
    map.entry(id)
        .or_insert_with(|| {
            let found = find_outline(id);
            if found.is_none() {
                log::warn!("no system font for {:?}, using the built-in bitmap face", id);
            }
            found
        })
        .clone()
}

impl SizedFont {
    /// Resolve `id` at `px` pixels. Falls back to the bitmap face.
    pub fn resolve(id: FontId, px: f32) -> Self {
        let px = px.max(1.0);
        let face = match id {
            FontId::Bitmap => Face::Bitmap,
            _ => outline_for(id).map_or(Face::Bitmap, Face::Outline),
        };
        Self { face, px }
    }

    /// The built-in face at `px` pixels.
    pub fn bitmap(px: f32) -> Self {
        Self {
            face: Face::Bitmap,
            px: px.max(1.0),
        }
    }

    pub fn px(&self) -> f32 {
        self.px
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self.face, Face::Bitmap)
    }

    /// Distance from the line top to the baseline.
    pub fn ascent(&self) -> f32 {
        match &self.face {
            Face::Outline(f) => f.as_scaled(self.px).ascent(),
            Face::Bitmap => self.px * BITMAP_ASCENT,
        }
    }

    /// Height of one line without spacing.
    pub fn line_height(&self) -> f32 {
        match &self.face {
            Face::Outline(f) => {
                let s = f.as_scaled(self.px);
                s.ascent() - s.descent()
            }
            Face::Bitmap => self.px,
        }
    }

    fn bitmap_scale(&self) -> f32 {
        self.px / CELL_H
    }

    /// Rasterize `text` with its baseline at `baseline` and pen start at `x`,
    /// reporting coverage per pixel.
    pub fn draw<F>(&self, text: &str, x: f32, baseline: f32, mut plot: F)
    where
        F: FnMut(i64, i64, f32),
    {
        match &self.face {
            Face::Outline(font) => {
                let scaled = font.as_scaled(self.px);
                let mut caret = x;
                let mut prev = None;
                for ch in text.chars() {
                    let id = scaled.glyph_id(ch);
                    if let Some(p) = prev {
                        caret += scaled.kern(p, id);
                    }
                    let glyph = id.with_scale_and_position(self.px, point(caret, baseline));
                    if let Some(outlined) = font.outline_glyph(glyph) {
                        let bounds = outlined.px_bounds();
                        outlined.draw(|gx, gy, c| {
                            plot(
                                bounds.min.x as i64 + gx as i64,
                                bounds.min.y as i64 + gy as i64,
                                c,
                            );
                        });
                    }
                    caret += scaled.h_advance(id);
                    prev = Some(id);
                }
            }
            Face::Bitmap => self.draw_bitmap(text, x, baseline, plot),
        }
    }

    fn draw_bitmap<F>(&self, text: &str, x: f32, baseline: f32, mut plot: F)
    where
        F: FnMut(i64, i64, f32),
    {
        let k = self.bitmap_scale();
        let top = baseline - self.ascent();
        let mut spleen = PSF2Font::new(FONT_12X24).ok();
        let mut caret = x;

        for ch in text.chars() {
            let cells = cell_count(ch);
            let advance = CELL_W * cells as f32 * k;
            if ch.is_whitespace() {
                caret += advance;
                continue;
            }

            let mut bits = vec![false; (CELL_W as usize) * (CELL_H as usize)];
            let mut found = false;
            if cells == 1 {
                let mut buf = [0u8; 4];
                if let Some(glyph) = spleen
                    .as_mut()
                    .and_then(|f| f.glyph_for_utf8(ch.encode_utf8(&mut buf).as_bytes()))
                {
                    for (row_y, row) in glyph.enumerate() {
                        for (col_x, on) in row.enumerate() {
                            let idx = row_y * CELL_W as usize + col_x;
                            if on && idx < bits.len() {
                                bits[idx] = true;
                                found = true;
                            }
                        }
                    }
                }
            }

            let (x0, y0) = (caret.round() as i64, top.round() as i64);
            let w = advance.round() as i64;
            let h = self.px.round() as i64;
            if found {
                for ty in 0..h {
                    let sy = ((ty as f32 + 0.5) / k) as usize;
                    for tx in 0..w {
                        let sx = ((tx as f32 + 0.5) / k) as usize;
                        if sy < CELL_H as usize && sx < CELL_W as usize && bits[sy * CELL_W as usize + sx] {
                            plot(x0 + tx, y0 + ty, 1.0);
                        }
                    }
                }
            } else {
                draw_box(x0, y0, w, h, k, &mut plot);
            }
            caret += advance;
        }
    }
}

/// Hollow box standing in for a glyph the bitmap face lacks.
fn draw_box<F: FnMut(i64, i64, f32)>(x0: i64, y0: i64, w: i64, h: i64, k: f32, plot: &mut F) {
    let inset = (2.0 * k).round().max(1.0) as i64;
    let line = k.round().max(1.0) as i64;
    let (bx0, by0, bx1, by1) = (x0 + inset, y0 + inset * 2, x0 + w - inset, y0 + h - inset);
    for y in by0..by1 {
        for x in bx0..bx1 {
            let edge = x < bx0 + line || x >= bx1 - line || y < by0 + line || y >= by1 - line;
            if edge {
                plot(x, y, 1.0);
            }
        }
    }
}

/// Bitmap cells a character occupies: two for East Asian wide ranges.
pub fn cell_count(ch: char) -> u32 {
    let c = ch as u32;
    let wide = matches!(
        c,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x1F300..=0x1F64F
            | 0x1F900..=0x1F9FF
            | 0x20000..=0x3FFFD
    );
    if wide { 2 } else { 1 }
}

impl Measure for SizedFont {
    fn measure(&self, text: &str) -> f32 {
        match &self.face {
            Face::Outline(font) => {
                let scaled = font.as_scaled(self.px);
                let mut width = 0.0;
                let mut prev = None;
                for ch in text.chars() {
                    let id = scaled.glyph_id(ch);
                    if let Some(p) = prev {
                        width += scaled.kern(p, id);
                    }
                    width += scaled.h_advance(id);
                    prev = Some(id);
                }
                width
            }
            Face::Bitmap => {
                let cells: u32 = text.chars().map(cell_count).sum();
                cells as f32 * CELL_W * self.bitmap_scale()
            }
        }
    }
}
