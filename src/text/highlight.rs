//! Keyword highlights.
//!
//! Matches are chosen longest first and must sit at least
//! [`MIN_GAP_CHARS`] characters away from every match already chosen. The
//! decoration style and the "random" color both come from hashes, so the
//! same text always renders the same way.
//!
//! | Style           | Shape                                           |
//! |-----------------|-------------------------------------------------|
//! | `underline_bar` | solid bar along the bottom of the line box      |
//! | `wavy_line`     | sine stroke under the glyphs                    |
//! | `chip`          | rounded rectangle behind the whole match        |
//! | `marker`        | flat stripe over the lower half of the glyphs   |

use crate::color::{BRIGHT, Rgb};
use crate::render::Surface;
use crate::shader::hash_str;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::f32::consts::PI;
use std::fmt;

/// Characters that must separate two highlighted matches.
pub const MIN_GAP_CHARS: usize = 12;

/// Opacity of every highlight decoration.
pub const HIGHLIGHT_ALPHA: u8 = 160;

/// Decoration drawn behind a matched keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightStyle {
    UnderlineBar,
    WavyLine,
    Chip,
    Marker,
}

impl HighlightStyle {
    pub const ALL: [HighlightStyle; 4] = [
        HighlightStyle::UnderlineBar,
        HighlightStyle::WavyLine,
        HighlightStyle::Chip,
        HighlightStyle::Marker,
    ];

    /// Style for the match of `keyword` starting at char `start`.
    pub fn pick(keyword: &str, start: usize) -> Self {
        let h = hash_str(&format!("{}@{}", keyword, start));
        Self::ALL[h as usize % Self::ALL.len()]
    }
}

/// Highlight color: fixed, or one bright color per keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HighlightColor {
    #[default]
    Random,
    Fixed(Rgb),
}

impl HighlightColor {
    pub fn resolve(self, keyword: &str) -> Rgb {
        match self {
            HighlightColor::Fixed(c) => c,
            HighlightColor::Random => BRIGHT[hash_str(keyword) as usize % BRIGHT.len()],
        }
    }
}

impl Serialize for HighlightColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HighlightColor::Random => serializer.serialize_str("random"),
            HighlightColor::Fixed(c) => c.serialize(serializer),
        }
    }
}

struct HighlightColorVisitor;

impl Visitor<'_> for HighlightColorVisitor {
    type Value = HighlightColor;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("\"random\" or a hex color like #FF2D55")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<HighlightColor, E> {
        if v.eq_ignore_ascii_case("random") {
            return Ok(HighlightColor::Random);
        }
        v.parse::<Rgb>().map(HighlightColor::Fixed).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for HighlightColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(HighlightColorVisitor)
    }
}

/// One highlighted keyword occurrence, in char indices of the content.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightMatch {
    pub start: usize,
    pub end: usize,
    pub keyword: String,
    pub style: HighlightStyle,
    pub color: Rgb,
}

impl HighlightMatch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Characters strictly between two char ranges, 0 when they overlap.
fn gap(a: (usize, usize), b: (usize, usize)) -> usize {
    if a.1 <= b.0 {
        b.0 - a.1
    } else if b.1 <= a.0 {
        a.0 - b.1
    } else {
        0
    }
}

/// Select the keyword matches to highlight in `content`, ordered by start.
pub fn find_matches(content: &str, keywords: &[String], color: HighlightColor) -> Vec<HighlightMatch> {
    let chars: Vec<char> = content.chars().collect();
    let mut candidates: Vec<(usize, usize, &str)> = Vec::new();

    for kw in keywords {
        let needle: Vec<char> = kw.chars().collect();
        if needle.is_empty() || needle.iter().all(|c| c.is_whitespace()) || needle.len() > chars.len() {
            continue;
        }
        for start in 0..=chars.len() - needle.len() {
            if chars[start..start + needle.len()] == needle[..] {
                candidates.push((start, start + needle.len(), kw.as_str()));
            }
        }
    }

    // Longest first, then leftmost
    candidates.sort_by(|a, b| (b.1 - b.0).cmp(&(a.1 - a.0)).then(a.0.cmp(&b.0)));

    let mut chosen: Vec<(usize, usize, &str)> = Vec::new();
    for cand in candidates {
        let clear = chosen
            .iter()
            .all(|c| gap((c.0, c.1), (cand.0, cand.1)) >= MIN_GAP_CHARS);
        if clear {
            chosen.push(cand);
        }
    }
    chosen.sort_by_key(|c| c.0);

    chosen
        .into_iter()
        .map(|(start, end, kw)| HighlightMatch {
            start,
            end,
            keyword: kw.to_string(),
            style: HighlightStyle::pick(kw, start),
            color: color.resolve(kw),
        })
        .collect()
}

/// Draw one highlight segment behind the glyphs spanning `[x0, x1]` on a
/// line whose box starts at `top` with height `line_h`.
pub fn draw_highlight(
    surface: &mut Surface,
    style: HighlightStyle,
    color: Rgb,
    x0: f32,
    x1: f32,
    top: f32,
    line_h: f32,
) {
    if x1 <= x0 {
        return;
    }
    let c = color.with_alpha(HIGHLIGHT_ALPHA);
    match style {
        HighlightStyle::UnderlineBar => {
            let bar = (line_h * 0.1).max(2.0);
            surface.fill_rect_f(x0, top + line_h - bar, x1, top + line_h, c);
        }
        HighlightStyle::WavyLine => {
            let amplitude = (line_h * 0.06).max(1.0);
            let wavelength = (line_h * 0.5).max(6.0);
            let base = top + line_h - amplitude - 1.0;
            let steps = ((x1 - x0) / 2.0).ceil().max(1.0) as usize;
            let points: Vec<(f32, f32)> = (0..=steps)
                .map(|i| {
                    let x = x0 + (x1 - x0) * i as f32 / steps as f32;
                    (x, base + amplitude * ((x - x0) / wavelength * 2.0 * PI).sin())
                })
                .collect();
            surface.stroke_polyline(&points, (line_h * 0.06).max(1.5), c);
        }
        HighlightStyle::Chip => {
            let pad = line_h * 0.1;
            surface.fill_rounded_rect(x0 - pad, top, x1 + pad, top + line_h, line_h * 0.3, c);
        }
        HighlightStyle::Marker => {
            surface.fill_rect_f(x0, top + line_h * 0.55, x1, top + line_h * 0.95, c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kws(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn spans(m: &[HighlightMatch]) -> Vec<(usize, usize)> {
        m.iter().map(|m| (m.start, m.end)).collect()
    }

    #[test]
    fn test_close_matches_keep_only_one() {
        // Second "cat" starts 5 chars after the first ends
        let m = find_matches("cat and a cat", &kws(&["cat"]), HighlightColor::Random);
        assert_eq!(spans(&m), vec![(0, 3)]);
    }

    #[test]
    fn test_far_matches_both_highlighted() {
        let text = "cat is here and then a cat";
        let m = find_matches(text, &kws(&["cat"]), HighlightColor::Random);
        assert_eq!(spans(&m), vec![(0, 3), (23, 26)]);
        assert!(m[0].end + MIN_GAP_CHARS <= m[1].start);
    }

    #[test]
    fn test_longest_match_wins() {
        let m = find_matches("a blue whale", &kws(&["whale", "blue whale"]), HighlightColor::Random);
        assert_eq!(spans(&m), vec![(2, 12)]);
        assert_eq!(m[0].keyword, "blue whale");
    }

    #[test]
    fn test_cjk_char_indices() {
        let m = find_matches("今天天气很好", &kws(&["天气"]), HighlightColor::Random);
        assert_eq!(spans(&m), vec![(2, 4)]);
    }

    #[test]
    fn test_blank_keywords_ignored() {
        let m = find_matches("hello", &kws(&["", "  ", "toolongkeyword"]), HighlightColor::Random);
        assert!(m.is_empty());
    }

    #[test]
    fn test_style_and_color_are_stable() {
        let a = find_matches("sunny day", &kws(&["sunny"]), HighlightColor::Random);
        let b = find_matches("sunny day", &kws(&["sunny"]), HighlightColor::Random);
        assert_eq!(a, b);
        assert!(BRIGHT.contains(&a[0].color));
        let fixed = find_matches("sunny day", &kws(&["sunny"]), HighlightColor::Fixed(Rgb::BLACK));
        assert_eq!(fixed[0].color, Rgb::BLACK);
    }

    #[test]
    fn test_color_serde() {
        assert_eq!(
            serde_json::from_str::<HighlightColor>("\"random\"").unwrap(),
            HighlightColor::Random
        );
        assert_eq!(
            serde_json::from_str::<HighlightColor>("\"#FF2D55\"").unwrap(),
            HighlightColor::Fixed(Rgb::from_u32(0xFF2D55))
        );
        assert_eq!(
            serde_json::to_string(&HighlightColor::Fixed(Rgb::from_u32(0xFF2D55))).unwrap(),
            "\"#FF2D55\""
        );
        assert!(serde_json::from_str::<HighlightColor>("\"sometimes\"").is_err());
    }

    #[test]
    fn test_decorations_stay_near_segment() {
        use crate::geometry::CanvasSpec;
        for style in HighlightStyle::ALL {
            let mut s = Surface::transparent(CanvasSpec::new(100, 60).unwrap()).unwrap();
            draw_highlight(&mut s, style, Rgb::from_u32(0xFF2D55), 20.0, 60.0, 10.0, 30.0);
            let mut any = false;
            for (x, y, p) in s.image().enumerate_pixels() {
                if p[3] > 0 {
                    any = true;
                    assert!((15..66).contains(&x) && (10..41).contains(&y), "{:?} at {},{}", style, x, y);
                    assert!(p[3] <= HIGHLIGHT_ALPHA);
                }
            }
            assert!(any, "{:?} drew nothing", style);
        }
    }
}
