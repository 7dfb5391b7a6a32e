//! Greedy word-wrap over grapheme clusters.
//!
//! CJK text has no spaces to break at, so lines are filled one cluster at a
//! time and flushed as soon as the next cluster would overflow. Explicit
//! newlines always break.

use super::font::Measure;
use std::ops::Range;

/// Two ideographic spaces, prepended to each paragraph when indenting.
pub const INDENT: &str = "\u{3000}\u{3000}";

/// Lower bound of the wrap width in pixels.
pub const MIN_WRAP_WIDTH: f32 = 100.0;

/// Canvases wider than this aspect ratio cap lines at 70% of the width.
const LANDSCAPE_ASPECT: f32 = 1.2;

/// One output line.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    /// Line text, including the indent prefix when `indented`.
    pub text: String,
    /// Characters of the original content on this line, as char indices.
    pub source: Range<usize>,
    pub indented: bool,
}

impl WrappedLine {
    /// The line without its indent prefix.
    pub fn body(&self) -> &str {
        if self.indented {
            self.text.strip_prefix(INDENT).unwrap_or(&self.text)
        } else {
            &self.text
        }
    }
}

/// Split `text` into user-perceived characters.
///
/// A cluster is a base character followed by any combining marks, variation
/// selectors, emoji modifiers or keycap marks, and anything joined to it by
/// a zero-width joiner.
pub fn clusters(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = None;
    let mut join_next = false;

    for (i, ch) in text.char_indices() {
        match start {
            Some(s) if !(is_extender(ch) || join_next) => {
                out.push(&text[s..i]);
                start = Some(i);
            }
            None => start = Some(i),
            _ => {}
        }
        join_next = ch == '\u{200D}';
    }
    if let Some(s) = start {
        out.push(&text[s..]);
    }
    out
}

fn is_extender(ch: char) -> bool {
    matches!(
        ch as u32,
        0x0300..=0x036F
            | 0x1AB0..=0x1AFF
            | 0x1DC0..=0x1DFF
            | 0x20D0..=0x20FF
            | 0xFE00..=0xFE0F
            | 0xFE20..=0xFE2F
            | 0x1F3FB..=0x1F3FF
            | 0xE0020..=0xE007F
            | 0x200D
    )
}

/// Width available to a text line.
///
/// `canvas_width − 2·margin − 2·safe_margin_x − 2·layer_padding`, capped at
/// 70% of the width on landscape canvases (aspect > 1.2) and 90% otherwise,
/// never below [`MIN_WRAP_WIDTH`]. All inputs are in target pixels.
pub fn max_text_width(
    canvas_width: f32,
    canvas_height: f32,
    margin: f32,
    safe_margin_x: f32,
    layer_padding: f32,
) -> f32 {
    let available = canvas_width - 2.0 * margin - 2.0 * safe_margin_x - 2.0 * layer_padding;
    let aspect = canvas_width / canvas_height.max(1.0);
    let share = if aspect > LANDSCAPE_ASPECT { 0.7 } else { 0.9 };
    let cap = share * canvas_width;
    available.min(cap).max(MIN_WRAP_WIDTH)
}

/// Wrap `content` to `max_width`.
///
/// With `indent`, the first line of every paragraph starts with [`INDENT`].
/// A single cluster wider than `max_width` still gets its own line, so no
/// line exceeds the budget by more than one cluster.
pub fn wrap<M: Measure + ?Sized>(content: &str, font: &M, max_width: f32, indent: bool) -> Vec<WrappedLine> {
    let mut lines = Vec::new();
    let mut offset = 0usize;

    for paragraph in content.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        let prefix = if indent { INDENT } else { "" };
        let mut buf = String::from(prefix);
        let mut indented = indent;
        let mut line_start = offset;
        let mut pos = offset;

        for cluster in clusters(paragraph) {
            let body_empty = buf.len() == if indented { INDENT.len() } else { 0 };
            let mut candidate = buf.clone();
            candidate.push_str(cluster);
            if !body_empty && font.measure(&candidate) > max_width {
                lines.push(WrappedLine {
                    text: std::mem::take(&mut buf),
                    source: line_start..pos,
                    indented,
                });
                indented = false;
                line_start = pos;
                buf.push_str(cluster);
            } else {
                buf = candidate;
            }
            pos += cluster.chars().count();
        }

        lines.push(WrappedLine {
            text: buf,
            source: line_start..pos,
            indented,
        });
        // Skip the paragraph plus its newline (and a stripped carriage return)
        offset += content_chars_with_break(paragraph, content, offset);
    }
    lines
}

/// Char count consumed by one paragraph and the line break that ended it.
fn content_chars_with_break(paragraph: &str, content: &str, offset: usize) -> usize {
    let mut n = paragraph.chars().count();
    let rest = content.chars().skip(offset + n);
    let mut rest = rest.take(2);
    match rest.next() {
        Some('\r') => {
            n += 1;
            if rest.next() == Some('\n') {
                n += 1;
            }
        }
        Some('\n') => n += 1,
        _ => {}
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// 10px per char.
    struct Fixed;

    impl Measure for Fixed {
        fn measure(&self, text: &str) -> f32 {
            text.chars().count() as f32 * 10.0
        }
    }

    fn texts(lines: &[WrappedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_exact_fit_is_one_line() {
        let lines = wrap("abcdefghij", &Fixed, 100.0, false);
        assert_eq!(texts(&lines), vec!["abcdefghij"]);
        let lines = wrap("abcdefghijk", &Fixed, 100.0, false);
        assert_eq!(texts(&lines), vec!["abcdefghij", "k"]);
    }

    #[test]
    fn test_cjk_wraps_without_spaces() {
        let lines = wrap("测试文字测试文字", &Fixed, 30.0, false);
        assert_eq!(texts(&lines), vec!["测试文", "字测试", "文字"]);
    }

    #[test]
    fn test_newlines_break_and_indent_each_paragraph() {
        let lines = wrap("ab\ncd", &Fixed, 100.0, true);
        assert_eq!(
            texts(&lines),
            vec!["\u{3000}\u{3000}ab", "\u{3000}\u{3000}cd"]
        );
        assert!(lines.iter().all(|l| l.indented));
        assert_eq!(lines[1].body(), "cd");
    }

    #[test]
    fn test_indent_only_on_first_line_of_paragraph() {
        let lines = wrap("abcdef", &Fixed, 50.0, true);
        assert_eq!(texts(&lines), vec!["\u{3000}\u{3000}abc", "def"]);
        assert!(lines[0].indented);
        assert!(!lines[1].indented);
    }

    #[test]
    fn test_source_ranges_skip_newlines() {
        let lines = wrap("abc\r\nde\nfgh", &Fixed, 20.0, false);
        let ranges: Vec<_> = lines.iter().map(|l| l.source.clone()).collect();
        assert_eq!(ranges, vec![0..2, 2..3, 5..7, 8..10, 10..11]);
        assert_eq!(texts(&lines), vec!["ab", "c", "de", "fg", "h"]);
    }

    #[test]
    fn test_oversized_cluster_gets_own_line() {
        let lines = wrap("abc", &Fixed, 5.0, false);
        assert_eq!(texts(&lines), vec!["a", "b", "c"]);
        for l in &lines {
            assert!(Fixed.measure(&l.text) <= 5.0 + 10.0);
        }
    }

    #[test]
    fn test_clusters_keep_marks_and_joiners() {
        assert_eq!(clusters("e\u{301}x"), vec!["e\u{301}", "x"]);
        assert_eq!(clusters("👍🏽!"), vec!["👍🏽", "!"]);
        assert_eq!(clusters("👩\u{200D}💻a"), vec!["👩\u{200D}💻", "a"]);
        assert_eq!(clusters("1\u{FE0F}\u{20E3}"), vec!["1\u{FE0F}\u{20E3}"]);
        assert!(clusters("").is_empty());
    }

    #[test]
    fn test_max_text_width_caps() {
        // Portrait: 1242 − 40 − 80 − 20 = 1102, under the 90% cap
        assert_eq!(max_text_width(1242.0, 1660.0, 20.0, 40.0, 10.0), 1102.0);
        // Landscape caps at 70%
        assert!((max_text_width(1920.0, 1080.0, 0.0, 0.0, 0.0) - 1344.0).abs() < 0.01);
        // Floor
        assert_eq!(max_text_width(120.0, 120.0, 50.0, 0.0, 0.0), 100.0);
    }
}
