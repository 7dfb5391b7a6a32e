//! # Render Tests
//!
//! End-to-end checks of the compositor: resolution independence, layer
//! order, theme round-trips and a full social-post render.
//!
//! Text uses the built-in bitmap face so results do not depend on installed
//! fonts.

use passepartout::background::BackgroundSpec;
use passepartout::border::{BorderPattern, BorderSpec, LineStyle};
use passepartout::color::Rgb;
use passepartout::compositor::{HANDLE_OUTLINE, HANDLE_SIZE, TEXT_SAFE_MARGIN, render, render_preview};
use passepartout::geometry::{CanvasSpec, Handle, Point, Rect};
use passepartout::render::Surface;
use passepartout::preset::ThemePreset;
use passepartout::scene::{Content, ImagePlacement, Scene, SceneAssets, StickerPlacement};
use passepartout::text::highlight::{MIN_GAP_CHARS, find_matches};
use passepartout::text::wrap::wrap;
use passepartout::text::{FontId, HighlightColor, HighlightSpec, SizedFont, TextFrame, TextLayer, render_text};
use image::RgbaImage;
use pretty_assertions::assert_eq;

const RED: Rgb = Rgb::from_u32(0xFF0000);
const FRAME: Rgb = Rgb::from_u32(0x1E88E5);

fn canvas(w: u32, h: u32) -> CanvasSpec {
    CanvasSpec::new(w, h).unwrap()
}

/// 400×400 reference: 20px solid frame, red photo in the middle.
fn framed_scene() -> (Scene, SceneAssets) {
    let mut scene = Scene::new(canvas(400, 400)).unwrap();
    scene.background = BackgroundSpec::solid(Rgb::WHITE);
    scene.border = BorderSpec {
        width_px: 20,
        corner_radius_px: 0,
        color: FRAME,
        line_style: LineStyle::Solid,
        pattern: BorderPattern::None,
        ..BorderSpec::default()
    };
    scene.add(Content::Image(ImagePlacement::new("photo.png", Rect::new(100.0, 100.0, 200.0, 200.0))));
    let mut assets = SceneAssets::new();
    assets.insert("photo.png", RgbaImage::from_pixel(16, 16, RED.to_rgba()));
    (scene, assets)
}

/// Inclusive box `(x0, y0, x1, y1)` around every pixel where `a` and `b`
/// differ.
fn diff_box(a: &Surface, b: &Surface) -> Option<(u32, u32, u32, u32)> {
    let mut found: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in a.image().enumerate_pixels() {
        if *p != b.pixel(x, y) {
            found = Some(match found {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }
    found
}

fn assert_near(actual: f32, expected: f32, tolerance: f32, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{}: {} is not within {} of {}",
        what,
        actual,
        tolerance,
        expected
    );
}

#[test]
fn test_scale_invariance() {
    let (base, assets) = framed_scene();
    let mut scene = base.clone();
    let layer = TextLayer {
        font_id: FontId::Bitmap,
        size_pt: 24,
        margin_px: 20,
        ..TextLayer::new("Scale")
    };
    scene.set_text(layer.clone());
    let sticker = StickerPlacement {
        color: Rgb::from_u32(0x2E7D32),
        ..StickerPlacement::glyph("#", Point::new(60.0, 200.0), 40)
    };
    scene.add(Content::Sticker(sticker.clone()));

    // Text block at the reference size
    let safe = (20 + TEXT_SAFE_MARGIN) as f32;
    let reference_block = render_text(
        &layer,
        &TextFrame {
            canvas: canvas(400, 400),
            scale: 1.0,
            safe_margin: (safe, safe),
        },
    )
    .unwrap()
    .block;

    for k in [0.25f32, 0.5, 1.0, 2.0, 4.0] {
        let side = (400.0 * k) as u32;
        let c = canvas(side, side);
        let s = render(&scene, &assets, c).unwrap();
        let mid = side / 2;

        let band = (20.0 * k).round() as u32;
        assert_eq!(s.pixel(band - 1, mid), FRAME.to_rgba(), "k={} band", k);
        assert_eq!(s.pixel(band + 1, mid + 2), Rgb::WHITE.to_rgba(), "k={} inside", k);

        let photo = (100.0 * k).round() as u32;
        assert_eq!(s.pixel(photo + 1, mid), RED.to_rgba(), "k={} photo", k);
        assert_eq!(s.pixel(photo - 2, mid), Rgb::WHITE.to_rgba(), "k={} photo edge", k);
        let far = (300.0 * k).round() as u32;
        assert_eq!(s.pixel(far - 2, mid), RED.to_rgba(), "k={} photo right", k);
        assert_eq!(s.pixel(far + 1, mid), Rgb::WHITE.to_rgba(), "k={} photo right edge", k);

        // Text: the block scales with the canvas and holds all of the ink
        let block = render_text(
            &layer,
            &TextFrame {
                canvas: c,
                scale: k,
                safe_margin: (safe * k, safe * k),
            },
        )
        .unwrap()
        .block;
        assert_near(block.x, reference_block.x * k, 1.0, &format!("k={} text x", k));
        assert_near(block.y, reference_block.y * k, 1.0, &format!("k={} text y", k));
        assert_near(block.width, reference_block.width * k, 1.0, &format!("k={} text w", k));
        assert_near(block.height, reference_block.height * k, 1.0, &format!("k={} text h", k));

        let mut without_text = scene.clone();
        without_text.set_text(layer.with_content(""));
        let bare = render(&without_text, &assets, c).unwrap();
        let (x0, y0, x1, y1) = diff_box(&s, &bare).unwrap();
        assert!(x0 as f32 >= block.x - 1.0 && (x1 as f32) < block.right() + 1.0, "k={} text ink x", k);
        assert!(y0 as f32 >= block.y - 1.0 && (y1 as f32) < block.bottom() + 1.0, "k={} text ink y", k);

        // Sticker: ink stays in its scaled square
        let frame_only = render(&base, &assets, c).unwrap();
        let mut only_text = base.clone();
        only_text.set_text(layer.clone());
        let with_text = render(&only_text, &assets, c).unwrap();
        let (x0, y0, x1, y1) = diff_box(&s, &with_text).unwrap();
        let square = Rect::centered(Point::new(60.0 * k, 200.0 * k), 40.0 * k, 40.0 * k);
        // Antialiased glyph edges may bleed one more pixel
        assert!(x0 as f32 >= square.x - 2.0 && (x1 as f32) < square.right() + 2.0, "k={} sticker x", k);
        assert!(y0 as f32 >= square.y - 2.0 && (y1 as f32) < square.bottom() + 2.0, "k={} sticker y", k);
        assert!(diff_box(&with_text, &frame_only).is_some(), "k={} text drawn", k);
    }
}

#[test]
fn test_sticker_position_scales_per_axis() {
    let (mut scene, assets) = framed_scene();
    scene.add(Content::Sticker(StickerPlacement::glyph("#", Point::new(200.0, 60.0), 30)));
    let s = render(&scene, &assets, canvas(800, 400)).unwrap();
    // Center (400, 60), size 30 · 1.5 = 45
    let mut ink = Vec::new();
    for (x, y, p) in s.image().enumerate_pixels() {
        if *p == Rgb::BLACK.to_rgba() {
            ink.push((x, y));
        }
    }
    assert!(!ink.is_empty());
    for (x, y) in ink {
        assert!((370..430).contains(&x) && (30..90).contains(&y), "ink at {},{}", x, y);
    }
}

#[test]
fn test_preview_and_export_share_layer_order() {
    let (mut scene, assets) = framed_scene();
    scene.add(Content::Sticker(StickerPlacement::glyph("*", Point::new(110.0, 110.0), 40)));
    let c = canvas(400, 400);
    assert_eq!(
        render_preview(&scene, &assets, c).unwrap().image(),
        render(&scene, &assets, c).unwrap().image()
    );

    scene.selected = Some(0);
    let preview = render_preview(&scene, &assets, c).unwrap();
    let export = render(&scene, &assets, c).unwrap();
    let bbox = Rect::new(100.0, 100.0, 200.0, 200.0);
    let reach = HANDLE_SIZE / 2.0 + HANDLE_OUTLINE + 1.0;
    for (x, y, p) in preview.image().enumerate_pixels() {
        if *p != export.pixel(x, y) {
            let near_handle = Handle::ALL.iter().any(|h| {
                let c = h.position(&bbox);
                (x as f32 + 0.5 - c.x).abs() <= reach && (y as f32 + 0.5 - c.y).abs() <= reach
            });
            assert!(near_handle, "preview differs away from handles at {},{}", x, y);
        }
    }
}

#[test]
fn test_theme_round_trip_renders_identically() {
    let (mut scene, assets) = framed_scene();
    scene.border.corner_radius_px = 24;
    scene.border.pattern = BorderPattern::Heart;
    scene.border.pattern_color = Rgb::WHITE;
    scene.add(Content::Sticker(StickerPlacement::glyph("+", Point::new(320.0, 80.0), 36)));
    scene.set_text(TextLayer {
        font_id: FontId::Bitmap,
        size_pt: 24,
        ..TextLayer::new("round trip")
    });

    let json = ThemePreset::capture("t", &scene).to_json().unwrap();
    let mut copy = scene.clone();
    copy.border = BorderSpec::none();
    copy.background = BackgroundSpec::solid(RED);
    ThemePreset::from_json(&json).unwrap().apply(&mut copy);

    let c = canvas(300, 300);
    assert_eq!(
        render(&copy, &assets, c).unwrap().image(),
        render(&scene, &assets, c).unwrap().image()
    );
}

#[test]
fn test_social_post_end_to_end() {
    let c = canvas(1242, 1660);
    let mut scene = Scene::new(c).unwrap();
    scene.background = BackgroundSpec::solid(Rgb::WHITE);
    scene.border = BorderSpec::default();
    let layer = TextLayer {
        font_id: FontId::Bitmap,
        size_pt: 48,
        margin_px: 20,
        color: Rgb::BLACK,
        ..TextLayer::new("测试文字Test")
    };
    scene.set_text(layer.clone());

    let s = render(&scene, &SceneAssets::new(), c).unwrap();
    let blank = render(&scene.with_text_content(""), &SceneAssets::new(), c).unwrap();

    // Band: frame color with white grid lines only
    let frame = Rgb::from_u32(0xBBDEFB).to_rgba();
    let mut saw_grid = false;
    for y in (2..28).chain(1632..1658) {
        for x in 40..1200 {
            let p = s.pixel(x, y);
            assert!(p == frame || p == Rgb::WHITE.to_rgba(), "band pixel {:?} at {},{}", p, x, y);
            saw_grid |= p == Rgb::WHITE.to_rgba();
        }
    }
    assert!(saw_grid);

    // Text block bottom sits at 1660 − 2·margin − (frame + fixed margin)
    let safe = (30 + TEXT_SAFE_MARGIN) as f32;
    let text = render_text(
        &layer,
        &TextFrame {
            canvas: c,
            scale: 1.0,
            safe_margin: (safe, safe),
        },
    )
    .unwrap();
    assert_eq!(text.block.bottom(), 1660.0 - 40.0 - safe);

    // The text changes pixels only inside its own box
    let bounds = text.bounds();
    let mut changed = 0;
    for (x, y, p) in s.image().enumerate_pixels() {
        if *p != blank.pixel(x, y) {
            changed += 1;
            let at = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            assert!(bounds.contains(at), "text ink outside its box at {},{}", x, y);
        }
    }
    assert!(changed > 0);
    assert_eq!(text.lines, 1);
}

#[test]
fn test_far_highlights_are_separate() {
    let c = canvas(600, 200);
    let mut scene = Scene::new(c).unwrap();
    scene.background = BackgroundSpec::solid(Rgb::WHITE);
    scene.border = BorderSpec::none();
    let content = format!("sun{}sun", ".".repeat(MIN_GAP_CHARS));
    scene.set_text(TextLayer {
        font_id: FontId::Bitmap,
        size_pt: 24,
        highlight: HighlightSpec {
            enabled: true,
            keywords: vec!["sun".to_string()],
            color: HighlightColor::Fixed(RED),
        },
        ..TextLayer::new(content.as_str())
    });
    let plain = {
        let mut s = scene.clone();
        s.set_text(TextLayer {
            highlight: HighlightSpec::default(),
            ..scene.text().unwrap().clone()
        });
        s
    };

    let lit = render(&scene, &SceneAssets::new(), c).unwrap();
    let bare = render(&plain, &SceneAssets::new(), c).unwrap();
    let mut columns: Vec<u32> = lit
        .image()
        .enumerate_pixels()
        .filter(|(x, y, p)| **p != bare.pixel(*x, *y))
        .map(|(x, _, _)| x)
        .collect();
    columns.sort_unstable();
    columns.dedup();

    // Group columns closer than one 12px cell into one decoration
    let mut runs: Vec<(u32, u32)> = Vec::new();
    for x in columns {
        match runs.last_mut() {
            Some(run) if x <= run.1 + 12 => run.1 = x,
            _ => runs.push((x, x)),
        }
    }
    assert_eq!(runs.len(), 2, "decorations: {:?}", runs);
    let (first, second) = (runs[0], runs[1]);
    assert!(first.1 < second.0);
    // Each decoration spans about one keyword, three 12px cells
    for run in [first, second] {
        assert!(run.1 - run.0 <= 3 * 12 + 8, "decoration {:?} too wide", run);
    }
    assert!(second.0 - first.1 >= (MIN_GAP_CHARS as u32 - 1) * 12);
}

#[test]
fn test_wrap_boundary() {
    // Bitmap face at 24px: 12px per character
    let font = SizedFont::bitmap(24.0);
    assert_eq!(wrap("abcdefghij", &font, 120.0, false).len(), 1);
    let lines = wrap("abcdefghijk", &font, 120.0, false);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].text, "k");
}

#[test]
fn test_highlight_gap() {
    let kws = vec!["sun".to_string()];
    let close = find_matches("sun and sun", &kws, HighlightColor::Random);
    assert_eq!(close.len(), 1);

    let far = format!("sun{}sun", " ".repeat(MIN_GAP_CHARS));
    assert_eq!(find_matches(&far, &kws, HighlightColor::Random).len(), 2);
    let near = format!("sun{}sun", " ".repeat(MIN_GAP_CHARS - 1));
    assert_eq!(find_matches(&near, &kws, HighlightColor::Random).len(), 1);
}

#[test]
fn test_corner_radius_clamped() {
    let c = canvas(200, 120);
    let spec = BorderSpec {
        width_px: 0,
        corner_radius_px: 10_000,
        pattern: BorderPattern::None,
        ..BorderSpec::default()
    };
    assert!(spec.effective_radius(c) <= c.min_side() / 2);

    let mut scene = Scene::new(c).unwrap();
    scene.background = BackgroundSpec::solid(Rgb::WHITE);
    scene.border = spec;
    scene.add(Content::Image(ImagePlacement::new("photo.png", Rect::new(0.0, 0.0, 200.0, 120.0))));
    let mut assets = SceneAssets::new();
    assets.insert("photo.png", RgbaImage::from_pixel(4, 4, RED.to_rgba()));
    let s = render(&scene, &assets, c).unwrap();
    assert_eq!(s.pixel(0, 0), Rgb::WHITE.to_rgba());
    assert_eq!(s.pixel(199, 119), Rgb::WHITE.to_rgba());
    assert_eq!(s.pixel(100, 60), RED.to_rgba());
    assert_eq!(s.pixel(100, 0), RED.to_rgba());
}
