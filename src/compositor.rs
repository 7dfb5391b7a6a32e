//! # Compositor
//!
//! Renders a [`Scene`] onto a fresh surface at any canvas size.
//!
//! ```text
//!   Scene (reference canvas)          canvas (preview or export)
//!   ┌───────────────┐                 ┌─────────────────────────┐
//!   │ background    │── fill ────────▶│ color / stretched photo │
//!   │ pattern       │── full canvas ─▶│ stripes, dots, ...      │
//!   │ contents[..]  │── per axis ────▶│ photos, stickers, text  │
//!   │ border        │── uniform ─────▶│ corner mask + frame     │
//!   │ selection     │── preview ─────▶│ handles                 │
//!   └───────────────┘                 └─────────────────────────┘
//! ```
//!
//! Positions scale per axis. Border widths and pattern pitches scale by the
//! larger axis factor, sticker sizes by the mean of both, and the text layer
//! by `canvas.width / reference.width`. [`render`] and [`render_preview`]
//! differ only in whether the overlay layer is included.

use crate::background::{fill_background, render_pattern};
use crate::border::render_border;
use crate::color::Rgb;
use crate::error::FrameError;
use crate::geometry::{CanvasSpec, Handle, Point, Rect, Scale, scale_point, scale_uniform};
use crate::render::Surface;
use crate::scene::{Content, ImagePlacement, Layer, RenderMode, Scene, SceneAssets, StickerPlacement, StickerSource};
use crate::text::font::Measure;
use crate::text::{FontId, SizedFont, TextFrame, render_text};
use chrono::{DateTime, Local, TimeZone};
use image::imageops::{self, FilterType};
use std::path::{Path, PathBuf};

/// Fixed gap between the frame and the text block, in reference pixels.
pub const TEXT_SAFE_MARGIN: u32 = 10;

/// Side of a selection handle square, in canvas pixels.
pub const HANDLE_SIZE: f32 = 10.0;
pub const HANDLE_FILL: Rgb = Rgb::from_u32(0x3B82F6);
pub const HANDLE_OUTLINE: f32 = 2.0;

/// Prefix of exported file names.
pub const EXPORT_PREFIX: &str = "tupian";

/// Per-render state shared by the layer walk.
struct Frame<'a> {
    scene: &'a Scene,
    assets: &'a SceneAssets,
    canvas: CanvasSpec,
    scale: Scale,
    /// Where the text block landed, for the overlay.
    text_block: Option<Rect>,
}

/// Render `scene` for export.
pub fn render(scene: &Scene, assets: &SceneAssets, canvas: CanvasSpec) -> Result<Surface, FrameError> {
    render_mode(scene, assets, canvas, RenderMode::Export)
}

/// Render `scene` for on-screen preview, with handles around the selection.
pub fn render_preview(scene: &Scene, assets: &SceneAssets, canvas: CanvasSpec) -> Result<Surface, FrameError> {
    render_mode(scene, assets, canvas, RenderMode::Preview)
}

/// Walk [`Scene::layers`] for `mode` onto a transparent surface.
pub fn render_mode(
    scene: &Scene,
    assets: &SceneAssets,
    canvas: CanvasSpec,
    mode: RenderMode,
) -> Result<Surface, FrameError> {
    let scale = Scale::between(scene.reference, canvas)?;
    let mut surface = Surface::transparent(canvas)?;
    let mut frame = Frame {
        scene,
        assets,
        canvas,
        scale,
        text_block: None,
    };

    for layer in scene.layers(mode) {
        frame.draw(&mut surface, layer)?;
    }
    log::debug!(
        "rendered {:?} {}x{} ({} content item(s), scale {:.3}x{:.3})",
        mode,
        canvas.width,
        canvas.height,
        scene.contents.len(),
        scale.x,
        scale.y
    );
    Ok(surface)
}

impl Frame<'_> {
    fn draw(&mut self, surface: &mut Surface, layer: Layer) -> Result<(), FrameError> {
        let scene = self.scene;
        let uniform = self.scale.uniform();
        match layer {
            Layer::Background => {
                let photo = scene.background.image.as_deref().and_then(|p| self.assets.get(p));
                fill_background(surface, &scene.background, self.canvas, photo)?;
            }
            Layer::BackgroundPattern => {
                render_pattern(surface, &scene.background.scaled(uniform), self.canvas)?;
            }
            Layer::Content(i) => match scene.contents.get(i) {
                Some(Content::Image(img)) => self.draw_image(surface, img),
                Some(Content::Sticker(s)) => self.draw_sticker(surface, s),
                Some(Content::Text(t)) => {
                    let text_frame = self.text_frame();
                    if let Some(rendered) = render_text(t, &text_frame) {
                        surface.composite(&rendered.image, rendered.x, rendered.y);
                        self.text_block = Some(rendered.block);
                    }
                }
                None => {}
            },
            Layer::Border => {
                let border = scene.border.scaled(uniform);
                render_border(surface, &border, self.canvas, scene.background.color)?;
            }
            Layer::UiOverlay => self.draw_handles(surface),
        }
        Ok(())
    }

    /// Text scales with the width; it keeps clear of the frame plus a fixed
    /// margin.
    fn text_frame(&self) -> TextFrame {
        let uniform = self.scale.uniform();
        let border = self.scene.border.scaled(uniform).effective_width(self.canvas);
        let safe = (border + scale_uniform(TEXT_SAFE_MARGIN, uniform)) as f32;
        TextFrame {
            canvas: self.canvas,
            scale: self.scale.x,
            safe_margin: (safe, safe),
        }
    }

    fn draw_image(&self, surface: &mut Surface, img: &ImagePlacement) {
        let Some(src) = self.assets.get(&img.source) else {
            log::debug!("no pixels for {}, skipping", img.source.display());
            return;
        };
        let rect = img.rect.scaled(self.scale);
        let (w, h) = (rect.width.round(), rect.height.round());
        if w < 1.0 || h < 1.0 {
            return;
        }
        let adjusted = img.adjust.render(src, (w as u32, h as u32), self.scale.uniform());
        surface.composite(&adjusted, rect.x.round() as i64, rect.y.round() as i64);
    }

    fn sticker_box(&self, s: &StickerPlacement) -> Rect {
        let center = scale_point(s.center, self.scale.x, self.scale.y);
        let size = (s.size_px as f32 * self.scale.average()).round().max(1.0);
        Rect::centered(center, size, size)
    }

    fn draw_sticker(&self, surface: &mut Surface, s: &StickerPlacement) {
        let bbox = self.sticker_box(s);
        match &s.source {
            StickerSource::Glyph(glyph) => {
                let font = SizedFont::resolve(FontId::Sans, bbox.height);
                let width = font.measure(glyph);
                let x = bbox.center().x - width / 2.0;
                let baseline = bbox.center().y - font.line_height() / 2.0 + font.ascent();
                let color = s.color.to_rgba();
                font.draw(glyph, x, baseline, |px, py, c| surface.blend(px, py, color, c));
            }
            StickerSource::Image(path) => {
                let Some(src) = self.assets.get(path) else {
                    log::debug!("no pixels for sticker {}, skipping", path.display());
                    return;
                };
                let side = bbox.width as u32;
                let fitted = imageops::resize(src, side, side, FilterType::Lanczos3);
                let x = bbox.center().x - fitted.width() as f32 / 2.0;
                let y = bbox.center().y - fitted.height() as f32 / 2.0;
                surface.composite(&fitted, x.round() as i64, y.round() as i64);
            }
        }
    }

    /// The selection's box on this canvas.
    fn selection_box(&self) -> Option<Rect> {
        match self.scene.contents.get(self.scene.selected?)? {
            Content::Image(img) => Some(img.rect.scaled(self.scale)),
            Content::Sticker(s) => Some(self.sticker_box(s)),
            Content::Text(_) => self.text_block,
        }
    }

    fn draw_handles(&self, surface: &mut Surface) {
        let Some(bbox) = self.selection_box() else {
            return;
        };
        let half = HANDLE_SIZE / 2.0;
        for handle in Handle::ALL {
            let Point { x, y } = handle.position(&bbox);
            let outer = half + HANDLE_OUTLINE;
            surface.fill_rect_f(x - outer, y - outer, x + outer, y + outer, Rgb::WHITE.to_rgba());
            surface.fill_rect_f(x - half, y - half, x + half, y + half, HANDLE_FILL.to_rgba());
        }
    }
}

/// `tupian_YYYYmmdd_HHMMSS.png` for the given moment.
pub fn default_filename<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.png", EXPORT_PREFIX, at.format("%Y%m%d_%H%M%S"))
}

/// [`default_filename`] for now, local time.
pub fn default_filename_now() -> String {
    default_filename(&Local::now())
}

/// Render `scene` at `canvas` and save it to `path` (PNG or JPEG by
/// extension). A directory gets a timestamped file name.
pub fn export(scene: &Scene, assets: &SceneAssets, canvas: CanvasSpec, path: &Path) -> Result<PathBuf, FrameError> {
    let target = if path.is_dir() {
        path.join(default_filename_now())
    } else {
        path.to_path_buf()
    };
    let surface = render(scene, assets, canvas)?;
    surface.save(&target)?;
    log::info!("exported {}x{} to {}", canvas.width, canvas.height, target.display());
    Ok(target)
}
