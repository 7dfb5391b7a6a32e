//! # Scene Snapshot
//!
//! A [`Scene`] is the declarative description the compositor renders: the
//! reference canvas everything was arranged on, the background, the border
//! and an ordered list of [`Content`] items (photos, stickers and at most one
//! text layer).
//!
//! ## Layer order
//!
//! ```text
//!   top     UiOverlay          selection handles, preview only
//!           Border             corner mask, then the frame
//!           Content(n-1)
//!           ...                user order, reorderable
//!           Content(0)
//!           BackgroundPattern
//!   bottom  Background         color or stretched photo
//! ```
//!
//! Both preview and export walk [`Scene::layers`], so the stacking cannot
//! drift between them. Background and border are pinned; only content moves.
//!
//! Hidden items keep their slot in the list and are left out of the draw
//! list. Background and border can be hidden too.
//!
//! Scenes are plain values. Rendering borrows them read-only; editing
//! operations take `&mut self` and never touch pixels.

use crate::adjust::ImageAdjustments;
use crate::background::{BackgroundMode, BackgroundSpec};
use crate::border::BorderSpec;
use crate::color::Rgb;
use crate::error::FrameError;
use crate::geometry::{
    CanvasSpec, Handle, Point, Rect, Scale, contain, deserialize_clamped_u32, image_size_after_drag,
    rescale_placement, sticker_size_after_drag,
};
use crate::loader::load_image;
use crate::text::TextLayer;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Margin kept around a newly placed photo on the reference canvas.
pub const IMAGE_MARGIN: u32 = 80;

/// Reference canvas of a scene built without one.
pub const DEFAULT_REFERENCE: CanvasSpec = CanvasSpec {
    width: 600,
    height: 800,
};

fn visible_by_default() -> bool {
    true
}

/// What a sticker shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickerSource {
    /// An emoji or other text glyph
    Glyph(String),
    /// An image file, drawn into the sticker's square
    Image(PathBuf),
}

/// A square sticker centered on a point of the reference canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerPlacement {
    pub source: StickerSource,
    pub center: Point,
    #[serde(deserialize_with = "deserialize_clamped_u32")]
    pub size_px: u32,
    /// Glyph color. Image stickers ignore it.
    #[serde(default)]
    pub color: Rgb,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

impl StickerPlacement {
    pub fn glyph(glyph: impl Into<String>, center: Point, size_px: u32) -> Self {
        Self {
            source: StickerSource::Glyph(glyph.into()),
            center,
            size_px,
            color: Rgb::BLACK,
            visible: true,
        }
    }

    pub fn bbox(&self) -> Rect {
        let s = self.size_px as f32;
        Rect::centered(self.center, s, s)
    }

    /// The same sticker on a resized canvas: center per axis, size by the
    /// averaged scale.
    pub fn rescaled(&self, from: CanvasSpec, to: CanvasSpec) -> Result<Self, FrameError> {
        let (center, size_px) = rescale_placement(self.center, self.size_px, from, to)?;
        Ok(Self {
            center,
            size_px,
            ..self.clone()
        })
    }

    pub fn moved(&self, dx: f32, dy: f32) -> Self {
        Self {
            center: Point::new(self.center.x + dx, self.center.y + dy),
            ..self.clone()
        }
    }

    /// Resize by dragging `handle`; the center stays put.
    pub fn resized(&self, handle: Handle, dx: i32, dy: i32) -> Self {
        Self {
            size_px: sticker_size_after_drag(self.size_px, handle, dx, dy),
            ..self.clone()
        }
    }
}

/// A photo occupying a rectangle of the reference canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    pub source: PathBuf,
    pub rect: Rect,
    /// Rotation, mirrors, filters and tone, applied while drawing
    #[serde(default, skip_serializing_if = "ImageAdjustments::is_identity")]
    pub adjust: ImageAdjustments,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

impl ImagePlacement {
    /// An unadjusted, visible photo filling `rect`.
    pub fn new(source: impl Into<PathBuf>, rect: Rect) -> Self {
        Self {
            source: source.into(),
            rect,
            adjust: ImageAdjustments::default(),
            visible: true,
        }
    }

    /// Fit an image of `dims` inside `reference` with [`IMAGE_MARGIN`] on
    /// every side, centered.
    pub fn contained(source: impl Into<PathBuf>, dims: (u32, u32), reference: CanvasSpec) -> Self {
        Self::new(source, contain(dims, reference, IMAGE_MARGIN))
    }

    pub fn rescaled(&self, from: CanvasSpec, to: CanvasSpec) -> Result<Self, FrameError> {
        let scale = Scale::between(from, to)?;
        Ok(Self {
            rect: self.rect.scaled(scale),
            ..self.clone()
        })
    }

    pub fn moved(&self, dx: f32, dy: f32) -> Self {
        Self {
            rect: Rect::new(self.rect.x + dx, self.rect.y + dy, self.rect.width, self.rect.height),
            ..self.clone()
        }
    }

    /// Resize by dragging `handle` around the current center.
    pub fn resized(&self, handle: Handle, dx: i32, dy: i32) -> Self {
        let size = (self.rect.width.round() as u32, self.rect.height.round() as u32);
        let (w, h) = image_size_after_drag(size, handle, dx, dy);
        Self {
            rect: Rect::centered(self.rect.center(), w as f32, h as f32),
            ..self.clone()
        }
    }
}

/// One reorderable item of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Content {
    Image(ImagePlacement),
    Sticker(StickerPlacement),
    Text(TextLayer),
}

impl Content {
    /// Bounding box on the reference canvas. Text has none until it is laid
    /// out against a concrete canvas.
    pub fn bbox(&self) -> Option<Rect> {
        match self {
            Content::Image(img) => Some(img.rect),
            Content::Sticker(s) => Some(s.bbox()),
            Content::Text(_) => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            Content::Image(img) => img.visible,
            Content::Sticker(s) => s.visible,
            Content::Text(t) => t.visible,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        match self {
            Content::Image(img) => img.visible = visible,
            Content::Sticker(s) => s.visible = visible,
            Content::Text(t) => t.visible = visible,
        }
    }

    fn rescaled(&self, from: CanvasSpec, to: CanvasSpec) -> Result<Self, FrameError> {
        Ok(match self {
            Content::Image(img) => Content::Image(img.rescaled(from, to)?),
            Content::Sticker(s) => Content::Sticker(s.rescaled(from, to)?),
            Content::Text(t) => Content::Text(t.clone()),
        })
    }
}

/// One entry of the draw list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Background,
    BackgroundPattern,
    /// Index into [`Scene::contents`]
    Content(usize),
    Border,
    UiOverlay,
}

/// Whether a render is for on-screen preview or for a saved file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    Preview,
    #[default]
    Export,
}

/// The complete, declarative description of one collage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Canvas every pixel value in the scene is relative to.
    pub reference: CanvasSpec,
    pub background: BackgroundSpec,
    pub border: BorderSpec,
    /// Bottom to top.
    pub contents: Vec<Content>,
    /// False draws no color, photo or pattern; the canvas stays transparent
    pub show_background: bool,
    pub show_border: bool,
    /// Content index whose handles the preview draws.
    #[serde(skip)]
    pub selected: Option<usize>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            reference: DEFAULT_REFERENCE,
            background: BackgroundSpec::default(),
            border: BorderSpec::default(),
            contents: Vec::new(),
            show_background: true,
            show_border: true,
            selected: None,
        }
    }
}

impl Scene {
    pub fn new(reference: CanvasSpec) -> Result<Self, FrameError> {
        reference.validate()?;
        Ok(Self {
            reference,
            ..Self::default()
        })
    }

    /// Parse a saved scene. Text layers after the first are dropped.
    pub fn from_json(json: &str) -> Result<Self, FrameError> {
        let mut scene: Scene = serde_json::from_str(json)?;
        scene.reference.validate()?;

        let mut seen_text = false;
        scene.contents.retain(|c| {
            if !matches!(c, Content::Text(_)) {
                return true;
            }
            if seen_text {
                log::warn!("dropping extra text layer, a scene holds only one");
                return false;
            }
            seen_text = true;
            true
        });
        Ok(scene)
    }

    pub fn to_json(&self) -> Result<String, FrameError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, FrameError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), FrameError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Draw list for `mode`. Hidden layers are left out. The overlay only
    /// exists in preview with a valid selection.
    pub fn layers(&self, mode: RenderMode) -> Vec<Layer> {
        let mut layers = Vec::with_capacity(self.contents.len() + 4);
        if self.show_background {
            layers.extend([Layer::Background, Layer::BackgroundPattern]);
        }
        layers.extend(
            self.contents
                .iter()
                .enumerate()
                .filter(|(_, c)| c.is_visible())
                .map(|(i, _)| Layer::Content(i)),
        );
        if self.show_border {
            layers.push(Layer::Border);
        }
        if mode == RenderMode::Preview && self.selected.is_some_and(|i| i < self.contents.len()) {
            layers.push(Layer::UiOverlay);
        }
        layers
    }

    /// Show or hide one layer. The overlay cannot be hidden and background
    /// and pattern go together. False when there is nothing to toggle.
    pub fn set_visible(&mut self, layer: Layer, visible: bool) -> bool {
        match layer {
            Layer::Background | Layer::BackgroundPattern => self.show_background = visible,
            Layer::Border => self.show_border = visible,
            Layer::Content(i) => match self.contents.get_mut(i) {
                Some(c) => c.set_visible(visible),
                None => return false,
            },
            Layer::UiOverlay => return false,
        }
        true
    }

    /// Append `content` on top. A second text layer replaces the first in
    /// its slot. Returns the index it landed at.
    pub fn add(&mut self, content: Content) -> usize {
        if let Content::Text(layer) = content {
            return self.set_text(layer);
        }
        self.contents.push(content);
        self.contents.len() - 1
    }

    pub fn text(&self) -> Option<&TextLayer> {
        self.contents.iter().find_map(|c| match c {
            Content::Text(t) => Some(t),
            _ => None,
        })
    }

    fn text_index(&self) -> Option<usize> {
        self.contents.iter().position(|c| matches!(c, Content::Text(_)))
    }

    /// Install `layer` as the scene's only text layer, keeping the z slot
    /// of any previous one.
    pub fn set_text(&mut self, layer: TextLayer) -> usize {
        match self.text_index() {
            Some(i) => {
                self.contents[i] = Content::Text(layer);
                i
            }
            None => {
                self.contents.push(Content::Text(layer));
                self.contents.len() - 1
            }
        }
    }

    /// A copy whose text layer shows `content` with unchanged styling.
    pub fn with_text_content(&self, content: &str) -> Scene {
        let mut scene = self.clone();
        let layer = match self.text() {
            Some(t) => t.with_content(content),
            None => TextLayer::new(content),
        };
        scene.set_text(layer);
        scene
    }

    /// The bottom-most photo, the one batch export swaps out.
    pub fn main_image(&self) -> Option<&ImagePlacement> {
        self.contents.iter().find_map(|c| match c {
            Content::Image(img) => Some(img),
            _ => None,
        })
    }

    /// Edit the main photo's adjustments. When a quarter turn swaps its
    /// axes, the rect turns with it around its center. False without a
    /// photo.
    pub fn edit_main_image(&mut self, edit: impl FnOnce(&mut ImageAdjustments)) -> bool {
        let Some(img) = self.contents.iter_mut().find_map(|c| match c {
            Content::Image(img) => Some(img),
            _ => None,
        }) else {
            return false;
        };
        let swapped = img.adjust.rotation.swaps_axes();
        edit(&mut img.adjust);
        if img.adjust.rotation.swaps_axes() != swapped {
            img.rect = Rect::centered(img.rect.center(), img.rect.height, img.rect.width);
        }
        true
    }

    /// Replace the main photo (or insert one at the bottom), fitted to the
    /// reference canvas. A replaced photo hands its adjustments and
    /// visibility to the new one.
    pub fn set_main_image(&mut self, source: impl Into<PathBuf>, dims: (u32, u32)) {
        let mut placement = ImagePlacement::contained(source, dims, self.reference);
        match self.contents.iter().position(|c| matches!(c, Content::Image(_))) {
            Some(i) => {
                if let Content::Image(old) = &self.contents[i] {
                    placement.rect = contain(old.adjust.oriented_dims(dims), self.reference, IMAGE_MARGIN);
                    placement.adjust = old.adjust.clone();
                    placement.visible = old.visible;
                }
                self.contents[i] = Content::Image(placement);
            }
            None => {
                self.contents.insert(0, Content::Image(placement));
                self.selected = self.selected.map(|s| s + 1);
            }
        }
    }

    pub fn stickers(&self) -> impl Iterator<Item = &StickerPlacement> {
        self.contents.iter().filter_map(|c| match c {
            Content::Sticker(s) => Some(s),
            _ => None,
        })
    }

    /// Move the item at `index` to `target`, keeping the selection on the
    /// same item. False when either index is out of range.
    fn relocate(&mut self, index: usize, target: usize) -> bool {
        let n = self.contents.len();
        if index >= n || target >= n {
            return false;
        }
        let item = self.contents.remove(index);
        self.contents.insert(target, item);
        self.selected = self.selected.map(|s| {
            if s == index {
                target
            } else if index < s && s <= target {
                s - 1
            } else if target <= s && s < index {
                s + 1
            } else {
                s
            }
        });
        true
    }

    pub fn bring_to_front(&mut self, index: usize) -> bool {
        let top = self.contents.len().saturating_sub(1);
        self.relocate(index, top)
    }

    pub fn send_to_back(&mut self, index: usize) -> bool {
        self.relocate(index, 0)
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        self.relocate(index, index + 1)
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        index > 0 && self.relocate(index, index - 1)
    }

    pub fn remove(&mut self, index: usize) -> Option<Content> {
        if index >= self.contents.len() {
            return None;
        }
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        Some(self.contents.remove(index))
    }

    /// Re-home the scene on a new reference canvas. Photos and stickers
    /// follow per axis; stickers size by the averaged scale.
    pub fn resize_reference(&mut self, to: CanvasSpec) -> Result<(), FrameError> {
        let from = self.reference;
        Scale::between(from, to)?;
        self.contents = self
            .contents
            .iter()
            .map(|c| c.rescaled(from, to))
            .collect::<Result<_, _>>()?;
        self.reference = to;
        Ok(())
    }

    /// Every image file the scene refers to.
    pub fn image_paths(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = Vec::new();
        if let (BackgroundMode::Image, Some(p)) = (self.background.mode, &self.background.image) {
            paths.push(p);
        }
        for c in &self.contents {
            match c {
                Content::Image(img) => paths.push(&img.source),
                Content::Sticker(StickerPlacement {
                    source: StickerSource::Image(p),
                    ..
                }) => paths.push(p),
                _ => {}
            }
        }
        paths
    }
}

/// Decoded images a scene refers to, keyed by path.
///
/// Decoding happens once, up front; rendering only looks images up. An
/// image that is missing here is skipped at render time. Images are shared,
/// so cloning a set of assets for another render is cheap.
#[derive(Debug, Clone, Default)]
pub struct SceneAssets {
    images: HashMap<PathBuf, Arc<RgbaImage>>,
}

impl SceneAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, image: RgbaImage) {
        self.images.insert(path.into(), Arc::new(image));
    }

    pub fn get(&self, path: &Path) -> Option<&RgbaImage> {
        self.images.get(path).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Decode every image of `scene`. Unreadable files are logged and left
    /// out.
    pub fn load(scene: &Scene) -> Self {
        let mut assets = Self::new();
        for path in scene.image_paths() {
            if assets.images.contains_key(path) {
                continue;
            }
            match load_image(path) {
                Ok(img) => assets.insert(path, img),
                Err(e) => log::warn!("skipping image: {}", e),
            }
        }
        assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sticker(g: &str) -> Content {
        Content::Sticker(StickerPlacement::glyph(g, Point::new(10.0, 10.0), 40))
    }

    fn glyphs(scene: &Scene) -> Vec<String> {
        scene
            .contents
            .iter()
            .map(|c| match c {
                Content::Sticker(StickerPlacement {
                    source: StickerSource::Glyph(g),
                    ..
                }) => g.clone(),
                Content::Text(_) => "text".into(),
                Content::Image(_) => "image".into(),
                Content::Sticker(_) => "sticker".into(),
            })
            .collect()
    }

    fn abc() -> Scene {
        let mut scene = Scene::default();
        for g in ["a", "b", "c"] {
            scene.add(sticker(g));
        }
        scene
    }

    #[test]
    fn test_layers_are_pinned_around_content() {
        let mut scene = abc();
        assert_eq!(
            scene.layers(RenderMode::Export),
            vec![
                Layer::Background,
                Layer::BackgroundPattern,
                Layer::Content(0),
                Layer::Content(1),
                Layer::Content(2),
                Layer::Border
            ]
        );
        scene.selected = Some(1);
        assert_eq!(scene.layers(RenderMode::Preview).last(), Some(&Layer::UiOverlay));
        assert!(!scene.layers(RenderMode::Export).contains(&Layer::UiOverlay));
        scene.selected = Some(7);
        assert!(!scene.layers(RenderMode::Preview).contains(&Layer::UiOverlay));
    }

    #[test]
    fn test_reorder_operations() {
        let mut scene = abc();
        assert!(scene.bring_to_front(0));
        assert_eq!(glyphs(&scene), vec!["b", "c", "a"]);
        assert!(scene.send_to_back(2));
        assert_eq!(glyphs(&scene), vec!["a", "b", "c"]);
        assert!(scene.move_up(0));
        assert_eq!(glyphs(&scene), vec!["b", "a", "c"]);
        assert!(scene.move_down(1));
        assert_eq!(glyphs(&scene), vec!["a", "b", "c"]);
        assert!(!scene.move_down(0));
        assert!(!scene.move_up(2));
        assert!(!scene.bring_to_front(5));
    }

    #[test]
    fn test_selection_follows_item() {
        let mut scene = abc();
        scene.selected = Some(0);
        scene.bring_to_front(0);
        assert_eq!(scene.selected, Some(2));
        scene.selected = Some(1);
        scene.send_to_back(2);
        assert_eq!(scene.selected, Some(2));
        scene.remove(2);
        assert_eq!(scene.selected, None);
    }

    #[test]
    fn test_single_text_layer() {
        let mut scene = abc();
        scene.add(Content::Text(TextLayer::new("first")));
        scene.send_to_back(3);
        let i = scene.add(Content::Text(TextLayer::new("second")));
        assert_eq!(i, 0);
        assert_eq!(scene.contents.len(), 4);
        assert_eq!(scene.text().map(|t| t.content.as_str()), Some("second"));
    }

    #[test]
    fn test_with_text_content_keeps_style() {
        let mut scene = Scene::default();
        scene.set_text(TextLayer {
            bold: true,
            ..TextLayer::new("template")
        });
        let other = scene.with_text_content("per image");
        let t = other.text().unwrap();
        assert_eq!(t.content, "per image");
        assert!(t.bold);
        assert_eq!(scene.text().unwrap().content, "template");
    }

    #[test]
    fn test_main_image_contained_with_margin() {
        let mut scene = Scene::new(CanvasSpec::new(600, 800).unwrap()).unwrap();
        scene.add(sticker("a"));
        scene.set_main_image("photo.jpg", (1000, 500));
        let img = scene.main_image().unwrap();
        assert_eq!(img.rect, Rect::new(80.0, 290.0, 440.0, 220.0));
        assert!(matches!(scene.contents[0], Content::Image(_)));
        scene.set_main_image("other.jpg", (100, 100));
        assert_eq!(scene.contents.len(), 2);
    }

    #[test]
    fn test_replaced_main_image_keeps_adjustments() {
        let mut scene = Scene::new(CanvasSpec::new(600, 800).unwrap()).unwrap();
        scene.set_main_image("a.jpg", (1000, 500));
        scene.edit_main_image(|a| a.rotate(true));
        scene.set_main_image("b.jpg", (1000, 500));
        let img = scene.main_image().unwrap();
        assert_eq!(img.source, PathBuf::from("b.jpg"));
        assert_eq!(img.adjust.rotation, crate::adjust::Rotation::Cw90);
        // Fitted as the upright 500x1000 it will be drawn as
        assert!(img.rect.height > img.rect.width);
    }

    #[test]
    fn test_resize_reference_rescales_stickers() {
        let mut scene = Scene::new(CanvasSpec::new(600, 800).unwrap()).unwrap();
        scene.add(Content::Sticker(StickerPlacement::glyph("🌸", Point::new(300.0, 400.0), 40)));
        scene.resize_reference(CanvasSpec::new(1200, 1200).unwrap()).unwrap();
        let s = scene.stickers().next().unwrap();
        assert_eq!(s.center, Point::new(600.0, 600.0));
        // Averaged scale (2 + 1.5) / 2
        assert_eq!(s.size_px, 70);
        assert_eq!(scene.reference, CanvasSpec::new(1200, 1200).unwrap());
    }

    #[test]
    fn test_drag_edits() {
        let s = StickerPlacement::glyph("x", Point::new(50.0, 50.0), 40);
        assert_eq!(s.resized(Handle::Se, 30, 0).size_px, 50);
        assert_eq!(s.moved(5.0, -5.0).center, Point::new(55.0, 45.0));
        let img = ImagePlacement::new("p.png", Rect::new(0.0, 0.0, 200.0, 100.0));
        let bigger = img.resized(Handle::Se, 100, 0);
        assert_eq!(bigger.rect.center(), img.rect.center());
        assert_eq!((bigger.rect.width, bigger.rect.height), (300.0, 150.0));
    }

    #[test]
    fn test_scene_json_round_trip() {
        let mut scene = abc();
        scene.set_main_image("photo.jpg", (400, 300));
        scene.set_text(TextLayer::new("hello"));
        let json = scene.to_json().unwrap();
        assert_eq!(Scene::from_json(&json).unwrap(), scene);
    }

    #[test]
    fn test_hidden_layers_are_not_drawn() {
        let mut scene = abc();
        assert!(scene.set_visible(Layer::Content(1), false));
        assert!(scene.set_visible(Layer::BackgroundPattern, false));
        assert!(!scene.set_visible(Layer::Content(9), false));
        assert!(!scene.set_visible(Layer::UiOverlay, false));
        assert_eq!(
            scene.layers(RenderMode::Export),
            vec![Layer::Content(0), Layer::Content(2), Layer::Border]
        );
        scene.set_visible(Layer::Border, false);
        scene.set_visible(Layer::Background, true);
        assert_eq!(
            scene.layers(RenderMode::Export),
            vec![
                Layer::Background,
                Layer::BackgroundPattern,
                Layer::Content(0),
                Layer::Content(2)
            ]
        );
        // Hidden items keep their slot
        assert_eq!(glyphs(&scene), vec!["a", "b", "c"]);
        assert!(!scene.contents[1].is_visible());
    }

    #[test]
    fn test_edit_main_image_turns_rect() {
        let mut scene = Scene::default();
        assert!(!scene.edit_main_image(|a| a.rotate(true)));
        scene.set_main_image("photo.jpg", (1000, 500));
        let before = scene.main_image().unwrap().rect;

        assert!(scene.edit_main_image(|a| a.rotate(true)));
        let turned = scene.main_image().unwrap().rect;
        assert_eq!((turned.width, turned.height), (before.height, before.width));
        assert_eq!(turned.center(), before.center());

        // A half turn in total keeps the original shape
        scene.edit_main_image(|a| a.rotate(true));
        assert_eq!(scene.main_image().unwrap().rect, before);
        scene.edit_main_image(|a| a.flip(true));
        assert_eq!(scene.main_image().unwrap().rect, before);
        assert!(scene.main_image().unwrap().adjust.flip_h);
    }

    #[test]
    fn test_adjustments_survive_json() {
        let mut scene = Scene::default();
        scene.set_main_image("photo.jpg", (400, 300));
        scene.edit_main_image(|a| {
            a.toggle_filter(crate::adjust::Filter::Sharpen);
            a.saturation = 0.5;
        });
        scene.set_visible(Layer::Border, false);
        let back = Scene::from_json(&scene.to_json().unwrap()).unwrap();
        assert_eq!(back, scene);

        // Older files carry neither field
        let plain = r#"{"contents": [{"kind": "image", "source": "a.png", "rect": {"x": 0, "y": 0, "width": 10, "height": 10}}]}"#;
        let img = Scene::from_json(plain).unwrap().main_image().cloned().unwrap();
        assert!(img.visible);
        assert!(img.adjust.is_identity());
    }

    #[test]
    fn test_json_keeps_only_first_text_layer() {
        let json = r#"{"contents": [
            {"kind": "text", "content": "first"},
            {"kind": "sticker", "source": {"glyph": "a"}, "center": {"x": 1, "y": 1}, "size_px": 10},
            {"kind": "text", "content": "second"}
        ]}"#;
        let scene = Scene::from_json(json).unwrap();
        assert_eq!(glyphs(&scene), vec!["text", "a"]);
        assert_eq!(scene.text().map(|t| t.content.as_str()), Some("first"));
    }

    #[test]
    fn test_scene_json_rejects_zero_canvas() {
        let err = Scene::from_json(r#"{"reference": {"width": 0, "height": 10}}"#).unwrap_err();
        assert!(matches!(err, FrameError::InvalidCanvas(_)));
    }

    #[test]
    fn test_assets_skip_unreadable() {
        let mut scene = Scene::default();
        scene.set_main_image("/nonexistent/a.jpg", (10, 10));
        let assets = SceneAssets::load(&scene);
        assert!(assets.is_empty());
        assert_eq!(scene.image_paths(), vec![Path::new("/nonexistent/a.jpg")]);
    }
}
