//! # Theme Presets
//!
//! A theme is the decoration of a scene without its photos: background,
//! border, text styling and stickers. Themes are saved as JSON and kept on a
//! [`ThemeShelf`] of at most [`SHELF_CAPACITY`] entries.
//!
//! Applying a theme replaces the scene's background, border and stickers.
//! The text layer takes the theme's styling but keeps the scene's own
//! content, so a theme never overwrites what the user wrote.

use crate::background::{BackgroundMode, BackgroundPattern, BackgroundSpec};
use crate::border::{BorderPattern, BorderSpec, LineStyle};
use crate::color::{BORDER, MACARON, Rgb};
use crate::error::FrameError;
use crate::scene::{Content, Scene, StickerPlacement};
use crate::text::TextLayer;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// Themes a shelf holds before the oldest is dropped.
pub const SHELF_CAPACITY: usize = 8;

/// Decoration that can be saved and reapplied to any scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemePreset {
    pub name: String,
    pub background: BackgroundSpec,
    pub border: BorderSpec,
    /// Text styling; its content is ignored when applied.
    pub text: Option<TextLayer>,
    pub stickers: Vec<StickerPlacement>,
}

impl ThemePreset {
    /// Capture the decoration of `scene`.
    pub fn capture(name: impl Into<String>, scene: &Scene) -> Self {
        Self {
            name: name.into(),
            background: scene.background.clone(),
            border: scene.border.clone(),
            text: scene.text().cloned(),
            stickers: scene.stickers().cloned().collect(),
        }
    }

    /// Restyle `scene` with this theme.
    pub fn apply(&self, scene: &mut Scene) {
        scene.background = self.background.clone();
        scene.border = self.border.clone();

        if let Some(style) = &self.text {
            let content = scene.text().map(|t| t.content.clone()).unwrap_or_default();
            scene.set_text(style.with_content(content));
        }

        let mut i = 0;
        while i < scene.contents.len() {
            if matches!(scene.contents[i], Content::Sticker(_)) {
                scene.remove(i);
            } else {
                i += 1;
            }
        }
        for sticker in &self.stickers {
            scene.add(Content::Sticker(sticker.clone()));
        }
        log::debug!("applied theme '{}' ({} sticker(s))", self.name, self.stickers.len());
    }

    pub fn from_json(json: &str) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(json)?)
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
}

/// A bounded list of saved themes, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeShelf {
    themes: VecDeque<ThemePreset>,
}

impl ThemeShelf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a theme, returning the one dropped to make room, if any.
    pub fn push(&mut self, theme: ThemePreset) -> Option<ThemePreset> {
        let dropped = if self.themes.len() >= SHELF_CAPACITY {
            self.themes.pop_front()
        } else {
            None
        };
        if let Some(old) = &dropped {
            log::info!("theme shelf full, dropping '{}'", old.name);
        }
        self.themes.push_back(theme);
        dropped
    }

    pub fn get(&self, index: usize) -> Option<&ThemePreset> {
        self.themes.get(index)
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThemePreset> {
        self.themes.iter()
    }

    pub fn load(path: &Path) -> Result<Self, FrameError> {
        let mut shelf: ThemeShelf = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        while shelf.themes.len() > SHELF_CAPACITY {
            shelf.themes.pop_front();
        }
        Ok(shelf)
    }

    pub fn save(&self, path: &Path) -> Result<(), FrameError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// A theme with a macaron background, a palette border and a random motif.
pub fn random_theme<R: Rng + ?Sized>(rng: &mut R) -> ThemePreset {
    let background = MACARON[rng.random_range(0..MACARON.len())];
    let (border_name, border_color) = BORDER[rng.random_range(0..BORDER.len())];
    let pattern = BorderPattern::ALL[rng.random_range(0..BorderPattern::ALL.len())];
    let bg_pattern = if rng.random_bool(0.5) {
        BackgroundPattern::None
    } else {
        BackgroundPattern::ALL[rng.random_range(1..BackgroundPattern::ALL.len())]
    };

    ThemePreset {
        name: format!("random {} {}", border_name, pattern),
        background: BackgroundSpec {
            mode: if bg_pattern == BackgroundPattern::None {
                BackgroundMode::Color
            } else {
                BackgroundMode::Pattern
            },
            color: background,
            pattern_id: bg_pattern,
            pattern_color: Rgb::WHITE,
            pattern_pitch_px: rng.random_range(6..=16),
            image: None,
        },
        border: BorderSpec {
            width_px: rng.random_range(16..=40),
            corner_radius_px: [0, 0, 16, 32][rng.random_range(0..4)],
            color: border_color,
            line_style: LineStyle::Solid,
            pattern,
            pattern_color: Rgb::WHITE,
            pattern_size_px: rng.random_range(8..=14),
        },
        text: None,
        stickers: Vec::new(),
    }
}
