//! # Batch Export
//!
//! Renders one scene template over many photos in parallel.
//!
//! ```text
//!   template scene ─┐
//!   shared assets ──┼──▶ per photo (rayon): decode ▶ swap main image ▶
//!   overrides ──────┘        override text ▶ render ▶ save processed_{name}
//! ```
//!
//! Every item works on its own scene copy and pixel buffers; the template
//! and the shared assets are only read. A failing item is recorded in the
//! [`BatchReport`] and the rest carry on. Setting the cancel flag stops
//! items that have not started yet; items already rendering finish.

use crate::compositor::render;
use crate::error::FrameError;
use crate::geometry::CanvasSpec;
use crate::loader::load_image;
use crate::render::OutputFormat;
use crate::scene::{Scene, SceneAssets};
use image::RgbaImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Prefix of every batch output file name.
pub const OUTPUT_PREFIX: &str = "processed_";

/// Where a batch photo comes from.
#[derive(Debug, Clone)]
pub enum BatchSource {
    File(PathBuf),
    Decoded(RgbaImage),
}

/// One photo of a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Identifier used for text overrides and the output name, normally
    /// the file name.
    pub id: String,
    pub source: BatchSource,
}

impl BatchItem {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            id,
            source: BatchSource::File(path),
        }
    }

    fn decode(&self) -> Result<RgbaImage, FrameError> {
        match &self.source {
            BatchSource::File(path) => load_image(path),
            BatchSource::Decoded(img) => Ok(img.clone()),
        }
    }
}

/// Per-photo replacement text, by identifier or by position in the batch.
///
/// An identifier match wins over an ordinal one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOverrides {
    pub by_id: HashMap<String, String>,
    pub by_index: HashMap<usize, String>,
}

impl TextOverrides {
    pub fn resolve(&self, id: &str, index: usize) -> Option<&str> {
        self.by_id
            .get(id)
            .or_else(|| self.by_index.get(&index))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_index.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }
}

/// How one item ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemStatus {
    Saved(PathBuf),
    Failed(String),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    pub id: String,
    pub status: ItemStatus,
}

/// Outcome of every item, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Saved(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Failed(_)))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Cancelled))
    }

    fn count(&self, pred: impl Fn(&ItemStatus) -> bool) -> usize {
        self.items.iter().filter(|o| pred(&o.status)).count()
    }

    /// (id, reason) of every failed item.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().filter_map(|o| match &o.status {
            ItemStatus::Failed(reason) => Some((o.id.as_str(), reason.as_str())),
            _ => None,
        })
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "succeeded {}/{}", self.succeeded(), self.total())?;
        if self.cancelled() > 0 {
            write!(f, ", cancelled {}", self.cancelled())?;
        }
        for (id, reason) in self.failures() {
            write!(f, "\n  {}: {}", id, reason)?;
        }
        Ok(())
    }
}

/// Output path of `id` in `dir`. Sources that are neither PNG nor JPEG
/// are written as PNG.
pub fn output_path(dir: &Path, id: &str) -> PathBuf {
    let name = format!("{}{}", OUTPUT_PREFIX, id);
    let path = dir.join(&name);
    match OutputFormat::from_path(&path) {
        Ok(_) => path,
        Err(_) => path.with_extension("png"),
    }
}

/// Shared inputs of a batch run.
pub struct BatchJob<'a> {
    pub template: &'a Scene,
    /// Sticker and background images of the template.
    pub assets: &'a SceneAssets,
    pub canvas: CanvasSpec,
    pub output_dir: &'a Path,
    pub overrides: &'a TextOverrides,
}

impl BatchJob<'_> {
    /// Render every item, stopping early when `cancel` is set.
    pub fn run(&self, items: &[BatchItem], cancel: &AtomicBool) -> Result<BatchReport, FrameError> {
        self.canvas.validate()?;
        std::fs::create_dir_all(self.output_dir)?;

        let outcomes: Vec<ItemOutcome> = items
            .par_iter()
            .enumerate()
            .map(|(index, item)| {
                let status = if cancel.load(Ordering::Relaxed) {
                    ItemStatus::Cancelled
                } else {
                    match self.process(index, item) {
                        Ok(path) => {
                            log::debug!("saved {}", path.display());
                            ItemStatus::Saved(path)
                        }
                        Err(e) => {
                            log::warn!("skipping {}: {}", item.id, e);
                            ItemStatus::Failed(e.to_string())
                        }
                    }
                };
                ItemOutcome {
                    id: item.id.clone(),
                    status,
                }
            })
            .collect();

        let report = BatchReport { items: outcomes };
        log::info!("batch finished: {}", report);
        Ok(report)
    }

    fn process(&self, index: usize, item: &BatchItem) -> Result<PathBuf, FrameError> {
        let photo = item.decode()?;
        let key = PathBuf::from(format!("batch://{}", item.id));

        let mut scene = match self.overrides.resolve(&item.id, index) {
            Some(text) => self.template.with_text_content(text),
            None => self.template.clone(),
        };
        scene.set_main_image(&key, photo.dimensions());

        let mut assets = self.assets.clone();
        assets.insert(key, photo);

        let surface = render(&scene, &assets, self.canvas)?;
        let path = output_path(self.output_dir, &item.id);
        surface.save(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::text::TextLayer;
    use pretty_assertions::assert_eq;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("passepartout-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn photo(color: Rgb) -> BatchSource {
        BatchSource::Decoded(RgbaImage::from_pixel(30, 20, color.to_rgba()))
    }

    #[test]
    fn test_overrides_prefer_id() {
        let mut o = TextOverrides::default();
        o.by_index.insert(0, "first".into());
        o.by_id.insert("b.jpg".into(), "bee".into());
        assert_eq!(o.resolve("a.jpg", 0), Some("first"));
        assert_eq!(o.resolve("b.jpg", 0), Some("bee"));
        assert_eq!(o.resolve("c.jpg", 3), None);
    }

    #[test]
    fn test_overrides_json() {
        let o: TextOverrides =
            serde_json::from_str(r#"{"by_id": {"a.jpg": "hello"}, "by_index": {"2": "third"}}"#).unwrap();
        assert_eq!(o.resolve("zzz", 2), Some("third"));
        assert_eq!(o.resolve("a.jpg", 2), Some("hello"));
    }

    #[test]
    fn test_output_names() {
        let dir = Path::new("/out");
        assert_eq!(output_path(dir, "cat.jpg"), PathBuf::from("/out/processed_cat.jpg"));
        assert_eq!(output_path(dir, "cat.PNG"), PathBuf::from("/out/processed_cat.PNG"));
        assert_eq!(output_path(dir, "cat.heic"), PathBuf::from("/out/processed_cat.png"));
    }

    #[test]
    fn test_batch_saves_and_reports_failures() {
        let dir = scratch_dir("batch");
        let mut template = Scene::default();
        template.set_text(TextLayer::new(""));
        let items = vec![
            BatchItem {
                id: "red.png".into(),
                source: photo(Rgb::from_u32(0xFF0000)),
            },
            BatchItem::from_path("/nonexistent/missing.jpg"),
            BatchItem {
                id: "blue.jpg".into(),
                source: photo(Rgb::from_u32(0x0000FF)),
            },
        ];
        let job = BatchJob {
            template: &template,
            assets: &SceneAssets::new(),
            canvas: CanvasSpec::new(60, 80).unwrap(),
            output_dir: &dir,
            overrides: &TextOverrides::default(),
        };
        let report = job.run(&items, &AtomicBool::new(false)).unwrap();

        assert_eq!((report.succeeded(), report.failed()), (2, 1));
        assert_eq!(report.items[1].id, "missing.jpg");
        assert!(dir.join("processed_red.png").is_file());
        assert!(dir.join("processed_blue.jpg").is_file());
        assert!(report.to_string().starts_with("succeeded 2/3"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_cancelled_batch_renders_nothing() {
        let dir = scratch_dir("cancel");
        let template = Scene::default();
        let items = vec![BatchItem {
            id: "a.png".into(),
            source: photo(Rgb::WHITE),
        }];
        let job = BatchJob {
            template: &template,
            assets: &SceneAssets::new(),
            canvas: CanvasSpec::new(60, 80).unwrap(),
            output_dir: &dir,
            overrides: &TextOverrides::default(),
        };
        let report = job.run(&items, &AtomicBool::new(true)).unwrap();
        assert_eq!(report.cancelled(), 1);
        assert!(!dir.join("processed_a.png").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
