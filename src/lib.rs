//! # Passepartout - Photo Frame Compositing
//!
//! Passepartout lays photos, stickers and one styled text layer out on a
//! canvas, frames them with a decorative border and exports the result at
//! any resolution. It provides:
//!
//! - **Resolution independence**: scenes are arranged on a reference canvas
//!   and re-derived for every render size
//! - **Borders**: rounded, dashed, dotted or double frames with band-clipped
//!   motifs
//! - **Backgrounds**: solid colors, stretched photos and full-canvas patterns
//! - **Text**: wrapping, stroke, shadow, italic shear and keyword highlights
//! - **Batch export**: one scene template over many photos, in parallel
//!
//! ## Quick Start
//!
//! ```no_run
//! use passepartout::{
//!     compositor,
//!     config::CanvasPreset,
//!     scene::{Scene, SceneAssets},
//!     text::TextLayer,
//! };
//!
//! let mut scene = Scene::default();
//! scene.set_main_image("holiday.jpg", (4032, 3024));
//! scene.set_text(TextLayer::new("Summer 2024"));
//!
//! let assets = SceneAssets::load(&scene);
//! let canvas = CanvasPreset::XIAOHONGSHU.canvas();
//! compositor::export(&scene, &assets, canvas, "framed.png".as_ref())?;
//!
//! # Ok::<(), passepartout::FrameError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`geometry`] | Canvas sizes, scale factors, drag math |
//! | [`border`] | Frame renderer |
//! | [`background`] | Background renderer |
//! | [`text`] | Text layout and rendering |
//! | [`scene`] | Scene snapshot and layer order |
//! | [`adjust`] | Photo rotation, mirrors, filters and tone |
//! | [`history`] | Undo and redo over scene snapshots |
//! | [`compositor`] | Preview and export rendering |
//! | [`preset`] | Theme presets |
//! | [`batch`] | Parallel batch export |
//! | [`error`] | Error types |

pub mod adjust;
pub mod background;
pub mod batch;
pub mod border;
pub mod color;
pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod history;
pub mod loader;
pub mod preset;
pub mod render;
pub mod scene;
pub mod shader;
pub mod text;

// Re-exports for convenience
pub use error::FrameError;
pub use geometry::CanvasSpec;
pub use scene::{Scene, SceneAssets};
