//! # Passepartout CLI
//!
//! Command-line front end for rendering framed photos.
//!
//! ## Usage
//!
//! ```bash
//! # Frame one photo with the default theme at 1242x1660
//! passepartout render --photo holiday.jpg --text "Summer" out.png
//!
//! # Render a saved scene at a custom size
//! passepartout render --scene scene.json --size 800x800 out.jpg
//!
//! # Turn the photo a quarter clockwise, mirror it and soften it
//! passepartout render --photo cat.jpg --rotate 90 --flip-h --filter smooth out.png
//!
//! # Apply a scene to a folder of photos
//! passepartout batch --scene scene.json --out-dir framed photos/*.jpg
//!
//! # List canvas presets, patterns and fonts
//! passepartout presets
//!
//! # Write a random theme, or capture one from a scene
//! passepartout theme --seed 7 theme.json
//! ```
//!
//! `RUST_LOG=debug` shows per-layer decisions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use passepartout::{
    FrameError,
    adjust::{Filter, ImageAdjustments, Rotation},
    background::BackgroundPattern,
    batch::{BatchItem, BatchJob, TextOverrides},
    border::BorderPattern,
    compositor,
    config::CanvasPreset,
    geometry::CanvasSpec,
    loader::load_image,
    preset::{ThemePreset, random_theme},
    scene::{Scene, SceneAssets},
    text::FontId,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Passepartout - photo frame compositor
#[derive(Parser, Debug)]
#[command(name = "passepartout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render one scene to a PNG or JPEG file
    Render {
        /// Output file, or a directory for a timestamped name
        out: PathBuf,

        /// Scene JSON (defaults to an empty scene)
        #[arg(long)]
        scene: Option<PathBuf>,

        /// Photo to use as the main image
        #[arg(long)]
        photo: Option<PathBuf>,

        /// Replace the text layer's content
        #[arg(long)]
        text: Option<String>,

        /// Theme JSON applied before rendering
        #[arg(long)]
        theme: Option<PathBuf>,

        #[command(flatten)]
        size: SizeArgs,

        #[command(flatten)]
        adjust: AdjustArgs,
    },

    /// Render a scene over many photos
    Batch {
        /// Input photos
        #[arg(required = true)]
        photos: Vec<PathBuf>,

        /// Output directory for processed_* files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Scene JSON used as the template
        #[arg(long)]
        scene: Option<PathBuf>,

        /// Per-photo text overrides JSON ({"by_id": {...}, "by_index": {...}})
        #[arg(long)]
        overrides: Option<PathBuf>,

        #[command(flatten)]
        size: SizeArgs,
    },

    /// List canvas presets, patterns and fonts
    Presets,

    /// Write a theme preset
    Theme {
        /// Output JSON file
        out: PathBuf,

        /// Capture the theme of this scene instead of a random one
        #[arg(long)]
        from: Option<PathBuf>,

        /// Seed for the random theme
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(clap::Args, Debug)]
struct SizeArgs {
    /// Canvas preset id
    #[arg(long, default_value = "xiaohongshu")]
    preset: String,

    /// Explicit WIDTHxHEIGHT, overrides --preset
    #[arg(long, value_parser = parse_size)]
    size: Option<CanvasSpec>,
}

impl SizeArgs {
    fn canvas(&self) -> Result<CanvasSpec, FrameError> {
        if let Some(size) = self.size {
            return Ok(size);
        }
        CanvasPreset::by_name(&self.preset)
            .map(|p| p.canvas())
            .ok_or_else(|| {
                FrameError::InvalidCanvas(format!(
                    "unknown preset '{}' (available: {})",
                    self.preset,
                    CanvasPreset::list().join(", ")
                ))
            })
    }
}

/// Edits of the main photo. Given factors and rotation replace the scene's;
/// flips toggle and filters are added.
#[derive(clap::Args, Debug)]
struct AdjustArgs {
    /// Clockwise rotation in degrees, a multiple of 90
    #[arg(long, value_parser = parse_rotation, allow_hyphen_values = true)]
    rotate: Option<Rotation>,

    /// Mirror left to right
    #[arg(long)]
    flip_h: bool,

    /// Mirror top to bottom
    #[arg(long)]
    flip_v: bool,

    /// Filter to switch on, repeatable (blur, sharpen, smooth, grayscale, contour, emboss, edge)
    #[arg(long = "filter")]
    filters: Vec<Filter>,

    /// Brightness factor, 0 to 2
    #[arg(long)]
    brightness: Option<f32>,

    /// Contrast factor, 0 to 2
    #[arg(long)]
    contrast: Option<f32>,

    /// Saturation factor, 0 to 2
    #[arg(long)]
    saturation: Option<f32>,
}

impl AdjustArgs {
    fn is_empty(&self) -> bool {
        self.rotate.is_none()
            && !self.flip_h
            && !self.flip_v
            && self.filters.is_empty()
            && self.brightness.is_none()
            && self.contrast.is_none()
            && self.saturation.is_none()
    }

    fn edit(&self, adj: &mut ImageAdjustments) {
        if let Some(rotation) = self.rotate {
            adj.rotation = rotation;
        }
        if self.flip_h {
            adj.flip(true);
        }
        if self.flip_v {
            adj.flip(false);
        }
        for filter in &self.filters {
            if !adj.filters.contains(filter) {
                adj.filters.push(*filter);
            }
        }
        adj.brightness = self.brightness.unwrap_or(adj.brightness);
        adj.contrast = self.contrast.unwrap_or(adj.contrast);
        adj.saturation = self.saturation.unwrap_or(adj.saturation);
    }

    fn apply(&self, scene: &mut Scene) {
        if !self.is_empty() && !scene.edit_main_image(|adj| self.edit(adj)) {
            log::warn!("no photo in the scene, ignoring photo adjustments");
        }
    }
}

fn parse_rotation(s: &str) -> Result<Rotation, String> {
    let degrees: i32 = s.trim().parse().map_err(|e| format!("bad angle '{}': {}", s, e))?;
    Rotation::from_degrees(degrees).ok_or_else(|| format!("{} is not a multiple of 90", degrees))
}

fn parse_size(s: &str) -> Result<CanvasSpec, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("bad width '{}': {}", w, e))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("bad height '{}': {}", h, e))?;
    CanvasSpec::new(w, h).map_err(|e| e.to_string())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_scene(path: Option<&PathBuf>) -> Result<Scene, FrameError> {
    match path {
        Some(p) => Scene::load(p),
        None => Ok(Scene::default()),
    }
}

fn run() -> Result<(), FrameError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            out,
            scene,
            photo,
            text,
            theme,
            size,
            adjust,
        } => {
            let canvas = size.canvas()?;
            let mut scene = load_scene(scene.as_ref())?;
            if let Some(theme) = theme {
                ThemePreset::load(&theme)?.apply(&mut scene);
            }
            if let Some(text) = text {
                scene = scene.with_text_content(&text);
            }

            let mut assets = SceneAssets::load(&scene);
            if let Some(photo) = photo {
                let img = load_image(&photo)?;
                scene.set_main_image(&photo, img.dimensions());
                assets.insert(photo, img);
            }
            adjust.apply(&mut scene);

            let saved = compositor::export(&scene, &assets, canvas, &out)?;
            println!("Saved {}x{} to {}", canvas.width, canvas.height, saved.display());
        }

        Commands::Batch {
            photos,
            out_dir,
            scene,
            overrides,
            size,
        } => {
            let canvas = size.canvas()?;
            let template = load_scene(scene.as_ref())?;
            let assets = SceneAssets::load(&template);
            let overrides = match overrides {
                Some(p) => TextOverrides::load(&p)?,
                None => TextOverrides::default(),
            };
            let items: Vec<BatchItem> = photos.into_iter().map(BatchItem::from_path).collect();

            println!("Processing {} photo(s) at {}x{}...", items.len(), canvas.width, canvas.height);
            let job = BatchJob {
                template: &template,
                assets: &assets,
                canvas,
                output_dir: &out_dir,
                overrides: &overrides,
            };
            let report = job.run(&items, &AtomicBool::new(false))?;
            println!("{}", report);
        }

        Commands::Presets => {
            println!("Canvas presets:");
            for p in CanvasPreset::ALL {
                println!("  {:<12} {:>4}x{:<4}  {}", p.id, p.width, p.height, p.name);
            }
            println!("\nBorder patterns:");
            for p in BorderPattern::ALL {
                println!("  {}", p);
            }
            println!("\nBackground patterns:");
            for p in BackgroundPattern::ALL {
                println!("  {}", p);
            }
            println!("\nFonts:");
            for f in FontId::ALL {
                println!("  {:?}", f);
            }
        }

        Commands::Theme { out, from, seed } => {
            let theme = match from {
                Some(path) => {
                    let name = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    ThemePreset::capture(name, &Scene::load(&path)?)
                }
                None => match seed {
                    Some(seed) => random_theme(&mut StdRng::seed_from_u64(seed)),
                    None => random_theme(&mut rand::rng()),
                },
            };
            theme.save(&out)?;
            println!("Wrote theme '{}' to {}", theme.name, out.display());
        }
    }

    Ok(())
}
