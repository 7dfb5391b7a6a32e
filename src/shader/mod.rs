//! # Shader Primitives
//!
//! Small analytic building blocks shared by the border, background and text
//! renderers. Shapes are evaluated per pixel from distance functions rather
//! than drawn from bitmaps, so they stay crisp at any export resolution.
//!
//! ## Categories
//!
//! - [`distance`]: point, segment and rounded-rectangle distances
//! - [`line`]: anti-aliased edges, dash patterns
//! - [`transform`]: arcs, shear
//! - [`noise`]: deterministic hashes

pub mod distance;
pub mod line;
pub mod noise;
pub mod transform;

// Re-export all primitives at the top level for convenience
pub use distance::*;
pub use line::*;
pub use noise::*;
pub use transform::*;
