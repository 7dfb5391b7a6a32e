//! # Error Types
//!
//! This module defines error types used throughout the passepartout library.
//!
//! Decorative parameters that are out of range (negative widths, radii larger
//! than the canvas, zero pitches) are clamped by the renderers and never show
//! up here. Only faults the caller has to act on are errors.

use thiserror::Error;

/// Main error type for passepartout operations
#[derive(Debug, Error)]
pub enum FrameError {
    /// Non-positive canvas dimensions passed to a renderer
    #[error("Invalid canvas: {0}")]
    InvalidCanvas(String),

    /// Font file or source image could not be loaded or decoded
    #[error("Asset load error: {0}")]
    AssetLoad(String),

    /// Encoding or writing an output file failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Theme preset or scene file could not be parsed
    #[error("Preset error: {0}")]
    Preset(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
