//! Error types for rendering and output assembly.

use plotters::drawing::DrawingAreaErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while drawing frames or writing images, animations and
/// documents.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid SVG: {0}")]
    Svg(String),

    #[error("chart drawing failed: {0}")]
    Plot(String),

    #[error("invalid canvas size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("frame data does not match a {width}x{height} grid ({len} values)")]
    FrameShape { width: usize, height: usize, len: usize },

    #[error("missing frame image: {}", .0.display())]
    MissingFrame(PathBuf),

    #[error("no frames to assemble")]
    NoFrames,

    #[error("ffmpeg failed: {0}")]
    Ffmpeg(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Plot(err.to_string())
    }
}
