//! Error types shared by the visualization crates.

use thiserror::Error;

/// Result type alias using VizError.
pub type VizResult<T> = Result<T, VizError>;

/// Validation failures of shared configuration values.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("Unknown color ramp: {0}")]
    UnknownColorRamp(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),
}
