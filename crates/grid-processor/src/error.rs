//! Error types for grid processing.

use thiserror::Error;

/// Errors that can occur while assembling or aggregating annual grids.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// No input file matched the pattern.
    #[error("no input files match {0}")]
    NoInputFiles(String),

    /// The file pattern is not a valid glob.
    #[error("invalid file pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    /// A matched path could not be read while listing the directory.
    #[error("failed to list input files: {0}")]
    ListFailed(#[from] glob::GlobError),

    /// Failed to read a yearly file.
    #[error("failed to read grid data: {0}")]
    ReadFailed(#[from] netcdf_parser::NetCdfError),

    /// Yearly files do not share the same spatial grid.
    #[error("grid of {file} does not match the first file: {message}")]
    GridMismatch { file: String, message: String },

    /// Frame data does not match the grid size.
    #[error("invalid grid shape: {0}")]
    InvalidShape(String),
}

/// Result type for grid processing operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
