//! Error types for crest table and statistics loading.

use thiserror::Error;

/// Result type for crest data operations.
pub type CrestDataResult<T> = Result<T, CrestDataError>;

/// Error types for crest data loading.
#[derive(Error, Debug)]
pub enum CrestDataError {
    /// Input file does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed CSV (bad quoting, invalid UTF-8, ...)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row
    #[error("Missing column '{column}' in {source_name}")]
    MissingColumn { source_name: String, column: String },
}
