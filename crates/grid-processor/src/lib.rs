//! Annual stacks of gridded day counts and their interval means.
//!
//! Yearly NetCDF files are concatenated along the year axis into an
//! [`AnnualStack`]; [`aggregate_intervals`] then averages the stack over
//! half-open year windows. Both sequences are rendered with one shared
//! colour scale, the global [`ValueRange`] of the annual stack.

pub mod aggregate;
pub mod error;
pub mod loader;
pub mod types;

pub use aggregate::{aggregate_intervals, IntervalMean};
pub use error::{GridProcessorError, Result};
pub use loader::{concatenate_files, discover_files, load_annual_stack};
pub use types::{AnnualStack, Field2D, GridAxes, ValueRange};
