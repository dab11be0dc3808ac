//! Common types and utilities shared across the climate visualization crates.

pub mod error;
pub mod interval;
pub mod period;
pub mod style;

pub use error::{VizError, VizResult};
pub use interval::{default_intervals, YearInterval};
pub use period::period_file_stem;
pub use style::{Color, ColorRamp, LineStyle};
