//! Tabular inputs of the crest-profile pipeline.
//!
//! Two CSV files feed every crest chart:
//! - the ridge-line table (`;`-separated), one row per point along the crest,
//!   in geographic order
//! - a per-period statistics table (`,`-separated) with the coldest-year,
//!   mean and hottest-year elevation of a climate threshold
//!
//! Numeric cells are coerced leniently: anything that does not parse becomes
//! a missing value and is simply left out of the chart.

pub mod coerce;
pub mod crest;
pub mod error;
pub mod stats;

pub use coerce::coerce_numeric;
pub use crest::{CrestPoint, CrestTable};
pub use error::{CrestDataError, CrestDataResult};
pub use stats::{ElevationStats, PeriodStats, PeriodStatsTable, ThresholdFamily};
