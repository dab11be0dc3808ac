//! Multi-decade year windows used to aggregate annual fields.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{VizError, VizResult};

/// Half-open year window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(i32, i32)", into = "(i32, i32)")]
pub struct YearInterval {
    pub start: i32,
    pub end: i32,
}

impl YearInterval {
    pub fn new(start: i32, end: i32) -> VizResult<Self> {
        if end <= start {
            return Err(VizError::InvalidInterval(format!(
                "end {} must be greater than start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year < self.end
    }

    /// Display label, e.g. "2020-2040".
    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

impl TryFrom<(i32, i32)> for YearInterval {
    type Error = VizError;

    fn try_from((start, end): (i32, i32)) -> Result<Self, Self::Error> {
        YearInterval::new(start, end)
    }
}

impl From<YearInterval> for (i32, i32) {
    fn from(interval: YearInterval) -> Self {
        (interval.start, interval.end)
    }
}

impl fmt::Display for YearInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// The fixed aggregation windows: 1990-2000, then 20-year windows up to 2100.
pub fn default_intervals() -> Vec<YearInterval> {
    [
        (1990, 2000),
        (2000, 2020),
        (2020, 2040),
        (2040, 2060),
        (2060, 2080),
        (2080, 2100),
    ]
    .into_iter()
    .map(|(start, end)| YearInterval { start, end })
    .collect()
}
