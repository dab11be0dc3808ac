//! Per-period threshold elevation statistics.
//!
//! The statistics are produced upstream (one row per period, indexed by the
//! period label in the first column) and only read here:
//!
//! ```text
//! ,min_elevation,mean_elevation,max_elevation
//! 1990-2020,1210.0,1893.2,2480.0
//! 2021-2040,1347.0,2039.4,2617.0
//! ```

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::coerce::{coerce_numeric, text_cell};
use crate::error::{CrestDataError, CrestDataResult};

const MIN_COLUMN: &str = "min_elevation";
const MEAN_COLUMN: &str = "mean_elevation";
const MAX_COLUMN: &str = "max_elevation";

/// Which climate threshold a statistics table describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdFamily {
    /// 0 °C isotherm altitude.
    Isotherm0,
    /// Altitude of the tropical 20 °C threshold.
    Tropical20,
}

impl ThresholdFamily {
    pub fn name(&self) -> &'static str {
        match self {
            ThresholdFamily::Isotherm0 => "isotherm_0",
            ThresholdFamily::Tropical20 => "tropical_20",
        }
    }
}

/// Coldest-year, mean and hottest-year elevation over a period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElevationStats {
    pub min: Option<f64>,
    pub mean: Option<f64>,
    pub max: Option<f64>,
}

/// Statistics row for one period label.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodStats {
    pub period: String,
    pub elevation: ElevationStats,
}

/// All periods of one threshold family, in file order.
#[derive(Debug, Clone)]
pub struct PeriodStatsTable {
    family: ThresholdFamily,
    rows: Vec<PeriodStats>,
}

impl PeriodStatsTable {
    pub fn new(family: ThresholdFamily, rows: Vec<PeriodStats>) -> Self {
        Self { family, rows }
    }

    /// Load a `,`-separated statistics table from disk.
    pub fn from_path<P: AsRef<Path>>(path: P, family: ThresholdFamily) -> CrestDataResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CrestDataError::NotFound(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file, family)?;
        info!(
            path = %path.display(),
            family = family.name(),
            periods = ?table.periods().collect::<Vec<_>>(),
            "Loaded period statistics"
        );
        Ok(table)
    }

    /// Parse a statistics table from any reader.
    ///
    /// The first column is the period label whatever its header; the three
    /// elevation columns are located by name after trimming header whitespace.
    pub fn from_reader<R: Read>(reader: R, family: ThresholdFamily) -> CrestDataResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| -> CrestDataResult<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CrestDataError::MissingColumn {
                    source_name: format!("{} statistics", family.name()),
                    column: name.to_string(),
                })
        };
        let min_idx = column(MIN_COLUMN)?;
        let mean_idx = column(MEAN_COLUMN)?;
        let max_idx = column(MAX_COLUMN)?;

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let period = text_cell(record.get(0));
            if period.is_empty() {
                continue;
            }
            rows.push(PeriodStats {
                period,
                elevation: ElevationStats {
                    min: coerce_numeric(record.get(min_idx)),
                    mean: coerce_numeric(record.get(mean_idx)),
                    max: coerce_numeric(record.get(max_idx)),
                },
            });
        }

        Ok(Self { family, rows })
    }

    pub fn family(&self) -> ThresholdFamily {
        self.family
    }

    pub fn rows(&self) -> &[PeriodStats] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Period labels in file order.
    pub fn periods(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.period.as_str())
    }

    pub fn get(&self, period: &str) -> Option<&ElevationStats> {
        self.rows
            .iter()
            .find(|r| r.period == period.trim())
            .map(|r| &r.elevation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_padded_headers() {
        let csv = "period, min_elevation , mean_elevation,max_elevation\n2021-2040,1347.0,2039.4,2617.0\n";
        let table = PeriodStatsTable::from_reader(csv.as_bytes(), ThresholdFamily::Isotherm0).unwrap();
        let stats = table.get("2021-2040").unwrap();
        assert_eq!(stats.min, Some(1347.0));
        assert_eq!(stats.mean, Some(2039.4));
        assert_eq!(stats.max, Some(2617.0));
    }

    #[test]
    fn test_missing_column() {
        let csv = ",min_elevation,max_elevation\n2021-2040,1,2\n";
        let err = PeriodStatsTable::from_reader(csv.as_bytes(), ThresholdFamily::Tropical20).unwrap_err();
        match err {
            CrestDataError::MissingColumn { column, .. } => assert_eq!(column, "mean_elevation"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_cell_is_missing() {
        let csv = ",min_elevation,mean_elevation,max_elevation\n2061-2080,,2339.5,--\n";
        let table = PeriodStatsTable::from_reader(csv.as_bytes(), ThresholdFamily::Isotherm0).unwrap();
        let stats = table.get("2061-2080").unwrap();
        assert_eq!(stats.min, None);
        assert_eq!(stats.mean, Some(2339.5));
        assert_eq!(stats.max, None);
    }
}
