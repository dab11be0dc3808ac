//! Ridge-line crest table.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::coerce::{coerce_numeric, text_cell};
use crate::error::{CrestDataError, CrestDataResult};

/// Column names of the crest table, as exported from the source spreadsheet.
pub mod columns {
    pub const DEPARTMENT: &str = "Département";
    pub const PEAK_NAME: &str = "Nom_Sommet";
    pub const PEAK_ALTITUDE: &str = "Altitude_Sommet";
    pub const PREFECTURE_NAME: &str = "Nom_prefecture";
    pub const PREFECTURE_ALTITUDE: &str = "Altitude_Préfécture";
    pub const STATION_NAME: &str = "Nom_station de ski";
    pub const STATION_LOW: &str = "Altitude_basse_station de ski";
    pub const STATION_HIGH: &str = "Altitude_haute_station de ski";
}

/// Raw row as read from the file; every cell may be absent.
#[derive(Debug, Deserialize)]
struct RawCrestRow {
    #[serde(rename = "Département")]
    department: Option<String>,
    #[serde(rename = "Nom_Sommet")]
    peak_name: Option<String>,
    #[serde(rename = "Altitude_Sommet")]
    peak_altitude: Option<String>,
    #[serde(rename = "Nom_prefecture")]
    prefecture_name: Option<String>,
    #[serde(rename = "Altitude_Préfécture")]
    prefecture_altitude: Option<String>,
    #[serde(rename = "Nom_station de ski")]
    station_name: Option<String>,
    #[serde(rename = "Altitude_basse_station de ski")]
    station_low: Option<String>,
    #[serde(rename = "Altitude_haute_station de ski")]
    station_high: Option<String>,
}

/// One point along the ridge line.
#[derive(Debug, Clone, PartialEq)]
pub struct CrestPoint {
    pub department: String,
    pub peak_name: String,
    /// `None` only when the cell was present but not numeric.
    pub peak_altitude: Option<f64>,
    pub prefecture_name: String,
    pub prefecture_altitude: Option<f64>,
    /// Empty when the point has no ski station.
    pub station_name: String,
    pub station_low: Option<f64>,
    pub station_high: Option<f64>,
}

impl CrestPoint {
    pub fn has_station(&self) -> bool {
        !self.station_name.is_empty()
    }

    /// Low/high altitude of the ski area, when the point has a station with
    /// both bounds defined.
    pub fn station_range(&self) -> Option<(f64, f64)> {
        if !self.has_station() {
            return None;
        }
        Some((self.station_low?, self.station_high?))
    }
}

/// Crest points in ridge order. Rows without a peak altitude cell are
/// dropped on load.
#[derive(Debug, Clone, Default)]
pub struct CrestTable {
    points: Vec<CrestPoint>,
}

impl CrestTable {
    pub fn new(points: Vec<CrestPoint>) -> Self {
        Self { points }
    }

    /// Load the `;`-separated crest table from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> CrestDataResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CrestDataError::NotFound(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            points = table.len(),
            stations = table.stations().count(),
            "Loaded crest table"
        );
        Ok(table)
    }

    /// Parse the crest table from any reader.
    pub fn from_reader<R: Read>(reader: R) -> CrestDataResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for required in [columns::PEAK_ALTITUDE, columns::DEPARTMENT] {
            if !headers.iter().any(|h| h == required) {
                return Err(CrestDataError::MissingColumn {
                    source_name: "crest table".to_string(),
                    column: required.to_string(),
                });
            }
        }

        let mut points = Vec::new();
        let mut skipped = 0usize;

        for record in csv_reader.deserialize::<RawCrestRow>() {
            let row = record?;

            // A missing peak cell removes the row from the chart entirely;
            // a present but non-numeric one only hides the point.
            let has_peak = row
                .peak_altitude
                .as_deref()
                .map(|cell| !cell.trim().is_empty())
                .unwrap_or(false);
            if !has_peak {
                skipped += 1;
                continue;
            }

            points.push(CrestPoint {
                department: text_cell(row.department.as_deref()),
                peak_name: text_cell(row.peak_name.as_deref()),
                peak_altitude: coerce_numeric(row.peak_altitude.as_deref()),
                prefecture_name: text_cell(row.prefecture_name.as_deref()),
                prefecture_altitude: coerce_numeric(row.prefecture_altitude.as_deref()),
                station_name: text_cell(row.station_name.as_deref()),
                station_low: coerce_numeric(row.station_low.as_deref()),
                station_high: coerce_numeric(row.station_high.as_deref()),
            });
        }

        if skipped > 0 {
            debug!(skipped, "Dropped crest rows without a peak altitude");
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[CrestPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points carrying a ski station, with their x position along the ridge.
    pub fn stations(&self) -> impl Iterator<Item = (usize, &CrestPoint)> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.has_station())
    }
}
