//! NetCDF reader for yearly gridded day-count fields.
//!
//! Each input file holds one (or a few) years of a 2-D count of days per
//! grid cell: freezing days, tropical nights. Files produced by xarray store
//! these counts as `timedelta64`, i.e. integers with a duration `units`
//! attribute; the reader converts them back to plain numbers of days.
//!
//! # File layout
//!
//! ```text
//! dimensions: year = 1 ; y = 120 ; x = 160 ;
//! variables:
//!     int64 year(year) ;            // or "days since 1990-01-01"
//!     double y(y) ; double x(x) ;
//!     int64 freezing_days(year, y, x) ; freezing_days:units = "days" ;
//! ```
//!
//! The year axis may be absent, in which case the year is taken from the
//! file name (`freezing_days_per_year_2034.nc`).

pub mod error;
pub mod native;
pub mod units;
pub mod year;

pub use error::{NetCdfError, NetCdfResult};
pub use native::silence_hdf5_errors;
pub use units::DayCountUnit;
pub use year::{decode_years, year_from_file_name};

use std::path::Path;

/// Day counts for one or more consecutive years on a single grid.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyField {
    /// Calendar year of each slice.
    pub years: Vec<i32>,
    /// X coordinate of each column.
    pub x: Vec<f64>,
    /// Y coordinate of each row.
    pub y: Vec<f64>,
    /// Year-major, row-major values in days; NaN where undefined.
    pub values: Vec<f32>,
}

impl YearlyField {
    pub fn width(&self) -> usize {
        self.x.len()
    }

    pub fn height(&self) -> usize {
        self.y.len()
    }

    /// Number of cells of one yearly slice.
    pub fn cells(&self) -> usize {
        self.width() * self.height()
    }

    /// Values of the `i`-th year slice.
    pub fn slice(&self, i: usize) -> Option<&[f32]> {
        let cells = self.cells();
        self.values.get(i * cells..(i + 1) * cells)
    }

    /// Check that values, axes and years agree in size.
    pub fn validate(&self, variable: &str) -> NetCdfResult<()> {
        let expected = self.years.len() * self.cells();
        if self.values.len() != expected {
            return Err(NetCdfError::ShapeMismatch {
                variable: variable.to_string(),
                message: format!(
                    "{} values for {} years of {}x{} cells",
                    self.values.len(),
                    self.years.len(),
                    self.width(),
                    self.height()
                ),
            });
        }
        Ok(())
    }
}

/// Read a yearly day-count variable from a NetCDF file.
pub fn read_yearly_field<P: AsRef<Path>>(path: P, variable: &str) -> NetCdfResult<YearlyField> {
    native::read_yearly_field(path.as_ref(), variable)
}
