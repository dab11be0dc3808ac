//! Core types for gridded day-count stacks.

use serde::{Deserialize, Serialize};

use crate::error::{GridProcessorError, Result};

/// Spatial axes shared by every frame of a stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxes {
    /// X coordinate of each column.
    pub x: Vec<f64>,
    /// Y coordinate of each row.
    pub y: Vec<f64>,
}

impl GridAxes {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }

    pub fn width(&self) -> usize {
        self.x.len()
    }

    pub fn height(&self) -> usize {
        self.y.len()
    }

    pub fn cells(&self) -> usize {
        self.width() * self.height()
    }

    /// True when y grows with the row index (row 0 is the southern edge).
    pub fn y_ascending(&self) -> bool {
        match (self.y.first(), self.y.last()) {
            (Some(first), Some(last)) => last >= first,
            _ => true,
        }
    }

    /// Describe the first difference with `other`, if any.
    pub fn mismatch(&self, other: &GridAxes) -> Option<String> {
        if self.width() != other.width() || self.height() != other.height() {
            return Some(format!(
                "size {}x{} vs {}x{}",
                other.width(),
                other.height(),
                self.width(),
                self.height()
            ));
        }
        if let Some(i) = self.x.iter().zip(&other.x).position(|(a, b)| a != b) {
            return Some(format!("x[{}] = {} vs {}", i, other.x[i], self.x[i]));
        }
        if let Some(j) = self.y.iter().zip(&other.y).position(|(a, b)| a != b) {
            return Some(format!("y[{}] = {} vs {}", j, other.y[j], self.y[j]));
        }
        None
    }
}

/// A single 2-D field (row-major), NaN where undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct Field2D {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f32>,
}

impl Field2D {
    pub fn new(width: usize, height: usize, values: Vec<f32>) -> Result<Self> {
        if values.len() != width * height {
            return Err(GridProcessorError::InvalidShape(format!(
                "{} values for a {}x{} field",
                values.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// A field with no defined value.
    pub fn undefined(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![f32::NAN; width * height],
        }
    }

    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.values.get(row * self.width + col).copied()
    }

    /// True when no cell holds a value.
    pub fn is_all_undefined(&self) -> bool {
        self.values.iter().all(|v| v.is_nan())
    }

    /// Row-major rows, as nested vectors (for JSON export).
    pub fn rows(&self) -> Vec<Vec<Option<f32>>> {
        self.values
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|v| (!v.is_nan()).then_some(*v)).collect())
            .collect()
    }
}

/// Minimum and maximum over the defined values of a set of fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    /// NaN-skipping min/max; `None` when nothing is defined.
    pub fn from_values<'a, I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a f32>,
    {
        values
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc: Option<ValueRange>, &v| {
                Some(match acc {
                    Some(r) => ValueRange {
                        min: r.min.min(v),
                        max: r.max.max(v),
                    },
                    None => ValueRange { min: v, max: v },
                })
            })
    }

    /// Map a value into [0, 1]; degenerate ranges map everything to 0.
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span.abs() < f32::EPSILON {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// Year-major stack of annual fields on one grid.
#[derive(Debug, Clone)]
pub struct AnnualStack {
    axes: GridAxes,
    years: Vec<i32>,
    /// `years.len() * axes.cells()` values, year-major then row-major.
    values: Vec<f32>,
}

impl AnnualStack {
    pub fn new(axes: GridAxes, years: Vec<i32>, values: Vec<f32>) -> Result<Self> {
        let expected = years.len() * axes.cells();
        if values.len() != expected {
            return Err(GridProcessorError::InvalidShape(format!(
                "{} values for {} years of {}x{} cells",
                values.len(),
                years.len(),
                axes.width(),
                axes.height()
            )));
        }
        Ok(Self {
            axes,
            years,
            values,
        })
    }

    pub fn axes(&self) -> &GridAxes {
        &self.axes
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Values of the `i`-th year.
    pub fn frame_values(&self, i: usize) -> Option<&[f32]> {
        let cells = self.axes.cells();
        self.values.get(i * cells..(i + 1) * cells)
    }

    /// The `i`-th year as an owned field.
    pub fn frame(&self, i: usize) -> Option<Field2D> {
        self.frame_values(i).map(|values| Field2D {
            width: self.axes.width(),
            height: self.axes.height(),
            values: values.to_vec(),
        })
    }

    /// Global min/max over every year and cell.
    pub fn value_range(&self) -> Option<ValueRange> {
        ValueRange::from_values(&self.values)
    }
}
