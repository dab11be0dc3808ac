//! Native NetCDF reading using the netcdf library.
//!
//! Reads one yearly day-count file: the data variable, its spatial axes and
//! its year axis. Values are converted to `f32` days with fill values mapped
//! to NaN.

use std::path::Path;
use std::sync::Once;
use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::units::DayCountUnit;
use crate::year::{decode_years, year_from_file_name};
use crate::YearlyField;

/// Turn off the HDF5 library's automatic error stack printing.
///
/// Probing optional attributes (`units`, `_FillValue`) fails inside HDF5
/// and would otherwise dump an `HDF5-DIAG` trace on stderr for every file.
/// Idempotent.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: null handler and client data switch printing off for the
        // default error stack.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Name of the year coordinate when the variable is 2-D.
const YEAR_VARIABLE: &str = "year";

/// Read `variable` from a yearly file.
///
/// The variable must be `(y, x)` or `(year, y, x)`; the last two dimensions
/// are spatial whatever their names.
pub fn read_yearly_field(path: &Path, variable: &str) -> NetCdfResult<YearlyField> {
    silence_hdf5_errors();

    if !path.exists() {
        return Err(NetCdfError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let nc_file = netcdf::open(path)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to open NetCDF: {}", e)))?;

    let var = nc_file
        .variable(variable)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", variable)))?;

    let dims: Vec<(String, usize)> = var
        .dimensions()
        .iter()
        .map(|d| (d.name(), d.len()))
        .collect();

    let (year_dim, (y_dim, height), (x_dim, width)) = match dims.as_slice() {
        [y, x] => (None, y.clone(), x.clone()),
        [t, y, x] => (Some(t.clone()), y.clone(), x.clone()),
        other => {
            return Err(NetCdfError::ShapeMismatch {
                variable: variable.to_string(),
                message: format!("expected 2 or 3 dimensions, found {}", other.len()),
            })
        }
    };

    let raw: Vec<f64> = var
        .get_values::<f64, _>(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", variable, e)))?;

    let unit = DayCountUnit::from_units_attr(get_string_attr(&var, "units").as_deref());
    let fill_value = get_f64_attr(&var, "_FillValue");
    let missing_value = get_f64_attr(&var, "missing_value");
    let scale_factor = get_f64_attr(&var, "scale_factor").unwrap_or(1.0);
    let add_offset = get_f64_attr(&var, "add_offset").unwrap_or(0.0);

    let values: Vec<f32> = raw
        .iter()
        .map(|&v| {
            if !v.is_finite() || Some(v) == fill_value || Some(v) == missing_value {
                f32::NAN
            } else {
                unit.to_days(v * scale_factor + add_offset) as f32
            }
        })
        .collect();

    let x = read_axis(&nc_file, &x_dim, width)?;
    let y = read_axis(&nc_file, &y_dim, height)?;

    let years = match &year_dim {
        Some((name, len)) => read_years(&nc_file, name, *len, path)?,
        None => read_years(&nc_file, YEAR_VARIABLE, 1, path)?,
    };

    debug!(
        path = %path.display(),
        variable,
        unit = ?unit,
        years = ?years,
        width,
        height,
        "Read yearly field"
    );

    let field = YearlyField {
        years,
        x,
        y,
        values,
    };
    field.validate(variable)?;
    Ok(field)
}

/// Read a 1-D coordinate variable, falling back to cell indices when the file
/// has no coordinate variable for the dimension.
fn read_axis(file: &netcdf::File, name: &str, len: usize) -> NetCdfResult<Vec<f64>> {
    match file.variable(name) {
        Some(var) => {
            let values: Vec<f64> = var
                .get_values::<f64, _>(..)
                .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;
            if values.len() != len {
                return Err(NetCdfError::ShapeMismatch {
                    variable: name.to_string(),
                    message: format!("axis has {} values, dimension has {}", values.len(), len),
                });
            }
            Ok(values)
        }
        None => Ok((0..len).map(|i| i as f64).collect()),
    }
}

/// Read the year axis, or take the year from the file name when absent.
fn read_years(
    file: &netcdf::File,
    name: &str,
    len: usize,
    path: &Path,
) -> NetCdfResult<Vec<i32>> {
    if let Some(var) = file.variable(name) {
        let values: Vec<f64> = var
            .get_values::<f64, _>(..)
            .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;
        let years = decode_years(&values, get_string_attr(&var, "units").as_deref())?;
        if years.len() != len {
            return Err(NetCdfError::ShapeMismatch {
                variable: name.to_string(),
                message: format!("{} year values for {} slices", years.len(), len),
            });
        }
        return Ok(years);
    }

    match (len, year_from_file_name(path)) {
        (1, Some(year)) => Ok(vec![year]),
        _ => Err(NetCdfError::InvalidYear(format!(
            "no '{}' axis in {} and no year in the file name",
            name,
            path.display()
        ))),
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get f64 attribute.
fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

/// Helper to get string attribute.
fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
