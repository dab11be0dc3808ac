//! Discovery and concatenation of yearly NetCDF files.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::error::{GridProcessorError, Result};
use crate::types::{AnnualStack, GridAxes};

/// List files of `dir` matching `pattern`, sorted by file name.
///
/// Year-stamped names sort chronologically.
pub fn discover_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    // Only `pattern` holds wildcards; brackets or stars in `dir` are literal
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = Path::new(&escaped_dir).join(pattern);
    let full_pattern = full_pattern.to_string_lossy();

    let mut files = glob::glob(&full_pattern)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    files.retain(|p| p.is_file());
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if files.is_empty() {
        return Err(GridProcessorError::NoInputFiles(full_pattern.into_owned()));
    }
    debug!(pattern = %full_pattern, count = files.len(), "Discovered input files");
    Ok(files)
}

/// Read `variable` from every file and concatenate along the year axis.
///
/// Every file must share the spatial axes of the first one.
pub fn concatenate_files(files: &[PathBuf], variable: &str) -> Result<AnnualStack> {
    let mut axes: Option<GridAxes> = None;
    let mut years = Vec::new();
    let mut values = Vec::new();

    for path in files {
        let field = netcdf_parser::read_yearly_field(path, variable)?;
        let file_axes = GridAxes::new(field.x, field.y);

        match &axes {
            Some(first) => {
                if let Some(message) = first.mismatch(&file_axes) {
                    return Err(GridProcessorError::GridMismatch {
                        file: path.display().to_string(),
                        message,
                    });
                }
            }
            None => axes = Some(file_axes),
        }

        years.extend(field.years);
        values.extend(field.values);
    }

    let axes = axes.ok_or_else(|| GridProcessorError::NoInputFiles(variable.to_string()))?;
    AnnualStack::new(axes, years, values)
}

/// Discover and load the annual stack of `variable` under `dir`.
pub fn load_annual_stack(dir: &Path, pattern: &str, variable: &str) -> Result<AnnualStack> {
    let start = Instant::now();
    let files = discover_files(dir, pattern)?;
    let stack = concatenate_files(&files, variable)?;

    info!(
        dir = %dir.display(),
        variable,
        files = files.len(),
        years = stack.len(),
        first_year = stack.years().first().copied(),
        last_year = stack.years().last().copied(),
        width = stack.axes().width(),
        height = stack.axes().height(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Loaded annual stack"
    );
    Ok(stack)
}
