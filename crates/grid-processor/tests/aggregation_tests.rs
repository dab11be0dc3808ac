//! Integration tests for annual stack loading and interval aggregation.

use grid_processor::{
    aggregate_intervals, load_annual_stack, AnnualStack, GridAxes, GridProcessorError, ValueRange,
};
use std::path::Path;
use test_utils::{assert_approx_eq, create_day_count_stack, temp_test_dir, years};
use viz_common::{default_intervals, YearInterval};

// ============================================================================
// Helper functions
// ============================================================================

fn synthetic_stack(years: &[i32], width: usize, height: usize) -> AnnualStack {
    let axes = GridAxes::new(
        (0..width).map(|i| 900_000.0 + i as f64 * 1000.0).collect(),
        (0..height).map(|j| 6_400_000.0 + j as f64 * 1000.0).collect(),
    );
    AnnualStack::new(axes, years.to_vec(), create_day_count_stack(years, width, height)).unwrap()
}

/// Write a one-year `(y, x)` file; the year comes from the file name.
fn write_year_file(dir: &Path, year: i32, x: &[f64], values: &[f32]) {
    let path = dir.join(format!("freezing_days_per_year_{}.nc", year));
    let mut file = netcdf::create(&path).unwrap();
    file.add_dimension("y", 1).unwrap();
    file.add_dimension("x", x.len()).unwrap();

    let mut y_var = file.add_variable::<f64>("y", &["y"]).unwrap();
    y_var.put_values(&[45.0], ..).unwrap();
    let mut x_var = file.add_variable::<f64>("x", &["x"]).unwrap();
    x_var.put_values(x, ..).unwrap();

    let mut var = file.add_variable::<f32>("freezing_days", &["y", "x"]).unwrap();
    var.put_values(values, ..).unwrap();
}

// ============================================================================
// Interval aggregation
// ============================================================================

#[test]
fn test_interval_mean_over_twenty_years() {
    let years = years::full_range();
    assert_eq!(years.first(), Some(&1990));
    assert_eq!(years.last(), Some(&2099));

    let (width, height) = (4, 3);
    let stack = synthetic_stack(&years, width, height);
    let interval = YearInterval::new(2020, 2040).unwrap();

    let means = aggregate_intervals(&stack, &[interval]);
    let mean = &means[0];

    assert_eq!(mean.years_used, (2020..2040).collect::<Vec<_>>());
    assert_eq!(mean.years_used.len(), 20);

    // Elementwise mean of the annual frames 2020..=2039
    let first = years.iter().position(|&y| y == 2020).unwrap();
    for cell in 0..width * height {
        let expected: f32 = (first..first + 20)
            .map(|i| stack.frame_values(i).unwrap()[cell])
            .sum::<f32>()
            / 20.0;
        assert_approx_eq!(mean.field.values[cell], expected, 1e-4);
        assert_approx_eq!(mean.field.values[cell], 129.5 + cell as f32, 1e-4);
    }
}

#[test]
fn test_default_intervals_cover_fixed_windows() {
    let stack = synthetic_stack(&years::full_range(), 2, 2);
    let means = aggregate_intervals(&stack, &default_intervals());

    let labels: Vec<String> = means.iter().map(|m| m.label()).collect();
    assert_eq!(
        labels,
        vec![
            "1990-2000",
            "2000-2020",
            "2020-2040",
            "2040-2060",
            "2060-2080",
            "2080-2100"
        ]
    );
    assert_eq!(means[0].years_used.len(), 10);
    // The stack stops at 2099
    assert_eq!(means[5].years_used.len(), 20);
}

#[test]
fn test_interval_outside_stack_is_undefined() {
    let stack = synthetic_stack(&[2000, 2001, 2002], 3, 2);
    let means = aggregate_intervals(&stack, &default_intervals());

    // 1990-2000 has no year in the stack
    assert!(means[0].is_empty());
    assert!(means[0].field.is_all_undefined());
    assert_eq!(means[0].field.values.len(), 6);
    assert!(!means[1].field.is_all_undefined());
}

// ============================================================================
// Shared colour bounds
// ============================================================================

#[test]
fn test_global_bounds_cover_every_frame() {
    let years: Vec<i32> = (1990..2000).collect();
    let stack = synthetic_stack(&years, 3, 3);
    let range = stack.value_range().unwrap();

    // min at (1990, cell 0), max at (1999, cell 8)
    assert_eq!(range, ValueRange { min: 90.0, max: 107.0 });

    for i in 0..stack.len() {
        let frame = ValueRange::from_values(stack.frame_values(i).unwrap()).unwrap();
        assert!(frame.min >= range.min && frame.max <= range.max);
    }

    // Interval means lie within the annual bounds
    for mean in aggregate_intervals(&stack, &default_intervals()) {
        if let Some(r) = ValueRange::from_values(&mean.field.values) {
            assert!(r.min >= range.min && r.max <= range.max);
        }
    }
}

// ============================================================================
// Loading from NetCDF files
// ============================================================================

#[test]
fn test_load_concatenates_in_file_name_order() {
    let dir = temp_test_dir();
    let x = [0.0, 1.0];
    write_year_file(dir.path(), 2002, &x, &[30.0, 31.0]);
    write_year_file(dir.path(), 2000, &x, &[10.0, 11.0]);
    write_year_file(dir.path(), 2001, &x, &[20.0, 21.0]);

    let stack = load_annual_stack(dir.path(), "freezing_days_per_year_*.nc", "freezing_days").unwrap();

    assert_eq!(stack.years(), &[2000, 2001, 2002]);
    assert_eq!(stack.frame_values(0).unwrap(), &[10.0, 11.0]);
    assert_eq!(stack.frame_values(2).unwrap(), &[30.0, 31.0]);
}

#[test]
fn test_mismatched_grids_are_rejected() {
    let dir = temp_test_dir();
    write_year_file(dir.path(), 2000, &[0.0, 1.0], &[1.0, 2.0]);
    write_year_file(dir.path(), 2001, &[0.0, 2.0], &[1.0, 2.0]);

    let err = load_annual_stack(dir.path(), "freezing_days_per_year_*.nc", "freezing_days")
        .unwrap_err();
    match err {
        GridProcessorError::GridMismatch { file, .. } => {
            assert!(file.ends_with("freezing_days_per_year_2001.nc"))
        }
        other => panic!("unexpected error: {other}"),
    }
}
