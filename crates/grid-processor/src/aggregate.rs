//! Multi-decade interval means of an annual stack.

use tracing::{debug, warn};
use viz_common::YearInterval;

use crate::types::{AnnualStack, Field2D};

/// Mean field over one year interval.
#[derive(Debug, Clone)]
pub struct IntervalMean {
    pub interval: YearInterval,
    /// Stack years that fell inside the interval.
    pub years_used: Vec<i32>,
    /// Per-cell mean; NaN where no matching year had a value.
    pub field: Field2D,
}

impl IntervalMean {
    pub fn label(&self) -> String {
        self.interval.label()
    }

    /// True when no year of the stack fell in the interval.
    pub fn is_empty(&self) -> bool {
        self.years_used.is_empty()
    }
}

/// Per-cell mean over the years `y` with `start <= y < end`, for every
/// interval in order.
///
/// Undefined cells are skipped; a cell undefined in every matching year, or
/// an interval matching no year at all, stays undefined.
pub fn aggregate_intervals(stack: &AnnualStack, intervals: &[YearInterval]) -> Vec<IntervalMean> {
    intervals
        .iter()
        .map(|interval| interval_mean(stack, *interval))
        .collect()
}

fn interval_mean(stack: &AnnualStack, interval: YearInterval) -> IntervalMean {
    let width = stack.axes().width();
    let height = stack.axes().height();
    let cells = width * height;

    let selected: Vec<usize> = stack
        .years()
        .iter()
        .enumerate()
        .filter(|(_, &year)| interval.contains(year))
        .map(|(i, _)| i)
        .collect();

    if selected.is_empty() {
        warn!(interval = %interval, "No annual field falls in interval");
        return IntervalMean {
            interval,
            years_used: Vec::new(),
            field: Field2D::undefined(width, height),
        };
    }

    let mut sums = vec![0.0f64; cells];
    let mut counts = vec![0u32; cells];
    for &i in &selected {
        let Some(frame) = stack.frame_values(i) else {
            continue;
        };
        for (cell, &v) in frame.iter().enumerate() {
            if !v.is_nan() {
                sums[cell] += v as f64;
                counts[cell] += 1;
            }
        }
    }

    let values = sums
        .iter()
        .zip(&counts)
        .map(|(&sum, &n)| if n == 0 { f32::NAN } else { (sum / n as f64) as f32 })
        .collect();

    let years_used: Vec<i32> = selected.iter().map(|&i| stack.years()[i]).collect();
    debug!(
        interval = %interval,
        years = years_used.len(),
        "Computed interval mean"
    );

    IntervalMean {
        interval,
        years_used,
        field: Field2D {
            width,
            height,
            values,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridAxes;

    fn stack(years: Vec<i32>, values: Vec<f32>) -> AnnualStack {
        let cells = values.len() / years.len();
        let axes = GridAxes::new((0..cells).map(|i| i as f64).collect(), vec![0.0]);
        AnnualStack::new(axes, years, values).unwrap()
    }

    #[test]
    fn test_half_open_bounds() {
        let s = stack(vec![1999, 2000, 2001, 2002], vec![1.0, 2.0, 4.0, 8.0]);
        let means = aggregate_intervals(&s, &[YearInterval::new(2000, 2002).unwrap()]);
        assert_eq!(means[0].years_used, vec![2000, 2001]);
        assert_eq!(means[0].field.values, vec![3.0]);
    }

    #[test]
    fn test_nan_cells_are_skipped() {
        let s = stack(
            vec![2000, 2001],
            vec![f32::NAN, 2.0, f32::NAN, 6.0],
        );
        let means = aggregate_intervals(&s, &[YearInterval::new(2000, 2010).unwrap()]);
        assert!(means[0].field.values[0].is_nan());
        assert_eq!(means[0].field.values[1], 4.0);
    }

    #[test]
    fn test_empty_interval_is_undefined() {
        let s = stack(vec![2000], vec![5.0, 6.0]);
        let means = aggregate_intervals(&s, &[YearInterval::new(1950, 1960).unwrap()]);
        assert!(means[0].is_empty());
        assert!(means[0].field.is_all_undefined());
        assert_eq!(means[0].field.width, 2);
    }

    #[test]
    fn test_order_follows_intervals() {
        let s = stack(vec![2000, 2050], vec![1.0, 9.0]);
        let intervals = [
            YearInterval::new(2040, 2060).unwrap(),
            YearInterval::new(2000, 2020).unwrap(),
        ];
        let labels: Vec<String> = aggregate_intervals(&s, &intervals)
            .iter()
            .map(IntervalMean::label)
            .collect();
        assert_eq!(labels, vec!["2040-2060", "2000-2020"]);
    }
}
