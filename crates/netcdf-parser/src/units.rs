//! Conversion of stored day counts to a number of days.
//!
//! Day counts are often written as time deltas (xarray encodes `timedelta64`
//! as integers with a `units` attribute such as `"days"` or
//! `"nanoseconds"`). Plain counts carry no unit, or a non-time unit.

/// Storage unit of a day-count variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayCountUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    /// Values are already counts of days.
    Raw,
}

impl DayCountUnit {
    /// Interpret a CF `units` attribute. Reference-time units
    /// (`"days since ..."`) are not durations and map to [`DayCountUnit::Raw`].
    pub fn from_units_attr(units: Option<&str>) -> Self {
        let Some(units) = units else {
            return DayCountUnit::Raw;
        };
        let units = units.trim().to_ascii_lowercase();
        if units.contains(" since ") {
            return DayCountUnit::Raw;
        }
        match units.as_str() {
            "ns" | "nanosecond" | "nanoseconds" => DayCountUnit::Nanoseconds,
            "us" | "µs" | "microsecond" | "microseconds" => DayCountUnit::Microseconds,
            "ms" | "millisecond" | "milliseconds" => DayCountUnit::Milliseconds,
            "s" | "sec" | "second" | "seconds" => DayCountUnit::Seconds,
            "min" | "minute" | "minutes" => DayCountUnit::Minutes,
            "h" | "hr" | "hour" | "hours" => DayCountUnit::Hours,
            "d" | "day" | "days" => DayCountUnit::Days,
            _ => DayCountUnit::Raw,
        }
    }

    /// Length of one stored unit expressed in days.
    pub fn days_per_unit(&self) -> f64 {
        match self {
            DayCountUnit::Nanoseconds => 1.0 / 86_400e9,
            DayCountUnit::Microseconds => 1.0 / 86_400e6,
            DayCountUnit::Milliseconds => 1.0 / 86_400e3,
            DayCountUnit::Seconds => 1.0 / 86_400.0,
            DayCountUnit::Minutes => 1.0 / 1_440.0,
            DayCountUnit::Hours => 1.0 / 24.0,
            DayCountUnit::Days | DayCountUnit::Raw => 1.0,
        }
    }

    pub fn to_days(&self, value: f64) -> f64 {
        value * self.days_per_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_parsing() {
        assert_eq!(DayCountUnit::from_units_attr(Some("days")), DayCountUnit::Days);
        assert_eq!(
            DayCountUnit::from_units_attr(Some(" Nanoseconds ")),
            DayCountUnit::Nanoseconds
        );
        assert_eq!(
            DayCountUnit::from_units_attr(Some("days since 1990-01-01")),
            DayCountUnit::Raw
        );
        assert_eq!(DayCountUnit::from_units_attr(Some("1")), DayCountUnit::Raw);
        assert_eq!(DayCountUnit::from_units_attr(None), DayCountUnit::Raw);
    }

    #[test]
    fn test_to_days() {
        assert_eq!(DayCountUnit::Days.to_days(42.0), 42.0);
        assert!((DayCountUnit::Nanoseconds.to_days(3.0 * 86_400e9) - 3.0).abs() < 1e-9);
        assert!((DayCountUnit::Hours.to_days(48.0) - 2.0).abs() < 1e-12);
    }
}
