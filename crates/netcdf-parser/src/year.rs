//! Decoding of the year axis.
//!
//! Yearly files carry their year either as a plain integer coordinate, as a
//! CF calendar coordinate (`"days since 1990-01-01"`), or only in the file
//! name (`freezing_days_per_year_2034.nc`).

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};
use std::path::Path;

use crate::error::{NetCdfError, NetCdfResult};

/// Convert raw year-axis values to calendar years.
pub fn decode_years(values: &[f64], units: Option<&str>) -> NetCdfResult<Vec<i32>> {
    match units.and_then(parse_reference_units) {
        Some((step, reference)) => values
            .iter()
            .map(|&v| offset_year(reference, step, v))
            .collect(),
        None => values
            .iter()
            .map(|&v| {
                if v.is_finite() {
                    Ok(v.round() as i32)
                } else {
                    Err(NetCdfError::InvalidYear(format!("non-finite year value {}", v)))
                }
            })
            .collect(),
    }
}

/// Extract the last four-digit group of a file stem as a year.
pub fn year_from_file_name(path: &Path) -> Option<i32> {
    let stem = path.file_stem()?.to_str()?;
    let digits: Vec<char> = stem.chars().collect();
    let mut best = None;
    let mut i = 0;
    while i < digits.len() {
        if digits[i].is_ascii_digit() {
            let start = i;
            while i < digits.len() && digits[i].is_ascii_digit() {
                i += 1;
            }
            if i - start == 4 {
                let group: String = digits[start..i].iter().collect();
                best = group.parse().ok();
            }
        } else {
            i += 1;
        }
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TimeStep {
    Milliseconds(f64),
    Months,
    Years,
}

/// Parse `"<unit> since <date>[ <time>]"`.
fn parse_reference_units(units: &str) -> Option<(TimeStep, NaiveDateTime)> {
    let lower = units.trim().to_ascii_lowercase();
    let (unit, reference) = lower.split_once(" since ")?;

    let step = match unit.trim() {
        "nanoseconds" | "nanosecond" | "ns" => TimeStep::Milliseconds(1e-6),
        "microseconds" | "microsecond" | "us" => TimeStep::Milliseconds(1e-3),
        "milliseconds" | "millisecond" | "ms" => TimeStep::Milliseconds(1.0),
        "seconds" | "second" | "s" => TimeStep::Milliseconds(1e3),
        "minutes" | "minute" | "min" => TimeStep::Milliseconds(60e3),
        "hours" | "hour" | "h" => TimeStep::Milliseconds(3_600e3),
        "days" | "day" | "d" => TimeStep::Milliseconds(86_400e3),
        "months" | "month" => TimeStep::Months,
        "years" | "year" => TimeStep::Years,
        _ => return None,
    };

    let date_part = reference
        .trim()
        .split(|c: char| c == ' ' || c == 'T' || c == 't')
        .next()?;
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    Some((step, date.and_hms_opt(0, 0, 0)?))
}

fn offset_year(reference: NaiveDateTime, step: TimeStep, value: f64) -> NetCdfResult<i32> {
    if !value.is_finite() {
        return Err(NetCdfError::InvalidYear(format!("non-finite time value {}", value)));
    }
    let overflow = || NetCdfError::InvalidYear(format!("time value {} overflows", value));
    match step {
        TimeStep::Years => whole_i64(value.floor())
            .and_then(|years| i32::try_from(years).ok())
            .and_then(|years| reference.year().checked_add(years))
            .ok_or_else(overflow),
        TimeStep::Months => whole_i64(value.floor())
            .and_then(|months| months.checked_add(reference.month0() as i64))
            .and_then(|months| i32::try_from(months.div_euclid(12)).ok())
            .and_then(|years| reference.year().checked_add(years))
            .ok_or_else(overflow),
        TimeStep::Milliseconds(factor) => whole_i64((value * factor).round())
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|offset| reference.checked_add_signed(offset))
            .map(|dt| dt.year())
            .ok_or_else(overflow),
    }
}

/// An integral float as `i64`, or `None` outside the representable range.
fn whole_i64(value: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    (value.is_finite() && (-LIMIT..LIMIT).contains(&value)).then(|| value as i64)
}
