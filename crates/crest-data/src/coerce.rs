//! Lenient numeric coercion for spreadsheet-exported cells.

/// Parse a cell as a finite number, or `None` when it is empty or malformed.
pub fn coerce_numeric(raw: Option<&str>) -> Option<f64> {
    let cell = raw?.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Trimmed text cell, empty when absent.
pub(crate) fn text_cell(raw: Option<&str>) -> String {
    raw.map(|s| s.trim().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_numeric() {
        assert_eq!(coerce_numeric(Some("2039.4")), Some(2039.4));
        assert_eq!(coerce_numeric(Some(" 1347 ")), Some(1347.0));
        assert_eq!(coerce_numeric(Some("")), None);
        assert_eq!(coerce_numeric(Some("n/a")), None);
        assert_eq!(coerce_numeric(Some("1 200")), None);
        assert_eq!(coerce_numeric(Some("NaN")), None);
        assert_eq!(coerce_numeric(None), None);
    }

    #[test]
    fn test_text_cell() {
        assert_eq!(text_cell(Some("  Mont Blanc ")), "Mont Blanc");
        assert_eq!(text_cell(None), "");
    }
}
