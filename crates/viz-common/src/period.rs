//! Helpers for period labels such as "2021-2040".

/// File stem fragment for a period label: every `-` becomes `_`.
///
/// Surrounding whitespace is dropped so labels read from CSV index columns
/// map to the same file name.
pub fn period_file_stem(label: &str) -> String {
    label.trim().replace('-', "_")
}
