//! Test data generators for synthetic climate fields and images.
//!
//! Values follow closed formulas so expected means and ranges can be
//! computed by hand in assertions.

/// Creates a year-major stack of day-count grids.
///
/// The cell at `(year, row, col)` holds `(year - 1900) + (row * width + col)`,
/// so the mean over any set of years is the mean year offset plus the flat
/// cell index.
///
/// # Example
///
/// ```
/// use test_utils::create_day_count_stack;
///
/// let stack = create_day_count_stack(&[2000, 2001], 2, 1);
/// assert_eq!(stack, vec![100.0, 101.0, 101.0, 102.0]);
/// ```
pub fn create_day_count_stack(years: &[i32], width: usize, height: usize) -> Vec<f32> {
    let cells = width * height;
    let mut data = Vec::with_capacity(years.len() * cells);
    for &year in years {
        for idx in 0..cells {
            data.push((year - 1900) as f32 + idx as f32);
        }
    }
    data
}

/// Creates a freezing-days-like grid: many frost days at the top rows
/// (high ground) decreasing towards the bottom rows.
pub fn create_freezing_days_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let altitude_factor = 1.0 - row as f32 / height.max(1) as f32;
            let ridge = ((col as f32 / width.max(1) as f32) * std::f32::consts::PI).sin();
            data.push((20.0 + 180.0 * altitude_factor * (0.6 + 0.4 * ridge)).round());
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Zero grid with NaN at the given `(col, row)` cells, like sea cells of a
/// land-only field. Out-of-range positions are ignored.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

/// Opaque RGBA gradient: red grows with x, green with y. Holds more
/// than 256 colours once both sides exceed 16 pixels.
pub fn create_test_rgba_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let r = ((x as f32 / width as f32) * 255.0) as u8;
            let g = ((y as f32 / height as f32) * 255.0) as u8;
            let b = 128u8;
            let a = 255u8;
            pixels.extend_from_slice(&[r, g, b, a]);
        }
    }
    pixels
}

/// Creates an opaque RGBA image of a single color.
pub fn create_solid_rgba_pixels(width: usize, height: usize, rgba: [u8; 4]) -> Vec<u8> {
    rgba.iter()
        .copied()
        .cycle()
        .take(width * height * 4)
        .collect()
}
