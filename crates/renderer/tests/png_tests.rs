//! Tests for PNG encoding of rendered frames.
//!
//! Frames are decoded back with the `image` crate to check that both the
//! indexed and the RGBA paths produce valid files.

use renderer::heatmap::ColorScale;
use renderer::png::{create_png, create_png_auto, encode_with_choice, PngEncoding};
use test_utils::{create_freezing_days_grid, create_grid_with_nans, create_solid_rgba_pixels, create_test_rgba_pixels};
use viz_common::ColorRamp;

// ============================================================================
// Helper functions
// ============================================================================

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .expect("valid PNG")
        .to_rgba8()
}

/// One RGBA pixel per value; undefined values are transparent.
fn colored_pixels(values: &[f32], scale: &ColorScale) -> Vec<u8> {
    values
        .iter()
        .flat_map(|&v| scale.color(v).map_or([0; 4], |c| [c.r, c.g, c.b, c.a]))
        .collect()
}

/// A colourised freezing-days frame: at most 256 ramp colours.
fn heatmap_pixels(width: usize, height: usize) -> Vec<u8> {
    let values = create_freezing_days_grid(width, height);
    colored_pixels(&values, &ColorScale::new(0.0, 200.0, ColorRamp::Blues))
}

// ============================================================================
// Format selection
// ============================================================================

#[test]
fn test_heatmap_frame_uses_indexed() {
    let pixels = heatmap_pixels(64, 48);
    let (png, encoding) = encode_with_choice(&pixels, 64, 48).unwrap();

    assert_eq!(encoding, PngEncoding::Indexed);
    assert_eq!(&png[0..8], &PNG_SIGNATURE);
    assert_eq!(decode(&png).as_raw(), &pixels);
}

#[test]
fn test_many_colors_fall_back_to_rgba() {
    // 256 * 2 distinct colours
    let pixels = create_test_rgba_pixels(256, 2);
    let (png, encoding) = encode_with_choice(&pixels, 256, 2).unwrap();

    assert_eq!(encoding, PngEncoding::Rgba);
    assert_eq!(decode(&png).as_raw(), &pixels);
}

#[test]
fn test_exactly_256_colors_still_indexed() {
    let pixels: Vec<u8> = (0..256u32).flat_map(|v| [v as u8, v as u8, v as u8, 255]).collect();
    let (_, encoding) = encode_with_choice(&pixels, 256, 1).unwrap();
    assert_eq!(encoding, PngEncoding::Indexed);
}

#[test]
fn test_indexed_smaller_for_heatmaps() {
    let pixels = heatmap_pixels(256, 256);
    let indexed = create_png_auto(&pixels, 256, 256).unwrap();
    let rgba = create_png(&pixels, 256, 256).unwrap();
    assert!(
        indexed.len() < rgba.len(),
        "indexed {} bytes vs RGBA {} bytes",
        indexed.len(),
        rgba.len()
    );
}

// ============================================================================
// Transparency
// ============================================================================

#[test]
fn test_undefined_cells_stay_transparent() {
    let values = create_grid_with_nans(2, 2, &[(1, 0)]);
    let scale = ColorScale::new(0.0, 40.0, ColorRamp::Reds);
    let pixels = colored_pixels(&values, &scale);

    let img = decode(&create_png_auto(&pixels, 2, 2).unwrap());
    assert_eq!(img.get_pixel(1, 0).0[3], 0);
    assert_eq!(img.get_pixel(0, 0).0[3], 255);
}

#[test]
fn test_translucent_rgba_round_trip() {
    let mut pixels = create_test_rgba_pixels(300, 1);
    pixels[3] = 128;
    let img = decode(&create_png(&pixels, 300, 1).unwrap());
    assert_eq!(img.get_pixel(0, 0).0[3], 128);
}

// ============================================================================
// Edge cases
// ============================================================================

#[test]
fn test_single_color_is_small() {
    let pixels = create_solid_rgba_pixels(100, 100, [255, 255, 255, 255]);
    let png = create_png_auto(&pixels, 100, 100).unwrap();
    assert!(png.len() < 1000, "solid 100x100 frame took {} bytes", png.len());
}

#[test]
fn test_wrong_buffer_size() {
    assert!(create_png_auto(&[0u8; 15], 2, 2).is_err());
    assert!(create_png(&[], 0, 0).is_err());
}
