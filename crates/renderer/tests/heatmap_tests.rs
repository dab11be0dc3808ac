//! Tests for heatmap colours and frame drawing.

use renderer::heatmap::{heatmap_svg, render_heatmap, ColorScale, HeatmapFrame, HeatmapStyle};
use renderer::raster::SvgRasterizer;
use test_utils::create_constant_grid;
use tiny_skia::Pixmap;
use viz_common::ColorRamp;

// ============================================================================
// Helper functions
// ============================================================================

fn ramp_rgb(ramp: ColorRamp, t: f32) -> [u8; 3] {
    let c = ramp.color_at(t);
    [c.r, c.g, c.b]
}

/// Pixels of the plot side (left of the colour bar) with the given colour.
fn matching_rows(pixmap: &Pixmap, rgb: [u8; 3], max_x: u32) -> Vec<u32> {
    let mut rows = Vec::new();
    for y in 0..pixmap.height() {
        for x in 0..max_x.min(pixmap.width()) {
            let p = pixmap.pixel(x, y).unwrap();
            if [p.red(), p.green(), p.blue()] == rgb && p.alpha() == 255 {
                rows.push(y);
            }
        }
    }
    rows
}

fn mean(rows: &[u32]) -> f64 {
    rows.iter().map(|&r| r as f64).sum::<f64>() / rows.len() as f64
}

// ============================================================================
// ColorScale tests
// ============================================================================

#[test]
fn test_normalize_clamps() {
    let scale = ColorScale::new(10.0, 110.0, ColorRamp::Blues);
    assert_eq!(scale.normalize(10.0), 0.0);
    assert_eq!(scale.normalize(60.0), 0.5);
    assert_eq!(scale.normalize(-50.0), 0.0);
    assert_eq!(scale.normalize(500.0), 1.0);
}

#[test]
fn test_flat_scale_maps_to_low_end() {
    let scale = ColorScale::new(42.0, 42.0, ColorRamp::Reds);
    assert_eq!(scale.normalize(42.0), 0.0);
    assert_eq!(scale.color(42.0), Some(ColorRamp::Reds.color_at(0.0)));
}

#[test]
fn test_color_extremes_hit_ramp_ends() {
    let scale = ColorScale::new(0.0, 100.0, ColorRamp::Blues);
    assert_eq!(scale.color(0.0), Some(ColorRamp::Blues.color_at(0.0)));
    assert_eq!(scale.color(100.0), Some(ColorRamp::Blues.color_at(1.0)));
}

#[test]
fn test_undefined_value_has_no_color() {
    let scale = ColorScale::new(0.0, 1.0, ColorRamp::Reds);
    assert_eq!(scale.color(f32::NAN), None);
}

#[test]
fn test_shared_scale_same_value_same_color() {
    // Two frames of a sequence with different local ranges share one scale
    let scale = ColorScale::new(0.0, 200.0, ColorRamp::Blues);
    assert_eq!(scale.color(60.0), scale.color(60.0));
    assert_ne!(scale.color(60.0), scale.color(190.0));
}

// ============================================================================
// render_heatmap tests
// ============================================================================

#[test]
fn test_render_heatmap_canvas() {
    let rasterizer = SvgRasterizer::new(None);
    let style = HeatmapStyle::default();
    let values = create_constant_grid(3, 3, 30.0);
    let frame = HeatmapFrame {
        title: "Jours de gel - Année 2034",
        values: &values,
        x: &[0.0, 1.0, 2.0],
        y: &[0.0, 1.0, 2.0],
    };
    let scale = ColorScale::new(0.0, 30.0, ColorRamp::Blues);

    let pixmap = render_heatmap(&rasterizer, &style, &frame, &scale).unwrap();
    assert_eq!((pixmap.width(), pixmap.height()), (800, 600));

    // Corner is background
    let corner = pixmap.pixel(1, 1).unwrap();
    assert_eq!((corner.red(), corner.green(), corner.blue()), (255, 255, 255));

    // The plot area is filled with the top ramp colour
    let filled = matching_rows(&pixmap, ramp_rgb(ColorRamp::Blues, 1.0), 650);
    assert!(filled.len() > 100_000, "{} pixels", filled.len());
}

#[test]
fn test_render_heatmap_undefined_cells_show_background() {
    let rasterizer = SvgRasterizer::new(None);
    let style = HeatmapStyle::default();
    let values = vec![f32::NAN; 4];
    let frame = HeatmapFrame {
        title: "",
        values: &values,
        x: &[0.0, 1.0],
        y: &[0.0, 1.0],
    };
    let scale = ColorScale::new(0.0, 1.0, ColorRamp::Reds);

    let pixmap = render_heatmap(&rasterizer, &style, &frame, &scale).unwrap();
    for t in [0.0, 1.0] {
        assert!(matching_rows(&pixmap, ramp_rgb(ColorRamp::Reds, t), 650).is_empty());
    }
}

#[test]
fn test_row_order_follows_y_axis() {
    let rasterizer = SvgRasterizer::new(None);
    let style = HeatmapStyle::default();
    // Row 0 low, row 1 high
    let values = [0.0, 100.0];
    let scale = ColorScale::new(0.0, 100.0, ColorRamp::Reds);
    let low = ramp_rgb(ColorRamp::Reds, 0.0);
    let high = ramp_rgb(ColorRamp::Reds, 1.0);

    let ascending = HeatmapFrame {
        title: "",
        values: &values,
        x: &[0.0],
        y: &[44.0, 45.0],
    };
    let pixmap = render_heatmap(&rasterizer, &style, &ascending, &scale).unwrap();
    // Northern row on top
    assert!(mean(&matching_rows(&pixmap, high, 650)) < mean(&matching_rows(&pixmap, low, 650)));

    let descending = HeatmapFrame {
        y: &[45.0, 44.0],
        ..ascending
    };
    let pixmap = render_heatmap(&rasterizer, &style, &descending, &scale).unwrap();
    assert!(mean(&matching_rows(&pixmap, high, 650)) > mean(&matching_rows(&pixmap, low, 650)));
}

#[test]
fn test_colorbar_labels() {
    let style = HeatmapStyle {
        colorbar_label: "Jours de gel".into(),
        x_label: "Longitude".into(),
        y_label: "Latitude".into(),
        ..HeatmapStyle::default()
    };
    let values = create_constant_grid(2, 2, 1.0);
    let frame = HeatmapFrame {
        title: "Jours de gel - Année 2034",
        values: &values,
        x: &[5.0, 6.0],
        y: &[44.0, 45.0],
    };
    let scale = ColorScale::new(0.0, 1.0, ColorRamp::Blues);
    let svg = heatmap_svg(&style, &frame, &scale).unwrap();
    assert!(svg.contains("Longitude"));
    assert!(svg.contains("Latitude"));
    assert!(svg.contains("Jours de gel<"));
}

#[test]
fn test_render_heatmap_bad_shape() {
    let rasterizer = SvgRasterizer::new(None);
    let frame = HeatmapFrame {
        title: "x",
        values: &[1.0, 2.0, 3.0],
        x: &[0.0, 1.0],
        y: &[0.0, 1.0],
    };
    let scale = ColorScale::new(0.0, 1.0, ColorRamp::Reds);
    assert!(render_heatmap(&rasterizer, &HeatmapStyle::default(), &frame, &scale).is_err());
}
