//! Tests for chart composition, plotters drawing and rasterisation.

use renderer::chart::{CategoryAxis, Figure, MarkerShape, Point, Segment, Trace, TraceKind};
use renderer::plot::{figure_layers, figure_svg, render_figure};
use renderer::raster::{pixmap_to_png, SvgRasterizer};
use viz_common::{Color, LineStyle};

// ============================================================================
// Helper functions
// ============================================================================

fn ridge_figure() -> Figure {
    let mut figure = Figure::new("Profil de crêtes (1990-2020)", 1200, 480);
    figure.x_axis = CategoryAxis {
        labels: vec!["Ain".into(), "Isère".into(), "Savoie".into(), "Drôme".into()],
        vertical: true,
    };
    figure.y_label = "Altitude (m)".into();
    figure.grid = true;

    let points = vec![
        Point::new(0, Some(1500.0)),
        Point::new(1, Some(1700.0)),
        Point::new(2, None),
        Point::new(3, Some(2800.0)),
    ];
    figure.add_trace(
        Trace::new(
            TraceKind::Area {
                points,
                fill: Color::new(0xC2, 0xC2, 0xC2, 128),
            },
            Color::rgb(128, 128, 128),
        )
        .named("Sommet")
        .width(2.0),
    );
    figure.add_trace(
        Trace::new(
            TraceKind::Segments {
                segments: vec![
                    Segment { x: 0, y0: 900.0, y1: 1400.0 },
                    Segment { x: 3, y0: 1600.0, y1: 2700.0 },
                ],
            },
            Color::from_hex("#BDF4FF").unwrap(),
        )
        .named("Espace couvert par le domaine skiable")
        .width(8.0),
    );
    figure.add_trace(
        Trace::new(
            TraceKind::Markers {
                points: vec![Point::new(1, Some(212.0)).with_hover("Grenoble: 212 m")],
                shape: MarkerShape::Cross,
                size: 100.0,
            },
            Color::rgb(169, 169, 169),
        )
        .named("Préfecture"),
    );
    figure.add_trace(
        Trace::new(TraceKind::HLine { y: 1800.0 }, Color::from_hex("#2EA8FF").unwrap())
            .named("Isotherme 0° moyen sur la période 1990-2020")
            .width(4.0)
            .style(LineStyle::Dashed),
    );
    figure.annotate(3, 2880.0, "2800 m", 9.0);
    figure
}

// ============================================================================
// Figure model tests
// ============================================================================

#[test]
fn test_y_range_covers_annotations() {
    let figure = ridge_figure();
    let (lo, hi) = figure.resolved_y_range();
    assert_eq!(lo, 0.0);
    assert!(hi > 2880.0);
}

#[test]
fn test_legend_entries_in_order() {
    let figure = ridge_figure();
    let names: Vec<_> = figure
        .legend_entries()
        .filter_map(|(_, t)| t.name.as_deref())
        .collect();
    assert_eq!(
        names,
        [
            "Sommet",
            "Espace couvert par le domaine skiable",
            "Préfecture",
            "Isotherme 0° moyen sur la période 1990-2020"
        ]
    );
}

// ============================================================================
// Static drawing tests
// ============================================================================

#[test]
fn test_static_svg_document() {
    let svg = figure_svg(&ridge_figure()).unwrap();

    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Profil de crêtes (1990-2020)"));
    assert!(svg.contains("Altitude (m)"));
    assert!(svg.contains("Isère"));
    assert!(svg.contains("2800 m"));
    // Legend rows
    assert!(svg.contains("Sommet"));
    assert!(svg.contains("Espace couvert par le domaine skiable"));
    assert!(svg.contains("Isotherme 0° moyen sur la période 1990-2020"));
}

#[test]
fn test_empty_figure_draws() {
    let figure = Figure::new("Vide", 200, 100);
    let svg = figure_svg(&figure).unwrap();
    assert!(svg.contains("Vide"));
}

// ============================================================================
// Layer tests
// ============================================================================

#[test]
fn test_one_layer_per_trace() {
    let figure = ridge_figure();
    let layers = figure_layers(&figure).unwrap();

    assert_eq!(layers.traces.len(), figure.traces.len());
    assert!(layers.base.contains("Altitude (m)"));
    assert!(layers.base.contains("2800 m"));
    for layer in &layers.traces {
        assert!(layer.svg.starts_with("<svg"));
        assert!(!layer.svg.contains("Altitude (m)"));
    }
}

#[test]
fn test_segment_layer_has_one_path_per_station() {
    let layers = figure_layers(&ridge_figure()).unwrap();
    let stations = &layers.traces[1].svg;
    assert_eq!(stations.matches("<polyline").count(), 2);
    assert!(stations.contains("stroke-width=\"8\""));
}

#[test]
fn test_gap_splits_area() {
    let layers = figure_layers(&ridge_figure()).unwrap();
    // Two runs of defined peaks, one filled polygon each
    assert_eq!(layers.traces[0].svg.matches("<polygon").count(), 2);
}

#[test]
fn test_hover_anchors_in_pixels() {
    let figure = ridge_figure();
    let layers = figure_layers(&figure).unwrap();

    let prefecture = &layers.traces[2].hover;
    assert_eq!(prefecture.len(), 1);
    assert_eq!(prefecture[0].series, 2);
    assert_eq!(prefecture[0].text, "Grenoble: 212 m");
    let px = prefecture[0].x.unwrap();
    assert!(px > 0 && px < figure.width as i32);

    let isotherm = &layers.traces[3].hover;
    assert_eq!(isotherm.len(), 1);
    assert!(isotherm[0].x.is_none());
    assert_eq!(isotherm[0].text, "Isotherme 0° moyen sur la période 1990-2020: 1800");
    // Higher altitude sits higher on screen
    assert!(isotherm[0].y < prefecture[0].y);

    // Segments carry no tooltip
    assert!(layers.traces[1].hover.is_empty());
}

// ============================================================================
// Rasterisation tests
// ============================================================================

#[test]
fn test_rasterize_figure() {
    let rasterizer = SvgRasterizer::new(None);
    let pixmap = render_figure(&rasterizer, &ridge_figure()).unwrap();
    assert_eq!((pixmap.width(), pixmap.height()), (1200, 480));

    let corner = pixmap.pixel(0, 0).unwrap();
    assert_eq!((corner.red(), corner.green(), corner.blue(), corner.alpha()), (255, 255, 255, 255));

    let png = pixmap_to_png(&pixmap).unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (1200, 480));
}

#[test]
fn test_rasterize_invalid_svg() {
    let rasterizer = SvgRasterizer::new(None);
    assert!(rasterizer.render("<svg").is_err());
}
