//! Figure drawing with plotters.
//!
//! Figures are drawn on the plotters SVG backend. Static charts are then
//! rasterised by [`SvgRasterizer`], which draws the labels with the loaded
//! font database. Interactive charts are split into a base layer (title,
//! axes, annotations) and one transparent layer per trace; every layer is
//! laid out by the same chart builder, so the layers stack exactly.

use plotters::coord::{CoordTranslate, Shift};
use plotters::element::{DynElement, IntoDynElement};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;
use tiny_skia::Pixmap;

use crate::chart::{Figure, MarkerShape, Point, Trace, TraceKind};
use crate::error::RenderResult;
use crate::raster::SvgRasterizer;

/// Font list written on every text element; resvg picks the first
/// family present in its database.
pub const FONT_FAMILY: &str = "DejaVu Sans, Liberation Sans, Arial, sans-serif";

pub(crate) const INK: RGBAColor = RGBAColor(0x26, 0x26, 0x26, 1.0);
const GRID: RGBAColor = RGBAColor(0xDD, 0xDD, 0xDD, 1.0);
const CLEAR: RGBAColor = RGBAColor(0, 0, 0, 0.0);

/// Convert a shared colour to plotters' colour type.
pub(crate) fn rgba(color: viz_common::Color) -> RGBAColor {
    RGBAColor(color.r, color.g, color.b, color.opacity() as f64)
}

/// Font sizes derived from the figure size.
#[derive(Debug, Clone, Copy)]
struct Fonts {
    base: f64,
}

impl Fonts {
    fn for_figure(figure: &Figure) -> Self {
        let short_side = figure.width.min(figure.height) as f64;
        Self {
            base: (short_side / 36.0).clamp(10.0, 24.0),
        }
    }

    fn title(&self) -> f64 {
        self.base * 1.4
    }

    fn tick(&self) -> f64 {
        self.base * 0.85
    }

    /// Annotation sizes are given for a 13 px base font.
    fn scaled(&self, size: f32) -> f64 {
        size as f64 * self.base / 13.0
    }
}

/// Which part of a figure one drawing pass produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    /// Everything, legend included.
    Full,
    /// Background, title, axes and annotations.
    Base,
    /// One trace on a transparent background.
    Trace(usize),
}

/// Tooltip anchor of an interactive trace, in pixels from the top left.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverPoint {
    /// Index of the trace in the figure.
    pub series: usize,
    /// `None` for a horizontal line, matched on `y` alone.
    pub x: Option<i32>,
    pub y: i32,
    pub text: String,
}

/// The SVG of one trace and its tooltip anchors.
#[derive(Debug, Clone)]
pub struct TraceLayer {
    pub index: usize,
    pub svg: String,
    pub hover: Vec<HoverPoint>,
}

/// A figure split for the interactive document.
#[derive(Debug, Clone)]
pub struct ChartLayers {
    pub base: String,
    pub traces: Vec<TraceLayer>,
}

/// The complete figure, legend included, as an SVG document.
pub fn figure_svg(figure: &Figure) -> RenderResult<String> {
    draw_svg(figure, Layer::Full).map(|(svg, _)| svg)
}

/// Draw the complete figure onto a pixmap.
pub fn render_figure(rasterizer: &SvgRasterizer, figure: &Figure) -> RenderResult<Pixmap> {
    rasterizer.render(&figure_svg(figure)?)
}

/// Base layer plus one layer per trace, in drawing order.
pub fn figure_layers(figure: &Figure) -> RenderResult<ChartLayers> {
    let (base, _) = draw_svg(figure, Layer::Base)?;
    let traces = (0..figure.traces.len())
        .map(|index| {
            let (svg, hover) = draw_svg(figure, Layer::Trace(index))?;
            Ok(TraceLayer { index, svg, hover })
        })
        .collect::<RenderResult<Vec<_>>>()?;
    Ok(ChartLayers { base, traces })
}

fn draw_svg(figure: &Figure, layer: Layer) -> RenderResult<(String, Vec<HoverPoint>)> {
    let mut svg = String::new();
    let hover = {
        let root = SVGBackend::with_string(&mut svg, (figure.width, figure.height)).into_drawing_area();
        let hover = draw_figure(&root, figure, layer)?;
        root.present()?;
        hover
    };
    Ok((svg, hover))
}

fn draw_figure(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    figure: &Figure,
    layer: Layer,
) -> RenderResult<Vec<HoverPoint>> {
    let fonts = Fonts::for_figure(figure);
    let trace_layer = matches!(layer, Layer::Trace(_));
    if !trace_layer {
        root.fill(&WHITE)?;
    }

    // Trace layers keep an invisible caption so the plot area matches the base
    let caption_color = if trace_layer { CLEAR } else { INK };
    let slots = figure.slots();
    let (x_lo, x_hi) = (-0.5, slots as f64 - 0.5);
    let (y_lo, y_hi) = figure.resolved_y_range();

    let mut chart = ChartBuilder::on(root)
        .caption(
            &figure.title,
            (FONT_FAMILY, fonts.title()).into_font().color(&caption_color),
        )
        .margin(fonts.base as u32)
        .x_label_area_size(x_label_area(figure, &fonts))
        .y_label_area_size((fonts.base * 6.0) as u32)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    if !trace_layer {
        let labels = &figure.x_axis.labels;
        let x_formatter = |v: &f64| category_label(labels, *v);
        let y_formatter = |v: &f64| format!("{:.0}", v);
        let tick_font = (FONT_FAMILY, fonts.tick()).into_font();
        let x_tick_font = if figure.x_axis.vertical {
            tick_font.clone().transform(FontTransform::Rotate90)
        } else {
            tick_font.clone()
        };

        let mut mesh = chart.configure_mesh();
        mesh.x_labels(slots)
            .x_label_formatter(&x_formatter)
            .y_labels(10)
            .y_label_formatter(&y_formatter)
            .label_style(tick_font.color(&INK))
            .x_label_style(x_tick_font.color(&INK))
            .y_desc(figure.y_label.as_str())
            .axis_desc_style((FONT_FAMILY, fonts.base).into_font().color(&INK))
            .x_max_light_lines(0)
            .y_max_light_lines(0);
        if figure.grid {
            mesh.bold_line_style(ShapeStyle {
                color: GRID,
                filled: false,
                stroke_width: 1,
            });
        } else {
            mesh.disable_x_mesh().disable_y_mesh();
        }
        mesh.draw()?;
    }

    let mut hover = Vec::new();
    for (index, trace) in figure.traces.iter().enumerate() {
        match layer {
            Layer::Full => {
                draw_trace(&mut chart, trace, (x_lo, x_hi), y_lo)?;
                if let Some(name) = &trace.name {
                    chart
                        .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
                        .label(name.as_str())
                        .legend(LegendGlyph::of(trace).into_legend::<SVGBackend<'_>>());
                }
            }
            Layer::Trace(i) if i == index => {
                draw_trace(&mut chart, trace, (x_lo, x_hi), y_lo)?;
                hover.extend(hover_points(chart.plotting_area(), index, trace, x_lo));
            }
            _ => {}
        }
    }

    if !trace_layer {
        chart.draw_series(figure.annotations.iter().map(|a| {
            Text::new(
                a.text.clone(),
                (a.x as f64, a.y),
                (FONT_FAMILY, fonts.scaled(a.font_size))
                    .into_font()
                    .color(&INK)
                    .pos(Pos::new(HPos::Center, VPos::Bottom)),
            )
        }))?;
    }

    if layer == Layer::Full && figure.legend_entries().next().is_some() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&INK)
            .label_font((FONT_FAMILY, fonts.tick()).into_font().color(&INK))
            .draw()?;
    }

    Ok(hover)
}

/// Room below the plot for the category labels.
fn x_label_area(figure: &Figure, fonts: &Fonts) -> u32 {
    if !figure.x_axis.vertical {
        return (fonts.base * 2.5) as u32;
    }
    let longest = figure
        .x_axis
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    let needed = longest as f64 * fonts.tick() * 0.6 + fonts.base;
    needed.min(figure.height as f64 / 3.0) as u32
}

/// Category name at an integer slot, nothing between slots.
fn category_label(labels: &[String], value: f64) -> String {
    let slot = value.round();
    if (value - slot).abs() > 1e-6 || slot < 0.0 {
        return String::new();
    }
    labels.get(slot as usize).cloned().unwrap_or_default()
}

fn line_style(trace: &Trace) -> ShapeStyle {
    ShapeStyle {
        color: rgba(trace.color),
        filled: false,
        stroke_width: trace.width.round().max(1.0) as u32,
    }
}

/// Runs of consecutive defined points; an undefined point ends a run.
fn defined_runs(points: &[Point]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for p in points {
        match p.y {
            Some(y) if y.is_finite() => current.push((p.x as f64, y)),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Split `[lo, hi]` into dashes of `dash` separated by `gap`.
fn dashes(lo: f64, hi: f64, dash: f64, gap: f64) -> Vec<(f64, f64)> {
    if dash <= 0.0 || hi <= lo {
        return vec![(lo, hi)];
    }
    let mut pieces = Vec::new();
    let mut start = lo;
    while start < hi {
        pieces.push((start, (start + dash).min(hi)));
        start += dash + gap.max(0.0);
    }
    pieces
}

fn draw_trace<CT>(
    chart: &mut ChartContext<'_, SVGBackend<'_>, CT>,
    trace: &Trace,
    (x_lo, x_hi): (f64, f64),
    baseline: f64,
) -> RenderResult<()>
where
    CT: CoordTranslate<From = (f64, f64)>,
{
    let line = line_style(trace);
    match &trace.kind {
        TraceKind::Line { points } => {
            for run in defined_runs(points) {
                chart.draw_series(LineSeries::new(run, line))?;
            }
        }
        TraceKind::Area { points, fill } => {
            for run in defined_runs(points) {
                chart.draw_series(
                    AreaSeries::new(run, baseline, rgba(*fill).filled()).border_style(line),
                )?;
            }
        }
        TraceKind::Markers { points, shape, size } => {
            let radius = (*size / 2.0).round().max(1.0) as i32;
            let coords = points
                .iter()
                .filter_map(|p| p.y.filter(|y| y.is_finite()).map(|y| (p.x as f64, y)));
            match shape {
                MarkerShape::Circle => {
                    let fill = rgba(trace.color).filled();
                    chart.draw_series(coords.map(|c| Circle::new(c, radius, fill)))?;
                }
                MarkerShape::Cross => {
                    chart.draw_series(coords.map(|c| Cross::new(c, radius, line)))?;
                }
            }
        }
        TraceKind::Segments { segments } => {
            chart.draw_series(segments.iter().map(|s| {
                PathElement::new(vec![(s.x as f64, s.y0), (s.x as f64, s.y1)], line)
            }))?;
        }
        TraceKind::HLine { y } => {
            let pieces = match trace.style.dash_lengths(trace.width) {
                Some((dash, gap)) => {
                    let plot_width = chart.plotting_area().dim_in_pixel().0.max(1) as f64;
                    let per_pixel = (x_hi - x_lo) / plot_width;
                    dashes(x_lo, x_hi, dash as f64 * per_pixel, gap as f64 * per_pixel)
                }
                None => vec![(x_lo, x_hi)],
            };
            chart.draw_series(
                pieces
                    .into_iter()
                    .map(|(a, b)| PathElement::new(vec![(a, *y), (b, *y)], line)),
            )?;
        }
    }
    Ok(())
}

/// Tooltip anchors of a trace: its points with hover text, or the line
/// itself for a named horizontal line.
fn hover_points<CT>(
    area: &DrawingArea<SVGBackend<'_>, CT>,
    series: usize,
    trace: &Trace,
    x_lo: f64,
) -> Vec<HoverPoint>
where
    CT: CoordTranslate<From = (f64, f64)>,
{
    match &trace.kind {
        TraceKind::HLine { y } => trace
            .name
            .as_ref()
            .map(|name| HoverPoint {
                series,
                x: None,
                y: area.map_coordinate(&(x_lo, *y)).1,
                text: format!("{}: {}", name, y),
            })
            .into_iter()
            .collect(),
        TraceKind::Line { points }
        | TraceKind::Area { points, .. }
        | TraceKind::Markers { points, .. } => points
            .iter()
            .filter_map(|p| {
                let (y, text) = (p.y?, p.hover.as_ref()?);
                let (px, py) = area.map_coordinate(&(p.x as f64, y));
                Some(HoverPoint {
                    series,
                    x: Some(px),
                    y: py,
                    text: text.clone(),
                })
            })
            .collect(),
        TraceKind::Segments { .. } => Vec::new(),
    }
}

/// Legend sample of a trace.
#[derive(Clone, Copy)]
enum LegendGlyph {
    Line(ShapeStyle),
    Fill(ShapeStyle),
    Circle(ShapeStyle, i32),
    Cross(ShapeStyle, i32),
}

impl LegendGlyph {
    fn of(trace: &Trace) -> Self {
        let line = line_style(trace);
        match &trace.kind {
            TraceKind::Area { fill, .. } => LegendGlyph::Fill(rgba(*fill).filled()),
            TraceKind::Markers { shape, size, .. } => {
                let radius = (*size / 2.0).round().clamp(2.0, 6.0) as i32;
                match shape {
                    MarkerShape::Circle => LegendGlyph::Circle(rgba(trace.color).filled(), radius),
                    MarkerShape::Cross => LegendGlyph::Cross(line, radius),
                }
            }
            TraceKind::Line { .. } | TraceKind::Segments { .. } | TraceKind::HLine { .. } => {
                LegendGlyph::Line(line)
            }
        }
    }

    fn into_legend<DB: DrawingBackend>(
        self,
    ) -> impl Fn((i32, i32)) -> DynElement<'static, DB, (i32, i32)> {
        move |(x, y)| match self {
            LegendGlyph::Line(style) => PathElement::new(vec![(x, y), (x + 20, y)], style).into_dyn(),
            LegendGlyph::Fill(style) => {
                Rectangle::new([(x, y - 5), (x + 20, y + 5)], style).into_dyn()
            }
            LegendGlyph::Circle(style, r) => Circle::new((x + 10, y), r, style).into_dyn(),
            LegendGlyph::Cross(style, r) => Cross::new((x + 10, y), r, style).into_dyn(),
        }
    }
}
