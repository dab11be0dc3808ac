//! Figure model for category-axis line charts.
//!
//! A [`Figure`] is a list of [`Trace`]s drawn over a categorical x axis
//! (one slot per data row) and a linear y axis. The same figure feeds the
//! static PNG output and the interactive document (see [`crate::plot`]);
//! only the traces with a legend name appear in the legend.

use viz_common::{Color, LineStyle};

/// Marker glyph for point traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Cross,
}

/// One marker; `y = None` leaves the slot empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: usize,
    pub y: Option<f64>,
    /// Hover text in interactive output.
    pub hover: Option<String>,
}

impl Point {
    pub fn new(x: usize, y: Option<f64>) -> Self {
        Self { x, y, hover: None }
    }

    pub fn with_hover(mut self, text: impl Into<String>) -> Self {
        self.hover = Some(text.into());
        self
    }
}

/// Vertical span at one x slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x: usize,
    pub y0: f64,
    pub y1: f64,
}

/// Geometry of a trace.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceKind {
    /// Polyline through defined points; undefined points break the line.
    Line { points: Vec<Point> },
    /// Polyline with the area down to y = 0 filled.
    Area { points: Vec<Point>, fill: Color },
    /// Isolated markers.
    Markers { points: Vec<Point>, shape: MarkerShape, size: f32 },
    /// Vertical segments sharing one style.
    Segments { segments: Vec<Segment> },
    /// Horizontal line across the whole plot.
    HLine { y: f64 },
}

/// A styled series.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Legend label; `None` keeps the trace out of the legend.
    pub name: Option<String>,
    pub kind: TraceKind,
    pub color: Color,
    pub width: f32,
    pub style: LineStyle,
}

impl Trace {
    pub fn new(kind: TraceKind, color: Color) -> Self {
        Self {
            name: None,
            kind,
            color,
            width: 1.5,
            style: LineStyle::Solid,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    /// Every defined y value the trace draws.
    fn y_values(&self) -> Vec<f64> {
        let values: Vec<f64> = match &self.kind {
            TraceKind::Line { points }
            | TraceKind::Area { points, .. }
            | TraceKind::Markers { points, .. } => points.iter().filter_map(|p| p.y).collect(),
            TraceKind::Segments { segments } => {
                segments.iter().flat_map(|s| [s.y0, s.y1]).collect()
            }
            TraceKind::HLine { y } => vec![*y],
        };
        values.into_iter().filter(|v| v.is_finite()).collect()
    }

    pub fn max_y(&self) -> Option<f64> {
        self.y_values().into_iter().reduce(f64::max)
    }

    pub fn min_y(&self) -> Option<f64> {
        self.y_values().into_iter().reduce(f64::min)
    }
}

/// Text placed in data coordinates, anchored at its bottom centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub x: usize,
    pub y: f64,
    pub text: String,
    pub font_size: f32,
}

/// Category x axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryAxis {
    pub labels: Vec<String>,
    /// Draw tick labels rotated a quarter turn, reading downwards.
    pub vertical: bool,
}

/// A complete chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_axis: CategoryAxis,
    pub y_label: String,
    /// Fixed y range; derived from the traces when `None`.
    pub y_range: Option<(f64, f64)>,
    pub grid: bool,
    pub traces: Vec<Trace>,
    pub annotations: Vec<Annotation>,
}

impl Figure {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            x_axis: CategoryAxis::default(),
            y_label: String::new(),
            y_range: None,
            grid: false,
            traces: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    pub fn annotate(&mut self, x: usize, y: f64, text: impl Into<String>, font_size: f32) {
        self.annotations.push(Annotation {
            x,
            y,
            text: text.into(),
            font_size,
        });
    }

    /// Number of x slots.
    pub fn slots(&self) -> usize {
        self.x_axis.labels.len().max(1)
    }

    /// Traces shown in the legend, in drawing order.
    pub fn legend_entries(&self) -> impl Iterator<Item = (usize, &Trace)> {
        self.traces
            .iter()
            .enumerate()
            .filter(|(_, t)| t.name.is_some())
    }

    /// The y range to draw: the fixed one, or 0 up to 5 % above the highest
    /// trace or annotation.
    pub fn resolved_y_range(&self) -> (f64, f64) {
        if let Some(range) = self.y_range {
            return range;
        }
        let top = self
            .traces
            .iter()
            .filter_map(Trace::max_y)
            .chain(self.annotations.iter().map(|a| a.y))
            .fold(0.0f64, f64::max);
        let bottom = self
            .traces
            .iter()
            .filter_map(Trace::min_y)
            .fold(0.0f64, f64::min);
        if top <= bottom {
            return (bottom, bottom + 1.0);
        }
        (bottom, top + (top - bottom) * 0.05)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_skips_unnamed() {
        let mut fig = Figure::new("t", 100, 100);
        fig.add_trace(Trace::new(TraceKind::HLine { y: 1.0 }, Color::rgb(0, 0, 0)).named("a"));
        fig.add_trace(Trace::new(TraceKind::HLine { y: 2.0 }, Color::rgb(0, 0, 0)));
        let names: Vec<_> = fig
            .legend_entries()
            .map(|(_, t)| t.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_resolved_range_includes_annotations() {
        let mut fig = Figure::new("t", 100, 100);
        fig.add_trace(Trace::new(
            TraceKind::Line {
                points: vec![Point::new(0, Some(1000.0)), Point::new(1, None)],
            },
            Color::rgb(0, 0, 0),
        ));
        fig.annotate(0, 2000.0, "label", 9.0);
        let (lo, hi) = fig.resolved_y_range();
        assert_eq!(lo, 0.0);
        assert!((hi - 2100.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_bounds() {
        let trace = Trace::new(
            TraceKind::Segments {
                segments: vec![Segment { x: 0, y0: 1200.0, y1: 2800.0 }],
            },
            Color::rgb(0, 0, 0),
        );
        assert_eq!(trace.min_y(), Some(1200.0));
        assert_eq!(trace.max_y(), Some(2800.0));
    }
}
