//! Heatmap frames for gridded day counts.
//!
//! A frame is drawn with plotters on the SVG backend: one filled cell per
//! defined grid value, axes and title around it, and a colour bar in a
//! strip split off the right edge. The SVG is then rasterised by
//! [`SvgRasterizer`].

use std::ops::Range;

use plotters::coord::Shift;
use plotters::prelude::*;
use tiny_skia::Pixmap;
use viz_common::ColorRamp;

use crate::error::{RenderError, RenderResult};
use crate::plot::{rgba, FONT_FAMILY, INK};
use crate::raster::SvgRasterizer;

/// Number of discrete colours a ramp is sampled into.
const RAMP_STEPS: usize = 256;
/// Bands of the colour bar gradient.
const COLORBAR_STEPS: usize = 100;

/// Value bounds and ramp shared by every frame of a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f32,
    pub max: f32,
    pub ramp: ColorRamp,
}

impl ColorScale {
    pub fn new(min: f32, max: f32, ramp: ColorRamp) -> Self {
        Self { min, max, ramp }
    }

    /// Position of `value` in [0, 1]; a flat scale maps everything to 0.
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span.abs() < f32::EPSILON {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    /// Colour of a cell, quantised to one of the ramp's 256 levels.
    /// Undefined values have none.
    pub fn color(&self, value: f32) -> Option<viz_common::Color> {
        if value.is_nan() {
            return None;
        }
        let last = (RAMP_STEPS - 1) as f32;
        let level = (self.normalize(value) * last).round();
        Some(self.ramp.color_at(level / last))
    }
}

/// Labels and canvas size of a heatmap sequence.
#[derive(Debug, Clone)]
pub struct HeatmapStyle {
    pub width: u32,
    pub height: u32,
    pub colorbar_label: String,
    pub x_label: String,
    pub y_label: String,
    pub font_size: f32,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            colorbar_label: String::new(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            font_size: 13.0,
        }
    }
}

/// One frame: a title and a row-major grid on the given axes.
#[derive(Debug, Clone, Copy)]
pub struct HeatmapFrame<'a> {
    pub title: &'a str,
    pub values: &'a [f32],
    pub x: &'a [f64],
    pub y: &'a [f64],
}

/// Outer edges of cells centred on `coords`.
fn extent(coords: &[f64]) -> (f64, f64) {
    let (first, last) = match (coords.first(), coords.last()) {
        (Some(&f), Some(&l)) => (f.min(l), f.max(l)),
        _ => return (0.0, 1.0),
    };
    if coords.len() < 2 {
        return (first - 0.5, first + 0.5);
    }
    let half = (last - first) / (coords.len() - 1) as f64 / 2.0;
    (first - half, last + half)
}

/// Tick label precision for an axis spanning `span`.
fn axis_label(value: f64, span: f64) -> String {
    if span.abs() >= 10.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// One heatmap frame as an SVG document.
///
/// Cells are centred on their axis values, so a descending y axis puts the
/// first data row at the top and an ascending one puts it at the bottom.
pub fn heatmap_svg(
    style: &HeatmapStyle,
    frame: &HeatmapFrame<'_>,
    scale: &ColorScale,
) -> RenderResult<String> {
    let (w, h) = (frame.x.len(), frame.y.len());
    if frame.values.len() != w * h {
        return Err(RenderError::FrameShape {
            width: w,
            height: h,
            len: frame.values.len(),
        });
    }

    let fs = style.font_size as f64;
    let font = (FONT_FAMILY, fs).into_font();
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (style.width, style.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let bar_width = (fs * 9.0) as u32;
        let (plot_area, bar_area) = root.split_horizontally(style.width.saturating_sub(bar_width));

        let (x_lo, x_hi) = extent(frame.x);
        let (y_lo, y_hi) = extent(frame.y);
        let mut chart = ChartBuilder::on(&plot_area)
            .caption(frame.title, (FONT_FAMILY, fs * 1.3).into_font().color(&INK))
            .margin(fs as u32)
            .x_label_area_size((fs * 3.0) as u32)
            .y_label_area_size((fs * 5.0) as u32)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

        let x_formatter = |v: &f64| axis_label(*v, x_hi - x_lo);
        let y_formatter = |v: &f64| axis_label(*v, y_hi - y_lo);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(5)
            .y_labels(5)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .x_desc(style.x_label.as_str())
            .y_desc(style.y_label.as_str())
            .label_style(font.clone().color(&INK))
            .axis_desc_style(font.clone().color(&INK))
            .draw()?;

        if w > 0 && h > 0 {
            let half_x = (x_hi - x_lo) / w as f64 / 2.0;
            let half_y = (y_hi - y_lo) / h as f64 / 2.0;
            chart.draw_series(frame.values.chunks(w).zip(frame.y).flat_map(|(row, &y)| {
                row.iter().zip(frame.x).filter_map(move |(&v, &x)| {
                    let color = scale.color(v)?;
                    Some(Rectangle::new(
                        [(x - half_x, y + half_y), (x + half_x, y - half_y)],
                        rgba(color).filled(),
                    ))
                })
            }))?;
        }

        let (_, plot_rows) = chart.plotting_area().get_pixel_range();
        draw_colorbar(&bar_area, style, scale, plot_rows)?;
        root.present()?;
    }
    Ok(svg)
}

/// Colour bar spanning the same rows as the plot, labelled on its right.
fn draw_colorbar(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    style: &HeatmapStyle,
    scale: &ColorScale,
    plot_rows: Range<i32>,
) -> RenderResult<()> {
    let fs = style.font_size as f64;
    let font = (FONT_FAMILY, fs).into_font();
    let (_, height) = area.dim_in_pixel();
    let lo = scale.min as f64;
    let hi = if scale.max as f64 > lo { scale.max as f64 } else { lo + 1.0 };

    let mut bar = ChartBuilder::on(area)
        .margin_top(plot_rows.start.max(0) as u32)
        .margin_bottom((height as i32 - plot_rows.end).max(0) as u32)
        .margin_left((fs * 1.2) as u32)
        .set_label_area_size(LabelAreaPosition::Right, (fs * 6.0) as u32)
        .build_cartesian_2d(0.0..1.0, lo..hi)?;

    let formatter = |v: &f64| axis_label(*v, hi - lo);
    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_labels(6)
        .y_label_formatter(&formatter)
        .y_desc(style.colorbar_label.as_str())
        .label_style(font.clone().color(&INK))
        .axis_desc_style(font.color(&INK))
        .draw()?;

    let band = (hi - lo) / COLORBAR_STEPS as f64;
    let colors = scale.ramp.lookup_table(COLORBAR_STEPS);
    bar.draw_series(colors.into_iter().enumerate().map(|(i, color)| {
        let bottom = lo + band * i as f64;
        Rectangle::new([(0.0, bottom + band), (1.0, bottom)], rgba(color).filled())
    }))?;
    Ok(())
}

/// Draw one heatmap frame.
pub fn render_heatmap(
    rasterizer: &SvgRasterizer,
    style: &HeatmapStyle,
    frame: &HeatmapFrame<'_>,
    scale: &ColorScale,
) -> RenderResult<Pixmap> {
    rasterizer.render(&heatmap_svg(style, frame, scale)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_half_cells() {
        assert_eq!(extent(&[0.0, 10.0, 20.0]), (-5.0, 25.0));
        assert_eq!(extent(&[20.0, 10.0, 0.0]), (-5.0, 25.0));
        assert_eq!(extent(&[3.0]), (2.5, 3.5));
    }

    #[test]
    fn test_axis_label_precision() {
        assert_eq!(axis_label(950000.0, 400000.0), "950000");
        assert_eq!(axis_label(5.25, 2.5), "5.25");
    }

    #[test]
    fn test_svg_contains_labels() {
        let style = HeatmapStyle {
            colorbar_label: "Jours de gel".into(),
            ..HeatmapStyle::default()
        };
        let frame = HeatmapFrame {
            title: "Jours de gel - Année 2034",
            values: &[1.0, 2.0],
            x: &[0.0, 1.0],
            y: &[0.0],
        };
        let scale = ColorScale::new(0.0, 200.0, ColorRamp::Blues);
        let svg = heatmap_svg(&style, &frame, &scale).unwrap();
        assert!(svg.contains("Jours de gel - Année 2034"));
        assert!(svg.contains(">Jours de gel<"));
        assert!(svg.contains(">200<"));
    }
}
