//! Crest-profile charts: one per statistics period.
//!
//! Each chart shows the ridge line (peaks, prefectures, ski areas) under the
//! 0 °C isotherm altitudes of the period, and optionally the maximum
//! altitude of the tropical 20 °C threshold.

use anyhow::{Context, Result};
use crest_data::{CrestPoint, CrestTable, ElevationStats, PeriodStatsTable, ThresholdFamily};
use renderer::{
    chart_document, pixmap_to_png, render_figure, CategoryAxis, Figure, MarkerShape, Point, Segment,
    SvgRasterizer, Trace, TraceKind,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use viz_common::{period_file_stem, Color, LineStyle};

use crate::config::CrestConfig;

pub const PEAK_LEGEND: &str = "Sommet";
pub const PREFECTURE_LEGEND: &str = "Préfecture";
pub const STATION_LEGEND: &str = "Espace couvert par le domaine skiable";
pub const LOW_STATION_LEGEND: &str = "Basse station de ski";
pub const HIGH_STATION_LEGEND: &str = "Haute station de ski";
pub const Y_LABEL: &str = "Altitude (m)";

/// Height of name labels above their point, in metres.
const LABEL_OFFSET: f64 = 80.0;

const PEAK_LINE: Color = Color::rgb(128, 128, 128);
const PEAK_FILL: Color = Color::new(0xC2, 0xC2, 0xC2, 128);
const PREFECTURE_MARKER: Color = Color::rgb(169, 169, 169);
const STATION_CONNECTOR: Color = Color::rgb(0xBD, 0xF4, 0xFF);
const STATION_MARKER: Color = Color::rgb(0, 255, 255);
const TROPICAL_MAX: Color = Color::rgb(0xD1, 0x00, 0x00);

/// One threshold statistic drawn as a horizontal line.
struct ThresholdLine {
    label: &'static str,
    color: Color,
    /// Colour in the interactive document.
    html_color: Color,
    style: LineStyle,
    pick: fn(&ElevationStats) -> Option<f64>,
}

const ISOTHERM_LINES: [ThresholdLine; 3] = [
    ThresholdLine {
        label: "Isotherme 0° pour l'année la plus froide sur la période",
        color: Color::rgb(0x2E, 0xA8, 0xFF),
        html_color: Color::rgb(0, 0, 255),
        style: LineStyle::Dashed,
        pick: stat_min,
    },
    ThresholdLine {
        label: "Isotherme 0° moyen sur la période",
        color: Color::rgb(0x8A, 0xCE, 0xFF),
        html_color: Color::rgb(255, 165, 0),
        style: LineStyle::Solid,
        pick: stat_mean,
    },
    ThresholdLine {
        label: "Isotherme 0° pour l'année la plus chaude sur la période",
        color: Color::rgb(0xB3, 0xDF, 0xFF),
        html_color: Color::rgb(255, 0, 0),
        style: LineStyle::Dashed,
        pick: stat_max,
    },
];

fn stat_min(s: &ElevationStats) -> Option<f64> {
    s.min
}

fn stat_mean(s: &ElevationStats) -> Option<f64> {
    s.mean
}

fn stat_max(s: &ElevationStats) -> Option<f64> {
    s.max
}

// ============================================================================
// Inputs
// ============================================================================

/// Everything the crest charts are drawn from.
#[derive(Debug, Clone)]
pub struct CrestInputs {
    pub table: CrestTable,
    pub isotherm: PeriodStatsTable,
    /// Present when the tropical overlay is enabled.
    pub tropical: Option<PeriodStatsTable>,
}

impl CrestInputs {
    pub fn load(config: &CrestConfig) -> Result<Self> {
        let table = CrestTable::from_path(&config.crest_csv)
            .with_context(|| format!("Failed to load crest table {:?}", config.crest_csv))?;
        let isotherm = PeriodStatsTable::from_path(&config.isotherm_stats, ThresholdFamily::Isotherm0)
            .with_context(|| format!("Failed to load isotherm statistics {:?}", config.isotherm_stats))?;
        let tropical = if config.tropical_overlay {
            Some(
                PeriodStatsTable::from_path(&config.tropical_stats, ThresholdFamily::Tropical20)
                    .with_context(|| {
                        format!("Failed to load tropical statistics {:?}", config.tropical_stats)
                    })?,
            )
        } else {
            None
        };
        Ok(Self {
            table,
            isotherm,
            tropical,
        })
    }

    /// Statistics of every period, in file order, with the tropical row
    /// when the overlay is enabled.
    pub fn periods(&self) -> Result<Vec<PeriodCharts<'_>>> {
        self.isotherm
            .rows()
            .iter()
            .map(|row| {
                let tropical = match &self.tropical {
                    Some(table) => Some(table.get(&row.period).with_context(|| {
                        format!("No tropical statistics for period {}", row.period)
                    })?),
                    None => None,
                };
                Ok(PeriodCharts {
                    period: &row.period,
                    isotherm: &row.elevation,
                    tropical,
                })
            })
            .collect()
    }
}

/// Statistics of one chart.
#[derive(Debug, Clone, Copy)]
pub struct PeriodCharts<'a> {
    pub period: &'a str,
    pub isotherm: &'a ElevationStats,
    pub tropical: Option<&'a ElevationStats>,
}

// ============================================================================
// Figures
// ============================================================================

/// Chart title for a period.
pub fn chart_title(period: &str, tropical: bool) -> String {
    if tropical {
        format!("Profil de crêtes avec altitudes de l'isotherme 0°C et tropic ({})", period)
    } else {
        format!("Profil de crêtes avec altitudes de l'isotherme 0°C ({})", period)
    }
}

/// Output file name of a period's artefact.
pub fn artefact_name(config: &CrestConfig, period: &str, extension: &str) -> String {
    format!(
        "{}{}{}.{}",
        config.file_prefix,
        period_file_stem(period),
        config.file_suffix,
        extension
    )
}

fn base_figure(table: &CrestTable, charts: &PeriodCharts<'_>, width: u32, height: u32) -> Figure {
    let mut figure = Figure::new(chart_title(charts.period, charts.tropical.is_some()), width, height);
    figure.x_axis = CategoryAxis {
        labels: table.points().iter().map(|p| p.department.clone()).collect(),
        vertical: true,
    };
    figure.y_label = Y_LABEL.to_string();
    figure.grid = true;
    figure
}

fn peak_points(table: &CrestTable) -> Vec<Point> {
    table
        .points()
        .iter()
        .enumerate()
        .map(|(x, p)| Point::new(x, p.peak_altitude))
        .collect()
}

/// Name labels above the points, one per x slot.
fn label_points<'a>(
    figure: &mut Figure,
    labels: impl IntoIterator<Item = (Option<f64>, &'a str)>,
    font_size: f32,
) {
    for (x, (altitude, name)) in labels.into_iter().enumerate() {
        if let Some(y) = altitude {
            figure.annotate(x, y + LABEL_OFFSET, name, font_size);
        }
    }
}

fn peak_labels(table: &CrestTable) -> impl Iterator<Item = (Option<f64>, &str)> {
    table.points().iter().map(|p| (p.peak_altitude, p.peak_name.as_str()))
}

fn prefecture_labels(table: &CrestTable) -> impl Iterator<Item = (Option<f64>, &str)> {
    table
        .points()
        .iter()
        .map(|p| (p.prefecture_altitude, p.prefecture_name.as_str()))
}

fn hover(name: &str, altitude: f64) -> String {
    format!("{}: {} m", name, altitude)
}

fn threshold_traces(figure: &mut Figure, charts: &PeriodCharts<'_>, interactive: bool) {
    for line in &ISOTHERM_LINES {
        let Some(y) = (line.pick)(charts.isotherm) else {
            continue;
        };
        let trace = if interactive {
            Trace::new(TraceKind::HLine { y }, line.html_color).width(2.0)
        } else {
            Trace::new(TraceKind::HLine { y }, line.color)
                .width(4.0)
                .style(line.style)
        };
        figure.add_trace(trace.named(format!("{} {}", line.label, charts.period)));
    }

    if let Some(y) = charts.tropical.and_then(|t| t.max) {
        figure.add_trace(
            Trace::new(TraceKind::HLine { y }, TROPICAL_MAX)
                .named(format!("Altitude maximale du seuil 20° sur la période {}", charts.period))
                .width(4.0)
                .style(LineStyle::Dashed),
        );
    }
}

/// The static chart of one period.
///
/// Station rows contribute one connector each to a single trace, so the
/// ski-area legend entry appears once whatever the number of stations.
pub fn static_figure(table: &CrestTable, charts: &PeriodCharts<'_>, config: &CrestConfig) -> Figure {
    let mut figure = base_figure(table, charts, config.width, config.height);

    figure.add_trace(
        Trace::new(
            TraceKind::Area {
                points: peak_points(table),
                fill: PEAK_FILL,
            },
            PEAK_LINE,
        )
        .named(PEAK_LEGEND)
        .width(2.0),
    );
    label_points(&mut figure, peak_labels(table), 9.0);

    figure.add_trace(
        Trace::new(
            TraceKind::Markers {
                points: table
                    .points()
                    .iter()
                    .enumerate()
                    .map(|(x, p)| Point::new(x, p.prefecture_altitude))
                    .collect(),
                shape: MarkerShape::Cross,
                size: 14.0,
            },
            PREFECTURE_MARKER,
        )
        .named(PREFECTURE_LEGEND),
    );
    label_points(&mut figure, prefecture_labels(table), 8.0);

    figure.add_trace(
        Trace::new(
            TraceKind::Segments {
                segments: station_segments(table),
            },
            STATION_CONNECTOR,
        )
        .named(STATION_LEGEND)
        .width(8.0),
    );

    threshold_traces(&mut figure, charts, false);
    figure
}

/// The interactive chart of one period: hover text on every point and
/// separate low/high station traces.
pub fn interactive_figure(table: &CrestTable, charts: &PeriodCharts<'_>, config: &CrestConfig) -> Figure {
    let mut figure = base_figure(table, charts, config.width, config.height);
    let points = table.points();

    figure.add_trace(
        Trace::new(
            TraceKind::Area {
                points: peak_points(table),
                fill: PEAK_FILL,
            },
            PEAK_LINE,
        )
        .named(PEAK_LEGEND)
        .width(2.0),
    );
    figure.add_trace(Trace::new(
        TraceKind::Markers {
            points: points
                .iter()
                .enumerate()
                .filter_map(|(x, p)| {
                    p.peak_altitude
                        .map(|y| Point::new(x, Some(y)).with_hover(hover(&p.peak_name, y)))
                })
                .collect(),
            shape: MarkerShape::Circle,
            size: 8.0,
        },
        PEAK_LINE,
    ));
    label_points(&mut figure, peak_labels(table), 9.0);

    figure.add_trace(
        Trace::new(
            TraceKind::Markers {
                points: points
                    .iter()
                    .enumerate()
                    .map(|(x, p)| {
                        let point = Point::new(x, p.prefecture_altitude);
                        match p.prefecture_altitude {
                            Some(y) => point.with_hover(hover(&p.prefecture_name, y)),
                            None => point,
                        }
                    })
                    .collect(),
                shape: MarkerShape::Cross,
                size: 10.0,
            },
            PREFECTURE_MARKER,
        )
        .named(PREFECTURE_LEGEND),
    );
    label_points(&mut figure, prefecture_labels(table), 8.0);

    let station_markers = |pick: fn(&CrestPoint) -> Option<f64>| -> Vec<Point> {
        table
            .stations()
            .filter_map(|(x, p)| {
                pick(p).map(|y| Point::new(x, Some(y)).with_hover(hover(&p.station_name, y)))
            })
            .collect()
    };
    figure.add_trace(
        Trace::new(
            TraceKind::Markers {
                points: station_markers(|p| p.station_low),
                shape: MarkerShape::Circle,
                size: 10.0,
            },
            STATION_MARKER,
        )
        .named(LOW_STATION_LEGEND),
    );
    figure.add_trace(
        Trace::new(
            TraceKind::Markers {
                points: station_markers(|p| p.station_high),
                shape: MarkerShape::Circle,
                size: 10.0,
            },
            STATION_MARKER,
        )
        .named(HIGH_STATION_LEGEND),
    );
    figure.add_trace(
        Trace::new(
            TraceKind::Segments {
                segments: station_segments(table),
            },
            STATION_MARKER,
        )
        .width(3.0),
    );

    threshold_traces(&mut figure, charts, true);
    figure
}

/// One low-to-high connector per station with both bounds defined.
pub fn station_segments(table: &CrestTable) -> Vec<Segment> {
    table
        .stations()
        .filter_map(|(x, p)| p.station_range().map(|(y0, y1)| Segment { x, y0, y1 }))
        .collect()
}

// ============================================================================
// Pipelines
// ============================================================================

/// Render one PNG per period into the output directory.
pub fn render_static(
    config: &CrestConfig,
    inputs: &CrestInputs,
    rasterizer: &SvgRasterizer,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {:?}", config.output_dir))?;

    let mut written = Vec::new();
    for charts in inputs.periods()? {
        let start = Instant::now();
        let figure = static_figure(&inputs.table, &charts, config);
        let pixmap = render_figure(rasterizer, &figure)
            .with_context(|| format!("Failed to draw chart for {}", charts.period))?;
        let png = pixmap_to_png(&pixmap)?;

        let path = config.output_dir.join(artefact_name(config, charts.period, "png"));
        write_file(&path, &png)?;
        info!(
            period = charts.period,
            path = %path.display(),
            bytes = png.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rendered crest chart"
        );
        written.push(path);
    }
    Ok(written)
}

/// Write one interactive HTML document per period.
pub fn render_interactive(config: &CrestConfig, inputs: &CrestInputs) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.html_output_dir)
        .with_context(|| format!("Failed to create {:?}", config.html_output_dir))?;

    let mut written = Vec::new();
    for charts in inputs.periods()? {
        let figure = interactive_figure(&inputs.table, &charts, config);
        let html = chart_document(&figure)
            .with_context(|| format!("Failed to draw interactive chart for {}", charts.period))?;
        let path = config.html_output_dir.join(artefact_name(config, charts.period, "html"));
        write_file(&path, html.as_bytes())?;
        info!(period = charts.period, path = %path.display(), "Wrote interactive crest chart");
        written.push(path);
    }
    Ok(written)
}

pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("Failed to write {:?}", path))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{crest, stats};

    fn inputs(tropical: bool) -> CrestInputs {
        CrestInputs {
            table: CrestTable::from_reader(crest::FIVE_POINTS_TWO_STATIONS.as_bytes()).unwrap(),
            isotherm: PeriodStatsTable::from_reader(stats::ISOTHERM_0.as_bytes(), ThresholdFamily::Isotherm0)
                .unwrap(),
            tropical: tropical.then(|| {
                PeriodStatsTable::from_reader(stats::TROPICAL_20.as_bytes(), ThresholdFamily::Tropical20)
                    .unwrap()
            }),
        }
    }

    #[test]
    fn test_artefact_name() {
        let mut config = CrestConfig::default();
        assert_eq!(artefact_name(&config, "1990-2020", "png"), "profile_0C_1990_2020.png");
        config.file_suffix = "v2".into();
        assert_eq!(artefact_name(&config, "2021-2040", "html"), "profile_0C_2021_2040v2.html");
    }

    #[test]
    fn test_chart_title() {
        assert_eq!(
            chart_title("2041-2060", false),
            "Profil de crêtes avec altitudes de l'isotherme 0°C (2041-2060)"
        );
        assert!(chart_title("2041-2060", true).contains("et tropic (2041-2060)"));
    }

    #[test]
    fn test_missing_tropical_period_is_fatal() {
        let mut inputs = inputs(true);
        inputs.tropical = Some(
            PeriodStatsTable::from_reader(
                ",min_elevation,mean_elevation,max_elevation\n1990-2020,0,1,2\n".as_bytes(),
                ThresholdFamily::Tropical20,
            )
            .unwrap(),
        );
        let err = inputs.periods().unwrap_err();
        assert!(err.to_string().contains("2021-2040"));
    }

    #[test]
    fn test_interactive_station_traces() {
        let inputs = inputs(false);
        let charts = inputs.periods().unwrap();
        let figure = interactive_figure(&inputs.table, &charts[0], &CrestConfig::default());

        let names: Vec<_> = figure.legend_entries().filter_map(|(_, t)| t.name.as_deref()).collect();
        assert!(names.contains(&LOW_STATION_LEGEND));
        assert!(names.contains(&HIGH_STATION_LEGEND));
        assert!(!names.contains(&STATION_LEGEND));

        let connectors = figure
            .traces
            .iter()
            .find(|t| matches!(t.kind, TraceKind::Segments { .. }))
            .unwrap();
        assert!(connectors.name.is_none());
    }
}
