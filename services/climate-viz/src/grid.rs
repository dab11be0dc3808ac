//! Gridded day-count animations: one frame per year, then one per interval
//! mean, both on the colour scale of the whole annual stack.

use anyhow::{Context, Result};
use grid_processor::{aggregate_intervals, load_annual_stack, AnnualStack, Field2D, IntervalMean};
use renderer::{
    pixmap_to_image, pixmap_to_png, render_heatmap, Animation, ColorScale, HeatmapDocument,
    HeatmapFrame, HeatmapStyle, SvgRasterizer,
};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::{GridPreset, RenderConfig};
use crate::crest::write_file;

/// Which outputs to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOutputs {
    /// Interactive documents instead of GIF/MP4.
    pub html: bool,
    /// MP4 alongside the GIF.
    pub video: bool,
}

/// The two frame sequences of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Annual,
    Intervals,
}

impl Pass {
    fn file_suffix(&self) -> &'static str {
        match self {
            Pass::Annual => "evolution",
            Pass::Intervals => "intervals",
        }
    }

    fn html_suffix(&self) -> &'static str {
        match self {
            Pass::Annual => "years_animation",
            Pass::Intervals => "intervals_animation",
        }
    }
}

pub fn annual_title(label: &str, year: i32) -> String {
    format!("{} - Année {}", label, year)
}

pub fn interval_title(label: &str, interval: &str) -> String {
    format!("{} - Intervalle {}", label, interval)
}

/// Title of the interactive document of a pass.
pub fn document_title(label: &str, pass: Pass) -> String {
    match pass {
        Pass::Annual => format!("{} - Évolution par année", label),
        Pass::Intervals => format!("{} - Moyenne par intervalle", label),
    }
}

fn slider_prefix(pass: Pass) -> &'static str {
    match pass {
        Pass::Annual => "Année: ",
        Pass::Intervals => "Intervalle: ",
    }
}

/// Output file of a pass with the given extension.
pub fn output_path(preset: &GridPreset, pass: Pass, extension: &str) -> PathBuf {
    match extension {
        "html" => preset
            .html_output_dir
            .join(format!("{}_{}.html", preset.output_stem, pass.html_suffix())),
        _ => preset
            .output_dir
            .join(format!("{}_{}.{}", preset.output_stem, pass.file_suffix(), extension)),
    }
}

/// Colour scale over the global range of the stack; `[0, 1]` when no cell
/// holds a value.
pub fn shared_scale(stack: &AnnualStack, preset: &GridPreset) -> ColorScale {
    let range = match stack.value_range() {
        Some(range) => range,
        None => {
            warn!(variable = %preset.variable, "Stack has no defined value, colour scale falls back to [0, 1]");
            Default::default()
        }
    };
    ColorScale::new(range.min, range.max, preset.ramp)
}

/// One titled frame of a sequence.
struct SequenceFrame<'a> {
    /// Slider label and frame file stem.
    name: String,
    title: String,
    values: &'a [f32],
}

fn annual_frames<'a>(stack: &'a AnnualStack, preset: &GridPreset) -> Vec<SequenceFrame<'a>> {
    stack
        .years()
        .iter()
        .enumerate()
        .filter_map(|(i, &year)| {
            stack.frame_values(i).map(|values| SequenceFrame {
                name: year.to_string(),
                title: annual_title(&preset.label, year),
                values,
            })
        })
        .collect()
}

fn interval_frames<'a>(means: &'a [IntervalMean], preset: &GridPreset) -> Vec<SequenceFrame<'a>> {
    means
        .iter()
        .map(|mean| SequenceFrame {
            name: mean.label(),
            title: interval_title(&preset.label, &mean.label()),
            values: &mean.field.values,
        })
        .collect()
}

/// Run both passes of a preset.
pub fn run_preset(preset: &GridPreset, render: &RenderConfig, outputs: GridOutputs) -> Result<Vec<PathBuf>> {
    let stack = load_annual_stack(&preset.data_dir, &preset.pattern, &preset.variable)
        .with_context(|| format!("Failed to load {} from {:?}", preset.variable, preset.data_dir))?;
    let scale = shared_scale(&stack, preset);
    info!(
        variable = %preset.variable,
        years = stack.len(),
        vmin = scale.min,
        vmax = scale.max,
        "Shared colour scale"
    );

    let means = aggregate_intervals(&stack, &preset.intervals);
    let sequences = [
        (Pass::Annual, annual_frames(&stack, preset)),
        (Pass::Intervals, interval_frames(&means, preset)),
    ];

    let run = PresetRun {
        stack: &stack,
        preset,
        render,
        scale,
    };
    let mut written = Vec::new();
    if outputs.html {
        fs::create_dir_all(&preset.html_output_dir)
            .with_context(|| format!("Failed to create {:?}", preset.html_output_dir))?;
        for (pass, frames) in &sequences {
            written.push(run.write_document(*pass, frames)?);
        }
    } else {
        fs::create_dir_all(&preset.output_dir)
            .with_context(|| format!("Failed to create {:?}", preset.output_dir))?;
        let rasterizer = SvgRasterizer::new(render.font_dir.as_deref());
        for (pass, frames) in &sequences {
            written.extend(run.write_animation(&rasterizer, *pass, frames, outputs.video)?);
        }
    }
    Ok(written)
}

/// Shared state of the two passes of a preset.
struct PresetRun<'a> {
    stack: &'a AnnualStack,
    preset: &'a GridPreset,
    render: &'a RenderConfig,
    scale: ColorScale,
}

impl PresetRun<'_> {
    fn write_animation(
        &self,
        rasterizer: &SvgRasterizer,
        pass: Pass,
        frames: &[SequenceFrame<'_>],
        video: bool,
    ) -> Result<Vec<PathBuf>> {
        let (stack, preset, render, scale) = (self.stack, self.preset, self.render, &self.scale);
        let start = Instant::now();
        let style = HeatmapStyle {
            width: preset.width,
            height: preset.height,
            colorbar_label: preset.label.clone(),
            ..HeatmapStyle::default()
        };
        let fps = match pass {
            Pass::Annual => preset.annual_fps,
            Pass::Intervals => preset.interval_fps,
        };
        let frames_dir = preset
            .output_dir
            .join(format!("{}_{}_frames", preset.output_stem, pass.file_suffix()));
        if preset.keep_frames {
            fs::create_dir_all(&frames_dir).with_context(|| format!("Failed to create {:?}", frames_dir))?;
        }

        let axes = stack.axes();
        let mut animation = Animation::new(fps);
        for frame in frames {
            let heatmap = HeatmapFrame {
                title: &frame.title,
                values: frame.values,
                x: &axes.x,
                y: &axes.y,
            };
            let pixmap = render_heatmap(rasterizer, &style, &heatmap, scale)
                .with_context(|| format!("Failed to render frame {}", frame.name))?;
            if preset.keep_frames {
                write_file(&frames_dir.join(format!("{}.png", frame.name)), &pixmap_to_png(&pixmap)?)?;
            }
            animation.push(pixmap_to_image(&pixmap)?);
        }

        let mut written = Vec::new();
        if video {
            let path = output_path(preset, pass, "mp4");
            animation
                .write_mp4(&path, &render.ffmpeg)
                .with_context(|| format!("Failed to write {:?}", path))?;
            written.push(path);
        }
        let path = output_path(preset, pass, "gif");
        animation
            .write_gif(&path)
            .with_context(|| format!("Failed to write {:?}", path))?;
        written.push(path);

        info!(
            pass = ?pass,
            frames = animation.len(),
            fps,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rendered heatmap animation"
        );
        Ok(written)
    }

    fn write_document(&self, pass: Pass, frames: &[SequenceFrame<'_>]) -> Result<PathBuf> {
        let axes = self.stack.axes();
        let rows = frames
            .iter()
            .map(|f| {
                let field = Field2D::new(axes.width(), axes.height(), f.values.to_vec())?;
                Ok((f.name.clone(), field.rows()))
            })
            .collect::<grid_processor::Result<Vec<_>>>()?;
        let doc = heatmap_document(self.stack, self.preset, &self.scale, pass, rows);
        let html = doc.to_html()?;

        let path = output_path(self.preset, pass, "html");
        write_file(&path, html.as_bytes())?;
        info!(pass = ?pass, frames = doc.frames.len(), path = %path.display(), "Wrote interactive heatmap");
        Ok(path)
    }
}

/// Build the interactive document of one pass.
pub fn heatmap_document(
    stack: &AnnualStack,
    preset: &GridPreset,
    scale: &ColorScale,
    pass: Pass,
    frames: impl IntoIterator<Item = (String, Vec<Vec<Option<f32>>>)>,
) -> HeatmapDocument {
    let axes = stack.axes();
    let mut doc = HeatmapDocument::new(
        document_title(&preset.label, pass),
        axes.x.clone(),
        axes.y.clone(),
        scale,
    );
    doc.colorbar_title = preset.label.clone();
    doc.slider_prefix = slider_prefix(pass).to_string();
    doc.width = preset.width;
    doc.height = preset.height;
    doc.frame_duration_ms = match pass {
        Pass::Annual => preset.annual_frame_ms,
        Pass::Intervals => preset.interval_frame_ms,
    };
    for (name, z) in frames {
        doc.push_frame(name, z);
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names() {
        let preset = GridPreset::freezing();
        assert_eq!(
            output_path(&preset, Pass::Annual, "mp4"),
            PathBuf::from("isotherme_animations/freezing_days_evolution.mp4")
        );
        assert_eq!(
            output_path(&preset, Pass::Intervals, "gif"),
            PathBuf::from("isotherme_animations/freezing_days_intervals.gif")
        );
        assert_eq!(
            output_path(&preset, Pass::Annual, "html"),
            PathBuf::from("isotherme_animations_plotly/freezing_days_years_animation.html")
        );
        let tropical = GridPreset::tropical();
        assert_eq!(
            output_path(&tropical, Pass::Intervals, "html"),
            PathBuf::from("tropical_animations_plotly/tropical_days_intervals_animation.html")
        );
    }

    #[test]
    fn test_document_rows_mark_undefined_cells() {
        let dir = test_utils::temp_test_dir();
        let preset = GridPreset {
            html_output_dir: dir.path().to_path_buf(),
            ..GridPreset::freezing()
        };
        let axes = grid_processor::GridAxes::new(vec![5.0, 6.0], vec![44.0, 44.5]);
        let stack = AnnualStack::new(axes, vec![2030], vec![1.0, f32::NAN, 3.0, 4.0]).unwrap();
        let render = RenderConfig::default();
        let run = PresetRun {
            stack: &stack,
            preset: &preset,
            render: &render,
            scale: shared_scale(&stack, &preset),
        };

        let frames = annual_frames(&stack, &preset);
        let path = run.write_document(Pass::Annual, &frames).unwrap();
        let html = fs::read_to_string(path).unwrap();
        assert!(html.contains(r#"{"name":"2030","z":[[1.0,null],[3.0,4.0]]}"#));
    }

    #[test]
    fn test_titles() {
        assert_eq!(annual_title("Jours de gel", 2034), "Jours de gel - Année 2034");
        assert_eq!(interval_title("Nuits tropicales", "2020-2040"), "Nuits tropicales - Intervalle 2020-2040");
        assert_eq!(document_title("Jours de gel", Pass::Annual), "Jours de gel - Évolution par année");
        assert_eq!(document_title("Jours de gel", Pass::Intervals), "Jours de gel - Moyenne par intervalle");
    }
}
