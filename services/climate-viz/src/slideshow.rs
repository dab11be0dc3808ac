//! Slideshow of the per-period crest charts.

use anyhow::{Context, Result};
use crest_data::PeriodStatsTable;
use renderer::{load_frames, Animation};
use std::path::PathBuf;
use tracing::info;

use crate::config::{CrestConfig, RenderConfig};
use crate::crest::artefact_name;

/// Files written by [`assemble`].
#[derive(Debug, Clone, PartialEq)]
pub struct SlideshowOutputs {
    pub mp4: Option<PathBuf>,
    pub gif: PathBuf,
}

/// Chart images in statistics-table order.
pub fn frame_paths(config: &CrestConfig, periods: &PeriodStatsTable) -> Vec<PathBuf> {
    periods
        .periods()
        .map(|period| config.output_dir.join(artefact_name(config, period, "png")))
        .collect()
}

/// Output paths of the slideshow: `(mp4, gif)`.
pub fn output_paths(config: &CrestConfig) -> (PathBuf, PathBuf) {
    let stem = format!("{}{}", config.animation_name, config.file_suffix);
    (
        config.output_dir.join(format!("{}.mp4", stem)),
        config.output_dir.join(format!("{}.gif", stem)),
    )
}

/// Assemble the already-rendered charts into a GIF, plus an MP4 when
/// `video` is set. Every chart must exist.
pub fn assemble(
    config: &CrestConfig,
    render: &RenderConfig,
    periods: &PeriodStatsTable,
    video: bool,
) -> Result<SlideshowOutputs> {
    let paths = frame_paths(config, periods);
    let frames = load_frames(&paths).context("Cannot assemble slideshow")?;
    let animation = Animation::with_frames(frames, config.slideshow_fps);
    info!(frames = animation.len(), fps = animation.fps(), "Assembling slideshow");

    let (mp4_path, gif_path) = output_paths(config);
    let mp4 = if video {
        animation
            .write_mp4(&mp4_path, &render.ffmpeg)
            .with_context(|| format!("Failed to write {:?}", mp4_path))?;
        Some(mp4_path)
    } else {
        None
    };
    animation
        .write_gif(&gif_path)
        .with_context(|| format!("Failed to write {:?}", gif_path))?;

    Ok(SlideshowOutputs { mp4, gif: gif_path })
}
