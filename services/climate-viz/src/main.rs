//! climate-viz command line.
//!
//! Renders crest-profile charts, their slideshow, and gridded day-count
//! animations from local CSV and NetCDF inputs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use climate_viz::config::{AppConfig, GridPresets};
use climate_viz::crest::{self, CrestInputs};
use climate_viz::grid::{self, GridOutputs};
use climate_viz::slideshow;
use crest_data::{PeriodStatsTable, ThresholdFamily};
use renderer::SvgRasterizer;

#[derive(Parser, Debug)]
#[command(name = "climate-viz")]
#[command(about = "Climate projection charts and animations for the French Alps")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "climate-viz.yaml", env = "CLIMATE_VIZ_CONFIG", global = true)]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info", env = "CLIMATE_VIZ_LOG_LEVEL", global = true)]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one crest-profile chart per period
    Crest {
        /// Write interactive HTML documents instead of PNGs
        #[arg(long)]
        html: bool,

        /// Skip the slideshow after the PNGs
        #[arg(long)]
        no_animation: bool,
    },

    /// Assemble previously rendered crest charts into MP4 and GIF
    Slideshow,

    /// Animate a gridded day-count dataset
    Grid {
        /// Dataset preset
        #[arg(long, value_parser = GridPresets::NAMES)]
        preset: String,

        /// Write interactive HTML documents instead of GIF/MP4
        #[arg(long)]
        html: bool,

        /// Skip the MP4 encoding (the GIF is still written)
        #[arg(long)]
        no_video: bool,
    },
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs);

    let config = AppConfig::load(Some(&args.config))?;

    match args.command {
        Command::Crest { html, no_animation } => run_crest(&config, html, no_animation),
        Command::Slideshow => run_slideshow(&config),
        Command::Grid {
            preset,
            html,
            no_video,
        } => run_grid(&config, &preset, GridOutputs { html, video: !no_video }),
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_crest(config: &AppConfig, html: bool, no_animation: bool) -> Result<()> {
    let inputs = CrestInputs::load(&config.crest)?;
    info!(
        points = inputs.table.len(),
        stations = inputs.table.stations().count(),
        periods = inputs.isotherm.rows().len(),
        tropical = inputs.tropical.is_some(),
        "Loaded crest inputs"
    );

    if html {
        let written = crest::render_interactive(&config.crest, &inputs)?;
        info!(documents = written.len(), "Interactive crest charts done");
        return Ok(());
    }

    let rasterizer = SvgRasterizer::new(config.render.font_dir.as_deref());
    let written = crest::render_static(&config.crest, &inputs, &rasterizer)?;
    info!(charts = written.len(), "Crest charts done");

    if !no_animation {
        let outputs = slideshow::assemble(&config.crest, &config.render, &inputs.isotherm, true)?;
        info!(gif = %outputs.gif.display(), mp4 = ?outputs.mp4, "Slideshow done");
    }
    Ok(())
}

fn run_slideshow(config: &AppConfig) -> Result<()> {
    let stats = &config.crest.isotherm_stats;
    let periods = PeriodStatsTable::from_path(stats, ThresholdFamily::Isotherm0)
        .with_context(|| format!("Failed to load isotherm statistics {:?}", stats))?;
    let outputs = slideshow::assemble(&config.crest, &config.render, &periods, true)?;
    info!(gif = %outputs.gif.display(), mp4 = ?outputs.mp4, "Slideshow done");
    Ok(())
}

fn run_grid(config: &AppConfig, name: &str, outputs: GridOutputs) -> Result<()> {
    netcdf_parser::silence_hdf5_errors();

    let preset = config
        .grids
        .get(name)
        .with_context(|| format!("Unknown preset '{}', expected one of {:?}", name, GridPresets::NAMES))?;
    info!(preset = name, data_dir = %preset.data_dir.display(), html = outputs.html, "Animating grid");

    let written = grid::run_preset(preset, &config.render, outputs)?;
    for path in &written {
        info!(path = %path.display(), "Wrote");
    }
    Ok(())
}
