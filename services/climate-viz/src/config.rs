//! Runtime configuration.
//!
//! Settings come from an optional YAML file. `${VAR}` and `${VAR:-default}`
//! references are expanded from the environment before parsing, and the
//! file is merged key by key over the built-in defaults, so an absent or
//! partial file still yields a complete configuration.
//!
//! ```yaml
//! crest:
//!   tropical_overlay: true
//!   file_suffix: v2
//! grids:
//!   tropical:
//!     data_dir: /data/Tropical_data
//! render:
//!   ffmpeg: /usr/local/bin/ffmpeg
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use viz_common::{default_intervals, ColorRamp, YearInterval};

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub crest: CrestConfig,
    pub grids: GridPresets,
    pub render: RenderConfig,
}

/// Crest-profile pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrestConfig {
    /// `;`-separated ridge-line table.
    pub crest_csv: PathBuf,
    /// 0 °C isotherm statistics per period.
    pub isotherm_stats: PathBuf,
    /// Tropical 20 °C threshold statistics per period.
    pub tropical_stats: PathBuf,
    /// Static PNGs and the slideshow.
    pub output_dir: PathBuf,
    /// Interactive HTML documents.
    pub html_output_dir: PathBuf,
    pub file_prefix: String,
    /// Appended to every artefact name (e.g. "v2" for the tropical variant).
    pub file_suffix: String,
    /// Stem of the slideshow files.
    pub animation_name: String,
    pub width: u32,
    pub height: u32,
    pub slideshow_fps: u32,
    /// Draw the maximum altitude of the tropical threshold.
    pub tropical_overlay: bool,
}

impl Default for CrestConfig {
    fn default() -> Self {
        Self {
            crest_csv: PathBuf::from("ligne_crete_cols.csv"),
            isotherm_stats: PathBuf::from("isotherme_0_averaged_stats.csv"),
            tropical_stats: PathBuf::from("tropical_averaged_stats.csv"),
            output_dir: PathBuf::from("crete_animations"),
            html_output_dir: PathBuf::from("crete_animations_plotly"),
            file_prefix: "profile_0C_".to_string(),
            file_suffix: String::new(),
            animation_name: "crete_animation".to_string(),
            width: 3000,
            height: 1200,
            slideshow_fps: 1,
            tropical_overlay: false,
        }
    }
}

/// The two gridded datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridPresets {
    pub freezing: GridPreset,
    pub tropical: GridPreset,
}

impl Default for GridPresets {
    fn default() -> Self {
        Self {
            freezing: GridPreset::freezing(),
            tropical: GridPreset::tropical(),
        }
    }
}

impl GridPresets {
    pub const NAMES: [&'static str; 2] = ["freezing", "tropical"];

    pub fn get(&self, name: &str) -> Option<&GridPreset> {
        match name {
            "freezing" => Some(&self.freezing),
            "tropical" => Some(&self.tropical),
            _ => None,
        }
    }
}

/// One gridded day-count dataset and how to render it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridPreset {
    pub data_dir: PathBuf,
    /// Glob pattern of the yearly files inside `data_dir`.
    pub pattern: String,
    pub variable: String,
    pub ramp: ColorRamp,
    /// Quantity name, used in titles and on the colour bar.
    pub label: String,
    pub output_dir: PathBuf,
    pub html_output_dir: PathBuf,
    /// Stem of every output file ("freezing_days").
    pub output_stem: String,
    pub width: u32,
    pub height: u32,
    pub annual_fps: u32,
    pub interval_fps: u32,
    /// Frame duration of the interactive documents.
    pub annual_frame_ms: u32,
    pub interval_frame_ms: u32,
    pub intervals: Vec<YearInterval>,
    /// Also write every heatmap frame as a PNG.
    pub keep_frames: bool,
}

impl GridPreset {
    pub fn freezing() -> Self {
        Self {
            data_dir: PathBuf::from("Isotherme0_data"),
            pattern: "freezing_days_per_year_*.nc".to_string(),
            variable: "freezing_days".to_string(),
            ramp: ColorRamp::Blues,
            label: "Jours de gel".to_string(),
            output_dir: PathBuf::from("isotherme_animations"),
            html_output_dir: PathBuf::from("isotherme_animations_plotly"),
            output_stem: "freezing_days".to_string(),
            ..Self::common()
        }
    }

    pub fn tropical() -> Self {
        Self {
            data_dir: PathBuf::from("Tropical_data"),
            pattern: "tropical_days_per_year_*.nc".to_string(),
            variable: "tropical_days".to_string(),
            ramp: ColorRamp::Reds,
            label: "Nuits tropicales".to_string(),
            output_dir: PathBuf::from("tropical_animations"),
            html_output_dir: PathBuf::from("tropical_animations_plotly"),
            output_stem: "tropical_days".to_string(),
            ..Self::common()
        }
    }

    fn common() -> Self {
        Self {
            data_dir: PathBuf::new(),
            pattern: String::new(),
            variable: String::new(),
            ramp: ColorRamp::Blues,
            label: String::new(),
            output_dir: PathBuf::new(),
            html_output_dir: PathBuf::new(),
            output_stem: String::new(),
            width: 800,
            height: 600,
            annual_fps: 8,
            interval_fps: 1,
            annual_frame_ms: 200,
            interval_frame_ms: 1000,
            intervals: default_intervals(),
            keep_frames: false,
        }
    }
}

/// Rendering backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Extra font directory, on top of the system fonts.
    pub font_dir: Option<PathBuf>,
    /// ffmpeg executable used for MP4 output.
    pub ffmpeg: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_dir: None,
            ffmpeg: "ffmpeg".to_string(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl AppConfig {
    /// Load the configuration, or the defaults when `path` is `None` or does
    /// not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config from {:?}", path))?;
                let config = Self::from_yaml(&content)
                    .with_context(|| format!("Failed to parse config from {:?}", path))?;
                info!(path = %path.display(), "Loaded configuration");
                config
            }
            Some(path) => {
                info!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            None => {
                debug!("No config file given, using defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML content over the defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        let overlay: Value = serde_yaml::from_str(&expanded).context("Invalid YAML")?;
        let mut merged = serde_yaml::to_value(Self::default())?;
        merge_values(&mut merged, overlay);
        Ok(serde_yaml::from_value(merged)?)
    }

    pub fn validate(&self) -> Result<()> {
        let crest = &self.crest;
        anyhow::ensure!(
            crest.width > 0 && crest.height > 0,
            "Crest figure size must be positive, got {}x{}",
            crest.width,
            crest.height
        );
        anyhow::ensure!(crest.slideshow_fps > 0, "Slideshow fps must be positive");

        for name in GridPresets::NAMES {
            let Some(preset) = self.grids.get(name) else {
                continue;
            };
            anyhow::ensure!(!preset.pattern.is_empty(), "Grid preset '{}' has no file pattern", name);
            anyhow::ensure!(!preset.variable.is_empty(), "Grid preset '{}' has no variable", name);
            anyhow::ensure!(
                preset.annual_fps > 0 && preset.interval_fps > 0,
                "Grid preset '{}' frame rates must be positive",
                name
            );
            anyhow::ensure!(
                preset.width > 0 && preset.height > 0,
                "Grid preset '{}' size must be positive",
                name
            );
            anyhow::ensure!(!preset.intervals.is_empty(), "Grid preset '{}' has no intervals", name);
        }
        anyhow::ensure!(!self.render.ffmpeg.is_empty(), "ffmpeg executable cannot be empty");
        Ok(())
    }
}

/// Recursively overlay `overlay` onto `base`. Mappings merge key by key;
/// any other value replaces the base one, and a null overlay leaves it as is.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .with_context(|| format!("Unclosed variable substitution: ${{{}", after))?;
        result.push_str(&resolve_var_expr(&after[..end])?);
        rest = &after[end + 1..];
    }
    result.push_str(rest);
    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    match expr.split_once(":-") {
        Some((name, default)) => match std::env::var(name.trim()) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Ok(default.to_string()),
        },
        None => std::env::var(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.crest.crest_csv, PathBuf::from("ligne_crete_cols.csv"));
        assert_eq!(config.crest.file_prefix, "profile_0C_");
        assert_eq!(config.crest.slideshow_fps, 1);
        assert_eq!(config.grids.freezing.annual_fps, 8);
        assert_eq!(config.grids.freezing.interval_frame_ms, 1000);
        assert_eq!(config.grids.tropical.ramp, ColorRamp::Reds);
        assert_eq!(config.grids.tropical.intervals.len(), 6);
        assert_eq!(config.render.ffmpeg, "ffmpeg");
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config.grids.freezing.variable, "freezing_days");
        assert_eq!(config.crest.width, 3000);
    }

    #[test]
    fn test_partial_preset_keeps_its_own_defaults() {
        let yaml = "grids:\n  tropical:\n    annual_fps: 4\n";
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.grids.tropical.annual_fps, 4);
        assert_eq!(config.grids.tropical.variable, "tropical_days");
        assert_eq!(config.grids.tropical.ramp, ColorRamp::Reds);
        assert_eq!(config.grids.freezing.annual_fps, 8);
    }

    #[test]
    fn test_intervals_from_yaml() {
        let yaml = "grids:\n  freezing:\n    intervals: [[1990, 2050], [2050, 2100]]\n";
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.grids.freezing.intervals,
            vec![
                YearInterval::new(1990, 2050).unwrap(),
                YearInterval::new(2050, 2100).unwrap()
            ]
        );
    }

    #[test]
    fn test_reversed_interval_rejected() {
        let yaml = "grids:\n  freezing:\n    intervals: [[2050, 1990]]\n";
        assert!(AppConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("CLIMATE_VIZ_TEST_DIR", "/data/iso");
        std::env::remove_var("CLIMATE_VIZ_TEST_UNSET");
        let out = expand_env_vars("a: ${CLIMATE_VIZ_TEST_DIR}\nb: ${CLIMATE_VIZ_TEST_UNSET:-x}").unwrap();
        assert_eq!(out, "a: /data/iso\nb: x");
        assert!(expand_env_vars("${CLIMATE_VIZ_TEST_UNSET}").is_err());
        assert!(expand_env_vars("${OPEN").is_err());
    }

    #[test]
    fn test_validate_rejects_zero_fps() {
        let mut config = AppConfig::default();
        config.grids.freezing.interval_fps = 0;
        assert!(config.validate().is_err());
    }
}
