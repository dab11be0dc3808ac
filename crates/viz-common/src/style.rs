//! Colors, color ramps and line styles used by every rendered figure.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VizError;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse "#RRGGBB" or "#RRGGBBAA".
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// "#rrggbb" form, alpha dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Opacity in [0, 1] for SVG/CSS `*-opacity` attributes.
    pub fn opacity(&self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Linear color interpolation
    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| ((a as f32) * (1.0 - t) + (b as f32) * t).round() as u8;

        Color::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

impl TryFrom<String> for Color {
    type Error = VizError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or(VizError::InvalidColor(value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        if color.a == 255 {
            color.to_hex()
        } else {
            format!("{}{:02x}", color.to_hex(), color.a)
        }
    }
}

/// Sequential color ramps for day-count heatmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorRamp {
    Blues,
    Reds,
}

/// ColorBrewer "Blues", light to dark.
const BLUES: [&str; 9] = [
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];

/// ColorBrewer "Reds", light to dark.
const REDS: [&str; 9] = [
    "#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a", "#ef3b2c", "#cb181d", "#a50f15",
    "#67000d",
];

impl ColorRamp {
    pub fn name(&self) -> &'static str {
        match self {
            ColorRamp::Blues => "Blues",
            ColorRamp::Reds => "Reds",
        }
    }

    /// Evenly spaced stops of the ramp.
    pub fn stops(&self) -> Vec<Color> {
        let hex = match self {
            ColorRamp::Blues => &BLUES,
            ColorRamp::Reds => &REDS,
        };
        hex.iter().filter_map(|h| Color::from_hex(h)).collect()
    }

    /// Color for a normalized value in [0, 1]; out-of-range values are clamped.
    pub fn color_at(&self, t: f32) -> Color {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let segments = (stops.len() - 1) as f32;
        let pos = t * segments;
        let lower = (pos.floor() as usize).min(stops.len() - 2);
        stops[lower].lerp(&stops[lower + 1], pos - lower as f32)
    }

    /// Precompute `n` colors spanning the ramp (for lookup tables and legends).
    pub fn lookup_table(&self, n: usize) -> Vec<Color> {
        let n = n.max(2);
        (0..n)
            .map(|i| self.color_at(i as f32 / (n - 1) as f32))
            .collect()
    }
}

impl FromStr for ColorRamp {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blues" => Ok(ColorRamp::Blues),
            "reds" => Ok(ColorRamp::Reds),
            other => Err(VizError::UnknownColorRamp(other.to_string())),
        }
    }
}

impl fmt::Display for ColorRamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stroke pattern for chart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

impl LineStyle {
    /// Dash and gap lengths scaled to the line width, if any.
    pub fn dash_lengths(&self, width: f32) -> Option<(f32, f32)> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some((width * 3.7, width * 1.6)),
        }
    }
}
