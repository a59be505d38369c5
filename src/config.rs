//! Gauge configuration: domain, sweep, styling and color bands.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{GaugeError, Result};
use crate::format::ValueFormat;
use crate::mapping::{AngularMapping, AngularSweep, Domain};

// ============================================================================
// COLORS
// ============================================================================

/// An RGBA color. Serialized as a CSS color string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_css(self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }

    fn named(name: &str) -> Option<Self> {
        let color = match name {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::rgb(0xff, 0x00, 0x00),
            "green" => Color::rgb(0x00, 0x80, 0x00),
            "blue" => Color::rgb(0x00, 0x00, 0xff),
            "yellow" => Color::rgb(0xff, 0xff, 0x00),
            "orange" => Color::rgb(0xff, 0xa5, 0x00),
            "gray" | "grey" => Color::rgb(0x80, 0x80, 0x80),
            "transparent" => Color::rgba(0, 0, 0, 0.0),
            _ => return None,
        };
        Some(color)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.is_ascii() {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::rgba(
                byte(0)?,
                byte(2)?,
                byte(4)?,
                f32::from(byte(6)?) / 255.0,
            )),
            _ => None,
        }
    }

    fn parse_functional(body: &str, with_alpha: bool) -> Option<Self> {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if with_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return None;
        }
        let channel = |s: &str| s.parse::<u8>().ok();
        let a = if with_alpha {
            let a = parts[3].parse::<f32>().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            a
        } else {
            1.0
        };
        Some(Color::rgba(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            a,
        ))
    }
}

impl FromStr for Color {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let parsed = if let Some(hex) = lower.strip_prefix('#') {
            Color::parse_hex(hex)
        } else if let Some(body) = lower.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
            Color::parse_functional(body, true)
        } else if let Some(body) = lower.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            Color::parse_functional(body, false)
        } else {
            Color::named(&lower)
        };
        parsed.ok_or_else(|| GaugeError::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = GaugeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_css()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Color of the value label: either fixed, or taken from the color band
/// containing the current value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LabelColor {
    Auto,
    Fixed(Color),
}

impl FromStr for LabelColor {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(LabelColor::Auto)
        } else {
            s.parse().map(LabelColor::Fixed)
        }
    }
}

impl TryFrom<String> for LabelColor {
    type Error = GaugeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LabelColor> for String {
    fn from(color: LabelColor) -> Self {
        match color {
            LabelColor::Auto => "auto".to_string(),
            LabelColor::Fixed(color) => color.to_css(),
        }
    }
}

impl From<Color> for LabelColor {
    fn from(color: Color) -> Self {
        LabelColor::Fixed(color)
    }
}

// ============================================================================
// COLOR BANDS
// ============================================================================

pub const DEFAULT_BAND_COLOR: Color = Color::rgb(0x1f, 0x77, 0xb4);

/// A sub-range of the domain drawn in its own color.
///
/// Bands are not validated against each other: they may overlap, leave gaps
/// or extend past the domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorBand {
    pub min: f64,
    pub max: f64,
    pub color: Color,
}

impl ColorBand {
    pub const fn new(min: f64, max: f64, color: Color) -> Self {
        Self { min, max, color }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// First band containing `value`, in configured order.
pub fn band_for_value(bands: &[ColorBand], value: f64) -> Option<&ColorBand> {
    bands.iter().find(|band| band.contains(value))
}

// ============================================================================
// GAUGE CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    // Domain
    #[builder(default = 0.0)]
    pub min_value: f64,
    #[builder(default = 100.0)]
    pub max_value: f64,

    // Angular sweep, degrees
    #[builder(default = 225.0)]
    pub start_angle: f64,
    #[builder(default = -45.0)]
    pub end_angle: f64,

    // Arc
    #[builder(default = 0.1)]
    pub gauge_thickness: f64,
    #[builder(default = Vec::new())]
    pub color_bands: Vec<ColorBand>,

    // Needle
    #[builder(default = Color::BLACK)]
    pub needle_color: Color,
    #[builder(default = 8.0)]
    pub needle_thickness: f64,

    // Value label
    #[builder(default = true)]
    pub show_value: bool,
    #[builder(default = "{:.1f}".to_string())]
    pub value_format: String,
    #[builder(default = "Arial, sans-serif".to_string())]
    pub value_font_family: String,
    #[builder(default = 16.0)]
    pub value_font_size: f32,
    #[builder(default = LabelColor::Fixed(Color::rgba(0, 0, 0, 0.8)))]
    pub value_font_color: LabelColor,
    #[builder(default = "bold".to_string())]
    pub value_font_weight: String,

    // Tick labels
    /// Falls back to `value_font_family` when unset.
    pub tick_font_family: Option<String>,
    #[builder(default = 10.0)]
    pub tick_font_size: f32,
    #[builder(default = Color::rgba(0, 0, 0, 0.7))]
    pub tick_font_color: Color,
    #[builder(default = 1.1)]
    pub tick_label_radius: f64,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GaugeConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn domain(&self) -> Result<Domain> {
        Domain::new(self.min_value, self.max_value)
    }

    pub fn sweep(&self) -> Result<AngularSweep> {
        AngularSweep::new(self.start_angle, self.end_angle)
    }

    pub fn mapping(&self) -> Result<AngularMapping> {
        Ok(AngularMapping::new(self.domain()?, self.sweep()?))
    }

    /// Check every construction-time invariant and compile the value format.
    pub fn validate(&self) -> Result<ValueFormat> {
        self.mapping()?;
        ValueFormat::parse(&self.value_format)
    }

    /// Font family for tick labels.
    pub fn tick_family(&self) -> &str {
        self.tick_font_family
            .as_deref()
            .unwrap_or(&self.value_font_family)
    }

    /// The configured bands, or a single default band spanning the domain
    /// when none are configured.
    pub fn effective_bands(&self) -> Cow<'_, [ColorBand]> {
        if self.color_bands.is_empty() {
            log::debug!(
                "no color bands configured, using one band over [{}, {}]",
                self.min_value,
                self.max_value
            );
            Cow::Owned(vec![ColorBand::new(
                self.min_value,
                self.max_value,
                DEFAULT_BAND_COLOR,
            )])
        } else {
            Cow::Borrowed(&self.color_bands)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let config = GaugeConfig::default();
        assert_eq!(config.min_value, 0.0);
        assert_eq!(config.max_value, 100.0);
        assert_eq!(config.start_angle, 225.0);
        assert_eq!(config.end_angle, -45.0);
        assert_eq!(config.gauge_thickness, 0.1);
        assert_eq!(config.needle_color, Color::BLACK);
        assert_eq!(config.needle_thickness, 8.0);
        assert!(config.show_value);
        assert_eq!(config.value_format, "{:.1f}");
        assert_eq!(config.tick_font_size, 10.0);
        assert_eq!(config.tick_label_radius, 1.1);
        assert_eq!(String::from(config.value_font_color), "rgba(0,0,0,0.8)");
        assert_eq!(config.tick_font_color.to_css(), "rgba(0,0,0,0.7)");
    }

    #[test]
    fn tick_family_falls_back_to_value_family() {
        let config = GaugeConfig::builder()
            .value_font_family("Helvetica".to_string())
            .build();
        assert_eq!(config.tick_family(), "Helvetica");

        let config = GaugeConfig::from_json(r#"{"tick_font_family": "monospace"}"#).unwrap();
        assert_eq!(config.tick_family(), "monospace");
        assert_eq!(config.value_font_family, "Arial, sans-serif");
    }

    #[test]
    fn parses_css_colors() {
        assert_eq!("#FF0000".parse::<Color>().unwrap(), Color::rgb(255, 0, 0));
        assert_eq!("#0f0".parse::<Color>().unwrap(), Color::rgb(0, 255, 0));
        assert_eq!(
            "rgba(200, 200, 200, 0.1)".parse::<Color>().unwrap(),
            Color::rgba(200, 200, 200, 0.1)
        );
        assert_eq!("rgb(1,2,3)".parse::<Color>().unwrap(), Color::rgb(1, 2, 3));
        assert_eq!("Black".parse::<Color>().unwrap(), Color::BLACK);
        assert_eq!(
            "#00000080".parse::<Color>().unwrap(),
            Color::rgba(0, 0, 0, 128.0 / 255.0)
        );
    }

    #[test]
    fn rejects_bad_colors() {
        for bad in ["", "#12", "#gggggg", "rgba(0,0,0)", "rgb(300,0,0)", "rgba(0,0,0,2)", "mauve"] {
            assert_eq!(
                bad.parse::<Color>(),
                Err(GaugeError::InvalidColor(bad.to_string())),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn label_color_accepts_auto() {
        assert_eq!("auto".parse::<LabelColor>().unwrap(), LabelColor::Auto);
        assert_eq!(
            "#FF5733".parse::<LabelColor>().unwrap(),
            LabelColor::Fixed(Color::rgb(0xff, 0x57, 0x33))
        );
    }

    #[test]
    fn validate_rejects_inverted_domain() {
        let config = GaugeConfig::builder().min_value(10.0).max_value(10.0).build();
        assert_eq!(
            config.validate(),
            Err(GaugeError::InvalidDomain { min: 10.0, max: 10.0 })
        );
    }

    #[test]
    fn validate_rejects_bad_format() {
        let config = GaugeConfig::builder().value_format("{:.1x}".to_string()).build();
        assert!(matches!(config.validate(), Err(GaugeError::InvalidFormat { .. })));
    }

    #[test]
    fn empty_bands_fall_back_to_single_default_band() {
        let config = GaugeConfig::builder().min_value(-5.0).max_value(5.0).build();
        assert_eq!(
            &*config.effective_bands(),
            &[ColorBand::new(-5.0, 5.0, DEFAULT_BAND_COLOR)]
        );
    }

    #[test]
    fn first_matching_band_wins_on_shared_boundary() {
        let bands = [
            ColorBand::new(0.0, 25.0, Color::rgb(255, 0, 0)),
            ColorBand::new(25.0, 75.0, Color::rgb(255, 255, 0)),
        ];
        assert_eq!(band_for_value(&bands, 25.0), Some(&bands[0]));
        assert_eq!(band_for_value(&bands, 80.0), None);
    }

    #[test]
    fn json_config_fills_missing_fields_with_defaults() {
        let config = GaugeConfig::from_json(
            r##"{
                "min_value": 10,
                "max_value": 500,
                "value_font_color": "auto",
                "color_bands": [{"min": 10, "max": 500, "color": "#00FF00"}]
            }"##,
        )
        .unwrap();
        assert_eq!(config.min_value, 10.0);
        assert_eq!(config.max_value, 500.0);
        assert_eq!(config.value_font_color, LabelColor::Auto);
        assert_eq!(config.color_bands[0].color, Color::rgb(0, 255, 0));
        assert_eq!(config.start_angle, 225.0);
        assert_eq!(config.value_format, "{:.1f}");
    }

    #[test]
    fn json_config_rejects_unparseable_color() {
        assert!(GaugeConfig::from_json(r#"{"needle_color": "nope"}"#).is_err());
    }
}
