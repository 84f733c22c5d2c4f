use super::geometry::{Margins, Size};
use crate::error::{ChartError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono_tz::Tz;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How time tick labels are produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum TimeFormat {
    /// Pick a pattern from the tick spacing (see `utils::date_formatter`).
    #[default]
    Auto,
    /// Fixed strftime pattern.
    Pattern(String),
}

/// How amplitude tick labels are produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum AmplitudeFormat {
    #[default]
    Auto,
    /// Fixed number of decimals.
    Fixed(usize),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisLabels {
    pub x: String,
    pub x_sub: String,
    pub y: String,
    pub y_sub: String,
    pub title: Option<String>,
}

impl Default for AxisLabels {
    fn default() -> Self {
        Self {
            x: "Time".to_string(),
            x_sub: String::new(),
            y: "Amplitude".to_string(),
            y_sub: String::new(),
            title: None,
        }
    }
}

/// Every option a chart recognizes. Replaced wholesale through
/// `Chart::apply_config`, never mutated field by field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Samples per pixel at or above which the min/max envelope is drawn.
    pub compressed_cutoff: f64,
    /// Finest resolution zoom may reach, in pixels per sample.
    pub max_zoom_pixel_per_sample: f64,
    pub margins: Margins,
    pub labels: AxisLabels,
    pub time_format: TimeFormat,
    pub amplitude_format: AmplitudeFormat,
    pub time_zone: Tz,
    pub tick_count: usize,
    pub resize_debounce: Duration,
    /// Label box used for markers when text cannot be measured.
    pub marker_fallback_size: Size,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            compressed_cutoff: 10.0,
            max_zoom_pixel_per_sample: 20.0,
            margins: Margins::default(),
            labels: AxisLabels::default(),
            time_format: TimeFormat::Auto,
            amplitude_format: AmplitudeFormat::Auto,
            time_zone: Tz::UTC,
            tick_count: 5,
            resize_debounce: Duration::from_millis(250),
            marker_fallback_size: Size::new(60.0, 16.0),
        }
    }
}

impl ChartConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.compressed_cutoff.is_finite() || self.compressed_cutoff <= 0.0 {
            return Err(ChartError::InvalidConfig(format!(
                "compressed_cutoff must be positive, got {}",
                self.compressed_cutoff
            )));
        }
        if !self.max_zoom_pixel_per_sample.is_finite() || self.max_zoom_pixel_per_sample <= 0.0 {
            return Err(ChartError::InvalidConfig(format!(
                "max_zoom_pixel_per_sample must be positive, got {}",
                self.max_zoom_pixel_per_sample
            )));
        }
        if !self.margins.is_valid() {
            return Err(ChartError::InvalidConfig(format!(
                "margins must be finite and non-negative, got {:?}",
                self.margins
            )));
        }
        if self.tick_count == 0 {
            return Err(ChartError::InvalidConfig("tick_count must be at least 1".into()));
        }
        if let TimeFormat::Pattern(pattern) = &self.time_format {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(ChartError::InvalidConfig(format!(
                    "time_format pattern {:?} is not a valid strftime pattern",
                    pattern
                )));
            }
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> eyre::Result<Self> {
        let config: Self =
            serde_json::from_str(json).wrap_err("failed to parse chart configuration")?;
        config
            .validate()
            .wrap_err("chart configuration rejected")?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> eyre::Result<String> {
        serde_json::to_string_pretty(self).wrap_err("failed to serialize chart configuration")
    }
}
