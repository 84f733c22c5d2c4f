//! Tick positions and labels for the time and amplitude axes.

use crate::data_types::{AmplitudeFormat, ChartConfig, ScreenPoint, TimeFormat};
use crate::scales::{tick_step, time_tick_interval, time_ticks, LinearScale};
use crate::utils::date_formatter::{determine_date_format, format_timestamp, format_with_pattern};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisOrientation {
    Bottom,
    Left,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub value: f64,
    /// Offset along the axis, in pixels from the axis origin.
    pub position: f32,
    pub label: String,
}

/// One rendered axis: where it is anchored and its ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisTicks {
    pub orientation: AxisOrientation,
    pub origin: ScreenPoint,
    pub length: f32,
    pub ticks: Vec<Tick>,
}

/// Ticks for the (zoomed) time scale.
pub fn time_axis(scale: &LinearScale, config: &ChartConfig, origin: ScreenPoint) -> AxisTicks {
    let (d0, d1) = scale.domain();
    let step_ms = time_tick_interval(d0, d1, config.tick_count).approx_ms();
    let ticks = time_ticks(d0, d1, config.tick_count)
        .into_iter()
        .map(|value| Tick {
            value,
            position: scale.map(value) as f32,
            label: format_time(value, step_ms, config),
        })
        .collect();
    AxisTicks {
        orientation: AxisOrientation::Bottom,
        origin,
        length: scale.range_width() as f32,
        ticks,
    }
}

/// Ticks for the zero-centered amplitude axis scale.
pub fn amplitude_axis(scale: &LinearScale, config: &ChartConfig, origin: ScreenPoint) -> AxisTicks {
    let (d0, d1) = scale.domain();
    let step = tick_step(d0, d1, config.tick_count as f64);
    let ticks = scale
        .ticks(config.tick_count)
        .into_iter()
        .map(|value| Tick {
            value,
            position: scale.map(value) as f32,
            label: format_amplitude(value, step, &config.amplitude_format),
        })
        .collect();
    AxisTicks {
        orientation: AxisOrientation::Left,
        origin,
        length: scale.range_width() as f32,
        ticks,
    }
}

pub fn format_time(value_ms: f64, step_ms: f64, config: &ChartConfig) -> String {
    match &config.time_format {
        TimeFormat::Auto => {
            format_timestamp(value_ms, determine_date_format(step_ms), config.time_zone)
        }
        TimeFormat::Pattern(p) => format_with_pattern(value_ms, p, config.time_zone),
    }
}

/// Amplitude label. `Auto` shows just enough decimals to tell adjacent
/// ticks `step` apart.
pub fn format_amplitude(value: f64, step: f64, format: &AmplitudeFormat) -> String {
    let precision = match format {
        AmplitudeFormat::Fixed(p) => *p,
        AmplitudeFormat::Auto => {
            if step > 0.0 && step.is_finite() {
                (-step.log10().floor()).max(0.0) as usize
            } else if value.abs() < 0.001 && value.abs() > 0.0 {
                4
            } else if value.abs() > 1000.0 {
                0
            } else {
                2
            }
        }
    };
    // avoid "-0"
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.*}", precision, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amplitude_precision_follows_step() {
        assert_eq!(format_amplitude(200.0, 100.0, &AmplitudeFormat::Auto), "200");
        assert_eq!(format_amplitude(0.25, 0.05, &AmplitudeFormat::Auto), "0.25");
        assert_eq!(format_amplitude(-0.0, 1.0, &AmplitudeFormat::Auto), "0");
        assert_eq!(format_amplitude(1.5, 1.0, &AmplitudeFormat::Fixed(3)), "1.500");
    }
}
