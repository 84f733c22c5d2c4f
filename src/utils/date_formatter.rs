use chrono::TimeZone;
use chrono_tz::Tz;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmartDateFormat {
    Year,       // 2024
    MonthYear,  // Jan 2024
    DayMonth,   // 12 Jan
    HourMin,    // 10:30
    HourMinSec, // 10:30:15
    SecMillis,  // 10:30:15.250
}

impl SmartDateFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Year => "%Y",
            Self::MonthYear => "%b %Y",
            Self::DayMonth => "%d %b",
            Self::HourMin => "%H:%M",
            Self::HourMinSec => "%H:%M:%S",
            Self::SecMillis => "%H:%M:%S%.3f",
        }
    }
}

const SECOND: f64 = 1000.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const MONTH: f64 = 28.0 * DAY;
const YEAR: f64 = 365.0 * DAY;

/// Smallest tick spacing (ms) each format can still tell apart, coarsest first.
const STRATEGY: [(f64, SmartDateFormat); 5] = [
    (YEAR, SmartDateFormat::Year),
    (MONTH, SmartDateFormat::MonthYear),
    (DAY, SmartDateFormat::DayMonth),
    (MINUTE, SmartDateFormat::HourMin),
    (SECOND, SmartDateFormat::HourMinSec),
];

/// Determines the label format from the spacing between ticks (ms).
pub fn determine_date_format(tick_step_ms: f64) -> SmartDateFormat {
    STRATEGY
        .iter()
        .find(|(min_step, _)| tick_step_ms >= *min_step)
        .map(|(_, fmt)| *fmt)
        .unwrap_or(SmartDateFormat::SecMillis)
}

/// Formats an epoch-ms instant with a strftime pattern in `tz`. A pattern
/// chrono cannot render falls back to the full time of day.
pub fn format_with_pattern(value_ms: f64, pattern: &str, tz: Tz) -> String {
    let dt = crate::utils::from_ms(value_ms);
    let local = tz.from_utc_datetime(&dt.naive_utc());
    let mut out = String::new();
    if write!(out, "{}", local.format(pattern)).is_ok() {
        return out;
    }
    out.clear();
    match write!(out, "{}", local.format(SmartDateFormat::HourMinSec.pattern())) {
        Ok(()) => out,
        Err(_) => format!("{:.0}", value_ms),
    }
}

/// Formats an epoch-ms instant according to the specified format.
pub fn format_timestamp(value_ms: f64, format: SmartDateFormat, tz: Tz) -> String {
    if !value_ms.is_finite() {
        return format!("{:.2}", value_ms);
    }
    format_with_pattern(value_ms, format.pattern(), tz)
}
