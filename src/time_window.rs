//! Resolving a plot window from any two of start, end and duration.

use crate::error::{ChartError, Result};
use chrono::{DateTime, Duration, Utc};

/// Start and end of a time window. Any two of `start`, `end` and `duration`
/// define it; `duration` alone means the window ends now. `clock_offset` is
/// local clock minus reference clock and is subtracted from `now`.
pub fn calc_start_end(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    duration: Option<Duration>,
    clock_offset: Duration,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let window = match (start, end, duration) {
        (Some(s), Some(e), _) => (s, e),
        (Some(s), None, Some(d)) => (s, shift(s.checked_add_signed(d))?),
        (None, Some(e), Some(d)) => (shift(e.checked_sub_signed(d))?, e),
        (None, None, Some(d)) => {
            let e = shift(now.checked_sub_signed(clock_offset))?;
            (shift(e.checked_sub_signed(d))?, e)
        }
        _ => {
            return Err(ChartError::InvalidTimeWindow(
                "need two of start, end and duration, or a duration".into(),
            ))
        }
    };
    if window.1 < window.0 {
        return Err(ChartError::InvalidTimeWindow(format!(
            "end {} precedes start {}",
            window.1, window.0
        )));
    }
    Ok(window)
}

fn shift(t: Option<DateTime<Utc>>) -> Result<DateTime<Utc>> {
    t.ok_or_else(|| ChartError::InvalidTimeWindow("time window out of range".into()))
}

/// [`calc_start_end`] against the current wall clock.
pub fn calc_start_end_now(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    duration: Option<Duration>,
    clock_offset: Duration,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    calc_start_end(start, end, duration, clock_offset, Utc::now())
}
