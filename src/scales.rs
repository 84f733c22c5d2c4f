//! Linear scales (d3 semantics) and time tick intervals.

use chrono::{Datelike, NaiveDate};

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Continuous linear map from a domain to a pixel range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let mut scale = Self {
            domain: (0.0, 1.0),
            range,
        };
        scale.update_domain(domain.0, domain.1);
        scale
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let res = r0 + (value - d0) / (d1 - d0) * (r1 - r0);
        if res.is_nan() || res.is_infinite() {
            0.0
        } else {
            res
        }
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if (r1 - r0).abs() < f64::EPSILON {
            return d0;
        }
        d0 + (pixel - r0) / (r1 - r0) * (d1 - d0)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Absolute pixel extent of the range.
    pub fn range_width(&self) -> f64 {
        (self.range.1 - self.range.0).abs()
    }

    pub fn span(&self) -> f64 {
        self.domain.1 - self.domain.0
    }

    pub fn update_domain(&mut self, min: f64, max: f64) {
        let mut d_min = min;
        let mut d_max = max;
        if (d_max - d_min).abs() < f64::EPSILON {
            d_min -= 0.5;
            d_max += 0.5;
        }
        self.domain = (d_min, d_max);
    }

    pub fn update_range(&mut self, min: f64, max: f64) {
        self.range = (min, max);
    }

    pub fn with_domain(mut self, min: f64, max: f64) -> Self {
        self.update_domain(min, max);
        self
    }

    /// Extends the domain to round values, like d3's `linear.nice()`.
    pub fn nice(&mut self, count: usize) {
        let (mut start, mut stop) = self.domain;
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }
        let mut prestep = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count as f64);
            if prestep == Some(step) {
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            prestep = Some(step);
        }
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }
        self.update_domain(start, stop);
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count as f64)
    }

    /// Returns (m, c) such that screen = value * m + c
    pub fn get_linear_coeffs(&self) -> (f64, f64) {
        let (d_min, d_max) = self.domain;
        let (r_min, r_max) = self.range;
        let m = (r_max - r_min) / (d_max - d_min);
        let c = r_min - m * d_min;
        (m, c)
    }
}

fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let inv = 10f64.powf(-power) / factor;
        i1 = (start * inv).round();
        i2 = (stop * inv).round();
        if i1 / inv < start {
            i1 += 1.0;
        }
        if i2 / inv > stop {
            i2 -= 1.0;
        }
        inc = -inv;
    } else {
        inc = 10f64.powf(power) * factor;
        i1 = (start / inc).round();
        i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
    }
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// Step between ticks as d3 encodes it: positive for steps >= 1, negative
/// reciprocal for fractional steps so the arithmetic stays exact.
pub fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    if !(start.is_finite() && stop.is_finite()) || stop <= start || count <= 0.0 {
        return 0.0;
    }
    tick_spec(start, stop, count).2
}

/// Positive tick step for a span.
pub fn tick_step(start: f64, stop: f64, count: f64) -> f64 {
    let (lo, hi) = if stop < start { (stop, start) } else { (start, stop) };
    let inc = tick_increment(lo, hi, count);
    if inc < 0.0 {
        -1.0 / inc
    } else {
        inc
    }
}

pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || !start.is_finite() || !stop.is_finite() {
        return vec![];
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let (i1, i2, inc) = tick_spec(lo, hi, count);
    if !(i2 >= i1) {
        return vec![];
    }
    let n = (i2 - i1 + 1.0) as usize;
    let mut out: Vec<f64> = (0..n)
        .map(|i| {
            let k = i1 + i as f64;
            if inc < 0.0 {
                k / -inc
            } else {
                k * inc
            }
        })
        .collect();
    if reverse {
        out.reverse();
    }
    out
}

const SECOND: f64 = 1000.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const WEEK: f64 = 7.0 * DAY;
const MONTH: f64 = 30.0 * DAY;
const YEAR: f64 = 365.0 * DAY;

/// Calendar-aware spacing between time ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeInterval {
    /// Fixed number of milliseconds, aligned on the epoch.
    Millis(f64),
    Months(u32),
    Years(u32),
}

impl TimeInterval {
    /// Approximate length in milliseconds, used to pick label formats.
    pub fn approx_ms(&self) -> f64 {
        match self {
            Self::Millis(ms) => *ms,
            Self::Months(n) => *n as f64 * MONTH,
            Self::Years(n) => *n as f64 * YEAR,
        }
    }
}

const TICK_INTERVALS: [(f64, TimeInterval); 18] = [
    (SECOND, TimeInterval::Millis(SECOND)),
    (5.0 * SECOND, TimeInterval::Millis(5.0 * SECOND)),
    (15.0 * SECOND, TimeInterval::Millis(15.0 * SECOND)),
    (30.0 * SECOND, TimeInterval::Millis(30.0 * SECOND)),
    (MINUTE, TimeInterval::Millis(MINUTE)),
    (5.0 * MINUTE, TimeInterval::Millis(5.0 * MINUTE)),
    (15.0 * MINUTE, TimeInterval::Millis(15.0 * MINUTE)),
    (30.0 * MINUTE, TimeInterval::Millis(30.0 * MINUTE)),
    (HOUR, TimeInterval::Millis(HOUR)),
    (3.0 * HOUR, TimeInterval::Millis(3.0 * HOUR)),
    (6.0 * HOUR, TimeInterval::Millis(6.0 * HOUR)),
    (12.0 * HOUR, TimeInterval::Millis(12.0 * HOUR)),
    (DAY, TimeInterval::Millis(DAY)),
    (2.0 * DAY, TimeInterval::Millis(2.0 * DAY)),
    (WEEK, TimeInterval::Millis(WEEK)),
    (MONTH, TimeInterval::Months(1)),
    (3.0 * MONTH, TimeInterval::Months(3)),
    (YEAR, TimeInterval::Years(1)),
];

/// Picks the tick interval for a time span in milliseconds, d3 `scaleTime` style.
pub fn time_tick_interval(start_ms: f64, stop_ms: f64, count: usize) -> TimeInterval {
    let (lo, hi) = if stop_ms < start_ms {
        (stop_ms, start_ms)
    } else {
        (start_ms, stop_ms)
    };
    let target = (hi - lo) / count.max(1) as f64;
    let i = TICK_INTERVALS.partition_point(|(ms, _)| *ms < target);
    if i == TICK_INTERVALS.len() {
        let step = tick_step(lo / YEAR, hi / YEAR, count as f64).max(1.0);
        return TimeInterval::Years(step.round() as u32);
    }
    if i == 0 {
        // Sub-second spans fall back to decimal steps; fractions of a
        // millisecond are allowed since high-rate channels zoom that far.
        return TimeInterval::Millis(tick_step(lo, hi, count as f64));
    }
    let (prev_ms, prev) = TICK_INTERVALS[i - 1];
    let (next_ms, next) = TICK_INTERVALS[i];
    if target / prev_ms < next_ms / target {
        prev
    } else {
        next
    }
}

/// Tick instants (epoch ms) inside [start, stop] for the given interval.
pub fn time_ticks(start_ms: f64, stop_ms: f64, count: usize) -> Vec<f64> {
    let (lo, hi) = if stop_ms < start_ms {
        (stop_ms, start_ms)
    } else {
        (start_ms, stop_ms)
    };
    if !(lo.is_finite() && hi.is_finite()) || count == 0 {
        return vec![];
    }
    match time_tick_interval(lo, hi, count) {
        TimeInterval::Millis(step) => {
            if step <= 0.0 || !step.is_finite() {
                return vec![lo];
            }
            let first = (lo / step).ceil();
            let last = (hi / step).floor();
            if last < first {
                return vec![];
            }
            (0..=(last - first) as usize)
                .map(|i| (first + i as f64) * step)
                .collect()
        }
        TimeInterval::Months(n) => calendar_ticks(lo, hi, n),
        TimeInterval::Years(n) => calendar_ticks(lo, hi, n * 12),
    }
}

/// Months since year 0 of the month containing `ms`.
fn month_index(ms: f64) -> i64 {
    let t = crate::utils::from_ms(ms);
    t.year() as i64 * 12 + t.month0() as i64
}

/// Epoch ms of the first instant of month `index`.
fn month_start_ms(index: i64) -> Option<f64> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| crate::utils::to_ms(d.and_utc()))
}

fn calendar_ticks(lo: f64, hi: f64, step_months: u32) -> Vec<f64> {
    let step = step_months.max(1) as i64;
    let mut index = (month_index(lo) + step - 1).div_euclid(step) * step;
    let mut out = Vec::new();
    loop {
        let Some(ms) = month_start_ms(index) else {
            break;
        };
        if ms > hi {
            break;
        }
        if ms >= lo {
            out.push(ms);
        }
        index += step;
    }
    out
}

/// Rounds a time domain outwards to whole tick intervals. Month and year
/// intervals round to calendar boundaries (UTC).
pub fn nice_time(start_ms: f64, stop_ms: f64, count: usize) -> (f64, f64) {
    match time_tick_interval(start_ms, stop_ms, count) {
        TimeInterval::Millis(step) if step > 0.0 && step.is_finite() => (
            (start_ms / step).floor() * step,
            (stop_ms / step).ceil() * step,
        ),
        TimeInterval::Months(n) => nice_calendar(start_ms, stop_ms, n),
        TimeInterval::Years(n) => nice_calendar(start_ms, stop_ms, n.saturating_mul(12)),
        _ => (start_ms, stop_ms),
    }
}

fn nice_calendar(start_ms: f64, stop_ms: f64, step_months: u32) -> (f64, f64) {
    if !(start_ms.is_finite() && stop_ms.is_finite()) {
        return (start_ms, stop_ms);
    }
    let step = step_months.max(1) as i64;
    let (lo, hi, reversed) = if stop_ms < start_ms {
        (stop_ms, start_ms, true)
    } else {
        (start_ms, stop_ms, false)
    };
    let first = month_index(lo).div_euclid(step) * step;
    let mut last = month_index(hi).div_euclid(step) * step;
    if month_start_ms(last).is_some_and(|ms| ms < hi) {
        last += step;
    }
    let (Some(a), Some(b)) = (month_start_ms(first), month_start_ms(last)) else {
        return (start_ms, stop_ms);
    };
    if reversed {
        (b, a)
    } else {
        (a, b)
    }
}
