use chrono::{DateTime, TimeZone, Utc};

pub mod date_formatter;

/// Milliseconds since the epoch, the unit every time scale domain is kept in.
pub fn to_ms(t: DateTime<Utc>) -> f64 {
    t.timestamp_nanos_opt()
        .map(|ns| ns as f64 / 1_000_000.0)
        .unwrap_or_else(|| t.timestamp_millis() as f64)
}

pub fn from_ms(ms: f64) -> DateTime<Utc> {
    let secs = (ms / 1000.0).floor();
    let nanos = ((ms - secs * 1000.0) * 1_000_000.0).round().clamp(0.0, 999_999_999.0);
    match Utc.timestamp_opt(secs as i64, nanos as u32) {
        chrono::LocalResult::Single(d) => d,
        chrono::LocalResult::Ambiguous(d, _) => d,
        chrono::LocalResult::None => DateTime::<Utc>::default(),
    }
}

pub fn seconds(secs: f64) -> chrono::Duration {
    chrono::Duration::nanoseconds((secs * 1e9).round() as i64)
}
