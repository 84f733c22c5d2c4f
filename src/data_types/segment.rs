use crate::error::{ChartError, Result};
use crate::utils::{seconds, to_ms};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Network / station / location / channel codes of a recording channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelCodes {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
}

impl ChannelCodes {
    pub fn new(network: &str, station: &str, location: &str, channel: &str) -> Self {
        Self {
            network: network.to_string(),
            station: station.to_string(),
            location: location.to_string(),
            channel: channel.to_string(),
        }
    }
}

impl fmt::Display for ChannelCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.channel
        )
    }
}

/// Stable identity of a segment: its channel codes plus its start time.
/// Two segments built from the same record share an id even if they are
/// distinct values, which is what the render cache and path ids key on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(String);

impl SegmentId {
    pub fn new(codes: &ChannelCodes, start: DateTime<Utc>) -> Self {
        Self(format!(
            "{}_{}",
            codes,
            start.format("%Y-%m-%dT%H:%M:%S%.6fZ")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A contiguous run of uniformly sampled amplitudes.
#[derive(Clone, Debug)]
pub struct Segment {
    codes: ChannelCodes,
    start: DateTime<Utc>,
    sample_rate: f64,
    samples: Arc<[f64]>,
    id: SegmentId,
}

impl Segment {
    pub fn new(
        codes: ChannelCodes,
        start: DateTime<Utc>,
        sample_rate: f64,
        samples: impl Into<Arc<[f64]>>,
    ) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ChartError::InvalidSegment(format!(
                "{}: sample rate must be positive, got {}",
                codes, sample_rate
            )));
        }
        let id = SegmentId::new(&codes, start);
        Ok(Self {
            codes,
            start,
            sample_rate,
            samples: samples.into(),
            id,
        })
    }

    pub fn id(&self) -> &SegmentId {
        &self.id
    }

    pub fn codes(&self) -> &ChannelCodes {
        &self.codes
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start
    }

    /// Time of the last sample, `start + (n - 1) / sample_rate`.
    pub fn end_time(&self) -> DateTime<Utc> {
        if self.samples.is_empty() {
            return self.start;
        }
        self.time_of_sample(self.samples.len() - 1)
    }

    pub fn time_of_sample(&self, index: usize) -> DateTime<Utc> {
        self.start + seconds(index as f64 / self.sample_rate)
    }

    pub fn start_ms(&self) -> f64 {
        to_ms(self.start)
    }

    pub fn end_ms(&self) -> f64 {
        self.start_ms() + self.duration_secs() * 1000.0
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len().saturating_sub(1) as f64 / self.sample_rate
    }

    /// Smallest and largest sample, NaN gaps skipped.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut acc: Option<(f64, f64)> = None;
        for &v in self.samples.iter() {
            if v.is_nan() {
                continue;
            }
            acc = Some(match acc {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
        acc
    }
}

/// Earliest start and latest end over a set of segments.
pub fn find_start_end(segments: &[Segment]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    segments.iter().fold(None, |acc, s| {
        let (start, end) = (s.start_time(), s.end_time());
        Some(match acc {
            None => (start, end),
            Some((a, b)) => (a.min(start), b.max(end)),
        })
    })
}

/// Overall amplitude extent over a set of segments.
pub fn find_min_max(segments: &[Segment]) -> Option<(f64, f64)> {
    segments
        .iter()
        .filter_map(Segment::min_max)
        .reduce(|(a, b), (lo, hi)| (a.min(lo), b.max(hi)))
}
