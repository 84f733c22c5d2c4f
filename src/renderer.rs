//! Per-segment choice between drawing every sample and drawing the
//! min/max envelope, and the path geometry that results.

use crate::data_types::{ScreenPoint, Segment, SegmentId};
use crate::decimation::{envelope_points, MinMaxCache};
use crate::scales::LinearScale;
use crate::transform::PlotTransform;
use std::collections::HashSet;
use tracing::debug;

pub const DEFAULT_COMPRESSED_CUTOFF: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// One point per sample at its exact time.
    Full,
    /// Alternating low/high envelope, one pair per pixel column.
    Compressed,
}

/// Drawing points of a segment in data space: (epoch ms, amplitude).
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentPoints {
    pub mode: RenderMode,
    pub samples_per_pixel: f64,
    pub points: Vec<(f64, f64)>,
}

pub struct DecimationRenderer {
    compressed_cutoff: f64,
    cache: MinMaxCache,
}

impl Default for DecimationRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSED_CUTOFF)
    }
}

impl DecimationRenderer {
    pub fn new(compressed_cutoff: f64) -> Self {
        Self {
            compressed_cutoff,
            cache: MinMaxCache::new(),
        }
    }

    pub fn compressed_cutoff(&self) -> f64 {
        self.compressed_cutoff
    }

    pub fn set_compressed_cutoff(&mut self, cutoff: f64) {
        self.compressed_cutoff = cutoff;
    }

    /// Seconds of data covered by one horizontal pixel of `x_scale`.
    pub fn seconds_per_pixel(x_scale: &LinearScale) -> f64 {
        let width = x_scale.range_width();
        if width <= 0.0 {
            return 0.0;
        }
        x_scale.span().abs() / 1000.0 / width
    }

    pub fn samples_per_pixel(segment: &Segment, x_scale: &LinearScale) -> f64 {
        segment.sample_rate() * Self::seconds_per_pixel(x_scale)
    }

    pub fn mode_for(&self, segment: &Segment, x_scale: &LinearScale) -> RenderMode {
        if Self::samples_per_pixel(segment, x_scale) < self.compressed_cutoff {
            RenderMode::Full
        } else {
            RenderMode::Compressed
        }
    }

    pub fn segment_points(&mut self, segment: &Segment, x_scale: &LinearScale) -> SegmentPoints {
        let seconds_per_pixel = Self::seconds_per_pixel(x_scale);
        let samples_per_pixel = segment.sample_rate() * seconds_per_pixel;
        let start_ms = segment.start_ms();

        if samples_per_pixel < self.compressed_cutoff {
            let period_ms = 1000.0 / segment.sample_rate();
            let points = segment
                .samples()
                .iter()
                .enumerate()
                .map(|(i, &v)| (start_ms + i as f64 * period_ms, v))
                .collect();
            return SegmentPoints {
                mode: RenderMode::Full,
                samples_per_pixel,
                points,
            };
        }

        let domain_end = x_scale.domain().1;
        let entry = self
            .cache
            .get_or_compute(segment, seconds_per_pixel, domain_end);
        SegmentPoints {
            mode: RenderMode::Compressed,
            samples_per_pixel,
            points: envelope_points(&entry.envelope, start_ms, seconds_per_pixel),
        }
    }

    /// Screen polylines for a segment. Points far outside the visible time
    /// domain are culled (one neighbour is kept on each side so lines still
    /// reach the clip edge) and NaN gaps split the path into separate runs.
    pub fn segment_path(
        &mut self,
        segment: &Segment,
        transform: &PlotTransform,
    ) -> Vec<Vec<ScreenPoint>> {
        let SegmentPoints { mode, points, .. } = self.segment_points(segment, &transform.x_scale);
        let (d0, d1) = transform.x_scale.domain();
        let (lo, hi) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };
        let first = points.partition_point(|(t, _)| *t < lo).saturating_sub(1);
        let last = (points.partition_point(|(t, _)| *t <= hi) + 1).min(points.len());

        let mut runs = Vec::new();
        let mut current = Vec::new();
        for &(t, v) in points.get(first..last).unwrap_or_default() {
            if v.is_nan() {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
                continue;
            }
            current.push(transform.data_to_screen(t, v));
        }
        if !current.is_empty() {
            runs.push(current);
        }
        debug!(
            segment = %segment.id(),
            ?mode,
            runs = runs.len(),
            "segment path built"
        );
        runs
    }

    pub fn cache(&self) -> &MinMaxCache {
        &self.cache
    }

    pub fn forget(&mut self, id: &SegmentId) {
        self.cache.invalidate(id);
    }

    pub fn retain(&mut self, ids: &HashSet<SegmentId>) {
        self.cache.retain(ids);
    }
}
