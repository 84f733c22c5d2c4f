use super::common::bucket_min_max;
use rayon::prelude::*;

/// Segments longer than this are bucketed in parallel.
const PAR_THRESHOLD: usize = 1 << 16;

/// Low/high amplitude of the samples falling into one horizontal pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeBucket {
    pub pixel: usize,
    pub low: f64,
    pub high: f64,
}

/// Number of pixel columns a segment of `sample_count` samples spans.
pub fn pixel_count(sample_count: usize, samples_per_pixel: f64) -> usize {
    if sample_count == 0 || !(samples_per_pixel > 0.0) {
        return 0;
    }
    (sample_count as f64 / samples_per_pixel).ceil() as usize
}

#[inline(always)]
fn bucket_bounds(pixel: usize, samples_per_pixel: f64, len: usize) -> (usize, usize) {
    let start = ((pixel as f64 * samples_per_pixel).floor() as usize).min(len);
    let end = (((pixel + 1) as f64 * samples_per_pixel).floor() as usize).min(len);
    (start, end)
}

/// Min/max envelope of `samples`, one bucket per pixel column. Buckets with
/// no usable sample (past the end of the data, or only gaps) are left out.
pub fn compute_envelope(samples: &[f64], samples_per_pixel: f64) -> Vec<EnvelopeBucket> {
    let pixels = pixel_count(samples.len(), samples_per_pixel);
    let aggregate = |pixel: usize| {
        let (start, end) = bucket_bounds(pixel, samples_per_pixel, samples.len());
        bucket_min_max(&samples[start..end]).map(|(low, high)| EnvelopeBucket { pixel, low, high })
    };

    if samples.len() >= PAR_THRESHOLD {
        (0..pixels).into_par_iter().filter_map(aggregate).collect()
    } else {
        (0..pixels).filter_map(aggregate).collect()
    }
}

/// Flattens an envelope into one polyline alternating low and high values.
/// Point `i` (counting both values of every pixel) sits at
/// `start + (i / 2 + 0.5) * seconds_per_pixel`, returned in epoch ms.
pub fn envelope_points(
    envelope: &[EnvelopeBucket],
    start_ms: f64,
    seconds_per_pixel: f64,
) -> Vec<(f64, f64)> {
    let step_ms = seconds_per_pixel * 1000.0;
    let mut points = Vec::with_capacity(envelope.len() * 2);
    for bucket in envelope {
        let i = (2 * bucket.pixel) as f64;
        points.push((start_ms + (i / 2.0 + 0.5) * step_ms, bucket.low));
        points.push((start_ms + ((i + 1.0) / 2.0 + 0.5) * step_ms, bucket.high));
    }
    points
}
