//! Paired time and amplitude scales sharing one plot rectangle.

use crate::data_types::{Segment, Size};
use crate::scales::{nice_time, LinearScale};

/// Time scale plus two amplitude scales: `y` is used for drawing and keeps
/// the true amplitudes, `y_axis` only feeds the axis and is centered on zero
/// so ticks read as deviation around the middle of the plot.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalePair {
    x: LinearScale,
    y: LinearScale,
    y_axis: LinearScale,
    size: Size,
}

impl ScalePair {
    pub fn new(time_domain_ms: (f64, f64), amplitude: (f64, f64), size: Size) -> Self {
        let mut pair = Self {
            x: LinearScale::new(time_domain_ms, (0.0, size.width as f64)),
            y: LinearScale::new(amplitude, (size.height as f64, 0.0)),
            y_axis: LinearScale::new((-0.5, 0.5), (size.height as f64, 0.0)),
            size,
        };
        pair.set_amplitude_domain(amplitude.0, amplitude.1);
        pair
    }

    pub fn x(&self) -> &LinearScale {
        &self.x
    }

    pub fn y(&self) -> &LinearScale {
        &self.y
    }

    pub fn y_axis(&self) -> &LinearScale {
        &self.y_axis
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Re-ranges every scale to a new plot size. Domains are untouched.
    pub fn set_dimensions(&mut self, width: f32, height: f32) {
        self.size = Size::new(width, height);
        self.x.update_range(0.0, width as f64);
        self.y.update_range(height as f64, 0.0);
        self.y_axis.update_range(height as f64, 0.0);
    }

    /// Replaces the time domain. Callers redraw afterwards.
    pub fn set_domain(&mut self, start_ms: f64, end_ms: f64) {
        self.x.update_domain(start_ms, end_ms);
    }

    pub fn set_amplitude_domain(&mut self, min: f64, max: f64) {
        self.y.update_domain(min, max);
        let (lo, hi) = self.y.domain();
        let half = (hi - lo) / 2.0;
        self.y_axis.update_domain(-half, half);
    }

    /// Rounds the time and amplitude domains outward to tick-friendly values.
    pub fn nice(&mut self, count: usize) {
        self.nice_time(count);
        self.nice_amplitude(count);
    }

    pub fn nice_time(&mut self, count: usize) {
        let (start, end) = self.x.domain();
        let (start, end) = nice_time(start, end, count);
        self.x.update_domain(start, end);
    }

    pub fn nice_amplitude(&mut self, count: usize) {
        self.y.nice(count);
        let (lo, hi) = self.y.domain();
        self.set_amplitude_domain(lo, hi);
        self.y_axis.nice(count);
    }
}

/// Global amplitude extent over the segments overlapping `time_domain_ms`
/// (all segments when no domain is given).
pub fn calc_amplitude_domain(
    segments: &[Segment],
    time_domain_ms: Option<(f64, f64)>,
) -> Option<(f64, f64)> {
    segments
        .iter()
        .filter(|s| match time_domain_ms {
            Some((start, end)) => s.end_ms() >= start && s.start_ms() <= end,
            None => true,
        })
        .filter_map(Segment::min_max)
        .reduce(|(a, b), (lo, hi)| (a.min(lo), b.max(hi)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_scale_is_centered_on_zero() {
        let pair = ScalePair::new((0.0, 1000.0), (100.0, 300.0), Size::new(400.0, 200.0));
        assert_eq!(pair.y().domain(), (100.0, 300.0));
        assert_eq!(pair.y_axis().domain(), (-100.0, 100.0));
        // zero of the axis scale sits in the vertical middle
        assert_eq!(pair.y_axis().map(0.0), 100.0);
    }

    #[test]
    fn set_dimensions_keeps_domains() {
        let mut pair = ScalePair::new((0.0, 1000.0), (-1.0, 1.0), Size::new(400.0, 200.0));
        pair.set_dimensions(800.0, 100.0);
        assert_eq!(pair.x().domain(), (0.0, 1000.0));
        assert_eq!(pair.x().range(), (0.0, 800.0));
        assert_eq!(pair.y().range(), (100.0, 0.0));
        assert_eq!(pair.y_axis().range(), (100.0, 0.0));
    }
}
