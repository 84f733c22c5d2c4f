//! Zoom transform and coordinate projection

use crate::data_types::{ScreenPoint, ScreenRect};
use crate::scales::LinearScale;

/// Horizontal scale + translate applied to the time axis, d3-zoom style:
/// a domain position `x` lands on screen at `x * k + tx`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self { k: 1.0, x: 0.0 };

    pub fn new(k: f64, x: f64) -> Self {
        Self { k, x }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply_x(&self, x: f64) -> f64 {
        x * self.k + self.x
    }

    pub fn invert_x(&self, px: f64) -> f64 {
        (px - self.x) / self.k
    }

    /// Same scale factor, shifted by `dx` screen pixels.
    pub fn translate_by(&self, dx: f64) -> Self {
        Self::new(self.k, self.x + dx)
    }

    /// Rescales to `k` keeping the point under `pivot` (screen pixels) fixed.
    pub fn scale_at(&self, k: f64, pivot: f64) -> Self {
        let anchored = self.invert_x(pivot);
        Self::new(k, pivot - anchored * k)
    }

    /// Copy of `scale` whose domain is what this transform shows across the
    /// scale's range.
    pub fn rescale_x(&self, scale: &LinearScale) -> LinearScale {
        if self.is_identity() {
            return *scale;
        }
        let (r0, r1) = scale.range();
        let d0 = scale.invert(self.invert_x(r0));
        let d1 = scale.invert(self.invert_x(r1));
        scale.with_domain(d0, d1)
    }

    /// Keeps the viewport `extent` inside `translate_extent` (both in
    /// untransformed pixels). When the content is narrower than the
    /// viewport it is centered instead.
    pub fn constrain(&self, extent: (f64, f64), translate_extent: (f64, f64)) -> Self {
        let dx0 = self.invert_x(extent.0) - translate_extent.0;
        let dx1 = self.invert_x(extent.1) - translate_extent.1;
        let shift = if dx1 > dx0 {
            (dx0 + dx1) / 2.0
        } else if dx0 < 0.0 {
            dx0
        } else if dx1 > 0.0 {
            dx1
        } else {
            0.0
        };
        // shift is in untransformed units
        Self::new(self.k, self.x + shift * self.k)
    }
}

/// Projects (time ms, amplitude) onto surface coordinates, including the
/// plot rectangle's offset inside the surface.
#[derive(Clone, Debug)]
pub struct PlotTransform {
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub bounds: ScreenRect,
}

impl PlotTransform {
    pub fn new(x_scale: LinearScale, y_scale: LinearScale, bounds: ScreenRect) -> Self {
        Self {
            x_scale,
            y_scale,
            bounds,
        }
    }

    pub fn data_to_screen(&self, time_ms: f64, amplitude: f64) -> ScreenPoint {
        ScreenPoint::new(
            self.x_data_to_screen(time_ms),
            self.y_data_to_screen(amplitude),
        )
    }

    pub fn screen_to_data(&self, point: ScreenPoint) -> (f64, f64) {
        (
            self.x_scale
                .invert((point.x - self.bounds.origin.x) as f64),
            self.y_scale
                .invert((point.y - self.bounds.origin.y) as f64),
        )
    }

    pub fn x_data_to_screen(&self, x: f64) -> f32 {
        self.bounds.origin.x + self.x_scale.map(x) as f32
    }

    pub fn y_data_to_screen(&self, y: f64) -> f32 {
        self.bounds.origin.y + self.y_scale.map(y) as f32
    }

    /// Returns (x_scale, x_offset, y_scale, y_offset) for bulk projection.
    /// formula: screen_val = data_val * scale + offset
    pub fn get_scale_coefficients(&self) -> (f64, f64, f64, f64) {
        let (x_m, x_c) = self.x_scale.get_linear_coeffs();
        let (y_m, y_c) = self.y_scale.get_linear_coeffs();

        let x_offset = self.bounds.origin.x as f64 + x_c;
        let y_offset = self.bounds.origin.y as f64 + y_c;

        (x_m, x_offset, y_m, y_offset)
    }
}
