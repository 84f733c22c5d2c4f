//! Zoom / pan state for the time axis.
//!
//! The controller owns the current [`ZoomTransform`], clamps it to the scale
//! extent derived from sample density and to the plot rectangle, and hands
//! every accepted change to its listeners. Amplitude is never zoomed here.

use crate::command::CommandQueue;
use crate::data_types::Segment;
use crate::scales::LinearScale;
use crate::transform::ZoomTransform;
use tracing::debug;

/// Smallest scale factor: zooming out to a quarter of the original span.
pub const MIN_ZOOM: f64 = 0.25;
/// `max_zoom_for` never goes below this.
pub const MIN_MAX_ZOOM: f64 = 8.0;

/// What caused a transform change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomSource {
    Zoom,
    Pan,
    Programmatic,
    Reset,
}

/// Delivered to listeners after an accepted transform change.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomEvent {
    pub transform: ZoomTransform,
    /// Original time scale rescaled by `transform`.
    pub x_scale: LinearScale,
    pub source: ZoomSource,
}

/// Receives zoom events. Anything it wants changed on the chart must be
/// queued on `commands`; it runs once the current redraw completes.
pub trait ZoomListener {
    fn on_zoom(&mut self, event: &ZoomEvent, commands: &mut CommandQueue);
}

impl<F> ZoomListener for F
where
    F: FnMut(&ZoomEvent, &mut CommandQueue),
{
    fn on_zoom(&mut self, event: &ZoomEvent, commands: &mut CommandQueue) {
        self(event, commands)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

/// Upper zoom bound for a set of segments drawn on `scale` (identity zoom):
/// samples per pixel of the densest segment times `pixel_per_sample`,
/// rounded up to a power of two and never below [`MIN_MAX_ZOOM`].
pub fn max_zoom_for(segments: &[Segment], scale: &LinearScale, pixel_per_sample: f64) -> f64 {
    let width = scale.range_width();
    if width <= 0.0 {
        return MIN_MAX_ZOOM;
    }
    let seconds_per_pixel = scale.span().abs() / 1000.0 / width;
    let densest = segments
        .iter()
        .map(|s| s.sample_rate() * seconds_per_pixel)
        .fold(0.0_f64, f64::max);
    let wanted = densest * pixel_per_sample;
    if !(wanted.is_finite() && wanted > 0.0) {
        return MIN_MAX_ZOOM;
    }
    2f64.powf(wanted.log2().ceil()).max(MIN_MAX_ZOOM)
}

pub struct ZoomController {
    transform: ZoomTransform,
    base: LinearScale,
    scale_extent: (f64, f64),
    extent: (f64, f64),
    translate_extent: (f64, f64),
    listeners: Vec<(ListenerId, Box<dyn ZoomListener>)>,
    next_listener: usize,
}

impl ZoomController {
    /// `base` is the un-zoomed time scale; its range is the plot width.
    pub fn new(base: LinearScale, max_zoom: f64) -> Self {
        let (r0, r1) = base.range();
        Self {
            transform: ZoomTransform::IDENTITY,
            base,
            scale_extent: (MIN_ZOOM, max_zoom.max(MIN_ZOOM)),
            extent: (r0.min(r1), r0.max(r1)),
            translate_extent: (r0.min(r1), r0.max(r1)),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn scale_extent(&self) -> (f64, f64) {
        self.scale_extent
    }

    pub fn max_zoom(&self) -> f64 {
        self.scale_extent.1
    }

    pub fn base(&self) -> &LinearScale {
        &self.base
    }

    /// The base time scale as currently zoomed.
    pub fn rescaled(&self) -> LinearScale {
        self.transform.rescale_x(&self.base)
    }

    /// Replaces the un-zoomed scale (domain or width changed). The
    /// viewport follows the new range and the transform is re-clamped.
    pub fn set_base(&mut self, base: LinearScale) {
        let (r0, r1) = base.range();
        self.base = base;
        self.extent = (r0.min(r1), r0.max(r1));
        self.translate_extent = self.extent;
        self.transform = self.clamp(self.transform);
    }

    pub fn set_max_zoom(&mut self, max_zoom: f64) {
        self.scale_extent.1 = max_zoom.max(MIN_ZOOM);
        self.transform = self.clamp(self.transform);
    }

    /// Multiplies the current scale by `factor` around `pivot` (plot pixels).
    pub fn zoom_by(&mut self, factor: f64, pivot: f64) -> Option<ZoomEvent> {
        if !(factor.is_finite() && factor > 0.0) {
            return None;
        }
        self.scale_to(self.transform.k * factor, pivot)
    }

    pub fn scale_to(&mut self, k: f64, pivot: f64) -> Option<ZoomEvent> {
        let k = k.clamp(self.scale_extent.0, self.scale_extent.1);
        let next = self.transform.scale_at(k, pivot);
        self.commit(next, ZoomSource::Zoom)
    }

    /// Pans by `dx` plot pixels; positive moves content to the right.
    pub fn translate_by(&mut self, dx: f64) -> Option<ZoomEvent> {
        if !dx.is_finite() {
            return None;
        }
        let next = self.transform.translate_by(dx);
        self.commit(next, ZoomSource::Pan)
    }

    pub fn set_transform(&mut self, transform: ZoomTransform) -> Option<ZoomEvent> {
        self.commit(transform, ZoomSource::Programmatic)
    }

    pub fn reset(&mut self) -> Option<ZoomEvent> {
        self.commit(ZoomTransform::IDENTITY, ZoomSource::Reset)
    }

    fn clamp(&self, transform: ZoomTransform) -> ZoomTransform {
        let k = transform
            .k
            .clamp(self.scale_extent.0, self.scale_extent.1);
        ZoomTransform::new(k, transform.x).constrain(self.extent, self.translate_extent)
    }

    fn commit(&mut self, transform: ZoomTransform, source: ZoomSource) -> Option<ZoomEvent> {
        let next = self.clamp(transform);
        if next == self.transform && source != ZoomSource::Reset {
            return None;
        }
        self.transform = next;
        let x_scale = self.rescaled();
        debug!(
            k = next.k,
            x = next.x,
            ?source,
            domain = ?x_scale.domain(),
            "zoom transform updated"
        );
        Some(ZoomEvent {
            transform: next,
            x_scale,
            source,
        })
    }

    pub fn add_listener(&mut self, listener: impl ZoomListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        before != self.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Calls every listener, in registration order.
    pub fn notify(&mut self, event: &ZoomEvent, commands: &mut CommandQueue) {
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_zoom(event, commands);
        }
    }
}
