//! Chart orchestrator
//!
//! A [`Chart`] owns the segment set, the scales, the zoom controller, the
//! decimating renderer and the marker overlay, and pushes everything it
//! draws into a [`DrawingSurface`]. All work happens synchronously on the
//! caller's thread. The only deferred things are the debounced resize
//! (driven by [`Chart::poll`]) and the commands zoom listeners queue while a
//! redraw is running, which are executed right after it.

use crate::axis::{amplitude_axis, time_axis};
use crate::command::{ChartCommand, CommandQueue};
use crate::data_types::{
    find_start_end, ChartConfig, Marker, MarkerKey, ScreenPoint, ScreenRect, Segment, SegmentId,
    Size,
};
use crate::debounce::Debouncer;
use crate::error::{ChartError, Result};
use crate::markers::MarkerOverlay;
use crate::renderer::{DecimationRenderer, RenderMode};
use crate::scale_pair::{calc_amplitude_domain, ScalePair};
use crate::scales::LinearScale;
use crate::surface::{
    DrawingSurface, Element, MarkerElement, PathElement, TextAnchor, TextElement, TextStyle,
};
use crate::transform::{PlotTransform, ZoomTransform};
use crate::utils::{from_ms, to_ms};
use crate::zoom_controller::{max_zoom_for, ListenerId, ZoomController, ZoomEvent, ZoomListener};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Smallest outer size a chart lays itself out in.
pub const MIN_OUTER_SIZE: Size = Size {
    width: 200.0,
    height: 100.0,
};
/// Outer size assumed for a dimension the surface reports as zero.
pub const UNSIZED_OUTER: Size = Size {
    width: 50.0,
    height: 100.0,
};
/// Span used when the time domain collapses to a single instant.
pub const DEFAULT_SPAN_MS: f64 = 1000.0;
/// Amplitude domain used when no segment has a finite sample.
pub const DEFAULT_AMPLITUDE: (f64, f64) = (-1.0, 1.0);
/// Deferred commands executed per triggering event before the rest is dropped.
pub const MAX_DEFERRED_COMMANDS: usize = 256;

const LABEL_OFFSET: f32 = 6.0;
const SUBLABEL_GAP: f32 = 14.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartState {
    /// Scales, zoom and clip region exist; nothing has been emitted yet.
    Built,
    /// Geometry, axes and markers are on the surface.
    Drawn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedrawReason {
    Initial,
    Zoomed,
    Resized,
    Appended,
    Trimmed,
    DomainChanged,
    Configured,
    MarkersChanged,
}

/// Summary of the last redraw, for callers and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct RedrawReport {
    pub reason: RedrawReason,
    /// Segment paths emitted.
    pub paths: usize,
    /// Of those, drawn from the min/max envelope.
    pub compressed: usize,
    pub axes: bool,
    /// Marker groups emitted (visible markers).
    pub markers: usize,
    pub labels: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct Layers {
    geometry: bool,
    axes: bool,
    markers: bool,
    labels: bool,
}

impl Layers {
    const ALL: Self = Self {
        geometry: true,
        axes: true,
        markers: true,
        labels: true,
    };
    const TRANSFORM: Self = Self {
        geometry: true,
        axes: true,
        markers: true,
        labels: false,
    };
}

pub struct Chart<S: DrawingSurface> {
    config: ChartConfig,
    surface: S,
    segments: Vec<Segment>,
    outer: Size,
    scales: ScalePair,
    zoom: ZoomController,
    renderer: DecimationRenderer,
    markers: MarkerOverlay,
    state: ChartState,
    resize: Debouncer<Size>,
    commands: CommandQueue,
    draining: bool,
    /// Suffix appended to every element id so several charts can share a surface.
    suffix: String,
    clip_id: String,
    last_redraw: Option<RedrawReport>,
}

impl<S: DrawingSurface> Chart<S> {
    /// Builds a chart whose time domain spans all `segments`.
    pub fn new(surface: Option<S>, segments: Vec<Segment>, config: ChartConfig) -> Result<Self> {
        Self::build(surface, segments, None, config)
    }

    /// Builds a chart over an explicit time domain. Segments outside it are
    /// kept but not visible until the domain is changed.
    pub fn with_domain(
        surface: Option<S>,
        segments: Vec<Segment>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        config: ChartConfig,
    ) -> Result<Self> {
        Self::build(surface, segments, Some((start, end)), config)
    }

    fn build(
        surface: Option<S>,
        segments: Vec<Segment>,
        domain: Option<(DateTime<Utc>, DateTime<Utc>)>,
        config: ChartConfig,
    ) -> Result<Self> {
        config.validate()?;
        let segments = dedup_segments(segments);
        let mut surface = surface.ok_or(ChartError::MissingSurface)?;
        let reported = surface.size();
        if !reported.is_valid() {
            return Err(ChartError::InvalidSurface {
                width: reported.width,
                height: reported.height,
            });
        }

        let (start, end) = match domain.or_else(|| find_start_end(&segments)) {
            Some(d) => d,
            None => return Err(ChartError::EmptyDomain),
        };
        let (start_ms, end_ms) = time_domain(to_ms(start), to_ms(end));

        let outer = outer_size(reported);
        let plot = plot_size(outer, &config);
        let amplitude = amplitude_domain(&segments, (start_ms, end_ms));
        let mut scales = ScalePair::new((start_ms, end_ms), amplitude, plot);
        scales.nice(config.tick_count);

        let max_zoom = max_zoom_for(&segments, scales.x(), config.max_zoom_pixel_per_sample);
        let zoom = ZoomController::new(*scales.x(), max_zoom);

        let uuid = Uuid::new_v4().simple().to_string();
        let clip_id = format!("clippath_{}", uuid);
        let rect = plot_rect(plot, &config);
        surface.set_clip(&clip_id, rect);

        info!(
            segments = segments.len(),
            width = outer.width,
            height = outer.height,
            max_zoom,
            "chart built"
        );

        Ok(Self {
            renderer: DecimationRenderer::new(config.compressed_cutoff),
            markers: MarkerOverlay::new(config.marker_fallback_size),
            resize: Debouncer::new(config.resize_debounce),
            config,
            surface,
            segments,
            outer,
            scales,
            zoom,
            state: ChartState::Built,
            commands: CommandQueue::new(),
            draining: false,
            suffix: uuid,
            clip_id,
            last_redraw: None,
        })
    }

    /// Emits geometry, axes, markers and labels.
    pub fn draw(&mut self) {
        self.state = ChartState::Drawn;
        self.redraw(RedrawReason::Initial, Layers::ALL);
        info!(chart = %self.suffix, "chart drawn");
    }

    /// Adds a segment, replacing one with the same identity.
    pub fn append(&mut self, segment: Segment) {
        self.append_all(std::iter::once(segment));
    }

    /// Adds several segments with a single redraw.
    pub fn append_all(&mut self, segments: impl IntoIterator<Item = Segment>) {
        let mut added = 0usize;
        for segment in segments {
            self.renderer.forget(segment.id());
            match self.segments.iter().position(|s| s.id() == segment.id()) {
                Some(i) => self.segments[i] = segment,
                None => self.segments.push(segment),
            }
            added += 1;
        }
        if added == 0 {
            return;
        }
        let axis_changed = self.update_amplitude_domain();
        debug!(added, axis_changed, "segments appended");
        self.redraw(
            RedrawReason::Appended,
            Layers {
                geometry: true,
                axes: axis_changed,
                ..Layers::default()
            },
        );
    }

    /// Drops every segment ending before `cutoff`. Returns how many went.
    pub fn trim(&mut self, cutoff: DateTime<Utc>) -> usize {
        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.segments)
            .into_iter()
            .partition(|s| s.end_time() >= cutoff);
        self.segments = kept;
        if dropped.is_empty() {
            return 0;
        }

        for segment in &dropped {
            let id = path_element_id(segment.id(), &self.suffix);
            self.surface.remove(&id);
        }
        let live: HashSet<SegmentId> = self.segments.iter().map(|s| s.id().clone()).collect();
        self.renderer.retain(&live);
        self.update_amplitude_domain();
        info!(
            removed = dropped.len(),
            remaining = self.segments.len(),
            %cutoff,
            "segments trimmed"
        );
        self.redraw(
            RedrawReason::Trimmed,
            Layers {
                geometry: true,
                axes: true,
                ..Layers::default()
            },
        );
        dropped.len()
    }

    /// Multiplies the zoom scale by `factor` around `pivot` (plot pixels).
    /// Returns whether the transform changed.
    pub fn zoom_by(&mut self, factor: f64, pivot: f64) -> bool {
        let event = self.zoom.zoom_by(factor, pivot);
        self.on_zoom(event)
    }

    pub fn scale_to(&mut self, k: f64, pivot: f64) -> bool {
        let event = self.zoom.scale_to(k, pivot);
        self.on_zoom(event)
    }

    pub fn translate_by(&mut self, dx: f64) -> bool {
        let event = self.zoom.translate_by(dx);
        self.on_zoom(event)
    }

    /// Pans by a pointer drag of `dx` pixels.
    pub fn drag_by(&mut self, dx: f32) -> bool {
        self.translate_by(dx as f64)
    }

    pub fn set_zoom_transform(&mut self, transform: ZoomTransform) -> bool {
        let event = self.zoom.set_transform(transform);
        self.on_zoom(event)
    }

    /// Restores the identity transform.
    pub fn reset_zoom(&mut self) -> bool {
        let event = self.zoom.reset();
        self.on_zoom(event)
    }

    /// Lays the chart out for a new outer size right away.
    pub fn resize(&mut self, outer_width: f32, outer_height: f32) {
        self.resize.cancel();
        self.apply_outer_size(Size::new(outer_width, outer_height));
        debug!(
            width = self.outer.width,
            height = self.outer.height,
            "chart resized"
        );
        self.redraw(RedrawReason::Resized, Layers::ALL);
    }

    /// Schedules a resize; a later call before the deadline replaces it.
    pub fn resize_needed(&mut self, outer_width: f32, outer_height: f32, now: Instant) {
        self.resize
            .schedule(Size::new(outer_width, outer_height), now);
    }

    /// Runs the pending resize once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.resize.take_due(now) {
            Some(size) => {
                self.resize(size.width, size.height);
                true
            }
            None => false,
        }
    }

    pub fn resize_pending(&self) -> bool {
        self.resize.is_pending()
    }

    /// Moves the start of the time domain; the redraw is debounced like a resize.
    pub fn set_plot_start(&mut self, start: DateTime<Utc>, now: Instant) {
        let (_, end) = self.zoom.base().domain();
        self.replace_domain(to_ms(start), end);
        self.schedule_redraw(now);
    }

    /// Moves the end of the time domain; the redraw is debounced like a resize.
    pub fn set_plot_end(&mut self, end: DateTime<Utc>, now: Instant) {
        let (start, _) = self.zoom.base().domain();
        self.replace_domain(start, to_ms(end));
        self.schedule_redraw(now);
    }

    pub fn plot_start(&self) -> DateTime<Utc> {
        from_ms(self.zoom.base().domain().0)
    }

    pub fn plot_end(&self) -> DateTime<Utc> {
        from_ms(self.zoom.base().domain().1)
    }

    /// Replaces the whole time domain and redraws immediately.
    pub fn set_domain(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.replace_domain(to_ms(start), to_ms(end));
        self.redraw(RedrawReason::DomainChanged, Layers::TRANSFORM);
    }

    /// Adds a marker, replacing one with the same name and time.
    pub fn add_marker(&mut self, marker: Marker) {
        if let Some(old) = self.markers.add(marker) {
            debug!(marker = %old.name, time = %old.time, "marker replaced");
        }
        self.redraw(
            RedrawReason::MarkersChanged,
            Layers {
                markers: true,
                ..Layers::default()
            },
        );
    }

    pub fn remove_marker(&mut self, key: &MarkerKey) -> Option<Marker> {
        let removed = self.markers.remove(key)?;
        let id = marker_element_id(key, &self.suffix);
        self.surface.remove(&id);
        Some(removed)
    }

    pub fn clear_markers(&mut self) {
        for key in self.markers.clear() {
            let id = marker_element_id(&key, &self.suffix);
            self.surface.remove(&id);
        }
    }

    /// Validates and installs a new configuration, then redraws everything.
    pub fn apply_config(&mut self, config: ChartConfig) -> Result<()> {
        config.validate()?;
        let old = std::mem::replace(&mut self.config, config);

        self.renderer
            .set_compressed_cutoff(self.config.compressed_cutoff);
        self.markers
            .set_fallback_size(self.config.marker_fallback_size);
        self.resize.set_delay(self.config.resize_debounce);

        if old.margins != self.config.margins {
            self.apply_outer_size(self.outer);
        }
        if old.max_zoom_pixel_per_sample != self.config.max_zoom_pixel_per_sample {
            self.refresh_max_zoom();
        }
        if old.tick_count != self.config.tick_count {
            self.scales.nice_amplitude(self.config.tick_count);
        }
        self.redraw(RedrawReason::Configured, Layers::ALL);
        Ok(())
    }

    pub fn add_zoom_listener(&mut self, listener: impl ZoomListener + 'static) -> ListenerId {
        self.zoom.add_listener(listener)
    }

    pub fn remove_zoom_listener(&mut self, id: ListenerId) -> bool {
        self.zoom.remove_listener(id)
    }

    /// Executes a command as if a listener had queued it.
    pub fn apply(&mut self, command: ChartCommand) {
        match command {
            ChartCommand::Append(segment) => self.append(segment),
            ChartCommand::Trim(cutoff) => {
                self.trim(cutoff);
            }
            ChartCommand::AddMarker(marker) => self.add_marker(marker),
            ChartCommand::RemoveMarker(key) => {
                self.remove_marker(&key);
            }
            ChartCommand::ResetZoom => {
                self.reset_zoom();
            }
        }
    }

    pub fn state(&self) -> ChartState {
        self.state
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn scales(&self) -> &ScalePair {
        &self.scales
    }

    /// Time scale as currently zoomed.
    pub fn x_scale(&self) -> LinearScale {
        self.zoom.rescaled()
    }

    pub fn zoom_transform(&self) -> ZoomTransform {
        self.zoom.transform()
    }

    pub fn max_zoom(&self) -> f64 {
        self.zoom.max_zoom()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn markers(&self) -> &MarkerOverlay {
        &self.markers
    }

    pub fn renderer(&self) -> &DecimationRenderer {
        &self.renderer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn outer_size(&self) -> Size {
        self.outer
    }

    pub fn plot_size(&self) -> Size {
        self.scales.size()
    }

    /// Plot rectangle on the surface, margins included.
    pub fn plot_rect(&self) -> ScreenRect {
        plot_rect(self.scales.size(), &self.config)
    }

    pub fn clip_id(&self) -> &str {
        &self.clip_id
    }

    /// Surface id of the path drawn for segment `id`.
    pub fn path_id(&self, id: &SegmentId) -> String {
        path_element_id(id, &self.suffix)
    }

    pub fn marker_id(&self, key: &MarkerKey) -> String {
        marker_element_id(key, &self.suffix)
    }

    /// Surface id of a fixed element: `x_axis`, `y_axis`, `x_label`,
    /// `x_sublabel`, `y_label`, `y_sublabel` or `title`.
    pub fn element_id(&self, name: &str) -> String {
        format!("{}_{}", name, self.suffix)
    }

    pub fn last_redraw(&self) -> Option<&RedrawReport> {
        self.last_redraw.as_ref()
    }

    fn on_zoom(&mut self, event: Option<ZoomEvent>) -> bool {
        let Some(event) = event else {
            return false;
        };
        self.redraw(RedrawReason::Zoomed, Layers::TRANSFORM);
        self.dispatch(&event);
        true
    }

    /// Notifies listeners, then runs whatever they queued. Commands that
    /// trigger further zoom events are drained by the outermost call.
    fn dispatch(&mut self, event: &ZoomEvent) {
        self.zoom.notify(event, &mut self.commands);
        if self.draining {
            return;
        }
        self.draining = true;
        let mut budget = MAX_DEFERRED_COMMANDS;
        while let Some(command) = self.commands.pop() {
            if budget == 0 {
                warn!(
                    dropped = self.commands.len() + 1,
                    "deferred chart commands dropped"
                );
                self.commands = CommandQueue::new();
                break;
            }
            budget -= 1;
            self.apply(command);
        }
        self.draining = false;
    }

    fn schedule_redraw(&mut self, now: Instant) {
        let size = self.resize.pending().copied().unwrap_or(self.outer);
        self.resize.schedule(size, now);
    }

    fn replace_domain(&mut self, start_ms: f64, end_ms: f64) {
        let (start_ms, end_ms) = time_domain(start_ms, end_ms);
        self.scales.set_domain(start_ms, end_ms);
        self.zoom.set_base(*self.scales.x());
        self.update_amplitude_domain();
    }

    fn apply_outer_size(&mut self, requested: Size) {
        self.outer = outer_size(requested);
        let plot = plot_size(self.outer, &self.config);
        self.scales.set_dimensions(plot.width, plot.height);
        self.zoom.set_base(*self.scales.x());
        let rect = self.plot_rect();
        self.surface.set_clip(&self.clip_id, rect);
    }

    fn refresh_max_zoom(&mut self) {
        let max_zoom = max_zoom_for(
            &self.segments,
            self.zoom.base(),
            self.config.max_zoom_pixel_per_sample,
        );
        debug!(max_zoom, "zoom bound updated");
        self.zoom.set_max_zoom(max_zoom);
    }

    /// Recomputes the amplitude domain from the visible segments. Returns
    /// whether the centered axis scale changed.
    fn update_amplitude_domain(&mut self) -> bool {
        let before = *self.scales.y_axis();
        let (lo, hi) = amplitude_domain(&self.segments, self.zoom.base().domain());
        self.scales.set_amplitude_domain(lo, hi);
        self.scales.nice_amplitude(self.config.tick_count);
        *self.scales.y_axis() != before
    }

    /// Emits the requested layers. Order is fixed: geometry, then axes, then
    /// markers, then labels. Nothing is emitted before the first `draw`.
    fn redraw(&mut self, reason: RedrawReason, layers: Layers) {
        if self.state != ChartState::Drawn {
            return;
        }
        let x_scale = self.zoom.rescaled();
        let rect = self.plot_rect();
        let mut report = RedrawReport {
            reason,
            paths: 0,
            compressed: 0,
            axes: layers.axes,
            markers: 0,
            labels: layers.labels,
        };

        if layers.geometry {
            let transform = PlotTransform::new(x_scale, *self.scales.y(), rect);
            for segment in &self.segments {
                if self.renderer.mode_for(segment, &x_scale) == RenderMode::Compressed {
                    report.compressed += 1;
                }
                let runs = self.renderer.segment_path(segment, &transform);
                self.surface.upsert(
                    &path_element_id(segment.id(), &self.suffix),
                    Element::Path(PathElement {
                        runs,
                        clip_id: Some(self.clip_id.clone()),
                    }),
                );
                report.paths += 1;
            }
        }

        if layers.axes {
            let bottom = ScreenPoint::new(rect.origin.x, rect.bottom());
            let x_axis = time_axis(&x_scale, &self.config, bottom);
            let y_axis = amplitude_axis(self.scales.y_axis(), &self.config, rect.origin);
            let (x_id, y_id) = (self.element_id("x_axis"), self.element_id("y_axis"));
            self.surface.upsert(&x_id, Element::Axis(x_axis));
            self.surface.upsert(&y_id, Element::Axis(y_axis));
        }

        if layers.markers {
            report.markers = self.emit_markers(&x_scale, rect);
        }

        if layers.labels {
            self.emit_labels(rect);
        }

        debug!(
            ?reason,
            paths = report.paths,
            compressed = report.compressed,
            markers = report.markers,
            "redraw complete"
        );
        self.last_redraw = Some(report);
    }

    fn emit_markers(&mut self, x_scale: &LinearScale, rect: ScreenRect) -> usize {
        let placements = self.markers.layout(x_scale, &mut self.surface);
        let mut shown = 0;
        for placement in placements {
            let id = marker_element_id(&placement.key, &self.suffix);
            if !placement.visible {
                self.surface.remove(&id);
                continue;
            }
            self.surface.upsert(
                &id,
                Element::Marker(MarkerElement {
                    translate: ScreenPoint::new(rect.origin.x + placement.x, rect.origin.y),
                    label: placement.marker.name,
                    kind: placement.marker.kind,
                    size: placement.size,
                    line_length: rect.size.height,
                }),
            );
            shown += 1;
        }
        shown
    }

    fn emit_labels(&mut self, rect: ScreenRect) {
        let labels = self.config.labels.clone();
        let center_x = rect.origin.x + rect.size.width / 2.0;
        let center_y = rect.origin.y + rect.size.height / 2.0;
        let bottom = self.outer.height - LABEL_OFFSET;
        let style = TextStyle::default();

        let x_label_y = if labels.x_sub.is_empty() {
            bottom
        } else {
            bottom - SUBLABEL_GAP
        };
        self.put_text("x_label", &labels.x, ScreenPoint::new(center_x, x_label_y), 0.0, &style);
        self.put_text("x_sublabel", &labels.x_sub, ScreenPoint::new(center_x, bottom), 0.0, &style);
        self.put_text("y_label", &labels.y, ScreenPoint::new(style.font_size, center_y), -90.0, &style);
        self.put_text(
            "y_sublabel",
            &labels.y_sub,
            ScreenPoint::new(style.font_size + SUBLABEL_GAP, center_y),
            -90.0,
            &style,
        );
        let title = labels.title.unwrap_or_default();
        self.put_text(
            "title",
            &title,
            ScreenPoint::new(center_x, rect.origin.y / 2.0),
            0.0,
            &style,
        );
    }

    /// Upserts a centered text element, or removes it when `text` is empty.
    fn put_text(
        &mut self,
        name: &str,
        text: &str,
        position: ScreenPoint,
        rotation: f32,
        style: &TextStyle,
    ) {
        let id = self.element_id(name);
        if text.is_empty() {
            self.surface.remove(&id);
            return;
        }
        self.surface.upsert(
            &id,
            Element::Text(TextElement {
                text: text.to_string(),
                position,
                anchor: TextAnchor::Middle,
                rotation,
                style: style.clone(),
            }),
        );
    }
}

/// Later segments replace earlier ones with the same identity, in place.
fn dedup_segments(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        match out.iter().position(|s| s.id() == segment.id()) {
            Some(i) => {
                debug!(id = %segment.id(), "duplicate segment replaced");
                out[i] = segment;
            }
            None => out.push(segment),
        }
    }
    out
}

fn path_element_id(id: &SegmentId, suffix: &str) -> String {
    format!("{}_{}", id, suffix)
}

fn marker_element_id(key: &MarkerKey, suffix: &str) -> String {
    format!("{}_{}", key.element_id(), suffix)
}

/// Zero dimensions fall back to a nominal size, then the minimum applies.
fn outer_size(requested: Size) -> Size {
    let width = if requested.width > 0.0 {
        requested.width
    } else {
        UNSIZED_OUTER.width
    };
    let height = if requested.height > 0.0 {
        requested.height
    } else {
        UNSIZED_OUTER.height
    };
    Size::new(
        width.max(MIN_OUTER_SIZE.width),
        height.max(MIN_OUTER_SIZE.height),
    )
}

fn plot_size(outer: Size, config: &ChartConfig) -> Size {
    Size::new(
        (outer.width - config.margins.horizontal()).max(1.0),
        (outer.height - config.margins.vertical()).max(1.0),
    )
}

fn plot_rect(plot: Size, config: &ChartConfig) -> ScreenRect {
    ScreenRect::new(
        ScreenPoint::new(config.margins.left, config.margins.top),
        plot,
    )
}

fn time_domain(start_ms: f64, end_ms: f64) -> (f64, f64) {
    if end_ms > start_ms {
        return (start_ms, end_ms);
    }
    warn!(start_ms, end_ms, "degenerate time domain, using default span");
    let start = start_ms.min(end_ms);
    (start, start + DEFAULT_SPAN_MS)
}

fn amplitude_domain(segments: &[Segment], time_domain_ms: (f64, f64)) -> (f64, f64) {
    calc_amplitude_domain(segments, Some(time_domain_ms))
        .or_else(|| calc_amplitude_domain(segments, None))
        .unwrap_or_else(|| {
            if !segments.is_empty() {
                warn!("no finite samples, using default amplitude domain");
            }
            DEFAULT_AMPLITUDE
        })
}
