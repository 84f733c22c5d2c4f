//! gpui backend for [`DrawingSurface`].
//!
//! The chart writes into a retained scene shared behind a lock; a gpui
//! `canvas` paint callback replays it every frame. Text sizes are only known
//! once gpui has shaped the text, so `measure_text` answers from what the
//! last paint recorded and returns `None` before the first frame.

use crate::axis::{AxisOrientation, AxisTicks};
use crate::data_types::{MarkerKind, ScreenPoint, ScreenRect, Size};
use crate::surface::{DrawingSurface, Element, MarkerElement, PathElement, TextAnchor, TextElement, TextStyle};
use gpui::*;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

const TICK_LENGTH: f32 = 6.0;

#[derive(Clone, Debug)]
pub struct WaveformTheme {
    pub background: Hsla,
    pub trace: Hsla,
    pub trace_width: Pixels,
    pub axis_line: Hsla,
    pub axis_label: Hsla,
    pub axis_label_size: Pixels,
    pub label: Hsla,
    pub phase_marker: Hsla,
    pub origin_marker: Hsla,
    pub other_marker: Hsla,
    pub marker_text: Hsla,
}

impl Default for WaveformTheme {
    fn default() -> Self {
        Self {
            background: gpui::black(),
            trace: gpui::white().alpha(0.9),
            trace_width: px(1.0),
            axis_line: gpui::white().alpha(0.4),
            axis_label: gpui::white().alpha(0.8),
            axis_label_size: px(11.0),
            label: gpui::white(),
            phase_marker: gpui::blue(),
            origin_marker: gpui::red(),
            other_marker: gpui::white().alpha(0.6),
            marker_text: gpui::white(),
        }
    }
}

impl WaveformTheme {
    fn marker_color(&self, kind: &MarkerKind) -> Hsla {
        match kind {
            MarkerKind::Phase => self.phase_marker,
            MarkerKind::Origin => self.origin_marker,
            MarkerKind::Other(_) => self.other_marker,
        }
    }
}

#[derive(Default)]
struct Scene {
    size: Size,
    /// Insertion order is paint order.
    elements: Vec<(String, Element)>,
    clips: HashMap<String, ScreenRect>,
    /// Text boxes recorded while painting, keyed by text and font size bits.
    measured: HashMap<(String, u32), Size>,
}

impl Scene {
    fn position(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|(eid, _)| eid == id)
    }
}

/// Cheap to clone: every clone shares the same scene.
#[derive(Clone)]
pub struct GpuiSurface {
    scene: Arc<RwLock<Scene>>,
    theme: WaveformTheme,
}

impl GpuiSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_theme(width, height, WaveformTheme::default())
    }

    pub fn with_theme(width: f32, height: f32, theme: WaveformTheme) -> Self {
        let scene = Scene {
            size: Size::new(width, height),
            ..Default::default()
        };
        Self {
            scene: Arc::new(RwLock::new(scene)),
            theme,
        }
    }

    /// Records the size of the element the surface is laid out in.
    pub fn set_size(&self, width: f32, height: f32) {
        self.scene.write().size = Size::new(width, height);
    }

    pub fn element_count(&self) -> usize {
        self.scene.read().elements.len()
    }

    /// Replays the scene into `bounds`. Call from a `canvas` paint closure.
    pub fn paint(&self, bounds: Bounds<Pixels>, window: &mut Window, cx: &mut App) {
        window.paint_quad(fill(bounds, self.theme.background));

        let scene = self.scene.read();
        let elements = scene.elements.clone();
        let clips = scene.clips.clone();
        drop(scene);

        let mut measured = Vec::new();
        for (_, element) in &elements {
            match element {
                Element::Path(path) => self.paint_path(path, &clips, bounds, window),
                Element::Axis(axis) => self.paint_axis(axis, bounds, window, cx),
                Element::Text(text) => {
                    if let Some(size) = self.paint_text(text, bounds, window, cx) {
                        measured.push(((text.text.clone(), text.style.font_size.to_bits()), size));
                    }
                }
                Element::Marker(marker) => {
                    if let Some(size) = self.paint_marker(marker, bounds, window, cx) {
                        measured.push(((marker.label.clone(), MARKER_FONT_SIZE.to_bits()), size));
                    }
                }
            }
        }

        if !measured.is_empty() {
            self.scene.write().measured.extend(measured);
        }
    }

    fn paint_path(
        &self,
        path: &PathElement,
        clips: &HashMap<String, ScreenRect>,
        bounds: Bounds<Pixels>,
        window: &mut Window,
    ) {
        let mask = path
            .clip_id
            .as_ref()
            .and_then(|id| clips.get(id))
            .map(|rect| ContentMask {
                bounds: to_bounds(*rect, bounds),
            });

        window.with_content_mask(mask, |window| {
            for run in &path.runs {
                if run.len() < 2 {
                    continue;
                }
                let mut builder = PathBuilder::stroke(self.theme.trace_width);
                builder.move_to(to_point(run[0], bounds));
                for p in &run[1..] {
                    builder.line_to(to_point(*p, bounds));
                }
                if let Ok(path) = builder.build() {
                    window.paint_path(path, self.theme.trace);
                }
            }
        });
    }

    fn paint_axis(&self, axis: &AxisTicks, bounds: Bounds<Pixels>, window: &mut Window, cx: &mut App) {
        let origin = to_point(axis.origin, bounds);
        let (end, tick_offset) = match axis.orientation {
            AxisOrientation::Bottom => (
                origin + point(px(axis.length), px(0.0)),
                point(px(0.0), px(TICK_LENGTH)),
            ),
            AxisOrientation::Left => (
                origin + point(px(0.0), px(axis.length)),
                point(px(-TICK_LENGTH), px(0.0)),
            ),
        };

        let mut builder = PathBuilder::stroke(px(1.0));
        builder.move_to(origin);
        builder.line_to(end);
        for tick in &axis.ticks {
            let at = match axis.orientation {
                AxisOrientation::Bottom => origin + point(px(tick.position), px(0.0)),
                AxisOrientation::Left => origin + point(px(0.0), px(tick.position)),
            };
            builder.move_to(at);
            builder.line_to(at + tick_offset);
        }
        if let Ok(path) = builder.build() {
            window.paint_path(path, self.theme.axis_line);
        }

        let font_size = self.theme.axis_label_size;
        for tick in &axis.ticks {
            let Some(line) = shape(&tick.label, font_size, self.theme.axis_label, window) else {
                continue;
            };
            let width = line.width();
            let at = match axis.orientation {
                AxisOrientation::Bottom => {
                    origin + point(px(tick.position) - width / 2.0, px(TICK_LENGTH + 2.0))
                }
                AxisOrientation::Left => {
                    origin
                        + point(
                            px(-TICK_LENGTH - 2.0) - width,
                            px(tick.position) - font_size / 2.0,
                        )
                }
            };
            let _ = line.paint(at, font_size, TextAlign::Left, None, window, cx);
        }
    }

    /// Vertical labels are painted upright; gpui text cannot be rotated.
    fn paint_text(
        &self,
        text: &TextElement,
        bounds: Bounds<Pixels>,
        window: &mut Window,
        cx: &mut App,
    ) -> Option<Size> {
        let font_size = px(text.style.font_size);
        let line = shape(&text.text, font_size, self.theme.label, window)?;
        let width = line.width();
        let anchor = to_point(text.position, bounds);
        let x = match text.anchor {
            TextAnchor::Start => anchor.x,
            TextAnchor::Middle => anchor.x - width / 2.0,
            TextAnchor::End => anchor.x - width,
        };
        let _ = line.paint(
            point(x, anchor.y - font_size),
            font_size,
            TextAlign::Left,
            None,
            window,
            cx,
        );
        Some(Size::new(width.as_f32(), text.style.font_size))
    }

    fn paint_marker(
        &self,
        marker: &MarkerElement,
        bounds: Bounds<Pixels>,
        window: &mut Window,
        cx: &mut App,
    ) -> Option<Size> {
        let color = self.theme.marker_color(&marker.kind);
        let top = to_point(marker.translate, bounds);

        let mut builder = PathBuilder::stroke(px(1.0));
        builder.move_to(top);
        builder.line_to(top + point(px(0.0), px(marker.line_length)));
        if let Ok(path) = builder.build() {
            window.paint_path(path, color);
        }

        let label_box = Bounds::new(top, gpui::size(px(marker.size.width), px(marker.size.height)));
        window.paint_quad(fill(label_box, color.alpha(0.8)));

        let font_size = px(MARKER_FONT_SIZE);
        let line = shape(&marker.label, font_size, self.theme.marker_text, window)?;
        let width = line.width();
        let _ = line.paint(
            top + point(px(2.0), px(0.0)),
            font_size,
            TextAlign::Left,
            Some(label_box),
            window,
            cx,
        );
        Some(Size::new(width.as_f32() + 4.0, MARKER_FONT_SIZE + 4.0))
    }
}

/// Matches the label style `MarkerOverlay` measures with.
const MARKER_FONT_SIZE: f32 = 10.0;

impl DrawingSurface for GpuiSurface {
    fn size(&self) -> Size {
        self.scene.read().size
    }

    fn upsert(&mut self, id: &str, element: Element) {
        let mut scene = self.scene.write();
        match scene.position(id) {
            Some(i) => scene.elements[i].1 = element,
            None => scene.elements.push((id.to_string(), element)),
        }
    }

    fn remove(&mut self, id: &str) -> bool {
        let mut scene = self.scene.write();
        match scene.position(id) {
            Some(i) => {
                scene.elements.remove(i);
                true
            }
            None => false,
        }
    }

    fn set_clip(&mut self, id: &str, rect: ScreenRect) {
        self.scene.write().clips.insert(id.to_string(), rect);
    }

    fn measure_text(&mut self, text: &str, style: &TextStyle) -> Option<Size> {
        self.scene
            .read()
            .measured
            .get(&(text.to_string(), style.font_size.to_bits()))
            .copied()
    }
}

fn to_point(p: ScreenPoint, bounds: Bounds<Pixels>) -> Point<Pixels> {
    bounds.origin + point(px(p.x), px(p.y))
}

fn to_bounds(rect: ScreenRect, bounds: Bounds<Pixels>) -> Bounds<Pixels> {
    Bounds::new(
        to_point(rect.origin, bounds),
        gpui::size(px(rect.size.width), px(rect.size.height)),
    )
}

fn shape(text: &str, font_size: Pixels, color: Hsla, window: &mut Window) -> Option<WrappedLine> {
    if text.is_empty() {
        return None;
    }
    let run = TextRun {
        len: text.len(),
        font: gpui::TextStyle::default().font(),
        color,
        background_color: None,
        underline: None,
        strikethrough: None,
    };
    window
        .text_system()
        .shape_text(text.to_string().into(), font_size, &[run], None, None)
        .ok()?
        .into_iter()
        .next()
}
