//! Abstract 2-D drawing surface the chart renders into.
//!
//! Elements are addressed by string id: `upsert` appends a new element or
//! replaces the one already holding that id, `remove` drops it. A real
//! backend maps this onto its retained scene (SVG nodes, canvas layers, a
//! gpui paint list); [`RecordingSurface`] keeps everything in memory.

use crate::axis::AxisTicks;
use crate::data_types::{MarkerKind, ScreenPoint, ScreenRect, Size};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self { font_size: 12.0 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

/// Polyline runs for one segment, drawn inside a clip region.
#[derive(Clone, Debug, PartialEq)]
pub struct PathElement {
    pub runs: Vec<Vec<ScreenPoint>>,
    pub clip_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextElement {
    pub text: String,
    pub position: ScreenPoint,
    pub anchor: TextAnchor,
    /// Degrees, clockwise.
    pub rotation: f32,
    pub style: TextStyle,
}

/// Marker group: translated to its anchor, with a label box of `size`.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerElement {
    pub translate: ScreenPoint,
    pub label: String,
    pub kind: MarkerKind,
    pub size: Size,
    /// Height of the marker line below the label.
    pub line_length: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Path(PathElement),
    Axis(AxisTicks),
    Text(TextElement),
    Marker(MarkerElement),
}

pub trait DrawingSurface {
    /// Outer size of the widget the chart lives in.
    fn size(&self) -> Size;

    fn upsert(&mut self, id: &str, element: Element);

    fn remove(&mut self, id: &str) -> bool;

    /// Defines (or resizes) a clip region.
    fn set_clip(&mut self, id: &str, rect: ScreenRect);

    /// Bounding box of `text` once rendered, or `None` while the surface
    /// cannot measure (for instance before it is attached to a live layout).
    fn measure_text(&mut self, text: &str, style: &TextStyle) -> Option<Size>;
}

/// One call made on a [`RecordingSurface`], in order.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceOp {
    Upsert(String),
    Remove(String),
    Clip(String),
}

/// Text metrics for the recording surface: fixed advance per char.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMetrics {
    pub char_width: f32,
    pub line_height: f32,
}

/// In-memory surface. Keeps the current elements and the full op log, which
/// is what tests inspect and what a custom backend can replay.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    size: Size,
    elements: HashMap<String, Element>,
    clips: HashMap<String, ScreenRect>,
    ops: Vec<SurfaceOp>,
    metrics: Option<MonospaceMetrics>,
    measure_calls: usize,
}

impl RecordingSurface {
    /// Surface of the given outer size that cannot measure text.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size::new(width, height),
            ..Default::default()
        }
    }

    pub fn with_metrics(mut self, char_width: f32, line_height: f32) -> Self {
        self.metrics = Some(MonospaceMetrics {
            char_width,
            line_height,
        });
        self
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = Size::new(width, height);
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn elements(&self) -> &HashMap<String, Element> {
        &self.elements
    }

    pub fn paths(&self) -> impl Iterator<Item = (&String, &PathElement)> {
        self.elements.iter().filter_map(|(id, e)| match e {
            Element::Path(p) => Some((id, p)),
            _ => None,
        })
    }

    pub fn markers(&self) -> impl Iterator<Item = (&String, &MarkerElement)> {
        self.elements.iter().filter_map(|(id, e)| match e {
            Element::Marker(m) => Some((id, m)),
            _ => None,
        })
    }

    pub fn clip(&self, id: &str) -> Option<ScreenRect> {
        self.clips.get(id).copied()
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn measure_calls(&self) -> usize {
        self.measure_calls
    }
}

impl DrawingSurface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn upsert(&mut self, id: &str, element: Element) {
        self.ops.push(SurfaceOp::Upsert(id.to_string()));
        self.elements.insert(id.to_string(), element);
    }

    fn remove(&mut self, id: &str) -> bool {
        self.ops.push(SurfaceOp::Remove(id.to_string()));
        self.elements.remove(id).is_some()
    }

    fn set_clip(&mut self, id: &str, rect: ScreenRect) {
        self.ops.push(SurfaceOp::Clip(id.to_string()));
        self.clips.insert(id.to_string(), rect);
    }

    fn measure_text(&mut self, text: &str, style: &TextStyle) -> Option<Size> {
        self.measure_calls += 1;
        let m = self.metrics?;
        let scale = style.font_size / TextStyle::default().font_size;
        Some(Size::new(
            text.chars().count() as f32 * m.char_width * scale,
            m.line_height * scale,
        ))
    }
}

/// Boxed surfaces, so a chart can be built over `Box<dyn DrawingSurface>`.
impl<S: DrawingSurface + ?Sized> DrawingSurface for Box<S> {
    fn size(&self) -> Size {
        (**self).size()
    }

    fn upsert(&mut self, id: &str, element: Element) {
        (**self).upsert(id, element)
    }

    fn remove(&mut self, id: &str) -> bool {
        (**self).remove(id)
    }

    fn set_clip(&mut self, id: &str, rect: ScreenRect) {
        (**self).set_clip(id, rect)
    }

    fn measure_text(&mut self, text: &str, style: &TextStyle) -> Option<Size> {
        (**self).measure_text(text, style)
    }
}
