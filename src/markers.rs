//! Labels anchored at instants on the time axis.

use crate::data_types::{Marker, MarkerKey, Size};
use crate::scales::LinearScale;
use crate::surface::{DrawingSurface, TextStyle};
use crate::utils::to_ms;
use std::collections::BTreeMap;
use tracing::warn;

/// Where a marker lands for the current zoom, relative to the plot origin.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerPlacement {
    pub key: MarkerKey,
    pub marker: Marker,
    pub x: f32,
    pub size: Size,
    pub visible: bool,
}

#[derive(Clone, Debug)]
struct MarkerEntry {
    marker: Marker,
    /// Label box in use, the fallback until a measurement succeeds.
    size: Option<Size>,
    measured: bool,
}

pub struct MarkerOverlay {
    entries: BTreeMap<MarkerKey, MarkerEntry>,
    fallback_size: Size,
    style: TextStyle,
}

impl MarkerOverlay {
    pub fn new(fallback_size: Size) -> Self {
        Self {
            entries: BTreeMap::new(),
            fallback_size,
            style: TextStyle { font_size: 10.0 },
        }
    }

    pub fn set_fallback_size(&mut self, size: Size) {
        self.fallback_size = size;
    }

    /// Adds a marker; one with the same name and timestamp is replaced.
    /// Returns the replaced marker, if any.
    pub fn add(&mut self, marker: Marker) -> Option<Marker> {
        let key = marker.key();
        self.entries
            .insert(
                key,
                MarkerEntry {
                    marker,
                    size: None,
                    measured: false,
                },
            )
            .map(|e| e.marker)
    }

    pub fn remove(&mut self, key: &MarkerKey) -> Option<Marker> {
        self.entries.remove(key).map(|e| e.marker)
    }

    pub fn clear(&mut self) -> Vec<MarkerKey> {
        let keys = self.entries.keys().cloned().collect();
        self.entries.clear();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.entries.values().map(|e| &e.marker)
    }

    /// Cached label box of a marker, once it has been placed.
    pub fn label_size(&self, key: &MarkerKey) -> Option<Size> {
        self.entries.get(key).and_then(|e| e.size)
    }

    /// Positions every marker against `x_scale`. A label box is measured
    /// once and reused afterwards. While the surface cannot measure it, the
    /// fallback size is used and measuring is retried on the next layout.
    pub fn layout(
        &mut self,
        x_scale: &LinearScale,
        surface: &mut dyn DrawingSurface,
    ) -> Vec<MarkerPlacement> {
        let (r0, r1) = x_scale.range();
        let (lo, hi) = (r0.min(r1), r0.max(r1));
        let fallback = self.fallback_size;
        let style = &self.style;

        self.entries
            .iter_mut()
            .map(|(key, entry)| {
                if !entry.measured {
                    match surface.measure_text(&entry.marker.name, style) {
                        Some(measured) => {
                            entry.size = Some(measured);
                            entry.measured = true;
                        }
                        None => {
                            if entry.size.is_none() {
                                warn!(marker = %entry.marker.name, "label not measurable, using fallback size");
                            }
                            entry.size = Some(fallback);
                        }
                    }
                }
                let size = entry.size.unwrap_or(fallback);
                let x = x_scale.map(to_ms(entry.marker.time));
                MarkerPlacement {
                    key: key.clone(),
                    marker: entry.marker.clone(),
                    x: x as f32,
                    size,
                    visible: x >= lo && x <= hi,
                }
            })
            .collect()
    }
}
