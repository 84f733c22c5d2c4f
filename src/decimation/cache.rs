use super::min_max::{compute_envelope, EnvelopeBucket};
use crate::data_types::{Segment, SegmentId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Envelope computed for one segment at one pixel density.
#[derive(Clone, Debug, PartialEq)]
pub struct MinMaxEntry {
    pub domain_end_ms: f64,
    pub seconds_per_pixel: f64,
    pub samples_per_pixel: f64,
    pub envelope: Arc<[EnvelopeBucket]>,
}

impl MinMaxEntry {
    pub fn matches(&self, seconds_per_pixel: f64, domain_end_ms: f64) -> bool {
        self.seconds_per_pixel == seconds_per_pixel && self.domain_end_ms == domain_end_ms
    }
}

/// Memoized envelopes keyed by segment identity. An entry stays valid only
/// while both seconds-per-pixel and the visible domain end equal the values
/// it was computed with; anything else replaces it.
#[derive(Debug, Default)]
pub struct MinMaxCache {
    entries: HashMap<SegmentId, MinMaxEntry>,
    computations: u64,
}

impl MinMaxCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &mut self,
        segment: &Segment,
        seconds_per_pixel: f64,
        domain_end_ms: f64,
    ) -> &MinMaxEntry {
        let id = segment.id();
        let fresh = self
            .entries
            .get(id)
            .is_some_and(|e| e.matches(seconds_per_pixel, domain_end_ms));

        if !fresh {
            let samples_per_pixel = segment.sample_rate() * seconds_per_pixel;
            let envelope: Arc<[EnvelopeBucket]> =
                compute_envelope(segment.samples(), samples_per_pixel).into();
            self.computations += 1;
            debug!(
                segment = %id,
                samples_per_pixel,
                buckets = envelope.len(),
                "min/max envelope recomputed"
            );
            self.entries.insert(
                id.clone(),
                MinMaxEntry {
                    domain_end_ms,
                    seconds_per_pixel,
                    samples_per_pixel,
                    envelope,
                },
            );
        }

        &self.entries[id]
    }

    pub fn get(&self, id: &SegmentId) -> Option<&MinMaxEntry> {
        self.entries.get(id)
    }

    pub fn invalidate(&mut self, id: &SegmentId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Drops entries for segments no longer plotted.
    pub fn retain(&mut self, ids: &HashSet<SegmentId>) {
        self.entries.retain(|id, _| ids.contains(id));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of envelope computations performed so far.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
