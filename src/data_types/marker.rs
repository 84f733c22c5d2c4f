use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a marker annotates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    /// Phase arrival (P, S, PKP, ...)
    #[default]
    Phase,
    /// Event origin time
    Origin,
    /// Anything else, tagged by the caller
    Other(String),
}

/// An annotated instant drawn over the waveforms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub time: DateTime<Utc>,
    pub name: String,
    pub kind: MarkerKind,
}

impl Marker {
    pub fn new(name: &str, time: DateTime<Utc>, kind: MarkerKind) -> Self {
        Self {
            time,
            name: name.to_string(),
            kind,
        }
    }

    pub fn key(&self) -> MarkerKey {
        MarkerKey::new(&self.name, self.time)
    }
}

/// Name plus exact timestamp. Adding a marker whose key already exists replaces it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerKey {
    pub name: String,
    pub time: DateTime<Utc>,
}

impl MarkerKey {
    pub fn new(name: &str, time: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            time,
        }
    }

    /// Element id used for the marker group on the drawing surface.
    pub fn element_id(&self) -> String {
        format!("marker_{}_{}", self.name, self.time.timestamp_nanos_opt().unwrap_or_default())
    }
}
