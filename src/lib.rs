//! seisplot: decimation-aware seismic waveform charting with zoom and pan

pub mod axis;
pub mod chart;
pub mod command;
pub mod data_types;
pub mod debounce;
pub mod decimation;
pub mod error;
#[cfg(feature = "gpui")]
pub mod gpui_surface;
pub mod markers;
pub mod renderer;
pub mod scale_pair;
pub mod scales;
pub mod surface;
pub mod time_window;
pub mod transform;
pub mod utils;
pub mod zoom_controller;

pub use chart::{Chart, ChartState, RedrawReason, RedrawReport};
pub use command::{ChartCommand, CommandQueue};
pub use data_types::{ChannelCodes, ChartConfig, Marker, MarkerKey, MarkerKind, Segment, SegmentId};
pub use error::{ChartError, Result};
pub use renderer::{DecimationRenderer, RenderMode};
pub use scales::LinearScale;
pub use surface::{DrawingSurface, Element, RecordingSurface};
pub use transform::ZoomTransform;
pub use zoom_controller::{ZoomController, ZoomEvent, ZoomListener, ZoomSource};
