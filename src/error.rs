//! Chart error types

use thiserror::Error;

/// Fatal configuration errors. Everything else the chart runs into
/// (unmeasurable labels, empty buckets, degenerate domains) is recovered
/// locally and never reaches the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    /// No drawing surface was supplied
    #[error("No drawing surface supplied")]
    MissingSurface,

    /// Surface reported a size that cannot host a plot
    #[error("Invalid drawing surface size: {width}x{height}")]
    InvalidSurface { width: f32, height: f32 },

    /// No segments and no explicit time domain
    #[error("Cannot build a chart without segments or an explicit time domain")]
    EmptyDomain,

    /// Segment metadata is unusable
    #[error("Invalid segment: {0}")]
    InvalidSegment(String),

    /// Time window cannot be resolved
    #[error("Invalid time window: {0}")]
    InvalidTimeWindow(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for chart operations
pub type Result<T> = std::result::Result<T, ChartError>;
