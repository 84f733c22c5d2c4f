pub mod config;
pub mod geometry;
pub mod marker;
pub mod segment;

// Re-export everything
pub use config::*;
pub use geometry::*;
pub use marker::*;
pub use segment::*;
