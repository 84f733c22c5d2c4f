pub mod cache;
pub mod common;
pub mod min_max;

pub use cache::{MinMaxCache, MinMaxEntry};
pub use common::bucket_min_max;
pub use min_max::{compute_envelope, envelope_points, pixel_count, EnvelopeBucket};
