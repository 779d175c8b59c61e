// Word cloud layout engine.
// Pure, synchronous packing of weighted words into a bounding box; handlers
// run it inside tokio::task::spawn_blocking.

pub mod cloud;
pub mod font_metrics;
pub mod geometry;
pub mod handlers;
pub mod spiral;

// Re-export the public API consumed by other modules (tiles, handlers).
pub use cloud::{layout_cloud, layout_weighted, Cloud, FontRange, LayoutError, WordWeight};
pub use font_metrics::{get_metrics, FontFamily, TextMeasurer};
pub use geometry::{BoundingBox, TextSize};
