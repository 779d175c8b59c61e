// Per-tile word clouds: term-count capping, label trimming, tile-space
// projection, and the tile endpoints.

pub mod cloud;
pub mod handlers;

pub use cloud::{build_tile_cloud, TermCount, TileCloud, TileCloudConfig};
