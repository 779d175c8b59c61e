pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::layout::handlers as cloud_handlers;
use crate::state::AppState;
use crate::tiles::handlers as tile_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Free-form layout
        .route("/api/v1/clouds", post(cloud_handlers::handle_layout_cloud))
        // Tile clouds
        .route("/api/v1/tiles/cloud", post(tile_handlers::handle_tile_cloud))
        .route("/api/v1/tiles/clouds", post(tile_handlers::handle_tile_batch))
        .with_state(state)
}
