//! Axum route handlers for tile word clouds.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::layout::{get_metrics, FontFamily};
use crate::state::AppState;
use crate::tiles::{build_tile_cloud, TermCount, TileCloud, TileCloudConfig};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TileCloudRequest {
    pub tile_key: String,
    pub entries: Vec<TermCount>,
    pub font: Option<FontFamily>,
}

#[derive(Debug, Deserialize)]
pub struct TileBatchEntry {
    pub tile_key: String,
    pub entries: Vec<TermCount>,
}

#[derive(Debug, Deserialize)]
pub struct TileBatchRequest {
    pub tiles: Vec<TileBatchEntry>,
    pub font: Option<FontFamily>,
}

#[derive(Debug, Serialize)]
pub struct TileBatchResponse {
    pub tiles: Vec<TileCloud>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tiles/cloud
pub async fn handle_tile_cloud(
    State(state): State<AppState>,
    Json(request): Json<TileCloudRequest>,
) -> Result<Json<TileCloud>, AppError> {
    if request.tile_key.trim().is_empty() {
        return Err(AppError::Validation("tile_key cannot be empty".to_string()));
    }

    let font = state.font_or_default(request.font);
    let cloud = spawn_tile_layout(
        request.tile_key,
        request.entries,
        state.tile_config().clone(),
        font,
    )
    .await?;

    info!(
        tile = %cloud.tile_key,
        placed = cloud.elements.len(),
        dropped = cloud.dropped,
        "tile cloud laid out"
    );

    Ok(Json(cloud))
}

/// POST /api/v1/tiles/clouds
///
/// Each tile is independent, so every tile gets its own blocking task.
/// Results are returned in request order.
pub async fn handle_tile_batch(
    State(state): State<AppState>,
    Json(request): Json<TileBatchRequest>,
) -> Result<Json<TileBatchResponse>, AppError> {
    if let Some(blank) = request.tiles.iter().position(|t| t.tile_key.trim().is_empty()) {
        return Err(AppError::Validation(format!(
            "tiles[{blank}].tile_key cannot be empty"
        )));
    }

    let font = state.font_or_default(request.font);
    let config = state.tile_config().clone();

    let pending: Vec<_> = request
        .tiles
        .into_iter()
        .map(|tile| {
            tokio::spawn(spawn_tile_layout(
                tile.tile_key,
                tile.entries,
                config.clone(),
                font,
            ))
        })
        .collect();

    let mut tiles = Vec::with_capacity(pending.len());
    for handle in pending {
        let cloud = handle
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("tile layout task failed: {e}")))??;
        tiles.push(cloud);
    }

    info!(tiles = tiles.len(), "tile batch laid out");

    Ok(Json(TileBatchResponse { tiles }))
}

async fn spawn_tile_layout(
    tile_key: String,
    entries: Vec<TermCount>,
    config: TileCloudConfig,
    font: FontFamily,
) -> Result<TileCloud, AppError> {
    let cloud = tokio::task::spawn_blocking(move || {
        build_tile_cloud(&tile_key, &entries, &config, get_metrics(font))
    })
    .await
    .map_err(|e| {
        AppError::Internal(anyhow::anyhow!("spawn_blocking failed in tile layout: {e}"))
    })??;
    Ok(cloud)
}
