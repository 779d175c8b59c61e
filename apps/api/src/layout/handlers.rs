//! Axum route handlers for free-form cloud layout.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::layout::{get_metrics, layout_cloud, BoundingBox, Cloud, FontFamily, FontRange};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CloudRequest {
    pub words: Vec<String>,
    pub weights: Vec<f64>,
    /// Defaults to the configured tile font range.
    pub font_range: Option<FontRange>,
    pub bounding_box: BoundingBox,
    pub font: Option<FontFamily>,
}

/// Upper bounds on what a single `/api/v1/clouds` request may ask for.
///
/// The engine accepts any valid input; requests over these caps are
/// rejected before any layout work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestLimits {
    pub max_words: usize,
    /// Largest accepted bounding box width or height, in pixels.
    pub max_box_side: f64,
    pub max_font_size: f64,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_words: 200,
            max_box_side: 4096.0,
            max_font_size: 256.0,
        }
    }
}

impl RequestLimits {
    /// Rejects requests over the configured caps. Runs before any layout work.
    pub fn check(&self, request: &CloudRequest, font_range: FontRange) -> Result<(), AppError> {
        if request.words.len() > self.max_words {
            return Err(AppError::Validation(format!(
                "too many words: {} (max {})",
                request.words.len(),
                self.max_words
            )));
        }
        let bb = &request.bounding_box;
        if bb.width > self.max_box_side || bb.height > self.max_box_side {
            return Err(AppError::Validation(format!(
                "bounding box {}x{} exceeds {} per side",
                bb.width, bb.height, self.max_box_side
            )));
        }
        if font_range.max_font_size > self.max_font_size {
            return Err(AppError::Validation(format!(
                "max_font_size {} exceeds {}",
                font_range.max_font_size, self.max_font_size
            )));
        }
        Ok(())
    }
}

/// POST /api/v1/clouds
///
/// Lays out arbitrary words in an arbitrary box and returns every slot in
/// rank order, placed or not.
pub async fn handle_layout_cloud(
    State(state): State<AppState>,
    Json(request): Json<CloudRequest>,
) -> Result<Json<Cloud>, AppError> {
    let font = state.font_or_default(request.font);
    let font_range = request.font_range.unwrap_or(state.tile_config().font_range);

    if let Err(e) = state.config.limits.check(&request, font_range) {
        warn!(words = request.words.len(), "cloud request rejected: {e}");
        return Err(e);
    }

    // CPU-bound packing: keep it off the async workers.
    let cloud = tokio::task::spawn_blocking(move || {
        layout_cloud(
            &request.words,
            &request.weights,
            font_range,
            request.bounding_box,
            get_metrics(font),
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in cloud layout: {e}")))??;

    info!(
        words = cloud.slots.len(),
        placed = cloud.placed().count(),
        unplaced = cloud.unplaced_count(),
        "cloud laid out"
    );

    Ok(Json(cloud))
}
