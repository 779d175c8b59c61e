use crate::config::Config;
use crate::layout::FontFamily;
use crate::tiles::TileCloudConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn tile_config(&self) -> &TileCloudConfig {
        &self.config.tile
    }

    /// The requested font family, or the configured default.
    pub fn font_or_default(&self, requested: Option<FontFamily>) -> FontFamily {
        requested.unwrap_or(self.config.default_font)
    }
}
