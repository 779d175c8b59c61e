use anyhow::{Context, Result};
use std::str::FromStr;

use crate::layout::handlers::RequestLimits;
use crate::layout::{FontFamily, FontRange};
use crate::tiles::TileCloudConfig;

/// Application configuration loaded from environment variables.
/// Every variable has a default; startup fails only on unparsable or
/// inconsistent values.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Font family used when a request does not name one.
    pub default_font: FontFamily,
    pub tile: TileCloudConfig,
    /// Caps on free-form layout requests.
    pub limits: RequestLimits,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let tile = checked_tile_config(
            env_or("CLOUD_MIN_FONT_SIZE", 12.0)?,
            env_or("CLOUD_MAX_FONT_SIZE", 30.0)?,
            TileCloudConfig {
                tile_size: env_or("CLOUD_TILE_SIZE", 256.0)?,
                pad_x: env_or("CLOUD_TILE_PAD_X", 10.0)?,
                pad_y: env_or("CLOUD_TILE_PAD_Y", 24.0)?,
                max_words: env_or("CLOUD_MAX_WORDS", 10)?,
                max_letters: env_or("CLOUD_MAX_LETTERS", 20)?,
                ..TileCloudConfig::default()
            },
        )?;

        let defaults = RequestLimits::default();
        let limits = RequestLimits {
            max_words: env_or("CLOUD_MAX_REQUEST_WORDS", defaults.max_words)?,
            max_box_side: env_or("CLOUD_MAX_BOX_SIDE", defaults.max_box_side)?,
            max_font_size: env_or("CLOUD_MAX_REQUEST_FONT_SIZE", defaults.max_font_size)?,
        };

        Ok(Config {
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            default_font: std::env::var("CLOUD_FONT")
                .unwrap_or_else(|_| "sans".to_string())
                .parse::<FontFamily>()
                .map_err(anyhow::Error::msg)
                .context("CLOUD_FONT must be 'sans' or 'condensed'")?,
            tile,
            limits,
        })
    }
}

/// Applies the configured font range to `tile` and rejects geometry the
/// layout engine would refuse for every tile.
fn checked_tile_config(
    min_font_size: f64,
    max_font_size: f64,
    tile: TileCloudConfig,
) -> Result<TileCloudConfig> {
    let font_range = FontRange::new(min_font_size, max_font_size)
        .context("CLOUD_MIN_FONT_SIZE/CLOUD_MAX_FONT_SIZE are inconsistent")?;
    let tile = TileCloudConfig { font_range, ..tile };
    tile.bounding_box()
        .context("CLOUD_TILE_SIZE is too small for the configured padding")?;
    Ok(tile)
}

/// Reads `key`, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
