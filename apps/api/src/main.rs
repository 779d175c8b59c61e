mod config;
mod errors;
mod layout;
mod routes;
mod state;
mod tiles;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cloud API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Tile clouds: {}px tiles, {} words max, fonts {}..{} ({:?})",
        config.tile.tile_size,
        config.tile.max_words,
        config.tile.font_range.min_font_size,
        config.tile.font_range.max_font_size,
        config.default_font
    );
    info!(
        "Cloud requests: {} words max, {}px box side max, font size <= {}",
        config.limits.max_words, config.limits.max_box_side, config.limits.max_font_size
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;

    let app = build_router(AppState::new(config))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
