use anyhow::{Context, Result};
use scraper_chromiumoxide::ChromiumRenderer;
use shared::AppConfig;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod handlers;
mod routes;

use crate::handlers::AppState;
use crate::routes::create_api_router;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let renderer = Arc::new(ChromiumRenderer::new(config.browser.clone()));
    let state = AppState::new(renderer, config.max_text_length);
    let app = create_api_router(state, &config.static_dir);

    let addr = config.listen_addr();
    info!(static_dir = %config.static_dir.display(), "Crawl API listening on http://{}", addr);

    axum::Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind {}", addr))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Crawl API shutting down");
}
