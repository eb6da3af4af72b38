//! PawPress backend: serves normalized WordPress posts and category
//! listings as a JSON API.

mod aggregate;
mod boost;
mod config;
mod handlers;
mod logging;
mod request_context;
mod routes;
mod state;
mod wordpress;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = logging::init_tracing(config.log_dir.as_deref())?;

    tracing::info!("Starting PawPress backend server");
    tracing::info!("WordPress API: {}", config.wordpress.api_url());
    tracing::info!(
        "Request deadline: {}s",
        config.wordpress.timeout.as_secs()
    );

    let shutdown = CancellationToken::new();
    let app_state = state::AppState::from_config(&config, shutdown.clone())?;
    let app = routes::create_router(app_state);

    let addr = config.listen_addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on ctrl-c after cancelling every in-flight upstream request.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested, cancelling upstream requests");
    shutdown.cancel();
}
