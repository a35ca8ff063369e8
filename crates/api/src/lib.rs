//! HTTP API for the Knowledge Base Assistant.
//!
//! Routes:
//! - `GET /health`
//! - `GET /api/search?query=..&category=..&limit=..`
//! - `POST /api/ask` with `{"question": .., "context_ids": [..]}`

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use kba_core::{AppConfig, AppError, AppResult};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Build the router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/search", get(handlers::search))
        .route("/api/ask", post(handlers::ask))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Bind `config.server.bind` and serve until Ctrl+C.
pub async fn serve(config: AppConfig) -> AppResult<()> {
    let bind = config.server.bind.clone();

    let state = AppState::new(config)?;
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || store.init_schema())
        .await
        .map_err(|e| AppError::Other(format!("Schema task failed: {}", e)))??;

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", bind, e)))?;

    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
