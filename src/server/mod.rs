// HTTP server - serves transcripts and their projections as JSON
//
// Security: binds to 127.0.0.1 by default (localhost only). All routes are
// read-only.

mod api;
mod error;

pub use error::ApiError;

use crate::interpreter::Interpreter;
use crate::transcripts::TranscriptSource;
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<TranscriptSource>,
    /// Interpreter with the configured display zone
    pub interpreter: Interpreter,
}

impl AppState {
    pub fn new(source: TranscriptSource, interpreter: Interpreter) -> Self {
        Self {
            source: Arc::new(source),
            interpreter,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/logs", get(api::list_logs))
        .route("/api/logs/:filename", get(api::get_log))
        .route("/api/logs/:filename/view", get(api::view_log))
        .route("/api/logs/:filename/download", get(api::download_log))
        .with_state(state)
}

/// Serve until `shutdown_rx` fires
pub async fn start_server(
    bind_addr: SocketAddr,
    state: AppState,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<()> {
    tracing::info!(
        "Serving transcripts from {} (timestamps in {})",
        state.source.describe(),
        state.interpreter.zone()
    );

    let app = router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.await.ok();
        })
        .await
        .context("Server error")?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}
