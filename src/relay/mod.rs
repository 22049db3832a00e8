//! Broadcast relay.
//!
//! SYSTEM CONTEXT
//! ==============
//! The relay is the shared broadcast domain every client connects to. It
//! binds `GET /ws` for the cursor stream and `GET /healthz` for liveness
//! probes under a single axum router. It keeps no presence state of its own.

pub mod state;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
pub use state::RelayState;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("failed to bind port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },
    #[error("server failed: {0}")]
    Serve(std::io::Error),
}

/// Relay routes with permissive CORS and request tracing.
#[must_use]
pub fn app(state: RelayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
///
/// # Errors
///
/// Returns [`RelayError`] if the port cannot be bound or the server fails.
pub async fn serve(config: RelayConfig) -> Result<(), RelayError> {
    let state = RelayState::new(config.peer_queue);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .map_err(|source| RelayError::Bind { port: config.port, source })?;

    tracing::info!(port = config.port, peer_queue = config.peer_queue, "relay listening");
    axum::serve(listener, app(state)).await.map_err(RelayError::Serve)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
