//! Axum-based HTTP gateway around the chat pipeline, with body limits and
//! request timeouts.

mod handlers;

use handlers::{handle_chat, handle_health, handle_new_session, handle_root};

use crate::pipeline::ChatPipeline;
use anyhow::Result;
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB) — prevents memory exhaustion
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s) — prevents slow-loris attacks
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
}

/// Chat request body
#[derive(serde::Deserialize)]
pub struct ChatBody {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// New-session request body (optional; names the session to clear)
#[derive(serde::Deserialize, Default)]
pub struct NewSessionBody {
    #[serde(default)]
    pub session_id: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/chat", post(handle_chat))
        .route("/new-session", post(handle_new_session))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .with_state(state)
}

pub async fn run_gateway(host: &str, port: u16, pipeline: Arc<ChatPipeline>) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_gateway_with_listener(listener, pipeline).await
}

/// Run the gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    pipeline: Arc<ChatPipeline>,
) -> Result<()> {
    tracing::info!(
        addr = %listener.local_addr()?,
        backend = %pipeline.backend_label(),
        "chat gateway listening"
    );
    let router = build_router(AppState { pipeline });
    axum::serve(listener, router).await?;
    Ok(())
}
