//! HTTP surface: `POST /api/chat`, the demo page, and a health probe

pub mod error;

use crate::core::config::ServerConfig;
use crate::core::error::{IdaError, Result};
use crate::llm::client::InferenceClient;
use crate::pipeline::{Assistant, Response};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use error::ApiError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const INDEX_HTML: &str = include_str!("index.html");

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
}

/// Shared state for handlers
pub struct AppState<C: ?Sized> {
    pub assistant: Arc<Assistant<C>>,
    pub request_timeout: Duration,
}

impl<C: ?Sized> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            assistant: Arc::clone(&self.assistant),
            request_timeout: self.request_timeout,
        }
    }
}

impl<C: InferenceClient + ?Sized> AppState<C> {
    pub fn new(assistant: Assistant<C>, request_timeout: Duration) -> Self {
        Self {
            assistant: Arc::new(assistant),
            request_timeout,
        }
    }
}

/// Create the router with all HTTP endpoints
pub fn router<C>(state: AppState<C>) -> Router
where
    C: InferenceClient + ?Sized + 'static,
{
    Router::new()
        .route("/", get(index_handler))
        .route("/healthz", get(health_handler))
        .route("/api/chat", post(chat_handler::<C>))
        .with_state(state)
}

/// Bind and serve until Ctrl+C
pub async fn serve<C>(assistant: Assistant<C>, config: &ServerConfig) -> Result<()>
where
    C: InferenceClient + ?Sized + 'static,
{
    let state = AppState::new(assistant, Duration::from_secs(config.request_timeout_secs));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(bind = %config.bind, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run the pipeline for one prompt under the request deadline
///
/// On timeout the pipeline future is dropped, cancelling whichever
/// inference call is outstanding.
async fn chat_handler<C>(
    State(state): State<AppState<C>>,
    body: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> std::result::Result<Json<Response>, ApiError>
where
    C: InferenceClient + ?Sized + 'static,
{
    let Json(request) = body.map_err(|e| IdaError::InvalidRequest(e.body_text()))?;

    let response = tokio::time::timeout(state.request_timeout, state.assistant.chat(&request.prompt))
        .await
        .map_err(|_| ApiError::Timeout(state.request_timeout))??;

    Ok(Json(response))
}
