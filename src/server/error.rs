use crate::core::error::IdaError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the HTTP layer
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] IdaError),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(IdaError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(IdaError::InferenceUnavailable(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Pipeline(IdaError::EmptyAnswer) => StatusCode::BAD_GATEWAY,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Pipeline(IdaError::InvalidRequest(_))
            | ApiError::Pipeline(IdaError::InferenceUnavailable(_))
            | ApiError::Pipeline(IdaError::EmptyAnswer)
            | ApiError::Timeout(_) => self.to_string(),
            ApiError::Pipeline(_) => "Internal error".to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Chat request failed");
        }

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}
