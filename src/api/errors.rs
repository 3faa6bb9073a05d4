//! API error type with JSON responses

use crate::storage::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors surfaced by the HTTP API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Secret key is required")]
    MissingSecret,

    #[error("Invalid secret key")]
    InvalidCredentials,

    #[error("Server configuration error")]
    ServerMisconfigured,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Could not load apps")]
    FetchFailed,

    #[error("Store unavailable")]
    StoreUnavailable,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingSecret => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::ServerMisconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::FetchFailed => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::NotFound(id),
            // Store faults collapse to one generic condition; the client
            // gets a retry affordance, not the failure details.
            other => {
                tracing::error!("Store operation failed: {}", other);
                ApiError::StoreUnavailable
            }
        }
    }
}
