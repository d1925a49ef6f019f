use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::models::{response::ApiResponse, validation::SignatureError};

/// Request-level failures. Channel failures never surface here; they are
/// reported inside a successful response.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid signature: {0}")]
    Unauthorized(#[from] SignatureError),

    #[error("{0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            WebhookError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            WebhookError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            WebhookError::Internal(e) => {
                error!(error = %e, "Unexpected error while handling publish webhook");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = ApiResponse::<()>::error(code.to_string(), self.to_string());

        (status, Json(body)).into_response()
    }
}
