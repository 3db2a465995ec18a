//! Relay error types.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub type RelayResult<T> = Result<T, RelayError>;

/// Failures of a relayed chat request, mapped to plain-text HTTP responses.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Completion provider failed: {0:#}")]
    Provider(anyhow::Error),

    #[error("Storage failed: {0:#}")]
    Storage(anyhow::Error),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            RelayError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            RelayError::InvalidRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            RelayError::Provider(_) | RelayError::Storage(_) => {
                tracing::error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };
        (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
    }
}
