//! `POST /api/chat`

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};

use super::ChatRequest;
use crate::error::{RelayError, RelayResult};
use crate::server::AppState;

/// Authenticate the caller, relay the conversation, and answer with the
/// complete assistant reply as plain text.
///
/// The body is parsed only after the caller's identity resolves, and the
/// `Content-Type` header is not consulted.
pub async fn post_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> RelayResult<Response> {
    let Some(user_id) = state.identity.resolve(&headers).await else {
        tracing::warn!("[ChatHandler] Rejected chat request without a resolvable identity");
        return Err(RelayError::Unauthorized);
    };

    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|e| RelayError::InvalidRequest(format!("Invalid chat request: {}", e)))?;

    tracing::debug!(
        "[ChatHandler] Relaying {} messages for user '{}'",
        request.messages.len(),
        user_id
    );

    let reply = state.relay.relay(&user_id, request).await?;
    Ok(([(header::CONTENT_TYPE, "text/plain")], reply).into_response())
}
