use std::sync::Arc;

use axum::{extract::{Request, State}, middleware::Next, response::Response};
use service::{chat::ChatCompleter, memory::MemoryStore};
use tracing::warn;

use crate::errors::ApiError;

pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Clone, Default)]
pub struct ServerAuthConfig {
    /// Shared secret; `None` disables the check.
    pub api_key: Option<String>,
}

#[derive(Clone)]
pub struct ServerState {
    pub auth: ServerAuthConfig,
    pub memory: Arc<dyn MemoryStore>,
    /// Absent when no chat API key is configured.
    pub chat: Option<Arc<dyn ChatCompleter>>,
}

/// Middleware: require the configured `X-API-Key` on protected routes.
/// Responds 403 before the handler runs when the header is missing or wrong.
pub async fn require_api_key(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.auth.api_key.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    let matches = provided.is_some_and(|p| constant_time_eq(p.as_bytes(), expected.as_bytes()));
    if !matches {
        warn!(path = %req.uri().path(), has_header = provided.is_some(), "rejected request: invalid api key");
        return Err(ApiError::forbidden("invalid or missing API key"));
    }

    Ok(next.run(req).await)
}

/// Compare secrets without exiting early on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
