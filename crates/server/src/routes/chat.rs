use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use common::types::ApiResponse;
use serde::{Deserialize, Serialize};
use service::errors::ServiceError;
use tracing::info;

use crate::auth::ServerState;
use crate::errors::ApiError;
use crate::observability::record_chat;
use crate::routes::payload::Payload;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChatQuery {
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
}

/// Forward a prompt to the configured chat-completion API.
#[utoipa::path(
    post, path = "/chat", tag = "chat",
    params(ChatQuery),
    request_body = crate::openapi::ChatRequestDoc,
    responses(
        (status = 200, description = "Completion text"),
        (status = 400, description = "Missing prompt"),
        (status = 403, description = "Invalid API key"),
        (status = 502, description = "Upstream failure"),
        (status = 503, description = "Chat not configured")
    )
)]
pub async fn chat(
    State(state): State<ServerState>,
    query: Result<Query<ChatQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Json<ApiResponse<ChatReply>>, ApiError> {
    let Query(q) = query?;
    let prompt = Payload::parse(&body)?.string("prompt", q.prompt)?;
    let Some(chat) = state.chat.as_ref() else {
        return Err(ServiceError::Unavailable("chat completion is not configured".into()).into());
    };

    let res = chat.complete(&prompt).await;
    record_chat(&res);
    let response = res?;
    info!(prompt_len = prompt.len(), response_len = response.len(), "chat completed");
    Ok(Json(ApiResponse::ok(ChatReply { response })))
}
