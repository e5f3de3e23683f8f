use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use common::types::ApiResponse;
use serde::Deserialize;
use service::memory::MemoryRecord;

use crate::auth::ServerState;
use crate::errors::ApiError;
use crate::observability::record_memory_op;
use crate::routes::payload::Payload;

type MemoryResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KeyQuery {
    /// Memory key
    pub key: Option<String>,
}

/// Query form of `/memory/add`, used only when the body is empty.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddQuery {
    pub key: Option<String>,
    pub value: Option<String>,
}

#[utoipa::path(
    get, path = "/memory/list", tag = "memory",
    responses(
        (status = 200, description = "All records in storage order"),
        (status = 403, description = "Invalid API key"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list(State(state): State<ServerState>) -> MemoryResult<Vec<MemoryRecord>> {
    let res = state.memory.list().await;
    record_memory_op("list", &res);
    Ok(Json(ApiResponse::ok(res?)))
}

#[utoipa::path(
    post, path = "/memory/add", tag = "memory",
    params(AddQuery),
    request_body = crate::openapi::MemoryRecordDoc,
    responses(
        (status = 200, description = "Stored"),
        (status = 400, description = "Missing or wrong-typed key/value"),
        (status = 403, description = "Invalid API key")
    )
)]
pub async fn add(
    State(state): State<ServerState>,
    query: Result<Query<AddQuery>, QueryRejection>,
    body: Bytes,
) -> MemoryResult<MemoryRecord> {
    let Query(q) = query?;
    let payload = Payload::parse(&body)?;
    let key = payload.string("key", q.key)?;
    let value = payload.string("value", q.value)?;
    let res = state.memory.upsert(key, value).await;
    record_memory_op("add", &res);
    Ok(Json(ApiResponse::ok(res?)))
}

#[utoipa::path(
    get, path = "/memory/get", tag = "memory",
    params(KeyQuery),
    responses(
        (status = 200, description = "Found"),
        (status = 400, description = "Missing key"),
        (status = 403, description = "Invalid API key"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    query: Result<Query<KeyQuery>, QueryRejection>,
) -> MemoryResult<MemoryRecord> {
    let Query(q) = query?;
    let key = q.key.ok_or_else(|| ApiError::bad_request("key is required"))?;
    let res = state.memory.get(&key).await;
    record_memory_op("get", &res);
    Ok(Json(ApiResponse::ok(res?)))
}

#[utoipa::path(
    delete, path = "/memory/delete", tag = "memory",
    params(KeyQuery),
    request_body = crate::openapi::KeyDoc,
    responses(
        (status = 200, description = "Deleted; returns the removed record"),
        (status = 400, description = "Missing key"),
        (status = 403, description = "Invalid API key"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    query: Result<Query<KeyQuery>, QueryRejection>,
    body: Bytes,
) -> MemoryResult<MemoryRecord> {
    let Query(q) = query?;
    let key = Payload::parse(&body)?.string("key", q.key)?;
    let res = state.memory.delete(&key).await;
    record_memory_op("delete", &res);
    Ok(Json(ApiResponse::ok(res?)))
}
