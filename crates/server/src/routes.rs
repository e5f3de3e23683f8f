use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure};
use tracing::Level;
use axum::middleware;
use utoipa::OpenApi;

use common::types::Health;

use crate::auth::{self, ServerState};
use crate::observability;
use crate::openapi::ApiDoc;

pub mod chat;
pub mod memory;
pub mod payload;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (StatusCode, String) {
    observability::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: public health/metrics/docs plus the
/// key-protected memory and chat routes.
pub fn build_router(state: ServerState) -> Router {
    // Public routes
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json));

    // Protected routes
    let protected = Router::new()
        .route("/memory/list", get(memory::list))
        .route("/memory/add", post(memory::add))
        .route("/memory/get", get(memory::get))
        .route("/memory/delete", delete(memory::delete))
        .route("/chat", post(chat::chat))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    public
        .merge(protected)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx responses are logged at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
