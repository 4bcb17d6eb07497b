use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    async_inference_handler, legacy_inference_handler, ping_handler, sync_inference_handler,
    test_inference_handler,
};
use crate::presentation::state::AppState;

/// Inline audio travels base64-encoded in JSON, so the default 2 MB body limit is too small.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    create_router_with_body_limit(state, DEFAULT_MAX_BODY_BYTES)
}

pub fn create_router_with_body_limit(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/", get(ping_handler))
        .route("/inference", post(legacy_inference_handler))
        .route("/inference/sync", post(sync_inference_handler))
        .route("/inference/v2", post(async_inference_handler))
        .route("/inference/test", post(test_inference_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
