use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::presentation::state::AppState;

use super::{ApiError, InferenceResponse};

/// Returns the canned fixture without touching the cache or the engine.
pub async fn test_inference_handler(
    State(state): State<AppState>,
) -> Result<Json<InferenceResponse>, ApiError> {
    let fixture = state.diagnostic_fixture.as_path();
    let contents = tokio::fs::read(fixture).await.map_err(|e| {
        tracing::error!(error = %e, fixture = %fixture.display(), "Failed to read diagnostic fixture");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to read fixture: {e}"),
        )
    })?;

    Ok(Json(InferenceResponse {
        data: STANDARD.encode(contents),
        model_cache_id: None,
    }))
}
