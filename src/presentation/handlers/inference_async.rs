use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::application::services::job_envelope::{decode_audio, model_ref_from_fields};
use crate::domain::{AudioSource, JobRequest, RequestId};
use crate::presentation::state::AppState;

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct AsyncInferenceRequest {
    pub request_id: String,
    #[serde(default)]
    pub model_url: Option<String>,
    #[serde(default)]
    pub model_cache_id: Option<String>,
    #[serde(default)]
    pub input_url: Option<String>,
    #[serde(default)]
    pub input_content: Option<String>,
    pub callback_url: String,
    #[serde(default)]
    pub pitch: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AsyncInferenceResponse {
    pub request_id: String,
}

/// Enqueues the job and answers with the caller's own request id.
#[tracing::instrument(skip(state, request), fields(request_id = %request.request_id))]
pub async fn async_inference_handler(
    State(state): State<AppState>,
    Json(request): Json<AsyncInferenceRequest>,
) -> Result<Json<AsyncInferenceResponse>, ApiError> {
    if request.request_id.is_empty() {
        return Err(ApiError::bad_request("request_id is required"));
    }
    if request.callback_url.is_empty() {
        return Err(ApiError::bad_request("callback_url is required"));
    }

    let model = model_ref_from_fields(
        request.model_cache_id.as_deref(),
        request.model_url.as_deref(),
    )?;
    let audio = match (request.input_url, request.input_content) {
        (Some(url), _) if !url.is_empty() => AudioSource::Remote(url),
        (_, Some(content)) => AudioSource::Inline(decode_audio(&content)?),
        _ => return Err(ApiError::bad_request("input_url or input_content is required")),
    };

    let receipt = state
        .producer
        .submit(JobRequest {
            request_id: RequestId::new(request.request_id),
            model,
            audio,
            callback_url: Some(request.callback_url),
            pitch_shift: request.pitch,
        })
        .await?;

    Ok(Json(AsyncInferenceResponse {
        request_id: receipt.request_id.to_string(),
    }))
}
