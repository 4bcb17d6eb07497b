use axum::Json;
use axum::extract::State;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::application::services::job_envelope::{decode_audio, model_ref_from_fields};
use crate::domain::{ArtifactLocator, AudioSource, JobRequest, ModelRef, RequestId};
use crate::presentation::state::AppState;

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct LegacyInferenceRequest {
    pub model_url: String,
    pub input_url: String,
    #[serde(default)]
    pub pitch: i32,
}

#[derive(Debug, Deserialize)]
pub struct SyncInferenceRequest {
    #[serde(default)]
    pub model_cache_id: Option<String>,
    #[serde(default)]
    pub model_url: Option<String>,
    /// Base64 of the input audio.
    pub input_content: String,
    #[serde(default)]
    pub pitch: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InferenceResponse {
    /// Base64 of the converted audio.
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_cache_id: Option<String>,
}

#[tracing::instrument(skip(state, request), fields(model_url = %request.model_url))]
pub async fn legacy_inference_handler(
    State(state): State<AppState>,
    Json(request): Json<LegacyInferenceRequest>,
) -> Result<Json<InferenceResponse>, ApiError> {
    if request.model_url.is_empty() || request.input_url.is_empty() {
        return Err(ApiError::bad_request("model_url and input_url are required"));
    }

    let job = JobRequest {
        request_id: RequestId::generate(),
        model: ModelRef::Locator(ArtifactLocator::new(request.model_url)),
        audio: AudioSource::Remote(request.input_url),
        callback_url: None,
        pitch_shift: request.pitch,
    };

    let output = state.pipeline.run(&job).await?;
    Ok(Json(InferenceResponse {
        data: STANDARD.encode(&output.audio),
        model_cache_id: None,
    }))
}

#[tracing::instrument(skip(state, request), fields(model_cache_id = ?request.model_cache_id))]
pub async fn sync_inference_handler(
    State(state): State<AppState>,
    Json(request): Json<SyncInferenceRequest>,
) -> Result<Json<InferenceResponse>, ApiError> {
    let model = model_ref_from_fields(
        request.model_cache_id.as_deref(),
        request.model_url.as_deref(),
    )?;
    let audio = decode_audio(&request.input_content)?;

    let job = JobRequest {
        request_id: RequestId::generate(),
        model,
        audio: AudioSource::Inline(audio),
        callback_url: None,
        pitch_shift: request.pitch,
    };

    let output = state.pipeline.run(&job).await?;
    tracing::debug!(bytes = output.audio.len(), "Synchronous conversion finished");

    Ok(Json(InferenceResponse {
        data: STANDARD.encode(&output.audio),
        model_cache_id: Some(output.cache_key.to_string()),
    }))
}
