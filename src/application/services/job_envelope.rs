use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::domain::{ArtifactLocator, AudioSource, CacheKey, JobRequest, ModelRef, RequestId};

use super::JobError;

/// Queue message body: the serialized form of a [`JobRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_cache_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_url: Option<String>,
    /// Base64 of the inline input audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub pitch: i32,
}

impl From<&JobRequest> for JobEnvelope {
    fn from(job: &JobRequest) -> Self {
        let (model_url, model_cache_id) = match &job.model {
            ModelRef::Locator(locator) => (Some(locator.to_string()), None),
            ModelRef::Cached { key, fallback } => {
                (fallback.as_ref().map(|l| l.to_string()), Some(key.to_string()))
            }
        };
        let (input_url, input_content) = match &job.audio {
            AudioSource::Remote(url) => (Some(url.clone()), None),
            AudioSource::Inline(bytes) => (None, Some(STANDARD.encode(bytes))),
        };

        Self {
            request_id: job.request_id.to_string(),
            model_url,
            model_cache_id,
            input_url,
            input_content,
            callback_url: job.callback_url.clone(),
            pitch: job.pitch_shift,
        }
    }
}

impl TryFrom<JobEnvelope> for JobRequest {
    type Error = JobError;

    fn try_from(envelope: JobEnvelope) -> Result<Self, Self::Error> {
        let model = model_ref_from_fields(
            envelope.model_cache_id.as_deref(),
            envelope.model_url.as_deref(),
        )?;

        let audio = match (envelope.input_url, envelope.input_content) {
            (Some(url), _) => AudioSource::Remote(url),
            (None, Some(content)) => AudioSource::Inline(decode_audio(&content)?),
            (None, None) => {
                return Err(JobError::MalformedJob("job carries no input audio".to_string()));
            }
        };

        Ok(JobRequest {
            request_id: RequestId::new(envelope.request_id),
            model,
            audio,
            callback_url: envelope.callback_url,
            pitch_shift: envelope.pitch,
        })
    }
}

/// Builds a [`ModelRef`] from the optional cache id and model URL a request carries.
/// A cache id takes precedence; the URL then only serves as the download fallback.
pub fn model_ref_from_fields(
    model_cache_id: Option<&str>,
    model_url: Option<&str>,
) -> Result<ModelRef, JobError> {
    let fallback = model_url
        .filter(|url| !url.is_empty())
        .map(ArtifactLocator::new);
    match model_cache_id.filter(|id| !id.is_empty()) {
        Some(raw) => {
            let key = CacheKey::parse(raw).map_err(|e| JobError::InvalidModel(e.to_string()))?;
            Ok(ModelRef::Cached { key, fallback })
        }
        None => fallback
            .map(ModelRef::Locator)
            .ok_or_else(|| JobError::InvalidModel("model_url or model_cache_id is required".to_string())),
    }
}

pub fn decode_audio(content: &str) -> Result<Vec<u8>, JobError> {
    STANDARD
        .decode(content.trim())
        .map_err(|e| JobError::MalformedJob(format!("input_content is not valid base64: {e}")))
}

pub fn encode_job(job: &JobRequest) -> Result<String, serde_json::Error> {
    serde_json::to_string(&JobEnvelope::from(job))
}

pub fn decode_job(body: &str) -> Result<JobRequest, JobError> {
    let envelope: JobEnvelope =
        serde_json::from_str(body).map_err(|e| JobError::MalformedJob(e.to_string()))?;
    JobRequest::try_from(envelope).map_err(|e| match e {
        e @ JobError::MalformedJob(_) => e,
        other => JobError::MalformedJob(other.to_string()),
    })
}

/// Pulls a callback URL (and request id, if any) out of a body that failed to decode.
pub fn salvage_callback(body: &str) -> Option<(RequestId, String)> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let callback_url = value.get("callback_url")?.as_str()?.to_string();
    let request_id = value
        .get("request_id")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    Some((RequestId::new(request_id), callback_url))
}
