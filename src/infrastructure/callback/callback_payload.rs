use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::domain::{JobOutcome, JobResult};

/// Body POSTed to a job's callback URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackPayload {
    pub result: String,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&JobResult> for CallbackPayload {
    fn from(result: &JobResult) -> Self {
        let (data, detail) = match &result.outcome {
            JobOutcome::Success { audio } => (Some(STANDARD.encode(audio)), None),
            JobOutcome::Failure { detail } => (None, Some(detail.clone())),
        };
        Self {
            result: result.status().as_str().to_string(),
            request_id: result.request_id.to_string(),
            data,
            detail,
        }
    }
}
