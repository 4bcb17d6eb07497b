use std::fmt;

use super::RequestId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub request_id: RequestId,
    pub outcome: JobOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success { audio: Vec<u8> },
    Failure { detail: String },
}

impl JobResult {
    pub fn success(request_id: RequestId, audio: Vec<u8>) -> Self {
        Self {
            request_id,
            outcome: JobOutcome::Success { audio },
        }
    }

    pub fn failure(request_id: RequestId, detail: impl Into<String>) -> Self {
        Self {
            request_id,
            outcome: JobOutcome::Failure {
                detail: detail.into(),
            },
        }
    }

    pub fn status(&self) -> ResultStatus {
        match self.outcome {
            JobOutcome::Success { .. } => ResultStatus::Success,
            JobOutcome::Failure { .. } => ResultStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Success,
    Failed,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Success => "success",
            ResultStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
