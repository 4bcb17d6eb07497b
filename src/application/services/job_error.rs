use std::time::Duration;

use crate::application::ports::{ConversionError, FetchError};

use super::ArtifactCacheError;

/// Failure of a single conversion job, on either execution path.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("fetch failed: {0}")]
    Fetch(FetchError),
    #[error("{0}")]
    ArtifactIncomplete(String),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("malformed job: {0}")]
    MalformedJob(String),
    #[error("invalid model reference: {0}")]
    InvalidModel(String),
    #[error("archive extraction failed: {0}")]
    Extraction(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("job exceeded its time budget of {0:?}")]
    TimedOut(Duration),
    #[error("job aborted: {0}")]
    Aborted(String),
}

impl JobError {
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::Fetch(_) => "fetch_error",
            JobError::ArtifactIncomplete(_) => "artifact_incomplete",
            JobError::Conversion(_) => "conversion_error",
            JobError::MalformedJob(_) => "malformed_job",
            JobError::InvalidModel(_) => "invalid_model",
            JobError::Extraction(_) => "extraction_error",
            JobError::Storage(_) => "storage_error",
            JobError::TimedOut(_) => "timed_out",
            JobError::Aborted(_) => "aborted",
        }
    }
}

impl From<ArtifactCacheError> for JobError {
    fn from(err: ArtifactCacheError) -> Self {
        match err {
            ArtifactCacheError::Fetch(e) => JobError::Fetch(e),
            e @ ArtifactCacheError::Incomplete { .. } => JobError::ArtifactIncomplete(e.to_string()),
            ArtifactCacheError::Extraction(e) => JobError::Extraction(e.to_string()),
            ArtifactCacheError::InvalidKey(e) => JobError::InvalidModel(e.to_string()),
            ArtifactCacheError::Io(e) => JobError::Storage(e.to_string()),
        }
    }
}
