use std::fmt;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::RequestId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeduplicationId(String);

impl DeduplicationId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn for_request(request_id: &RequestId) -> Self {
        let digest = Sha256::digest(request_id.as_str().as_bytes());
        Self(format!("{digest:x}"))
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeduplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeduplicationStrategy {
    /// Same request id, same deduplication id: resubmissions collapse in the queue.
    RequestId,
    /// Fresh id per enqueue: every submission is delivered.
    Random,
}

impl DeduplicationStrategy {
    pub fn derive(&self, request_id: &RequestId) -> DeduplicationId {
        match self {
            DeduplicationStrategy::RequestId => DeduplicationId::for_request(request_id),
            DeduplicationStrategy::Random => DeduplicationId::random(),
        }
    }
}
