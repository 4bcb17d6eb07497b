use std::fmt;

use super::DeduplicationId;

/// Queue-assigned handle identifying one lease on a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeaseHandle(String);

impl LeaseHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message leased from the job queue. The body is the serialized job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub body: String,
    pub lease: LeaseHandle,
    pub dedup_id: DeduplicationId,
    pub receive_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub body: String,
    pub group_id: String,
    pub dedup_id: DeduplicationId,
}
