use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{LeaseHandle, OutgoingMessage, QueueMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Enqueued,
    /// A message with the same group and deduplication id was sent within the window.
    Duplicate,
}

/// Durable, at-least-once queue with FIFO ordering per message group.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn send(&self, message: OutgoingMessage) -> Result<SendStatus, QueueError>;

    /// Long-polls for at most one message, waiting up to `wait`. `Ok(None)` on timeout.
    async fn receive(&self, wait: Duration) -> Result<Option<QueueMessage>, QueueError>;

    /// Permanently removes the leased message.
    async fn acknowledge(&self, lease: &LeaseHandle) -> Result<(), QueueError>;

    /// Records the message in the dead-letter store. The lease is left untouched.
    async fn dead_letter(&self, message: &QueueMessage, reason: &str) -> Result<(), QueueError>;
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("encoding failed: {0}")]
    Encoding(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("unknown or expired lease: {0}")]
    UnknownLease(String),
}
