use async_trait::async_trait;

use crate::domain::JobResult;

/// Delivers a job's outcome to the caller-supplied callback URL.
#[async_trait]
pub trait CallbackNotifier: Send + Sync {
    async fn deliver(&self, callback_url: &str, result: &JobResult) -> Result<(), DeliveryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("callback {url} unreachable: {reason}")]
    Unreachable { url: String, reason: String },
    #[error("callback {url} timed out")]
    TimedOut { url: String },
    #[error("callback {url} rejected delivery with status {status}")]
    Rejected { url: String, status: u16 },
}
