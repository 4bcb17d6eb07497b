use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{MessageQueue, QueueError};
use crate::presentation::config::{QueueProviderSetting, QueueSettings};

use super::in_memory_queue::InMemoryQueue;
use super::pg_queue::PgMessageQueue;

pub struct MessageQueueFactory;

impl MessageQueueFactory {
    pub async fn create(settings: &QueueSettings) -> Result<Arc<dyn MessageQueue>, QueueError> {
        let visibility_timeout = Duration::from_secs(settings.visibility_timeout_secs);
        let dedup_window = Duration::from_secs(settings.deduplication_window_secs);

        match settings.provider {
            QueueProviderSetting::Memory => {
                tracing::warn!("Using in-memory job queue: queued jobs do not survive a restart");
                Ok(Arc::new(InMemoryQueue::new(visibility_timeout, dedup_window)))
            }
            QueueProviderSetting::Postgres => {
                let url = settings.database_url.as_deref().ok_or_else(|| {
                    QueueError::ConnectionFailed("queue.database_url required".into())
                })?;
                let queue = PgMessageQueue::connect(
                    url,
                    settings.max_connections,
                    visibility_timeout,
                    dedup_window,
                )
                .await?;
                Ok(Arc::new(queue))
            }
        }
    }
}
