use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{MessageQueue, QueueError, SendStatus};
use crate::domain::{
    DeduplicationId, DeduplicationStrategy, JobRequest, OutgoingMessage, QueueMessage,
};

use super::job_envelope::encode_job;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueueReceipt {
    pub dedup_id: DeduplicationId,
    pub status: SendStatus,
}

/// Job-level view of the message queue. Every job shares one message group.
pub struct JobQueueClient {
    queue: Arc<dyn MessageQueue>,
    group_id: String,
    deduplication: DeduplicationStrategy,
}

impl JobQueueClient {
    pub fn new(
        queue: Arc<dyn MessageQueue>,
        group_id: impl Into<String>,
        deduplication: DeduplicationStrategy,
    ) -> Self {
        Self {
            queue,
            group_id: group_id.into(),
            deduplication,
        }
    }

    pub async fn enqueue(&self, job: &JobRequest) -> Result<EnqueueReceipt, QueueError> {
        let body = encode_job(job).map_err(|e| QueueError::Encoding(e.to_string()))?;
        let dedup_id = self.deduplication.derive(&job.request_id);
        let status = self
            .queue
            .send(OutgoingMessage {
                body,
                group_id: self.group_id.clone(),
                dedup_id: dedup_id.clone(),
            })
            .await?;
        Ok(EnqueueReceipt { dedup_id, status })
    }

    pub async fn receive(&self, wait: Duration) -> Result<Option<QueueMessage>, QueueError> {
        self.queue.receive(wait).await
    }

    pub async fn acknowledge(&self, message: &QueueMessage) -> Result<(), QueueError> {
        self.queue.acknowledge(&message.lease).await
    }

    pub async fn dead_letter(&self, message: &QueueMessage, reason: &str) -> Result<(), QueueError> {
        self.queue.dead_letter(message, reason).await
    }
}
