use std::sync::Arc;

use crate::application::ports::{QueueError, SendStatus};
use crate::domain::{DeduplicationId, JobRequest, RequestId};

use super::JobQueueClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReceipt {
    pub request_id: RequestId,
    pub dedup_id: DeduplicationId,
    pub duplicate: bool,
}

/// Enqueues asynchronous jobs. Does not wait for, or learn, their outcome.
pub struct JobProducer {
    queue: Arc<JobQueueClient>,
}

impl JobProducer {
    pub fn new(queue: Arc<JobQueueClient>) -> Self {
        Self { queue }
    }

    #[tracing::instrument(skip(self, job), fields(request_id = %job.request_id))]
    pub async fn submit(&self, job: JobRequest) -> Result<JobReceipt, QueueError> {
        let receipt = self.queue.enqueue(&job).await?;
        let duplicate = receipt.status == SendStatus::Duplicate;

        if duplicate {
            tracing::info!(dedup_id = %receipt.dedup_id, "Duplicate job submission suppressed by queue");
        } else {
            tracing::info!(dedup_id = %receipt.dedup_id, "Conversion job enqueued");
        }

        Ok(JobReceipt {
            request_id: job.request_id,
            dedup_id: receipt.dedup_id,
            duplicate,
        })
    }
}
