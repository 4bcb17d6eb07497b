use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::Instrument;

use crate::application::ports::CallbackNotifier;
use crate::domain::{JobOutcome, JobRequest, JobResult, QueueMessage, RequestId, ResultStatus};

use super::job_envelope::{decode_job, salvage_callback};
use super::{ConversionPipeline, JobError, JobQueueClient};

const EXCEEDED_ATTEMPTS: &str = "exceeded maximum delivery attempts";

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Long-poll duration of each receive.
    pub wait_time: Duration,
    /// Messages received more often than this are dead-lettered without processing.
    pub max_receive_count: u32,
    pub job_timeout: Option<Duration>,
    /// Pause after a failed receive before polling again.
    pub idle_backoff: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            wait_time: Duration::from_secs(20),
            max_receive_count: 3,
            job_timeout: None,
            idle_backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryState {
    Delivered,
    Failed(String),
    NotAttempted,
}

/// What happened to one received message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageOutcome {
    pub request_id: Option<RequestId>,
    pub status: Option<ResultStatus>,
    pub delivery: DeliveryState,
    pub dead_lettered: bool,
    pub acknowledged: bool,
}

/// Consumer side of the asynchronous path.
///
/// Each received message moves through PROCESSING, DELIVERING and ACKNOWLEDGING.
/// Acknowledgment happens whatever the job or the delivery outcome was; a message is
/// only seen again if the process dies before acknowledging it.
pub struct JobWorker {
    queue: Arc<JobQueueClient>,
    pipeline: Arc<ConversionPipeline>,
    notifier: Arc<dyn CallbackNotifier>,
    config: WorkerConfig,
}

impl JobWorker {
    pub fn new(
        queue: Arc<JobQueueClient>,
        pipeline: Arc<ConversionPipeline>,
        notifier: Arc<dyn CallbackNotifier>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            queue,
            pipeline,
            notifier,
            config,
        }
    }

    /// Runs until `shutdown` turns true or its sender is dropped. A job already in
    /// progress completes, including delivery and acknowledgment, before returning.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Job worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            tracing::trace!(state = "RECEIVING", "Polling job queue");
            let received = tokio::select! {
                _ = shutdown.changed() => break,
                received = self.queue.receive(self.config.wait_time) => received,
            };

            match received {
                Ok(Some(message)) => {
                    let outcome = self.process_message(message).await;
                    tracing::debug!(?outcome, "Message handled");
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Failed to receive from job queue");
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = tokio::time::sleep(self.config.idle_backoff) => {}
                    }
                }
            }
        }
        tracing::info!("Job worker stopped");
    }

    pub async fn process_message(&self, message: QueueMessage) -> MessageOutcome {
        let span = tracing::info_span!(
            "conversion_job",
            dedup_id = %message.dedup_id,
            receive_count = message.receive_count,
            request_id = tracing::field::Empty,
        );
        self.handle(message).instrument(span).await
    }

    async fn handle(&self, message: QueueMessage) -> MessageOutcome {
        let mut outcome = match decode_job(&message.body) {
            Ok(job) => {
                tracing::Span::current().record("request_id", job.request_id.as_str());
                if message.receive_count > self.config.max_receive_count {
                    tracing::warn!(
                        max_receive_count = self.config.max_receive_count,
                        "Message redelivered too often, dead-lettering"
                    );
                    let result = JobResult::failure(job.request_id.clone(), EXCEEDED_ATTEMPTS);
                    let delivery = self.deliver(job.callback_url.as_deref(), &result).await;
                    let dead_lettered = self.dead_letter(&message, EXCEEDED_ATTEMPTS).await;
                    MessageOutcome {
                        request_id: Some(job.request_id),
                        status: Some(ResultStatus::Failed),
                        delivery,
                        dead_lettered,
                        acknowledged: false,
                    }
                } else {
                    self.execute(&message, job).await
                }
            }
            Err(e) => self.reject_malformed(&message, e).await,
        };

        tracing::debug!(state = "ACKNOWLEDGING", "Acknowledging message");
        match self.queue.acknowledge(&message).await {
            Ok(()) => outcome.acknowledged = true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to acknowledge message, it will be redelivered");
            }
        }
        outcome
    }

    async fn execute(&self, message: &QueueMessage, job: JobRequest) -> MessageOutcome {
        let request_id = job.request_id.clone();
        let callback_url = job.callback_url.clone();

        tracing::debug!(state = "PROCESSING", "Running conversion pipeline");
        let result = match self.run_pipeline(job).await {
            Ok(audio) => JobResult::success(request_id.clone(), audio),
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Conversion job failed");
                JobResult::failure(request_id.clone(), e.to_string())
            }
        };
        let status = result.status();

        let delivery = self.deliver(callback_url.as_deref(), &result).await;

        let dead_lettered = match &result.outcome {
            JobOutcome::Failure { detail } => self.dead_letter(message, detail).await,
            JobOutcome::Success { .. } => false,
        };

        tracing::info!(status = %status, "Conversion job finished");
        MessageOutcome {
            request_id: Some(request_id),
            status: Some(status),
            delivery,
            dead_lettered,
            acknowledged: false,
        }
    }

    /// Runs the pipeline on its own task so a panic fails only this job.
    async fn run_pipeline(&self, job: JobRequest) -> Result<Vec<u8>, JobError> {
        let pipeline = Arc::clone(&self.pipeline);
        let budget = self.config.job_timeout;

        let task = tokio::spawn(async move {
            match budget {
                Some(limit) => tokio::time::timeout(limit, pipeline.run(&job))
                    .await
                    .unwrap_or_else(|_| Err(JobError::TimedOut(limit))),
                None => pipeline.run(&job).await,
            }
        });

        match task.await {
            Ok(result) => result.map(|output| output.audio),
            Err(e) => Err(JobError::Aborted(e.to_string())),
        }
    }

    async fn reject_malformed(&self, message: &QueueMessage, error: JobError) -> MessageOutcome {
        tracing::warn!(error = %error, "Malformed job message");

        let (request_id, delivery) = match salvage_callback(&message.body) {
            Some((request_id, callback_url)) => {
                let result = JobResult::failure(request_id.clone(), error.to_string());
                let delivery = self.deliver(Some(callback_url.as_str()), &result).await;
                (Some(request_id), delivery)
            }
            None => (None, DeliveryState::NotAttempted),
        };

        let dead_lettered = self.dead_letter(message, &error.to_string()).await;

        MessageOutcome {
            request_id,
            status: Some(ResultStatus::Failed),
            delivery,
            dead_lettered,
            acknowledged: false,
        }
    }

    async fn deliver(&self, callback_url: Option<&str>, result: &JobResult) -> DeliveryState {
        let Some(url) = callback_url else {
            tracing::warn!("Job has no callback url, result dropped");
            return DeliveryState::NotAttempted;
        };

        tracing::debug!(state = "DELIVERING", callback_url = %url, status = %result.status(), "Delivering result");
        match self.notifier.deliver(url, result).await {
            Ok(()) => DeliveryState::Delivered,
            Err(e) => {
                tracing::warn!(error = %e, "Callback delivery failed");
                DeliveryState::Failed(e.to_string())
            }
        }
    }

    async fn dead_letter(&self, message: &QueueMessage, reason: &str) -> bool {
        match self.queue.dead_letter(message, reason).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to dead-letter message");
                false
            }
        }
    }
}
