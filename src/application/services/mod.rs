mod artifact_cache;
mod conversion_invoker;
mod conversion_pipeline;
pub mod job_envelope;
mod job_error;
mod job_producer;
mod job_queue_client;
mod job_worker;

pub use artifact_cache::{ArtifactCache, ArtifactCacheError};
pub use conversion_invoker::{ConversionInvoker, F0_METHOD, SPEAKER_ID};
pub use conversion_pipeline::{ConversionOutput, ConversionPipeline};
pub use job_envelope::JobEnvelope;
pub use job_error::JobError;
pub use job_producer::{JobProducer, JobReceipt};
pub use job_queue_client::{EnqueueReceipt, JobQueueClient};
pub use job_worker::{DeliveryState, JobWorker, MessageOutcome, WorkerConfig};
