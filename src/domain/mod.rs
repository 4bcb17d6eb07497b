mod artifact_locator;
mod audio_source;
mod cache_key;
mod cached_artifact;
mod deduplication_id;
mod job_request;
mod job_result;
mod model_ref;
mod queue_message;
mod request_id;

pub use artifact_locator::ArtifactLocator;
pub use audio_source::AudioSource;
pub use cache_key::{CacheKey, InvalidCacheKey};
pub use cached_artifact::{CachedArtifact, INDEX_EXTENSION, WEIGHTS_EXTENSION};
pub use deduplication_id::{DeduplicationId, DeduplicationStrategy};
pub use job_request::JobRequest;
pub use job_result::{JobOutcome, JobResult, ResultStatus};
pub use model_ref::ModelRef;
pub use queue_message::{LeaseHandle, OutgoingMessage, QueueMessage};
pub use request_id::RequestId;
