use std::borrow::Cow;
use std::sync::Arc;

use crate::application::ports::RemoteFetcher;
use crate::domain::{AudioSource, CacheKey, JobRequest};

use super::{ArtifactCache, ConversionInvoker, JobError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    pub audio: Vec<u8>,
    /// Key the artifact was resolved under, reusable as a pre-resolved key.
    pub cache_key: CacheKey,
}

/// Resolve, fetch input, convert. Shared by the synchronous handlers and the worker.
pub struct ConversionPipeline {
    cache: Arc<ArtifactCache>,
    invoker: Arc<ConversionInvoker>,
    fetcher: Arc<dyn RemoteFetcher>,
}

impl ConversionPipeline {
    pub fn new(
        cache: Arc<ArtifactCache>,
        invoker: Arc<ConversionInvoker>,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Self {
        Self {
            cache,
            invoker,
            fetcher,
        }
    }

    #[tracing::instrument(skip(self, job), fields(request_id = %job.request_id, pitch = job.pitch_shift))]
    pub async fn run(&self, job: &JobRequest) -> Result<ConversionOutput, JobError> {
        let artifact = self.cache.resolve(&job.model).await?;

        let audio: Cow<'_, [u8]> = match &job.audio {
            AudioSource::Remote(url) => {
                let bytes = self.fetcher.fetch_bytes(url).await.map_err(JobError::Fetch)?;
                tracing::debug!(input_url = %url, bytes = bytes.len(), "Input audio downloaded");
                Cow::Owned(bytes)
            }
            AudioSource::Inline(bytes) => Cow::Borrowed(bytes.as_slice()),
        };

        let converted = self
            .invoker
            .convert(&artifact, &audio, job.pitch_shift)
            .await?;

        Ok(ConversionOutput {
            audio: converted,
            cache_key: artifact.cache_key,
        })
    }
}
