use std::io;
use std::path::Path;

use async_trait::async_trait;

/// Blocking-transfer download primitive for model archives and input audio.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Streams `url` into `dest`, returning the number of bytes written.
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("artifact {0} is not cached and no model url was supplied")]
    NotCached(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
