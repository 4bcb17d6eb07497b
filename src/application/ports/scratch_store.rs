use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Per-request input and output audio files.
#[async_trait]
pub trait ScratchStore: Send + Sync {
    async fn write_input(&self, data: &[u8]) -> Result<PathBuf, ScratchError>;

    /// Reserves a fresh path for the engine to write its output to.
    fn output_path(&self) -> PathBuf;

    async fn read(&self, path: &Path) -> Result<Vec<u8>, ScratchError>;

    /// Signals the request no longer needs `path`.
    async fn release(&self, path: &Path);
}

#[derive(Debug, thiserror::Error)]
pub enum ScratchError {
    #[error("scratch file not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
