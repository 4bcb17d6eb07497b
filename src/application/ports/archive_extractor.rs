use std::io;
use std::path::Path;

/// Unpacks a model archive. Called from a blocking thread.
pub trait ArchiveExtractor: Send + Sync {
    /// Extracts every entry of `archive` under `dest` and returns the number of files written.
    fn extract(&self, archive: &Path, dest: &Path) -> Result<usize, ExtractError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("corrupt archive: {0}")]
    Corrupt(String),
    #[error("archive entry escapes extraction directory: {0}")]
    UnsafeEntry(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
