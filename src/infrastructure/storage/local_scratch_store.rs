use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::ports::{ScratchError, ScratchStore};

const AUDIO_EXTENSION: &str = "wav";

/// Keeps per-request audio under `inputs/` and `outputs/`. Files are deleted on
/// release unless `retain` is set.
pub struct LocalScratchStore {
    inputs_dir: PathBuf,
    outputs_dir: PathBuf,
    retain: bool,
}

impl LocalScratchStore {
    pub fn new(root: &Path, retain: bool) -> Result<Self, ScratchError> {
        let inputs_dir = root.join("inputs");
        let outputs_dir = root.join("outputs");
        std::fs::create_dir_all(&inputs_dir)?;
        std::fs::create_dir_all(&outputs_dir)?;
        Ok(Self {
            inputs_dir,
            outputs_dir,
            retain,
        })
    }

    fn fresh_name() -> String {
        format!("{}.{AUDIO_EXTENSION}", Uuid::new_v4())
    }
}

#[async_trait]
impl ScratchStore for LocalScratchStore {
    async fn write_input(&self, data: &[u8]) -> Result<PathBuf, ScratchError> {
        let path = self.inputs_dir.join(Self::fresh_name());
        tokio::fs::write(&path, data).await?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "Input audio staged");
        Ok(path)
    }

    fn output_path(&self) -> PathBuf {
        self.outputs_dir.join(Self::fresh_name())
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>, ScratchError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ScratchError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn release(&self, path: &Path) {
        if self.retain {
            return;
        }
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(error = %e, path = %path.display(), "Failed to delete scratch file");
            }
        }
    }
}
