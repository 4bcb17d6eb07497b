use std::path::PathBuf;

use async_trait::async_trait;

use super::ScratchError;

/// Everything the external engine needs for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub weights_path: PathBuf,
    pub index_path: PathBuf,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub pitch_shift: i32,
    pub speaker_id: u32,
    pub f0_method: &'static str,
}

/// The voice-conversion engine. Reads `input_path` and writes `output_path`.
#[async_trait]
pub trait ConversionEngine: Send + Sync {
    async fn convert(&self, request: &ConversionRequest) -> Result<(), ConversionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("{0}")]
    EngineFailed(String),
    #[error("engine produced no output: {0}")]
    MissingOutput(String),
    #[error("scratch storage: {0}")]
    Scratch(#[from] ScratchError),
}
