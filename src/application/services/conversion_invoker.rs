use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::ports::{
    ConversionEngine, ConversionError, ConversionRequest, ScratchStore,
};
use crate::domain::CachedArtifact;

pub const SPEAKER_ID: u32 = 0;
pub const F0_METHOD: &str = "crepe";

/// Adapter between in-memory audio and the file-based conversion engine.
pub struct ConversionInvoker {
    engine: Arc<dyn ConversionEngine>,
    scratch: Arc<dyn ScratchStore>,
    gate: Option<Mutex<()>>,
}

impl ConversionInvoker {
    /// With `serialize` set, at most one conversion runs at a time.
    pub fn new(
        engine: Arc<dyn ConversionEngine>,
        scratch: Arc<dyn ScratchStore>,
        serialize: bool,
    ) -> Self {
        Self {
            engine,
            scratch,
            gate: serialize.then(|| Mutex::new(())),
        }
    }

    #[tracing::instrument(skip(self, artifact, audio), fields(cache_key = %artifact.cache_key, input_bytes = audio.len()))]
    pub async fn convert(
        &self,
        artifact: &CachedArtifact,
        audio: &[u8],
        pitch_shift: i32,
    ) -> Result<Vec<u8>, ConversionError> {
        let input_path = self.scratch.write_input(audio).await?;
        let output_path = self.scratch.output_path();

        let request = ConversionRequest {
            weights_path: artifact.weights_path.clone(),
            index_path: artifact.index_path.clone(),
            input_path: input_path.clone(),
            output_path: output_path.clone(),
            pitch_shift,
            speaker_id: SPEAKER_ID,
            f0_method: F0_METHOD,
        };

        let converted = {
            let _permit = match &self.gate {
                Some(gate) => Some(gate.lock().await),
                None => None,
            };
            self.engine.convert(&request).await
        };

        let result = match converted {
            Ok(()) => self
                .scratch
                .read(&output_path)
                .await
                .map_err(|e| ConversionError::MissingOutput(e.to_string())),
            Err(e) => Err(e),
        };

        self.scratch.release(&input_path).await;
        self.scratch.release(&output_path).await;

        if let Ok(audio) = &result {
            tracing::info!(output_bytes = audio.len(), "Conversion completed");
        }
        result
    }
}
