use async_trait::async_trait;

use crate::application::ports::{ConversionEngine, ConversionError, ConversionRequest};

/// Writes the input audio back out unchanged.
pub struct MockConversionEngine;

#[async_trait]
impl ConversionEngine for MockConversionEngine {
    async fn convert(&self, request: &ConversionRequest) -> Result<(), ConversionError> {
        tokio::fs::copy(&request.input_path, &request.output_path)
            .await
            .map_err(|e| ConversionError::EngineFailed(e.to_string()))?;
        Ok(())
    }
}
