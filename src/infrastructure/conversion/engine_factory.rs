use std::sync::Arc;

use crate::application::ports::{ConversionEngine, ConversionError};

use super::command_engine::CommandConversionEngine;
use super::mock_engine::MockConversionEngine;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConversionProvider {
    Command,
    Mock,
}

pub struct ConversionEngineFactory;

impl ConversionEngineFactory {
    pub fn create(
        provider: ConversionProvider,
        program: Option<&str>,
        args: &[String],
    ) -> Result<Arc<dyn ConversionEngine>, ConversionError> {
        match provider {
            ConversionProvider::Command => {
                let program = program.filter(|p| !p.is_empty()).ok_or_else(|| {
                    ConversionError::EngineFailed(
                        "conversion.command is required for the command provider".to_string(),
                    )
                })?;
                Ok(Arc::new(CommandConversionEngine::new(program, args.to_vec())))
            }
            ConversionProvider::Mock => Ok(Arc::new(MockConversionEngine)),
        }
    }
}
