mod command_engine;
mod engine_factory;
mod mock_engine;

pub use command_engine::CommandConversionEngine;
pub use engine_factory::{ConversionEngineFactory, ConversionProvider};
pub use mock_engine::MockConversionEngine;
