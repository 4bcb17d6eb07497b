mod diagnostic;
mod error;
mod health;
mod inference;
mod inference_async;

pub use diagnostic::test_inference_handler;
pub use error::{ApiError, ErrorResponse};
pub use health::{PingResponse, ping_handler};
pub use inference::{
    InferenceResponse, LegacyInferenceRequest, SyncInferenceRequest, legacy_inference_handler,
    sync_inference_handler,
};
pub use inference_async::{AsyncInferenceRequest, AsyncInferenceResponse, async_inference_handler};
