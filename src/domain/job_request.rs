use super::{AudioSource, ModelRef, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub request_id: RequestId,
    pub model: ModelRef,
    pub audio: AudioSource,
    /// Absent for synchronous requests.
    pub callback_url: Option<String>,
    /// Semitone offset applied by the conversion engine.
    pub pitch_shift: i32,
}
