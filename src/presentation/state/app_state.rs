use std::path::PathBuf;
use std::sync::Arc;

use crate::application::services::{ConversionPipeline, JobProducer};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ConversionPipeline>,
    pub producer: Arc<JobProducer>,
    pub diagnostic_fixture: PathBuf,
}
