pub mod archive;
pub mod callback;
pub mod conversion;
pub mod http;
pub mod observability;
pub mod queue;
pub mod storage;
