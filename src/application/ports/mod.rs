mod archive_extractor;
mod callback_notifier;
mod conversion_engine;
mod message_queue;
mod remote_fetcher;
mod scratch_store;

pub use archive_extractor::{ArchiveExtractor, ExtractError};
pub use callback_notifier::{CallbackNotifier, DeliveryError};
pub use conversion_engine::{ConversionEngine, ConversionError, ConversionRequest};
pub use message_queue::{MessageQueue, QueueError, SendStatus};
pub use remote_fetcher::{FetchError, RemoteFetcher};
pub use scratch_store::{ScratchError, ScratchStore};
