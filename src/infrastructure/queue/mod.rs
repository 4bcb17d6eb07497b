mod in_memory_queue;
mod pg_queue;
mod queue_factory;

pub use in_memory_queue::{DeadLetter, InMemoryQueue};
pub use pg_queue::PgMessageQueue;
pub use queue_factory::MessageQueueFactory;
