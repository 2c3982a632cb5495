//! Deploy queue stores for governator.
//!
//! Provides `QueueStore` implementations:
//! - Redis / Valkey (production)
//! - In-memory (tests and local dry runs)

pub mod memory;
pub mod redis;

pub use governator_core::queue::{CANCELLATION_FIELD, METADATA_FIELD, QueueName, QueueStore};
pub use memory::MemoryQueueStore;
pub use redis::RedisQueueStore;
