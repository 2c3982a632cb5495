//! Work queue layout and the store trait.
//!
//! The producer owns the layout: one sorted set of due deploys per queue,
//! scored by Unix timestamp, plus a hash record per deploy id.

use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Hash field holding the JSON deploy request.
pub const METADATA_FIELD: &str = "request:metadata";

/// Hash field whose mere presence cancels a deploy.
pub const CANCELLATION_FIELD: &str = "cancellation";

/// Namespace prefix shared by every key of one queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct QueueName(String);

impl QueueName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}:{}", self.0, suffix)
    }

    /// Sorted set of pending deploy ids.
    pub fn deploys_key(&self) -> String {
        self.key("governator:deploys")
    }

    /// Hash record holding a deploy's side state.
    pub fn record_key(&self, deploy_id: &str) -> String {
        self.key(deploy_id)
    }
}

impl From<&str> for QueueName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for QueueName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Ordered-set and hash-record access needed by the deployer.
///
/// Implementations must make `remove` atomic across every consumer of the
/// store: for a given member exactly one caller may observe a non-zero count.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Lowest-scored member of `set` whose score is at most `max_score`.
    async fn earliest_due(&self, set: &str, max_score: i64) -> Result<Option<String>>;

    /// Remove `member` from `set`, returning how many members were removed.
    async fn remove(&self, set: &str, member: &str) -> Result<u64>;

    /// Whether `field` is present in the hash `record`.
    async fn field_exists(&self, record: &str, field: &str) -> Result<bool>;

    /// Raw value of `field` in the hash `record`. `None` when absent.
    async fn field(&self, record: &str, field: &str) -> Result<Option<Vec<u8>>>;
}
