//! Redis-backed deploy queue.

use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use governator_core::{Error, QueueStore, Result};
use tracing::{debug, warn};

/// Queue store over a shared Redis connection pool.
///
/// Cloning shares the pool. The store never closes it.
#[derive(Clone)]
pub struct RedisQueueStore {
    pool: Pool,
}

impl RedisQueueStore {
    /// Build a pool for `url` and check it answers a `PING`.
    pub async fn connect(url: &str, pool_size: usize) -> Result<Self> {
        let pool = Config::from_url(url)
            .builder()
            .map_err(store_err)?
            .max_size(pool_size)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(store_err)?;

        let mut conn = pool.get().await.map_err(store_err)?;
        deadpool_redis::redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map_err(store_err)?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn with_pool(pool: Pool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<Connection> {
        self.pool.get().await.map_err(store_err)
    }
}

fn store_err(e: impl std::fmt::Display) -> Error {
    Error::Store(e.to_string())
}

/// First member that is a valid id. Undecodable members can never be
/// claimed by id, so they are skipped rather than blocking the queue.
fn first_decodable(set: &str, members: Vec<Vec<u8>>) -> Option<String> {
    members.into_iter().find_map(|raw| match String::from_utf8(raw) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(set = %set, member = ?e.as_bytes(), "Skipping non-UTF-8 queue member");
            None
        }
    })
}

#[async_trait]
impl QueueStore for RedisQueueStore {
    async fn earliest_due(&self, set: &str, max_score: i64) -> Result<Option<String>> {
        let mut conn = self.conn().await?;
        let members: Vec<Vec<u8>> = conn
            .zrangebyscore(set, "-inf", max_score)
            .await
            .map_err(store_err)?;
        Ok(first_decodable(set, members))
    }

    async fn remove(&self, set: &str, member: &str) -> Result<u64> {
        debug!(set = %set, member = %member, "ZREM");
        let mut conn = self.conn().await?;
        conn.zrem(set, member).await.map_err(store_err)
    }

    async fn field_exists(&self, record: &str, field: &str) -> Result<bool> {
        let mut conn = self.conn().await?;
        conn.hexists(record, field).await.map_err(store_err)
    }

    async fn field(&self, record: &str, field: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn().await?;
        conn.hget(record, field).await.map_err(store_err)
    }
}
