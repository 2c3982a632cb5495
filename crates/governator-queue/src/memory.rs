//! In-memory deploy queue.

use async_trait::async_trait;
use governator_core::{QueueStore, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    sets: HashMap<String, HashMap<String, i64>>,
    records: HashMap<String, HashMap<String, Vec<u8>>>,
}

/// Queue store held in process memory.
///
/// Cloning shares the same underlying data, so clones behave like separate
/// consumers of one store. All operations take a single lock, which keeps
/// `remove` atomic across them.
#[derive(Clone, Default)]
pub struct MemoryQueueStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `member` to `set` with `score`, replacing any previous score.
    pub async fn schedule(&self, set: &str, member: &str, score: i64) {
        let mut inner = self.inner.lock().await;
        inner
            .sets
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string(), score);
    }

    /// Set a field on a hash record.
    pub async fn set_field(&self, record: &str, field: &str, value: impl Into<Vec<u8>>) {
        let mut inner = self.inner.lock().await;
        inner
            .records
            .entry(record.to_string())
            .or_default()
            .insert(field.to_string(), value.into());
    }

    /// Members of `set` in ascending score order.
    pub async fn members(&self, set: &str) -> Vec<String> {
        let inner = self.inner.lock().await;
        let mut members: Vec<(i64, String)> = inner
            .sets
            .get(set)
            .map(|m| m.iter().map(|(k, v)| (*v, k.clone())).collect())
            .unwrap_or_default();
        members.sort();
        members.into_iter().map(|(_, m)| m).collect()
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn earliest_due(&self, set: &str, max_score: i64) -> Result<Option<String>> {
        let inner = self.inner.lock().await;
        Ok(inner.sets.get(set).and_then(|members| {
            members
                .iter()
                .filter(|(_, score)| **score <= max_score)
                .min_by(|(a_member, a_score), (b_member, b_score)| {
                    a_score.cmp(b_score).then_with(|| a_member.cmp(b_member))
                })
                .map(|(member, _)| member.clone())
        }))
    }

    async fn remove(&self, set: &str, member: &str) -> Result<u64> {
        let mut inner = self.inner.lock().await;
        let removed = inner
            .sets
            .get_mut(set)
            .and_then(|members| members.remove(member))
            .is_some();
        Ok(u64::from(removed))
    }

    async fn field_exists(&self, record: &str, field: &str) -> Result<bool> {
        let inner = self.inner.lock().await;
        Ok(inner
            .records
            .get(record)
            .is_some_and(|fields| fields.contains_key(field)))
    }

    async fn field(&self, record: &str, field: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .records
            .get(record)
            .and_then(|fields| fields.get(field))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_earliest_due_respects_score_and_now() {
        let store = MemoryQueueStore::new();
        store.schedule("q", "late", 300).await;
        store.schedule("q", "early", 100).await;
        store.schedule("q", "middle", 200).await;

        assert_eq!(store.earliest_due("q", 50).await.unwrap(), None);
        assert_eq!(
            store.earliest_due("q", 250).await.unwrap().as_deref(),
            Some("early")
        );
        assert_eq!(store.earliest_due("missing", 1000).await.unwrap(), None);
        assert_eq!(store.members("q").await, vec!["early", "middle", "late"]);
    }

    #[tokio::test]
    async fn test_ties_break_lexicographically() {
        let store = MemoryQueueStore::new();
        store.schedule("q", "b", 10).await;
        store.schedule("q", "a", 10).await;
        assert_eq!(store.earliest_due("q", 10).await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_remove_counts() {
        let store = MemoryQueueStore::new();
        store.schedule("q", "deploy", 1).await;
        assert_eq!(store.remove("q", "deploy").await.unwrap(), 1);
        assert_eq!(store.remove("q", "deploy").await.unwrap(), 0);
        assert_eq!(store.remove("other", "deploy").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_removal_succeeds_once() {
        let store = MemoryQueueStore::new();
        store.schedule("q", "deploy", 1).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.remove("q", "deploy").await.unwrap() })
            })
            .collect();

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_fields_distinguish_absent_and_empty() {
        let store = MemoryQueueStore::new();
        store.set_field("rec", "empty", Vec::new()).await;

        assert!(store.field_exists("rec", "empty").await.unwrap());
        assert!(!store.field_exists("rec", "missing").await.unwrap());
        assert_eq!(store.field("rec", "empty").await.unwrap(), Some(Vec::new()));
        assert_eq!(store.field("rec", "missing").await.unwrap(), None);
        assert_eq!(store.field("nope", "empty").await.unwrap(), None);
    }
}
