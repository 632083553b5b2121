//! In-memory tile store using moka.
//!
//! This store wraps `moka::future::Cache` to provide an async-safe,
//! lock-free key-value store. It is built without a capacity limit or TTL:
//! tiles are never evicted, only removed by [`TileStore::destroy_all`].
//!
//! Useful for tests and for sessions that do not need to survive a restart.

use moka::future::Cache as MokaCache;

use crate::cache::traits::{BoxFuture, StoreError, TileEntry, TileStore};

/// How a store reacts to a write for a key that already has an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevisionPolicy {
    /// Replace the previous entry (last write wins).
    #[default]
    Overwrite,
    /// Keep the existing entry and report [`StoreError::Conflict`].
    ///
    /// Mirrors attachment stores that reject writes with a stale revision.
    RejectExisting,
}

/// In-memory tile store backed by moka.
pub struct MemoryTileStore {
    cache: MokaCache<String, TileEntry>,
    policy: RevisionPolicy,
}

impl MemoryTileStore {
    /// Create an empty store that overwrites on repeated writes.
    pub fn new() -> Self {
        Self::with_policy(RevisionPolicy::Overwrite)
    }

    /// Create an empty store with the given revision policy.
    pub fn with_policy(policy: RevisionPolicy) -> Self {
        Self {
            cache: MokaCache::builder().build(),
            policy,
        }
    }

    /// The configured revision policy.
    pub fn policy(&self) -> RevisionPolicy {
        self.policy
    }
}

impl Default for MemoryTileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TileStore for MemoryTileStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<TileEntry>, StoreError>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.cache.get(&key).await) })
    }

    fn put(&self, key: &str, entry: TileEntry) -> BoxFuture<'_, Result<(), StoreError>> {
        let key = key.to_string();
        Box::pin(async move {
            match self.policy {
                RevisionPolicy::Overwrite => {
                    self.cache.insert(key, entry).await;
                    Ok(())
                }
                RevisionPolicy::RejectExisting => {
                    let inserted = self
                        .cache
                        .entry(key.clone())
                        .or_insert_with(async move { entry })
                        .await;
                    if inserted.is_fresh() {
                        Ok(())
                    } else {
                        Err(StoreError::Conflict { key })
                    }
                }
            }
        })
    }

    fn destroy_all(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            self.cache.invalidate_all();
            self.cache.run_pending_tasks().await;
            Ok(())
        })
    }

    fn entry_count(&self) -> BoxFuture<'_, Result<u64, StoreError>> {
        Box::pin(async move {
            // moka counts are eventually consistent
            self.cache.run_pending_tasks().await;
            Ok(self.cache.entry_count())
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_memory_store_put_and_get() {
        let store = MemoryTileStore::new();

        store.put("13,100,200", TileEntry::png(vec![1, 2, 3])).await.unwrap();

        let value = store.get("13,100,200").await.unwrap();
        assert_eq!(value, Some(TileEntry::png(vec![1, 2, 3])));
    }

    #[tokio::test]
    async fn test_memory_store_get_missing_is_absent() {
        let store = MemoryTileStore::new();
        assert!(store.get("0,0,0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_overwrite() {
        let store = MemoryTileStore::new();

        store.put("1,0,0", TileEntry::png(vec![1])).await.unwrap();
        store.put("1,0,0", TileEntry::png(vec![2, 2])).await.unwrap();

        let value = store.get("1,0,0").await.unwrap().unwrap();
        assert_eq!(value.data, vec![2, 2]);
        assert_eq!(store.entry_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_reject_existing() {
        let store = MemoryTileStore::with_policy(RevisionPolicy::RejectExisting);

        store.put("1,0,0", TileEntry::png(vec![1])).await.unwrap();
        let err = store.put("1,0,0", TileEntry::png(vec![2])).await.unwrap_err();

        assert!(err.is_conflict());
        let value = store.get("1,0,0").await.unwrap().unwrap();
        assert_eq!(value.data, vec![1], "First revision should be kept");
    }

    #[tokio::test]
    async fn test_memory_store_destroy_all() {
        let store = MemoryTileStore::new();
        for i in 0..4u32 {
            store
                .put(&format!("2,{},0", i), TileEntry::png(vec![i as u8]))
                .await
                .unwrap();
        }
        assert_eq!(store.entry_count().await.unwrap(), 4);

        store.destroy_all().await.unwrap();

        for i in 0..4u32 {
            assert!(store.get(&format!("2,{},0", i)).await.unwrap().is_none());
        }
        assert_eq!(store.entry_count().await.unwrap(), 0);

        // Store is usable again after a wipe
        store.put("2,0,0", TileEntry::png(vec![9])).await.unwrap();
        assert!(store.get("2,0,0").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_memory_store_concurrent_access() {
        let store = Arc::new(MemoryTileStore::new());
        let mut handles = Vec::new();

        for i in 0..50u32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let key = format!("10,{},{}", i, i);
                let entry = TileEntry::png(vec![i as u8; 100]);

                store.put(&key, entry.clone()).await.unwrap();
                assert_eq!(store.get(&key).await.unwrap(), Some(entry));
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.entry_count().await.unwrap(), 50);
    }
}
