//! Tile cache client.
//!
//! This client wraps a `TileStore` with:
//! - Key translation: `TileCoord` → `"{zoom},{x},{y}"`
//! - Fail-open reads: store errors are logged and reported as a miss
//! - Non-fatal write conflicts
//! - Hit/miss/write counters
//!
//! It is the only component that talks to the store directly.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::stats::{CacheStats, CacheStatsSnapshot};
use crate::cache::traits::{StoreError, TileEntry, TileStore};
use crate::coord::TileCoord;

/// Result of a successful-or-tolerated tile write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The tile was written.
    Stored,
    /// The store kept an existing revision; the new bytes were dropped.
    Conflict,
}

/// Cache client for tile storage.
#[derive(Clone)]
pub struct TileCacheClient {
    /// The underlying store.
    store: Arc<dyn TileStore>,

    /// Access counters.
    stats: Arc<CacheStats>,
}

impl TileCacheClient {
    /// Create a new tile cache client over `store`.
    pub fn new(store: Arc<dyn TileStore>) -> Self {
        Self {
            store,
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// Get a tile from the cache.
    ///
    /// Store failures are logged and treated as absent so that a broken
    /// cache never blocks tile display.
    pub async fn get(&self, tile: &TileCoord) -> Option<TileEntry> {
        let key = tile.to_key();
        match self.store.get(&key).await {
            Ok(Some(entry)) => {
                self.stats.record_hit();
                debug!(key = %key, bytes = entry.len(), "Tile cache hit");
                Some(entry)
            }
            Ok(None) => {
                self.stats.record_miss();
                debug!(key = %key, "Tile cache miss");
                None
            }
            Err(e) => {
                self.stats.record_read_error();
                warn!(error = %e, key = %key, "Tile cache get failed");
                None
            }
        }
    }

    /// Store a tile in the cache.
    ///
    /// A revision conflict is not an error: the tile keeps its earlier
    /// bytes and [`WriteOutcome::Conflict`] is returned. Other failures are
    /// returned for the caller to observe or drop.
    pub async fn put(&self, tile: &TileCoord, entry: TileEntry) -> Result<WriteOutcome, StoreError> {
        let key = tile.to_key();
        if !tile.is_valid() {
            self.stats.record_write_failure();
            return Err(StoreError::InvalidKey(key));
        }

        match self.store.put(&key, entry).await {
            Ok(()) => {
                self.stats.record_write();
                Ok(WriteOutcome::Stored)
            }
            Err(e) if e.is_conflict() => {
                self.stats.record_write_conflict();
                debug!(key = %key, "Tile cache write conflict ignored");
                Ok(WriteOutcome::Conflict)
            }
            Err(e) => {
                self.stats.record_write_failure();
                debug!(error = %e, key = %key, "Tile cache put failed");
                Err(e)
            }
        }
    }

    /// Wipe every cached tile.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.destroy_all().await.inspect_err(|e| {
            warn!(error = %e, store = self.store.name(), "Tile cache clear failed");
        })
    }

    /// Number of cached tiles.
    pub async fn entry_count(&self) -> Result<u64, StoreError> {
        self.store.entry_count().await
    }

    /// Snapshot of the access counters.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Backend name of the underlying store.
    pub fn store_name(&self) -> &str {
        self.store.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::providers::{MemoryTileStore, RevisionPolicy};
    use crate::cache::traits::BoxFuture;

    /// Store whose every operation fails.
    struct FailingStore;

    impl TileStore for FailingStore {
        fn get(&self, _key: &str) -> BoxFuture<'_, Result<Option<TileEntry>, StoreError>> {
            Box::pin(async { Err(StoreError::Encoding("broken".to_string())) })
        }

        fn put(&self, _key: &str, _entry: TileEntry) -> BoxFuture<'_, Result<(), StoreError>> {
            Box::pin(async { Err(StoreError::Encoding("broken".to_string())) })
        }

        fn destroy_all(&self) -> BoxFuture<'_, Result<(), StoreError>> {
            Box::pin(async { Err(StoreError::Encoding("broken".to_string())) })
        }

        fn entry_count(&self) -> BoxFuture<'_, Result<u64, StoreError>> {
            Box::pin(async { Ok(0) })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn memory_client() -> TileCacheClient {
        TileCacheClient::new(Arc::new(MemoryTileStore::new()))
    }

    #[tokio::test]
    async fn test_tile_client_set_and_get() {
        let client = memory_client();
        let tile = TileCoord::new(13, 100, 200);

        let outcome = client.put(&tile, TileEntry::png(vec![1, 2, 3])).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Stored);

        let entry = client.get(&tile).await.unwrap();
        assert_eq!(entry.data, vec![1, 2, 3]);

        let stats = client.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.writes, 1);
    }

    #[tokio::test]
    async fn test_tile_client_uses_canonical_key() {
        let store = Arc::new(MemoryTileStore::new());
        let client = TileCacheClient::new(store.clone());

        client
            .put(&TileCoord::new(13, 100, 200), TileEntry::png(vec![1]))
            .await
            .unwrap();

        assert!(store.get("13,100,200").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_tile_client_get_missing() {
        let client = memory_client();
        assert!(client.get(&TileCoord::new(15, 999, 999)).await.is_none());
        assert_eq!(client.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_tile_client_read_error_is_miss() {
        let client = TileCacheClient::new(Arc::new(FailingStore));

        assert!(client.get(&TileCoord::new(1, 0, 0)).await.is_none());

        let stats = client.stats();
        assert_eq!(stats.read_errors, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_tile_client_write_error_is_returned() {
        let client = TileCacheClient::new(Arc::new(FailingStore));

        let result = client.put(&TileCoord::new(1, 0, 0), TileEntry::png(vec![1])).await;
        assert!(matches!(result, Err(StoreError::Encoding(_))));
        assert_eq!(client.stats().write_failures, 1);
    }

    #[tokio::test]
    async fn test_tile_client_conflict_is_non_fatal() {
        let client = TileCacheClient::new(Arc::new(MemoryTileStore::with_policy(
            RevisionPolicy::RejectExisting,
        )));
        let tile = TileCoord::new(2, 1, 1);

        assert_eq!(
            client.put(&tile, TileEntry::png(vec![1])).await.unwrap(),
            WriteOutcome::Stored
        );
        assert_eq!(
            client.put(&tile, TileEntry::png(vec![2])).await.unwrap(),
            WriteOutcome::Conflict
        );
        assert_eq!(client.get(&tile).await.unwrap().data, vec![1]);
        assert_eq!(client.stats().write_conflicts, 1);
    }

    #[tokio::test]
    async fn test_tile_client_rejects_invalid_coordinate() {
        let client = memory_client();

        let result = client.put(&TileCoord::new(1, 2, 0), TileEntry::png(vec![1])).await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));
        assert_eq!(client.entry_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_tile_client_clear() {
        let client = memory_client();
        let tile = TileCoord::new(13, 100, 200);

        client.put(&tile, TileEntry::png(vec![1])).await.unwrap();
        client.clear().await.unwrap();

        assert!(client.get(&tile).await.is_none());
        assert_eq!(client.entry_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_tile_client_clear_failure_is_reported() {
        let client = TileCacheClient::new(Arc::new(FailingStore));
        assert!(client.clear().await.is_err());
    }
}
