//! Per-tile cache resolution.
//!
//! [`TileResolver`] decides, for one requested tile, whether it can be
//! served from the store or has to come from the network:
//!
//! ```text
//! resolve(tile)
//!   ├─ store hit  → Resolution::Cached(CachedTile)   scoped display resource
//!   └─ store miss → Resolution::Remote(PendingFetch) lazy fetch + background put
//! ```
//!
//! Every miss issues exactly one request when activated and at most one
//! store write. Concurrent misses for the same tile are not coalesced.

mod resource;
mod source;

pub use resource::{CachedTile, ReleaseCounts, ReleaseReason, ResourceRegistry};
pub use source::{CachingTileSource, TileCallback, TileError, TileImage, TileOrigin, TileSource};

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::cache::{StoreError, TileCacheClient, TileEntry, WriteOutcome};
use crate::coord::TileCoord;
use crate::provider::{NetworkError, TileFetcher, TileUrlTemplate};

/// Outcome of a background store write started by a [`PendingFetch`].
#[derive(Debug)]
pub struct CacheWriteEvent {
    pub tile: TileCoord,
    pub result: Result<WriteOutcome, StoreError>,
}

/// How a tile request will be satisfied.
#[derive(Debug)]
pub enum Resolution {
    /// The store holds the tile.
    Cached(CachedTile),
    /// The tile must be downloaded.
    Remote(PendingFetch),
}

impl Resolution {
    pub fn is_cached(&self) -> bool {
        matches!(self, Resolution::Cached(_))
    }

    pub fn tile(&self) -> TileCoord {
        match self {
            Resolution::Cached(cached) => cached.tile(),
            Resolution::Remote(pending) => pending.tile,
        }
    }
}

/// Decides cache hit versus network fetch for individual tiles.
#[derive(Clone)]
pub struct TileResolver {
    cache: TileCacheClient,
    fetcher: Arc<dyn TileFetcher>,
    urls: TileUrlTemplate,
    registry: Arc<ResourceRegistry>,
    events: Option<mpsc::UnboundedSender<CacheWriteEvent>>,
}

impl TileResolver {
    pub fn new(cache: TileCacheClient, fetcher: Arc<dyn TileFetcher>, urls: TileUrlTemplate) -> Self {
        Self {
            cache,
            fetcher,
            urls,
            registry: Arc::new(ResourceRegistry::new()),
            events: None,
        }
    }

    /// Publishes the outcome of every background write on `events`.
    ///
    /// Without an observer write outcomes are logged and dropped.
    pub fn with_write_observer(mut self, events: mpsc::UnboundedSender<CacheWriteEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Looks `tile` up in the store.
    ///
    /// Store failures count as a miss.
    pub async fn resolve(&self, tile: TileCoord) -> Resolution {
        match self.cache.get(&tile).await {
            Some(entry) => {
                trace!(tile = %tile, "Resolved from cache");
                Resolution::Cached(self.registry.acquire(tile, entry))
            }
            None => Resolution::Remote(PendingFetch {
                tile,
                url: self.urls.url_for(&tile),
                cache: self.cache.clone(),
                fetcher: Arc::clone(&self.fetcher),
                events: self.events.clone(),
            }),
        }
    }

    /// Registry tracking the cached tiles handed out for display.
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &TileCacheClient {
        &self.cache
    }

    pub fn urls(&self) -> &TileUrlTemplate {
        &self.urls
    }
}

/// A cache miss waiting to be downloaded.
///
/// Nothing happens until [`PendingFetch::activate`] is called.
pub struct PendingFetch {
    tile: TileCoord,
    url: String,
    cache: TileCacheClient,
    fetcher: Arc<dyn TileFetcher>,
    events: Option<mpsc::UnboundedSender<CacheWriteEvent>>,
}

impl std::fmt::Debug for PendingFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFetch")
            .field("tile", &self.tile)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl PendingFetch {
    pub fn tile(&self) -> TileCoord {
        self.tile
    }

    /// URL the tile will be requested from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Downloads the tile and returns its bytes.
    ///
    /// On success the bytes are also written to the store by a spawned
    /// task; the caller does not wait for it. Must be called inside a
    /// Tokio runtime.
    pub async fn activate(self) -> Result<Vec<u8>, NetworkError> {
        let data = self.fetcher.fetch(&self.url).await?;
        debug!(tile = %self.tile, bytes = data.len(), "Fetched tile from network");

        let tile = self.tile;
        let cache = self.cache;
        let events = self.events;
        let entry = TileEntry::png(data.clone());
        tokio::spawn(async move {
            let result = cache.put(&tile, entry).await;
            if let Err(e) = &result {
                debug!(tile = %tile, error = %e, "Background tile write failed");
            }
            if let Some(events) = events {
                // Observer may have gone away
                let _ = events.send(CacheWriteEvent { tile, result });
            }
        });

        Ok(data)
    }
}
