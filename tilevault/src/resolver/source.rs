//! Tile source capability for renderers.
//!
//! A renderer asks a [`TileSource`] for tiles by coordinate and receives
//! displayable bytes. [`CachingTileSource`] answers from the local store
//! when it can and downloads otherwise.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::{Resolution, TileResolver};
use crate::cache::{BoxFuture, DEFAULT_CONTENT_TYPE};
use crate::coord::TileCoord;
use crate::provider::NetworkError;

/// Where a tile's bytes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOrigin {
    Cache,
    Network,
}

/// A tile ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileImage {
    pub tile: TileCoord,
    pub data: Vec<u8>,
    pub content_type: String,
    pub origin: TileOrigin,
}

/// Why a tile could not be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// Download failed.
    #[error("Tile {tile} download failed: {source}")]
    Network {
        tile: TileCoord,
        #[source]
        source: NetworkError,
    },

    /// The cached attachment holds no image data.
    #[error("Cached tile {0} is empty")]
    EmptyCachedTile(TileCoord),
}

/// Continuation invoked once with the outcome of [`TileSource::load_tile`].
pub type TileCallback = Box<dyn FnOnce(Result<TileImage, TileError>) + Send>;

/// Something that can produce tile images by coordinate.
pub trait TileSource: Send + Sync {
    /// Produces the image for `tile`.
    fn create_tile(&self, tile: TileCoord) -> BoxFuture<'_, Result<TileImage, TileError>>;

    /// Produces the image for `tile` and hands the outcome to `done`.
    ///
    /// `done` runs exactly once, with either the image or the error.
    fn load_tile(&self, tile: TileCoord, done: TileCallback) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let result = self.create_tile(tile).await;
            done(result);
        })
    }
}

/// Tile source backed by the offline cache.
#[derive(Clone)]
pub struct CachingTileSource {
    resolver: Arc<TileResolver>,
}

impl CachingTileSource {
    pub fn new(resolver: Arc<TileResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &TileResolver {
        &self.resolver
    }
}

impl TileSource for CachingTileSource {
    fn create_tile(&self, tile: TileCoord) -> BoxFuture<'_, Result<TileImage, TileError>> {
        Box::pin(async move {
            match self.resolver.resolve(tile).await {
                Resolution::Cached(cached) => {
                    if cached.entry().is_empty() {
                        cached.on_error();
                        return Err(TileError::EmptyCachedTile(tile));
                    }
                    let entry = cached.on_load();
                    Ok(TileImage {
                        tile,
                        data: entry.data,
                        content_type: entry.content_type,
                        origin: TileOrigin::Cache,
                    })
                }
                Resolution::Remote(pending) => match pending.activate().await {
                    Ok(data) => Ok(TileImage {
                        tile,
                        data,
                        content_type: DEFAULT_CONTENT_TYPE.to_string(),
                        origin: TileOrigin::Network,
                    }),
                    Err(source) => {
                        debug!(tile = %tile, error = %source, "Tile failed to load");
                        Err(TileError::Network { tile, source })
                    }
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryTileStore, TileCacheClient, TileEntry, TileStore};
    use crate::provider::{MockFetcher, TileUrlTemplate};
    use tokio::sync::oneshot;

    fn source(store: Arc<MemoryTileStore>, fetcher: MockFetcher) -> CachingTileSource {
        let resolver = TileResolver::new(
            TileCacheClient::new(store),
            Arc::new(fetcher),
            TileUrlTemplate::default(),
        );
        CachingTileSource::new(Arc::new(resolver))
    }

    #[tokio::test]
    async fn test_create_tile_from_cache() {
        let store = Arc::new(MemoryTileStore::new());
        store
            .put("3,1,2", TileEntry::new(vec![1, 2], "image/jpeg"))
            .await
            .unwrap();
        let source = source(store, MockFetcher::ok(vec![9]));

        let image = source.create_tile(TileCoord::new(3, 1, 2)).await.unwrap();

        assert_eq!(image.origin, TileOrigin::Cache);
        assert_eq!(image.data, vec![1, 2]);
        assert_eq!(image.content_type, "image/jpeg");
        assert_eq!(source.resolver().registry().release_counts().loaded, 1);
    }

    #[tokio::test]
    async fn test_create_tile_from_network() {
        let source = source(Arc::new(MemoryTileStore::new()), MockFetcher::ok(vec![9]));

        let image = source.create_tile(TileCoord::new(3, 1, 2)).await.unwrap();

        assert_eq!(image.origin, TileOrigin::Network);
        assert_eq!(image.data, vec![9]);
        assert_eq!(image.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_empty_cached_tile_releases_as_error() {
        let store = Arc::new(MemoryTileStore::new());
        store.put("1,0,0", TileEntry::png(Vec::new())).await.unwrap();
        let source = source(store, MockFetcher::ok(vec![9]));

        let err = source.create_tile(TileCoord::new(1, 0, 0)).await.unwrap_err();

        assert_eq!(err, TileError::EmptyCachedTile(TileCoord::new(1, 0, 0)));
        assert_eq!(source.resolver().registry().release_counts().errored, 1);
        assert_eq!(source.resolver().registry().live_count(), 0);
    }

    #[tokio::test]
    async fn test_load_tile_invokes_callback_with_error() {
        let source = source(
            Arc::new(MemoryTileStore::new()),
            MockFetcher::failing(NetworkError::Status {
                status: 404,
                url: "http://a.tile.osm.org/2/1/1.png".to_string(),
            }),
        );
        let (tx, rx) = oneshot::channel();

        source
            .load_tile(
                TileCoord::new(2, 1, 1),
                Box::new(move |result| {
                    let _ = tx.send(result);
                }),
            )
            .await;

        let result = rx.await.unwrap();
        assert!(matches!(result, Err(TileError::Network { .. })));
    }

    #[tokio::test]
    async fn test_load_tile_invokes_callback_with_image() {
        let source = source(Arc::new(MemoryTileStore::new()), MockFetcher::ok(vec![5]));
        let (tx, rx) = oneshot::channel();

        source
            .load_tile(
                TileCoord::new(2, 1, 1),
                Box::new(move |result| {
                    let _ = tx.send(result);
                }),
            )
            .await;

        assert_eq!(rx.await.unwrap().unwrap().data, vec![5]);
    }
}
