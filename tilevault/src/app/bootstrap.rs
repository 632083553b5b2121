//! Application bootstrap implementation.
//!
//! `TileVaultApp` owns the one tile cache client and wires the resolver,
//! the tile source and the prefetch scheduler to it.

use std::sync::Arc;

use tracing::{info, warn};

use super::config::AppConfig;
use super::error::AppError;
use crate::cache::{CacheStatsSnapshot, DiskTileStore, StoreError, TileCacheClient, TileStore};
use crate::prefetch::{PrefetchHandle, PrefetchRequest, PrefetchScheduler};
use crate::provider::{ReqwestFetcher, TileFetcher};
use crate::resolver::{CachingTileSource, TileResolver};

/// TileVault application context.
///
/// Replaces process-wide state: every component that touches the store
/// goes through the same [`TileCacheClient`].
///
/// # Example
///
/// ```ignore
/// use tilevault::app::{AppConfig, TileVaultApp};
///
/// let app = TileVaultApp::start(config).await?;
/// let handle = app.populate_cache();
/// let report = handle.wait().await?;
/// app.clear_cache().await?;
/// ```
pub struct TileVaultApp {
    config: AppConfig,
    cache: TileCacheClient,
    resolver: Arc<TileResolver>,
    source: CachingTileSource,
    scheduler: PrefetchScheduler,
}

impl TileVaultApp {
    /// Start the application with the given configuration.
    ///
    /// Opens the on-disk store and creates the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or the HTTP client
    /// cannot be built.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        let store = DiskTileStore::open(&config.store_directory, &config.database_name)
            .await
            .map_err(AppError::StoreOpen)?;
        info!(
            directory = %store.directory().display(),
            database = %config.database_name,
            "Tile store opened"
        );

        let fetcher = ReqwestFetcher::with_timeout(config.timeout)?;
        Ok(Self::with_components(config, Arc::new(store), Arc::new(fetcher)))
    }

    /// Build the application around an existing store and fetcher.
    pub fn with_components(
        config: AppConfig,
        store: Arc<dyn TileStore>,
        fetcher: Arc<dyn TileFetcher>,
    ) -> Self {
        let cache = TileCacheClient::new(store);
        let resolver = Arc::new(TileResolver::new(
            cache.clone(),
            Arc::clone(&fetcher),
            config.urls.clone(),
        ));
        let source = CachingTileSource::new(Arc::clone(&resolver));
        let scheduler = PrefetchScheduler::new(cache.clone(), fetcher, config.urls.clone());

        Self {
            config,
            cache,
            resolver,
            source,
            scheduler,
        }
    }

    /// Start downloading the configured region.
    ///
    /// Replaces a prefetch that is already running.
    pub fn populate_cache(&self) -> PrefetchHandle {
        self.populate(self.config.populate_request())
    }

    /// Start downloading an explicit region.
    pub fn populate(&self, request: PrefetchRequest) -> PrefetchHandle {
        info!(
            max_zoom = request.max_zoom,
            throttle_ms = request.throttle.as_millis() as u64,
            "Populating tile cache"
        );
        self.scheduler.start(request)
    }

    /// Wipe the tile store.
    ///
    /// An active prefetch is cancelled first. The store stays usable and
    /// starts out empty.
    pub async fn clear_cache(&self) -> Result<(), AppError> {
        if self.scheduler.is_active() {
            warn!("Cancelling active prefetch before clearing the cache");
            self.scheduler.cancel();
        }
        self.cache.clear().await.map_err(AppError::StoreClear)?;
        info!(store = self.cache.store_name(), "Tile cache cleared");
        Ok(())
    }

    /// Number of cached tiles.
    pub async fn entry_count(&self) -> Result<u64, StoreError> {
        self.cache.entry_count().await
    }

    /// Access counters of the cache client.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.cache.stats()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> &TileCacheClient {
        &self.cache
    }

    pub fn resolver(&self) -> &Arc<TileResolver> {
        &self.resolver
    }

    /// Tile source for renderers.
    pub fn tile_source(&self) -> &CachingTileSource {
        &self.source
    }

    pub fn scheduler(&self) -> &PrefetchScheduler {
        &self.scheduler
    }
}
