//! Scoped display resources for cached tiles.
//!
//! A cache hit is handed to the renderer as a [`CachedTile`], the
//! equivalent of a transient object URL: it is registered when created and
//! must be released once the image has loaded or failed. Both
//! [`CachedTile::on_load`] and [`CachedTile::on_error`] consume the handle,
//! so only one of them can run and it runs once. Dropping an unfinished
//! handle releases it as well.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::cache::TileEntry;
use crate::coord::TileCoord;

/// Why a resource was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    /// The image finished loading.
    Loaded,
    /// The image failed to load.
    Errored,
    /// The handle was dropped without a load outcome.
    Dropped,
}

/// Counts of released resources by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseCounts {
    pub loaded: u64,
    pub errored: u64,
    pub dropped: u64,
}

/// Registry of live display resources.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    next_id: AtomicU64,
    live: Mutex<HashSet<u64>>,
    loaded: AtomicU64,
    errored: AtomicU64,
    dropped: AtomicU64,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cached entry and returns its scoped handle.
    pub fn acquire(self: &Arc<Self>, tile: TileCoord, entry: TileEntry) -> CachedTile {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.live.lock().insert(id);
        trace!(id, tile = %tile, "Display resource acquired");

        CachedTile {
            id,
            tile,
            entry,
            registry: Arc::clone(self),
            released: false,
        }
    }

    /// Number of resources acquired and not yet released.
    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    pub fn release_counts(&self) -> ReleaseCounts {
        ReleaseCounts {
            loaded: self.loaded.load(Ordering::Relaxed),
            errored: self.errored.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    fn release(&self, id: u64, reason: ReleaseReason) {
        if !self.live.lock().remove(&id) {
            return;
        }
        let counter = match reason {
            ReleaseReason::Loaded => &self.loaded,
            ReleaseReason::Errored => &self.errored,
            ReleaseReason::Dropped => &self.dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        trace!(id, ?reason, "Display resource released");
    }
}

/// A cached tile acquired for display.
#[derive(Debug)]
pub struct CachedTile {
    id: u64,
    tile: TileCoord,
    entry: TileEntry,
    registry: Arc<ResourceRegistry>,
    released: bool,
}

impl CachedTile {
    /// Object-URL style handle for the renderer.
    pub fn handle(&self) -> String {
        format!("blob:tilevault/{}", self.id)
    }

    pub fn tile(&self) -> TileCoord {
        self.tile
    }

    /// The cached bytes and content type.
    pub fn entry(&self) -> &TileEntry {
        &self.entry
    }

    /// The image loaded; releases the resource and returns the entry.
    pub fn on_load(mut self) -> TileEntry {
        self.finish(ReleaseReason::Loaded);
        std::mem::take(&mut self.entry)
    }

    /// The image failed to load; releases the resource.
    pub fn on_error(mut self) {
        self.finish(ReleaseReason::Errored);
    }

    fn finish(&mut self, reason: ReleaseReason) {
        if !self.released {
            self.released = true;
            self.registry.release(self.id, reason);
        }
    }
}

impl Drop for CachedTile {
    fn drop(&mut self) {
        self.finish(ReleaseReason::Dropped);
    }
}
