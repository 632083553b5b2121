//! Tile cache layer.
//!
//! - [`TileStore`]: contract over the persistent attachment store
//! - [`providers`]: memory and disk store backends
//! - [`TileCacheClient`]: coordinate-keyed, fail-open access to a store

pub mod clients;
pub mod providers;
mod stats;
mod traits;

pub use clients::{TileCacheClient, WriteOutcome};
pub use providers::{DiskTileStore, MemoryTileStore, RevisionPolicy};
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use traits::{BoxFuture, StoreError, TileEntry, TileStore, DEFAULT_CONTENT_TYPE};
