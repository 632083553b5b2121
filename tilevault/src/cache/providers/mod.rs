//! Tile store backends.
//!
//! Each backend implements the `TileStore` trait.
//!
//! # Available Stores
//!
//! - [`MemoryTileStore`]: In-memory store using moka, optional revision checks
//! - [`DiskTileStore`]: Persistent store, one attachment file per key

mod disk;
mod memory;

pub use disk::DiskTileStore;
pub use memory::{MemoryTileStore, RevisionPolicy};
