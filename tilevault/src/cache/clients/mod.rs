//! Domain-specific cache clients.
//!
//! These clients wrap the generic `TileStore` trait with domain-specific
//! key translation and access counters.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  TileCacheClient    │
//! │                     │
//! │ TileCoord → key     │
//! │ Fail-open policy    │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────────────────────────────────┐
//! │              Arc<dyn TileStore>                 │
//! │                                                 │
//! │  Attachment store (string → bytes + mime type)  │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Key Format
//!
//! - Tiles: `"{zoom},{x},{y}"` (e.g., `"13,1541,3280"`)

mod tile;

pub use tile::{TileCacheClient, WriteOutcome};
