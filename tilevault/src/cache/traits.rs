//! Core traits for the tile store.
//!
//! The `TileStore` trait is the contract over the persistent attachment
//! store: string keys, one binary blob per key tagged with a content type.
//! All store backends implement this trait so the cache client can use any
//! of them through a consistent interface.
//!
//! # Design Principles
//!
//! - **String keys**: Human-readable (`"13,1541,3280"`), opaque to the store
//! - **Attachment values**: Raw bytes plus a content-type tag
//! - **Minimal interface**: get / put / destroy, no eviction or expiry
//! - **Dyn-compatible**: Uses `Pin<Box<dyn Future>>` for trait object support

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content type recorded for tiles when the server does not say otherwise.
pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// A stored tile attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileEntry {
    /// Encoded image bytes.
    pub data: Vec<u8>,
    /// MIME type of `data`.
    pub content_type: String,
}

impl TileEntry {
    /// Creates an entry with an explicit content type.
    pub fn new(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
        }
    }

    /// Creates an entry tagged with [`DEFAULT_CONTENT_TYPE`].
    pub fn png(data: Vec<u8>) -> Self {
        Self::new(data, DEFAULT_CONTENT_TYPE)
    }

    /// Size of the payload in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error in a file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored attachment could not be encoded or decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The store rejected a write because the key already holds a revision.
    #[error("Write conflict for key '{key}'")]
    Conflict { key: String },

    /// Key does not derive from a valid tile coordinate.
    #[error("Invalid tile key: '{0}'")]
    InvalidKey(String),
}

impl StoreError {
    /// Returns `true` for revision conflicts, which callers treat as non-fatal.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Asynchronous attachment store keyed by string.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Concurrent `put` calls to
/// different keys must not interfere; concurrent writes to the same key
/// resolve as last-write-wins.
pub trait TileStore: Send + Sync {
    /// Retrieve the attachment stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entry))` if the key exists
    /// - `Ok(None)` if the key is not found (absence is not an error)
    /// - `Err(_)` if the store failed
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<TileEntry>, StoreError>>;

    /// Store `entry` under `key`, replacing any previous attachment.
    ///
    /// Stores that enforce revisions may return [`StoreError::Conflict`]
    /// instead of overwriting.
    fn put(&self, key: &str, entry: TileEntry) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Irreversibly remove every entry.
    ///
    /// The store stays usable afterwards and starts out empty.
    fn destroy_all(&self) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Number of stored entries.
    fn entry_count(&self) -> BoxFuture<'_, Result<u64, StoreError>>;

    /// Short backend name for logging.
    fn name(&self) -> &str;
}
