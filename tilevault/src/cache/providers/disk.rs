//! On-disk tile store.
//!
//! Each database is a directory under the store root. Every key is stored
//! as one attachment file holding the key, its content type and the tile
//! bytes, bincode-encoded.
//!
//! # File Layout
//!
//! ```text
//! {root}/{database_name}/{sha256(key)}.tile
//! ```
//!
//! The key is hashed to create a safe filename that works across all
//! platforms. The key is also stored inside the file and checked on read.
//!
//! Writes go to a uniquely named temp file and are renamed into place, so
//! a reader never sees a partially written attachment and concurrent writes
//! to the same key resolve as last-rename-wins.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::cache::traits::{BoxFuture, StoreError, TileEntry, TileStore};

/// File extension for stored attachments.
const TILE_EXTENSION: &str = "tile";

/// On-disk representation of an attachment.
#[derive(Debug, Serialize, Deserialize)]
struct StoredAttachment {
    key: String,
    content_type: String,
    data: Vec<u8>,
}

/// Persistent tile store backed by one directory per database.
pub struct DiskTileStore {
    /// Database directory (`{root}/{database_name}`).
    directory: PathBuf,

    /// Database identifier.
    database_name: String,

    /// Counter for unique temp file names.
    write_seq: AtomicU64,
}

impl DiskTileStore {
    /// Open (or create) the database `database_name` under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database directory cannot be created.
    pub async fn open(root: &Path, database_name: &str) -> Result<Self, StoreError> {
        let directory = root.join(database_name);
        tokio::fs::create_dir_all(&directory).await?;

        info!(
            dir = %directory.display(),
            database = database_name,
            "Opened disk tile store"
        );

        Ok(Self {
            directory,
            database_name: database_name.to_string(),
            write_seq: AtomicU64::new(0),
        })
    }

    /// The database directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The database identifier.
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Generate a safe filename from a store key.
    fn key_to_filename(key: &str) -> String {
        let digest = Sha256::digest(key.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        format!("{}.{}", hex, TILE_EXTENSION)
    }

    /// Get the file path for a store key.
    fn key_path(&self, key: &str) -> PathBuf {
        self.directory.join(Self::key_to_filename(key))
    }
}

impl TileStore for DiskTileStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<TileEntry>, StoreError>> {
        let path = self.key_path(key);
        let key = key.to_string();
        Box::pin(async move {
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(StoreError::Io(e)),
            };

            let stored: StoredAttachment = bincode::deserialize(&bytes)
                .map_err(|e| StoreError::Encoding(format!("{}: {}", path.display(), e)))?;

            if stored.key != key {
                debug!(
                    key = %key,
                    stored_key = %stored.key,
                    "Attachment key mismatch, treating as absent"
                );
                return Ok(None);
            }

            Ok(Some(TileEntry {
                data: stored.data,
                content_type: stored.content_type,
            }))
        })
    }

    fn put(&self, key: &str, entry: TileEntry) -> BoxFuture<'_, Result<(), StoreError>> {
        let path = self.key_path(key);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let key = key.to_string();
        Box::pin(async move {
            let stored = StoredAttachment {
                key,
                content_type: entry.content_type,
                data: entry.data,
            };
            let bytes =
                bincode::serialize(&stored).map_err(|e| StoreError::Encoding(e.to_string()))?;

            let temp_path = path.with_extension(format!("{}.tmp", seq));
            tokio::fs::write(&temp_path, &bytes).await?;
            if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(StoreError::Io(e));
            }
            Ok(())
        })
    }

    fn destroy_all(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            match tokio::fs::remove_dir_all(&self.directory).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::Io(e)),
            }
            tokio::fs::create_dir_all(&self.directory).await?;

            info!(
                dir = %self.directory.display(),
                database = %self.database_name,
                "Disk tile store destroyed and reopened"
            );
            Ok(())
        })
    }

    fn entry_count(&self) -> BoxFuture<'_, Result<u64, StoreError>> {
        Box::pin(async move {
            let mut entries = tokio::fs::read_dir(&self.directory).await?;
            let mut count = 0u64;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some(TILE_EXTENSION) {
                    count += 1;
                }
            }
            Ok(count)
        })
    }

    fn name(&self) -> &str {
        "disk"
    }
}
