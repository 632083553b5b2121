//! Application context and lifecycle.
//!
//! This module provides the `TileVaultApp` type which opens the tile store
//! and wires every component to the single cache client.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       TileVaultApp                        │
//! │                                                           │
//! │  TileCacheClient ◄── TileResolver ◄── CachingTileSource   │
//! │        ▲                                                  │
//! │        └──────────── PrefetchScheduler                    │
//! │                                                           │
//! │  store: DiskTileStore   fetcher: ReqwestFetcher           │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tilevault::app::{AppConfig, TileVaultApp};
//! use tilevault::config::ConfigFile;
//!
//! let config = AppConfig::from_config_file(&ConfigFile::load()?)?;
//! let app = TileVaultApp::start(config).await?;
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::TileVaultApp;
pub use config::AppConfig;
pub use error::AppError;
