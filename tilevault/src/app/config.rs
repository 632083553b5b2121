//! Application configuration for TileVaultApp.
//!
//! `AppConfig` is the validated subset of [`ConfigFile`] needed to open the
//! store, talk to the tile server and run prefetch jobs.

use std::path::PathBuf;
use std::time::Duration;

use super::error::AppError;
use crate::config::{ConfigFile, PrefetchSettings};
use crate::coord::BoundingRegion;
use crate::prefetch::PrefetchRequest;
use crate::provider::TileUrlTemplate;

/// Application configuration combining all component configs.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Root directory of the tile databases.
    pub store_directory: PathBuf,

    /// Database identifier under `store_directory`.
    pub database_name: String,

    /// Tile server URLs.
    pub urls: TileUrlTemplate,

    /// HTTP request timeout, `None` for no timeout.
    pub timeout: Option<Duration>,

    /// Region downloaded by `populate`.
    pub region: BoundingRegion,

    /// Zoom depth and throttle for `populate`.
    pub prefetch: PrefetchSettings,
}

impl AppConfig {
    /// Create a config with the default tile server, region and prefetch settings.
    pub fn new(store_directory: PathBuf, database_name: impl Into<String>) -> Self {
        let defaults = ConfigFile::default();
        Self {
            store_directory,
            database_name: database_name.into(),
            urls: TileUrlTemplate::default(),
            timeout: None,
            region: defaults.region.region(),
            prefetch: defaults.prefetch,
        }
    }

    /// Build the app config from the user's config file.
    pub fn from_config_file(config: &ConfigFile) -> Result<Self, AppError> {
        let urls = config
            .provider
            .url_template()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let region = config.region.region();
        region
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            store_directory: config.store.directory.clone(),
            database_name: config.store.database_name.clone(),
            urls,
            timeout: config.provider.timeout(),
            region,
            prefetch: config.prefetch,
        })
    }

    pub fn with_region(mut self, region: BoundingRegion) -> Self {
        self.region = region;
        self
    }

    pub fn with_urls(mut self, urls: TileUrlTemplate) -> Self {
        self.urls = urls;
        self
    }

    pub fn with_prefetch(mut self, prefetch: PrefetchSettings) -> Self {
        self.prefetch = prefetch;
        self
    }

    /// Prefetch request for the configured region.
    pub fn populate_request(&self) -> PrefetchRequest {
        self.prefetch.request(self.region)
    }
}
