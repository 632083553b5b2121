//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! Conversion helpers turn them into the library's runtime types.

use std::path::PathBuf;
use std::time::Duration;

use crate::coord::{BoundingRegion, GeoPoint};
use crate::prefetch::PrefetchRequest;
use crate::provider::{TemplateError, TileUrlTemplate};

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Area covered by `populate`
    pub region: RegionSettings,
    /// Initial map view
    pub view: ViewSettings,
    /// Bulk prefetch settings
    pub prefetch: PrefetchSettings,
    /// Tile store location
    pub store: StoreSettings,
    /// Tile server settings
    pub provider: ProviderSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Prefetch region bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSettings {
    pub top_left_lat: f64,
    pub top_left_lon: f64,
    pub bottom_right_lat: f64,
    pub bottom_right_lon: f64,
}

impl RegionSettings {
    pub fn region(&self) -> BoundingRegion {
        BoundingRegion::new(
            GeoPoint::new(self.top_left_lat, self.top_left_lon),
            GeoPoint::new(self.bottom_right_lat, self.bottom_right_lon),
        )
    }
}

/// Where the map starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

/// Prefetch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchSettings {
    /// Deepest zoom level to prefetch, inclusive
    pub layers_to_load: u8,
    /// Milliseconds between tile dispatches
    pub ms_throttle: u64,
}

impl PrefetchSettings {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.ms_throttle)
    }

    /// Prefetch request for `region` with these settings.
    pub fn request(&self, region: BoundingRegion) -> PrefetchRequest {
        PrefetchRequest::new(region, self.layers_to_load).with_throttle(self.throttle())
    }
}

/// Tile store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Store identifier, used as the database directory name
    pub database_name: String,
    /// Root directory holding databases
    pub directory: PathBuf,
}

/// Tile server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// URL template with `{z}`, `{x}`, `{y}` and optional `{s}`
    pub url_template: String,
    /// Values substituted for `{s}`
    pub subdomains: Vec<String>,
    /// Flip rows for TMS-addressed servers
    pub tms: bool,
    /// Request timeout in seconds, 0 for none
    pub timeout_secs: u64,
}

impl ProviderSettings {
    pub fn url_template(&self) -> Result<TileUrlTemplate, TemplateError> {
        TileUrlTemplate::new(self.url_template.clone(), self.subdomains.clone(), self.tms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
