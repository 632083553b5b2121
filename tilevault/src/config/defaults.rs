//! Default values for all configuration settings.
//!
//! The default region and view cover the Phoenix metropolitan area.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::prefetch::{DEFAULT_LAYERS_TO_LOAD, DEFAULT_THROTTLE_MS};
use crate::provider::{DEFAULT_SUBDOMAINS, DEFAULT_URL_TEMPLATE};

pub const DEFAULT_TOP_LEFT_LAT: f64 = 33.712167;
pub const DEFAULT_TOP_LEFT_LON: f64 = -112.271690;
pub const DEFAULT_BOTTOM_RIGHT_LAT: f64 = 33.217292;
pub const DEFAULT_BOTTOM_RIGHT_LON: f64 = -111.633453;

pub const DEFAULT_VIEW_LAT: f64 = 33.217292;
pub const DEFAULT_VIEW_LON: f64 = -111.633453;
pub const DEFAULT_VIEW_ZOOM: u8 = 13;

/// Default store identifier.
pub const DEFAULT_DATABASE_NAME: &str = "tile";

/// Default request timeout in seconds (0 = none).
pub const DEFAULT_TIMEOUT_SECS: u64 = 0;

/// Default store root (~/.tilevault/db).
pub fn default_store_directory() -> PathBuf {
    config_directory().join("db")
}

/// Default log file (~/.tilevault/tilevault.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join("tilevault.log")
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            top_left_lat: DEFAULT_TOP_LEFT_LAT,
            top_left_lon: DEFAULT_TOP_LEFT_LON,
            bottom_right_lat: DEFAULT_BOTTOM_RIGHT_LAT,
            bottom_right_lon: DEFAULT_BOTTOM_RIGHT_LON,
        }
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            lat: DEFAULT_VIEW_LAT,
            lon: DEFAULT_VIEW_LON,
            zoom: DEFAULT_VIEW_ZOOM,
        }
    }
}

impl Default for PrefetchSettings {
    fn default() -> Self {
        Self {
            layers_to_load: DEFAULT_LAYERS_TO_LOAD,
            ms_throttle: DEFAULT_THROTTLE_MS,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            directory: default_store_directory(),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            subdomains: DEFAULT_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
            tms: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            region: RegionSettings::default(),
            view: ViewSettings::default(),
            prefetch: PrefetchSettings::default(),
            store: StoreSettings::default(),
            provider: ProviderSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}
