//! User configuration.
//!
//! Settings are read from `~/.tilevault/config.ini`. A missing file means
//! defaults; any key may be omitted.
//!
//! # Example
//!
//! ```ignore
//! use tilevault::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let request = config.prefetch.request(config.region.region());
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, LoggingSettings, PrefetchSettings, ProviderSettings, RegionSettings,
    StoreSettings, ViewSettings,
};
