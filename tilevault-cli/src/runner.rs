//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, runtime creation
//! and application startup shared by the command handlers.

use std::future::Future;
use std::path::{Path, PathBuf};

use tilevault::app::{AppConfig, TileVaultApp};
use tilevault::config::{config_file_path, ConfigFile};
use tilevault::logging::{init_logging, LoggingGuard};
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    _logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    /// Path the configuration was loaded from
    config_path: PathBuf,
    runtime: Runtime,
}

impl CliRunner {
    /// Create a runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Config file override, defaults to ~/.tilevault/config.ini
    /// * `verbose` - Mirror log events to stderr
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&config_path)?;

        let logging_guard = init_logging(&config.logging.file, verbose)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = Runtime::new().map_err(CliError::Runtime)?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
            config_path,
            runtime,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("TileVault v{}", tilevault::VERSION);
        info!(config = %self.config_path.display(), "TileVault CLI: {} command", command);
    }

    /// Run a future to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Start the application context from the loaded configuration.
    pub fn start_app(&self) -> Result<TileVaultApp, CliError> {
        let config = AppConfig::from_config_file(&self.config)?;
        let app = self.block_on(TileVaultApp::start(config))?;
        Ok(app)
    }

    /// Write bytes to a file, creating parent directories.
    pub fn save_file(&self, path: &Path, data: &[u8]) -> Result<(), CliError> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, data)
        };
        write().map_err(|error| CliError::FileWrite {
            path: path.display().to_string(),
            error,
        })?;
        info!(path = %path.display(), bytes = data.len(), "Wrote tile to file");
        Ok(())
    }
}
