//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use tilevault::app::AppError;
use tilevault::cache::StoreError;
use tilevault::config::ConfigFileError;
use tilevault::coord::CoordError;
use tilevault::prefetch::PrefetchError;
use tilevault::resolver::TileError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to start the application context
    App(AppError),
    /// Invalid tile coordinate or key
    Coord(CoordError),
    /// Tile store operation failed
    Store(StoreError),
    /// Failed to load a tile
    Tile(TileError),
    /// Prefetch job failed
    Prefetch(PrefetchError),
    /// Failed to write output file
    FileWrite { path: String, error: std::io::Error },
    /// Failed to create the Tokio runtime
    Runtime(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) | CliError::App(AppError::Config(_)) => {
                eprintln!();
                eprintln!("Check your configuration with: tilevault config show");
            }
            CliError::Tile(TileError::Network { .. }) => {
                eprintln!();
                eprintln!("The tile is not cached and the tile server could not be reached.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::App(e) => write!(f, "{}", e),
            CliError::Coord(e) => write!(f, "Invalid tile: {}", e),
            CliError::Store(e) => write!(f, "Tile store error: {}", e),
            CliError::Tile(e) => write!(f, "{}", e),
            CliError::Prefetch(e) => write!(f, "{}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
            CliError::Runtime(e) => write!(f, "Failed to create Tokio runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::App(e) => Some(e),
            CliError::Coord(e) => Some(e),
            CliError::Store(e) => Some(e),
            CliError::Tile(e) => Some(e),
            CliError::Prefetch(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coord(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<TileError> for CliError {
    fn from(e: TileError) -> Self {
        CliError::Tile(e)
    }
}

impl From<PrefetchError> for CliError {
    fn from(e: PrefetchError) -> Self {
        CliError::Prefetch(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_from_file_error() {
        let err: CliError = ConfigFileError::InvalidValue {
            section: "prefetch".to_string(),
            key: "ms_throttle".to_string(),
            value: "fast".to_string(),
            reason: "must be a non-negative integer (milliseconds)".to_string(),
        }
        .into();

        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("[prefetch] ms_throttle"));
    }

    #[test]
    fn test_file_write_display() {
        let err = CliError::FileWrite {
            path: "/tmp/tile.png".to_string(),
            error: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to write file '/tmp/tile.png': denied"
        );
    }
}
