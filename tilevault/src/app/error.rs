//! Application error types.

use std::fmt;

use crate::cache::StoreError;
use crate::provider::NetworkError;

/// Errors that can occur during application lifecycle.
#[derive(Debug)]
pub enum AppError {
    /// Failed to open the tile store.
    StoreOpen(StoreError),

    /// Failed to wipe the tile store.
    StoreClear(StoreError),

    /// Failed to create the HTTP client.
    HttpClient(NetworkError),

    /// Configuration error.
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::StoreOpen(e) => write!(f, "Failed to open tile store: {}", e),
            AppError::StoreClear(e) => write!(f, "Failed to clear tile store: {}", e),
            AppError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::StoreOpen(e) => Some(e),
            AppError::StoreClear(e) => Some(e),
            AppError::HttpClient(e) => Some(e),
            AppError::Config(_) => None,
        }
    }
}

impl From<NetworkError> for AppError {
    fn from(e: NetworkError) -> Self {
        AppError::HttpClient(e)
    }
}
