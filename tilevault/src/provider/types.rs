//! Network error types

use thiserror::Error;

/// Errors that can occur while fetching tile bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The request could not be sent or did not complete
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body could not be read
    #[error("Failed to read response: {0}")]
    Body(String),

    /// The HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = NetworkError::Status {
            status: 404,
            url: "http://a.tile.osm.org/1/0/0.png".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from http://a.tile.osm.org/1/0/0.png");
    }
}
