//! HTTP fetcher abstraction for testability

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, trace, warn};

use super::types::NetworkError;
use crate::cache::BoxFuture;

/// Default user agent sent with tile requests.
pub const DEFAULT_USER_AGENT: &str = concat!("tilevault/", env!("CARGO_PKG_VERSION"));

/// Trait for fetching tile bytes over the network.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock fetchers in tests. GET only, no retry.
pub trait TileFetcher: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Returns
    ///
    /// The response body as bytes, or an error for transport failures and
    /// non-success statuses.
    fn fetch(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, NetworkError>>;
}

/// Async HTTP fetcher using reqwest.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Creates a fetcher with no request timeout.
    pub fn new() -> Result<Self, NetworkError> {
        Self::with_timeout(None)
    }

    /// Creates a fetcher with an optional request timeout.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, NetworkError> {
        let mut builder = reqwest::Client::builder().user_agent(DEFAULT_USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| NetworkError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl TileFetcher for ReqwestFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, NetworkError>> {
        let url = url.to_string();
        Box::pin(async move {
            trace!(url = %url, "HTTP GET request starting");

            let response = match self.client.get(&url).send().await {
                Ok(resp) => {
                    debug!(url = %url, status = resp.status().as_u16(), "HTTP response received");
                    resp
                }
                Err(e) => {
                    warn!(
                        url = %url,
                        error = %e,
                        is_connect = e.is_connect(),
                        is_timeout = e.is_timeout(),
                        "HTTP request failed"
                    );
                    return Err(NetworkError::Http(e.to_string()));
                }
            };

            check_status(response.status(), &url)?;

            let bytes = response
                .bytes()
                .await
                .map_err(|e| NetworkError::Body(e.to_string()))?;
            trace!(url = %url, bytes = bytes.len(), "HTTP response body read");
            Ok(bytes.to_vec())
        })
    }
}

/// Only `200 OK` carries a tile; any other status is a failed fetch.
fn check_status(status: StatusCode, url: &str) -> Result<(), NetworkError> {
    if status == StatusCode::OK {
        return Ok(());
    }
    Err(NetworkError::Status {
        status: status.as_u16(),
        url: url.to_string(),
    })
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock fetcher that records every requested URL.
    pub struct MockFetcher {
        response: Result<Vec<u8>, NetworkError>,
        fail_matching: Option<String>,
        delay: Option<Duration>,
        calls: Mutex<Vec<(String, tokio::time::Instant)>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockFetcher {
        /// Every fetch succeeds with `data`.
        pub fn ok(data: Vec<u8>) -> Self {
            Self::with_response(Ok(data))
        }

        /// Every fetch fails with `error`.
        pub fn failing(error: NetworkError) -> Self {
            Self::with_response(Err(error))
        }

        fn with_response(response: Result<Vec<u8>, NetworkError>) -> Self {
            Self {
                response,
                fail_matching: None,
                delay: None,
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        /// Fail fetches whose URL contains `pattern`.
        pub fn fail_urls_containing(mut self, pattern: &str) -> Self {
            self.fail_matching = Some(pattern.to_string());
            self
        }

        /// Sleep before answering.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn urls(&self) -> Vec<String> {
            self.calls.lock().iter().map(|(url, _)| url.clone()).collect()
        }

        pub fn call_times(&self) -> Vec<tokio::time::Instant> {
            self.calls.lock().iter().map(|(_, at)| *at).collect()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        /// Highest number of fetches that were running at the same time.
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    impl TileFetcher for MockFetcher {
        fn fetch(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, NetworkError>> {
            let url = url.to_string();
            Box::pin(async move {
                self.calls
                    .lock()
                    .push((url.clone(), tokio::time::Instant::now()));
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(now, Ordering::SeqCst);

                if let Some(delay) = self.delay {
                    tokio::time::sleep(delay).await;
                }
                self.in_flight.fetch_sub(1, Ordering::SeqCst);

                if let Some(pattern) = &self.fail_matching {
                    if url.contains(pattern.as_str()) {
                        return Err(NetworkError::Status { status: 500, url });
                    }
                }
                self.response.clone()
            })
        }
    }

    #[tokio::test]
    async fn test_mock_fetcher_success() {
        let mock = MockFetcher::ok(vec![1, 2, 3, 4]);

        let result = mock.fetch("http://example.com/1/0/0.png").await;
        assert_eq!(result, Ok(vec![1, 2, 3, 4]));
        assert_eq!(mock.urls(), vec!["http://example.com/1/0/0.png".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_fetcher_error() {
        let mock = MockFetcher::failing(NetworkError::Http("Test error".to_string()));

        assert!(mock.fetch("http://example.com").await.is_err());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_fetcher_fail_matching() {
        let mock = MockFetcher::ok(vec![1]).fail_urls_containing("/3/");

        assert!(mock.fetch("http://example.com/2/1/1.png").await.is_ok());
        assert!(mock.fetch("http://example.com/3/1/1.png").await.is_err());
    }

    #[test]
    fn test_reqwest_fetcher_builds() {
        assert!(ReqwestFetcher::new().is_ok());
        assert!(ReqwestFetcher::with_timeout(Some(Duration::from_secs(5))).is_ok());
    }

    #[test]
    fn test_only_ok_status_is_accepted() {
        let url = "http://a.tile.osm.org/3/1/2.png";

        assert!(check_status(StatusCode::OK, url).is_ok());
        for status in [StatusCode::NO_CONTENT, StatusCode::PARTIAL_CONTENT, StatusCode::NOT_FOUND] {
            assert_eq!(
                check_status(status, url),
                Err(NetworkError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                })
            );
        }
    }

    #[test]
    fn test_user_agent() {
        assert!(DEFAULT_USER_AGENT.starts_with("tilevault/"));
    }
}
