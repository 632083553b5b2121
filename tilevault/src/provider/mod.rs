//! Tile network access
//!
//! This module provides the [`TileFetcher`] trait used by the resolver and
//! the prefetch scheduler to download tile bytes, its reqwest-backed
//! implementation, and the [`TileUrlTemplate`] that maps a tile coordinate
//! to a server URL.
//!
//! ```ignore
//! use tilevault::provider::{ReqwestFetcher, TileFetcher, TileUrlTemplate};
//!
//! let fetcher = ReqwestFetcher::new()?;
//! let url = TileUrlTemplate::default().url_for(&tile);
//! let bytes = fetcher.fetch(&url).await?;
//! ```

mod http;
mod types;
mod url;

pub use http::{ReqwestFetcher, TileFetcher, DEFAULT_USER_AGENT};
pub use types::NetworkError;
pub use url::{TemplateError, TileUrlTemplate, DEFAULT_SUBDOMAINS, DEFAULT_URL_TEMPLATE};

#[cfg(test)]
pub use http::tests::MockFetcher;
