//! TileVault - Offline tile cache for slippy maps
//!
//! This library intercepts per-tile image requests, serves them from a
//! local attachment store when present and otherwise downloads them, and
//! prefetches whole regions into the store for later offline use.
//!
//! # Modules
//!
//! - [`coord`]: tile keys and Web Mercator tile math
//! - [`cache`]: tile store contract, backends and the fail-open client
//! - [`provider`]: HTTP fetcher and tile URL templates
//! - [`resolver`]: per-tile cache hit vs. network decision
//! - [`prefetch`]: throttled bulk region download
//! - [`config`]: INI configuration file
//! - [`app`]: application context wiring it together

pub mod app;
pub mod cache;
pub mod config;
pub mod coord;
pub mod logging;
pub mod prefetch;
pub mod provider;
pub mod resolver;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
