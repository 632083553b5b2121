//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`cache`] - Cache management (clear, stats)
//! - [`config`] - Configuration management (path, show, init)
//! - [`fetch`] - Single tile lookup through the cache
//! - [`populate`] - Bulk region download

pub mod cache;
pub mod config;
pub mod fetch;
pub mod populate;
