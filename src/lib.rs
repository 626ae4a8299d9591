//! # Token Relay Library
//!
//! Fetches an authentication token from an upstream service, caches it
//! single-flight for a fixed TTL, and clears every cache on a timer.
//!
//! Modules:
//! - `config` — service configuration, loading and validation
//! - `cache` — token value, single-flight token cache, cache registry
//! - `sources` — upstream token sources
//! - `executor` — periodic eviction sweep
//! - `server` — HTTP routes serving the token and metrics

pub mod app;
pub mod cache;
pub mod config;
pub mod errors;
pub mod executor;
pub mod helpers;
pub mod observability;
pub mod server;
pub mod sources;
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use crate::cache::token::Token;
pub use crate::config::service::ServiceConfig;
pub use crate::errors::RelayError;
