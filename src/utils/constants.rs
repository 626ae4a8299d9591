//! Shared constants and invariants

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "http://localhost:8111";
pub const DEFAULT_UPSTREAM_PATH: &str = "/token";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;

pub const DEFAULT_CACHE_NAME: &str = "token";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;
pub const DEFAULT_EVICTION_INTERVAL_SECS: u64 = 60;

/// The single key the relay caches its token under.
pub const TOKEN_CACHE_KEY: &str = "token";

pub const DEFAULT_TOKEN_PATH: &str = "/db";
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
