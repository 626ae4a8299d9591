use std::time::Duration;

use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_CACHE_NAME, DEFAULT_CACHE_TTL_SECS, DEFAULT_EVICTION_INTERVAL_SECS,
    DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_UPSTREAM_BASE_URL, DEFAULT_UPSTREAM_PATH,
};

/// ================================
/// Upstream token service
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_path(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// ================================
/// Token cache
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_name")]
    pub name: String,
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: default_cache_name(),
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

/// ================================
/// Eviction sweep
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct EvictionConfig {
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
}

impl EvictionConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_UPSTREAM_BASE_URL.to_string()
}

fn default_path() -> String {
    DEFAULT_UPSTREAM_PATH.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_cache_name() -> String {
    DEFAULT_CACHE_NAME.to_string()
}

fn default_ttl_seconds() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_interval_seconds() -> u64 {
    DEFAULT_EVICTION_INTERVAL_SECS
}
