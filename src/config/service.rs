use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::config::upstream::{CacheConfig, EvictionConfig, UpstreamConfig};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub eviction: EvictionConfig,
}
