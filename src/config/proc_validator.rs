//! Configuration validation with aggregated errors.
//! Every issue is collected so a broken config reports all of its problems at once.

use tracing::{error, info};

use crate::config::service::ServiceConfig;
use crate::config::settings::SettingsConfig;
use crate::config::upstream::{CacheConfig, EvictionConfig, UpstreamConfig};
use crate::observability::metrics::get_metrics;

/// Returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_upstream(&cfg.upstream, &mut errors);
    validate_cache(&cfg.cache, &mut errors);
    validate_eviction(&cfg.eviction, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }
    if !settings.server.token_path.starts_with('/') {
        errors.push(format!(
            "settings.server.token_path '{}' must start with '/'",
            settings.server.token_path
        ));
    }

    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }
    if metrics.is_enabled && metrics.path == settings.server.token_path {
        errors.push(format!(
            "settings.metrics.path and settings.server.token_path both use '{}'",
            metrics.path
        ));
    }

    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

fn validate_upstream(upstream: &UpstreamConfig, errors: &mut Vec<String>) {
    match reqwest::Url::parse(&upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(format!(
            "upstream.base_url '{}' has unsupported scheme '{}'",
            upstream.base_url,
            url.scheme()
        )),
        Err(e) => errors.push(format!(
            "upstream.base_url '{}' is not a valid URL: {}",
            upstream.base_url, e
        )),
    }
    if !upstream.path.starts_with('/') {
        errors.push(format!("upstream.path '{}' must start with '/'", upstream.path));
    }
    if upstream.timeout_ms == 0 {
        errors.push("upstream.timeout_ms must be > 0".to_string());
    }
}

fn validate_cache(cache: &CacheConfig, errors: &mut Vec<String>) {
    if cache.name.trim().is_empty() {
        errors.push("cache.name must not be empty".to_string());
    }
    if cache.ttl_seconds == 0 {
        errors.push("cache.ttl_seconds must be > 0".to_string());
    }
}

fn validate_eviction(eviction: &EvictionConfig, errors: &mut Vec<String>) {
    if eviction.interval_seconds == 0 {
        errors.push("eviction.interval_seconds must be > 0".to_string());
    }
}
