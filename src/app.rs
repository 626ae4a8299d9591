use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;

use crate::cache::registry::CacheRegistry;
use crate::cache::token_cache::TokenCache;
use crate::config::service::ServiceConfig;
use crate::executor::cache_eviction::EvictionScheduler;
use crate::observability::metrics::get_metrics;
use crate::server::server::AppState;
use crate::server::token_route::TokenRouteState;
use crate::sources::http::HttpTokenSource;
use crate::utils::constants::TOKEN_CACHE_KEY;

/// Everything the relay wires together at startup.
pub struct Relay {
    pub cache: Arc<TokenCache<HttpTokenSource>>,
    pub registry: Arc<CacheRegistry>,
    config: ServiceConfig,
}

impl Relay {
    pub fn build(config: &ServiceConfig) -> Result<Self> {
        let source = HttpTokenSource::from_config(&config.upstream)?;
        let cache = Arc::new(TokenCache::new(
            config.cache.name.clone(),
            config.cache.ttl(),
            source,
        ));

        let registry = Arc::new(CacheRegistry::new());
        registry.register(&cache);

        Ok(Self {
            cache,
            registry,
            config: config.clone(),
        })
    }

    pub fn spawn_eviction(&self) -> JoinHandle<()> {
        EvictionScheduler::new(self.registry.clone(), self.config.eviction.interval()).spawn()
    }

    pub async fn app_state(&self) -> AppState {
        let metrics = get_metrics().await;
        AppState::new(metrics, TokenRouteState::new(self.cache.clone(), TOKEN_CACHE_KEY))
    }
}
