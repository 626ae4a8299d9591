use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::errors::RelayError;
use crate::observability::metrics::get_metrics;

/// A cache the eviction sweep can clear.
pub trait Evictable: Send + Sync {
    fn cache_name(&self) -> &str;

    /// Remove every entry, returning how many were dropped.
    fn evict(&self) -> Result<usize, RelayError>;
}

/// Outcome of one sweep over the registry.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// (cache name, entries removed)
    pub cleared: Vec<(String, usize)>,
    pub failed: Vec<RelayError>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Named set of caches, populated at startup and handed to the eviction scheduler.
///
/// Caches are held weakly: the registry never keeps a cache alive, and a name
/// whose cache was dropped shows up as [`RelayError::NoSuchCache`] at sweep time.
#[derive(Default)]
pub struct CacheRegistry {
    caches: RwLock<BTreeMap<String, Weak<dyn Evictable>>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: Evictable + 'static>(&self, cache: &Arc<C>) {
        let name = cache.cache_name().to_owned();
        let weak: Weak<dyn Evictable> = Arc::downgrade(cache) as Weak<dyn Evictable>;
        if self.caches.write().insert(name.clone(), weak).is_some() {
            warn!("cache '{}' registered twice, keeping the latest instance", name);
        } else {
            info!("cache '{}' registered", name);
        }
    }

    pub fn cache_names(&self) -> Vec<String> {
        self.caches.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.caches.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear every registered cache. A cache that is gone or fails to clear is
    /// logged and skipped, the rest are still cleared.
    pub async fn evict_all(&self) -> SweepReport {
        let metrics = get_metrics().await;
        let snapshot: Vec<(String, Weak<dyn Evictable>)> = self
            .caches
            .read()
            .iter()
            .map(|(name, cache)| (name.clone(), cache.clone()))
            .collect();

        let mut report = SweepReport::default();
        for (name, cache) in snapshot {
            info!("CacheEvict Name: {}", name);
            let result = cache
                .upgrade()
                .ok_or_else(|| RelayError::no_such_cache(&name))
                .and_then(|cache| cache.evict());

            match result {
                Ok(removed) => {
                    metrics.cache_evictions.with_label_values(&[&name]).inc();
                    metrics.cached_tokens.with_label_values(&[&name]).set(0);
                    report.cleared.push((name, removed));
                }
                Err(err) => {
                    warn!("skipping cache '{}' during eviction: {}", name, err);
                    metrics
                        .cache_eviction_failures
                        .with_label_values(&[name.as_str(), err.kind()])
                        .inc();
                    report.failed.push(err);
                }
            }
        }
        report
    }
}
