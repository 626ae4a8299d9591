use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::cache::registry::{CacheRegistry, SweepReport};
use crate::helpers::time::wall_clock_after;

/// Periodic sweep that clears every registered cache, whatever it holds.
///
/// This is a coarse freshness backstop; the TTL inside each cache is what keeps
/// served tokens valid. The first sweep fires immediately, then every `interval`.
pub struct EvictionScheduler {
    registry: Arc<CacheRegistry>,
    interval: Duration,
}

impl EvictionScheduler {
    pub fn new(registry: Arc<CacheRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// Run the sweep loop on its own task. It lives until the handle is aborted
    /// or the runtime shuts down.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "eviction scheduler started, interval {:?}, caches: {:?}",
            self.interval,
            self.registry.cache_names()
        );
        loop {
            ticker.tick().await;
            self.tick().await;
            debug!("next eviction sweep at {}", wall_clock_after(self.interval));
        }
    }

    /// One sweep. Runs on a separate task so a panicking cache cannot take the loop down.
    pub async fn tick(&self) -> Option<SweepReport> {
        let registry = self.registry.clone();
        match tokio::spawn(async move { registry.evict_all().await }).await {
            Ok(report) => {
                if report.is_clean() {
                    info!("eviction sweep cleared {} cache(s)", report.cleared.len());
                } else {
                    warn!(
                        "eviction sweep cleared {} cache(s), skipped {}",
                        report.cleared.len(),
                        report.failed.len()
                    );
                }
                Some(report)
            }
            Err(e) => {
                error!("eviction sweep aborted: {}", e);
                None
            }
        }
    }
}
