use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process-wide `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Upstream metrics
    pub upstream_fetch_requests: IntCounter,
    pub upstream_fetch_failures: IntCounterVec,
    pub upstream_fetch_duration: Histogram,

    // Cache metrics
    pub cache_hits: IntCounterVec,
    pub cache_misses: IntCounterVec,
    pub cached_tokens: IntGaugeVec,

    // Eviction metrics
    pub cache_evictions: IntCounterVec,
    pub cache_eviction_failures: IntCounterVec,

    // Config/runtime
    pub parse_failures: IntCounter,
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("tokenrelay".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Upstream
            upstream_fetch_requests: IntCounter::new("upstream_fetch_requests_total", "Total upstream token fetch attempts").unwrap(),
            upstream_fetch_failures: IntCounterVec::new(Opts::new("upstream_fetch_failures_total", "Upstream fetch failures by reason"),&["reason"],).unwrap(),
            upstream_fetch_duration: Histogram::with_opts(HistogramOpts::new("upstream_fetch_duration_seconds", "Upstream fetch duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])).unwrap(),

            // Cache
            cache_hits: IntCounterVec::new(Opts::new("cache_hits_total", "Requests served from a live entry"),&["cache"],).unwrap(),
            cache_misses: IntCounterVec::new(Opts::new("cache_misses_total", "Requests that needed an upstream fetch"),&["cache"],).unwrap(),
            cached_tokens: IntGaugeVec::new(Opts::new("cached_tokens", "Entries currently stored per cache"),&["cache"],).unwrap(),

            // Eviction
            cache_evictions: IntCounterVec::new(Opts::new("cache_evictions_total", "Caches cleared by the eviction sweep"),&["cache"],).unwrap(),
            cache_eviction_failures: IntCounterVec::new(Opts::new("cache_eviction_failures_total", "Caches skipped by the eviction sweep"),&["cache", "reason"],).unwrap(),

            // Config/runtime
            parse_failures: IntCounter::new("config_parse_failures_total","Config parse failures",).unwrap(),
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.upstream_fetch_requests.clone())).unwrap();
        reg.register(Box::new(metrics.upstream_fetch_failures.clone())).unwrap();
        reg.register(Box::new(metrics.upstream_fetch_duration.clone())).unwrap();
        reg.register(Box::new(metrics.cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.cache_misses.clone())).unwrap();
        reg.register(Box::new(metrics.cached_tokens.clone())).unwrap();
        reg.register(Box::new(metrics.cache_evictions.clone())).unwrap();
        reg.register(Box::new(metrics.cache_eviction_failures.clone())).unwrap();
        reg.register(Box::new(metrics.parse_failures.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
