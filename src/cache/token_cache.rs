use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::cache::registry::Evictable;
use crate::cache::token::Token;
use crate::errors::RelayError;
use crate::observability::metrics::get_metrics;
use crate::sources::TokenSource;

type FetchOutcome = Result<Token, RelayError>;
type InFlight = watch::Receiver<Option<FetchOutcome>>;

/// Cached token with its deadline.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Token,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: Token, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_live(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// key -> pending upstream fetch
    in_flight: HashMap<String, InFlight>,
}

/// Single-flight token cache in front of a [`TokenSource`].
///
/// A live entry is served without touching the upstream. On a miss the first
/// caller registers a fetch in the in-flight table and every concurrent caller
/// for the same key subscribes to it, so one upstream call answers all of them.
/// The fetch runs on its own task: a caller that gives up waiting does not
/// cancel it, and its result still lands in the cache.
pub struct TokenCache<S> {
    name: String,
    ttl: Duration,
    source: Arc<S>,
    state: Arc<Mutex<CacheState>>,
}

impl<S: TokenSource> TokenCache<S> {
    pub fn new(name: impl Into<String>, ttl: Duration, source: S) -> Self {
        Self {
            name: name.into(),
            ttl,
            source: Arc::new(source),
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the cached token for `key`, fetching it from upstream when absent or expired.
    pub async fn get(&self, key: &str) -> Result<Token, RelayError> {
        let metrics = get_metrics().await;

        let pending = {
            let mut state = self.state.lock();

            if let Some(entry) = state.entries.get(key) {
                if entry.is_live() {
                    metrics.cache_hits.with_label_values(&[&self.name]).inc();
                    debug!("cache '{}' hit for key '{}'", self.name, key);
                    return Ok(entry.value.clone());
                }
            }
            if state.entries.remove(key).is_some() {
                debug!("cache '{}' entry for key '{}' expired", self.name, key);
                metrics.cached_tokens.with_label_values(&[&self.name]).set(state.entries.len() as i64);
            }

            metrics.cache_misses.with_label_values(&[&self.name]).inc();
            let joined = state.in_flight.get(key).cloned();
            match joined {
                Some(pending) => {
                    debug!("cache '{}' joins in-flight fetch for key '{}'", self.name, key);
                    pending
                }
                None => self.spawn_fetch(key, &mut state),
            }
        };

        wait_for_outcome(pending).await
    }

    /// Drop every entry. In-flight fetches keep running and may repopulate the cache.
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        let removed = state.entries.len();
        state.entries.clear();
        removed
    }

    /// Number of stored entries, live or not.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn spawn_fetch(&self, key: &str, state: &mut CacheState) -> InFlight {
        let (tx, rx) = watch::channel(None);
        state.in_flight.insert(key.to_owned(), rx.clone());

        let key = key.to_owned();
        let name = self.name.clone();
        let ttl = self.ttl;
        let source = self.source.clone();
        let shared = self.state.clone();

        info!("cache '{}' fetching key '{}' from upstream", name, key);
        tokio::spawn(async move {
            // a panicking source must still release the in-flight slot
            let outcome = match tokio::spawn(async move { source.fetch_token().await }).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("cache '{}' upstream fetch for key '{}' aborted: {}", name, key, e);
                    Err(RelayError::upstream(format!("upstream fetch aborted: {}", e)))
                }
            };
            let metrics = get_metrics().await;
            {
                let mut state = shared.lock();
                state.in_flight.remove(&key);
                if let Ok(token) = &outcome {
                    state.entries.insert(key.clone(), CacheEntry::new(token.clone(), ttl));
                    metrics.cached_tokens.with_label_values(&[&name]).set(state.entries.len() as i64);
                    debug!("cache '{}' stored key '{}' for {:?}", name, key, ttl);
                }
            }
            // all waiters may have gone away, the entry is stored regardless
            let _ = tx.send(Some(outcome));
        });

        rx
    }
}

impl<S: TokenSource> Evictable for TokenCache<S> {
    fn cache_name(&self) -> &str {
        &self.name
    }

    fn evict(&self) -> Result<usize, RelayError> {
        Ok(self.clear())
    }
}

async fn wait_for_outcome(mut pending: InFlight) -> FetchOutcome {
    let dropped = || RelayError::upstream("in-flight fetch ended without a result");
    match pending.wait_for(Option::is_some).await {
        Ok(outcome) => outcome.clone().unwrap_or_else(|| Err(dropped())),
        Err(_) => Err(dropped()),
    }
}
