// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::cache::registry::Evictable;
use crate::cache::token::Token;
use crate::errors::RelayError;
use crate::sources::TokenSource;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Base URL of a local port nothing listens on.
pub async fn refused_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// In-process upstream: counts calls, answers after `delay`, fails while `failing` is set.
/// Every successful fetch carries its call number in `access_token`.
#[derive(Clone)]
pub struct StubSource {
    pub calls: Arc<AtomicUsize>,
    pub failing: Arc<AtomicBool>,
    pub delay: Duration,
}

impl StubSource {
    pub fn new(delay: Duration) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            failing: Arc::new(AtomicBool::new(false)),
            delay,
        }
    }

    pub fn failing(delay: Duration) -> Self {
        let source = Self::new(delay);
        source.failing.store(true, Ordering::SeqCst);
        source
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenSource for StubSource {
    async fn fetch_token(&self) -> Result<Token, RelayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(RelayError::upstream("connection refused"));
        }
        Ok(Token::new("id", format!("access-{}", n), "bearer"))
    }
}

/// Panics on its first call, then behaves like a healthy upstream.
#[derive(Clone, Default)]
pub struct PanicOnceSource {
    pub calls: Arc<AtomicUsize>,
}

impl TokenSource for PanicOnceSource {
    async fn fetch_token(&self) -> Result<Token, RelayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n == 1 {
            panic!("upstream client crashed");
        }
        Ok(Token::new("id", format!("access-{}", n), "bearer"))
    }
}

/// Counts calls made through any other source.
pub struct Counted<S> {
    pub inner: S,
    pub calls: Arc<AtomicUsize>,
}

impl<S> Counted<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl<S: TokenSource> TokenSource for Counted<S> {
    async fn fetch_token(&self) -> Result<Token, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_token().await
    }
}

/// Cache that always refuses to clear.
pub struct BrokenCache {
    pub name: String,
}

impl Evictable for BrokenCache {
    fn cache_name(&self) -> &str {
        &self.name
    }

    fn evict(&self) -> Result<usize, RelayError> {
        Err(RelayError::ClearFailed {
            name: self.name.clone(),
            reason: "backing store unavailable".to_owned(),
        })
    }
}
