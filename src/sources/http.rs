use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{error, info};

use crate::cache::token::Token;
use crate::config::upstream::UpstreamConfig;
use crate::errors::RelayError;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::sources::TokenSource;

static TRANSPORT_MSG: &str = "transport";
static STATUS_MSG: &str = "status";
static DECODE_MSG: &str = "decode";

/// Upstream client: `GET {base_url}{path}` decoded into a [`Token`].
#[derive(Debug, Clone)]
pub struct HttpTokenSource {
    client: Client,
    url: String,
}

impl HttpTokenSource {
    pub fn new(client: Client, upstream: &UpstreamConfig) -> Self {
        Self {
            client,
            url: token_url(&upstream.base_url, &upstream.path),
        }
    }

    /// Build with its own client honouring `timeout_ms`.
    pub fn from_config(upstream: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(upstream.timeout_ms))
            .build()
            .context("failed to build upstream HTTP client")?;
        Ok(Self::new(client, upstream))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TokenSource for HttpTokenSource {
    async fn fetch_token(&self) -> Result<Token, RelayError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.upstream_fetch_requests.inc();

        let result = request_token(&self.client, &self.url).await;
        metrics.upstream_fetch_duration.observe(start.elapsed().as_secs_f64());

        match result {
            Ok(token) => {
                info!("upstream response: SUCCESS");
                Ok(token)
            }
            Err((reason, err)) => {
                error!("upstream response: ERROR {}", err);
                metrics.upstream_fetch_failures.with_label_values(&[reason]).inc();
                Err(err)
            }
        }
    }
}

async fn request_token(client: &Client, url: &str) -> Result<Token, (&'static str, RelayError)> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| (TRANSPORT_MSG, RelayError::upstream(format!("request to {} failed: {}", url, e))))?;

    let status = response.status();
    if !status.is_success() {
        return Err((STATUS_MSG, RelayError::upstream(format!("{} returned {}", url, status))));
    }

    response
        .json::<Token>()
        .await
        .map_err(|e| (DECODE_MSG, RelayError::upstream(format!("malformed token body from {}: {}", url, e))))
}

fn token_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
