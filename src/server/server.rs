use std::future::Future;

use anyhow::{Context, Result};
use axum::Router;
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::token_route::TokenRouteState;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub token_state: TokenRouteState,
}

impl AppState {
    pub fn new(metrics: &Metrics, token_state: TokenRouteState) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            token_state,
        }
    }
}

/// Token route plus the optional metrics route, with state attached.
pub fn router(settings_config: &SettingsConfig, state: AppState) -> Router {
    Router::new()
        .merge(state.token_state.router(&settings_config.server.token_path))
        .merge(state.metrics_state.router(&settings_config.metrics))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn start(
    settings_config: &SettingsConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let metrics = get_metrics().await;
    let app = router(settings_config, state);

    let bind_addr = &settings_config.server.host;
    let port = &settings_config.server.port;
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port))
        .await
        .with_context(|| format!("failed to bind {}:{}", bind_addr, port))?;
    info!("address: {}, port: {}", bind_addr, port);

    metrics.up.set(1);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("http server failed");
    metrics.up.set(0);

    served
}
