use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::{info, warn};

use crate::cache::token_cache::TokenCache;
use crate::errors::RelayError;
use crate::server::server::AppState;
use crate::sources::http::HttpTokenSource;

#[derive(Clone)]
pub struct TokenRouteState {
    cache: Arc<TokenCache<HttpTokenSource>>,
    key: String,
}

impl TokenRouteState {
    pub fn new(cache: Arc<TokenCache<HttpTokenSource>>, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    pub fn router(&self, path: &str) -> Router<AppState> {
        info!("served path: {}", path);
        Router::new().route(path, get(handle_get_token))
    }
}

/// `GET token`: the cached token, or an explicit failure when the upstream is down.
async fn handle_get_token(State(state): State<AppState>) -> Response {
    let route = &state.token_state;
    match route.cache.get(&route.key).await {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(err) => {
            warn!("token request failed: {}", err);
            (status_for(&err), Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

fn status_for(err: &RelayError) -> StatusCode {
    match err {
        RelayError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
        RelayError::NoSuchCache { .. } | RelayError::ClearFailed { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
