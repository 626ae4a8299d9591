// Full relay: upstream mocked with httpmock, relay served by axum on an
// ephemeral port, requests sent with reqwest.

#[cfg(test)]
mod test {

    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use http::StatusCode;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::Value;

    use crate::app::Relay;
    use crate::cache::token::Token;
    use crate::cache::token_cache::TokenCache;
    use crate::config::service::ServiceConfig;
    use crate::config::upstream::UpstreamConfig;
    use crate::errors::RelayError;
    use crate::server::server::router;
    use crate::sources::http::HttpTokenSource;
    use crate::tests::common::{build_reqwest_client, json, refused_base_url, spawn_axum, Counted};
    use crate::utils::constants::TOKEN_CACHE_KEY;

    fn relay_config(base_url: String) -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.upstream.base_url = base_url;
        config.settings.metrics.is_enabled = true;
        config
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn get_token_route_serves_cached_upstream_token() -> anyhow::Result<()> {
        let upstream = MockServer::start_async().await;
        let mock = upstream
            .mock_async(|when, then| {
                when.method(GET).path("/token");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"idToken": "a", "accessToken": "b", "authType": "bearer"}));
            })
            .await;

        let config = relay_config(upstream.base_url());
        let relay = Relay::build(&config)?;
        let app = router(&config.settings, relay.app_state().await);
        let (handle, addr) = spawn_axum(app).await;
        let client = build_reqwest_client();

        let url = format!("http://{}{}", addr, config.settings.server.token_path);
        for _ in 0..3 {
            let response = client.get(&url).send().await?;
            assert_eq!(response.status(), StatusCode::OK);
            let token: Token = response.json().await?;
            assert_eq!(token, Token::new("a", "b", "bearer"));
        }
        mock.assert_calls_async(1).await;

        handle.abort();
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn get_token_route_reports_upstream_failure() -> anyhow::Result<()> {
        let upstream = MockServer::start_async().await;
        let mock = upstream
            .mock_async(|when, then| {
                when.method(GET).path("/token");
                then.status(500).body("boom");
            })
            .await;

        let config = relay_config(upstream.base_url());
        let relay = Relay::build(&config)?;
        let app = router(&config.settings, relay.app_state().await);
        let (handle, addr) = spawn_axum(app).await;
        let client = build_reqwest_client();

        let url = format!("http://{}{}", addr, config.settings.server.token_path);
        for _ in 0..2 {
            let response = client.get(&url).send().await?;
            assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
            let body: Value = response.json().await?;
            assert!(body["error"].as_str().unwrap_or_default().starts_with("upstream unavailable"));
        }
        // no negative caching: every request went upstream
        mock.assert_calls_async(2).await;

        handle.abort();
        Ok(())
    }

    #[tokio::test]
    async fn connection_refused_is_retried_on_next_get() -> anyhow::Result<()> {
        let upstream = UpstreamConfig {
            base_url: refused_base_url().await,
            ..UpstreamConfig::default()
        };
        let source = Counted::new(HttpTokenSource::from_config(&upstream)?);
        let calls = source.calls.clone();
        let cache = TokenCache::new("token", Duration::from_secs(60), source);

        let first = cache.get(TOKEN_CACHE_KEY).await;
        assert!(matches!(first, Err(RelayError::UpstreamUnavailable { .. })));
        let second = cache.get(TOKEN_CACHE_KEY).await;
        assert!(matches!(second, Err(RelayError::UpstreamUnavailable { .. })));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn eviction_through_relay_registry_forces_refetch() -> anyhow::Result<()> {
        let upstream = MockServer::start_async().await;
        let mock = upstream
            .mock_async(|when, then| {
                when.method(GET).path("/token");
                then.status(200)
                    .json_body(json!({"idToken": "a", "accessToken": "b", "authType": "bearer"}));
            })
            .await;

        let relay = Relay::build(&relay_config(upstream.base_url()))?;
        assert_eq!(relay.registry.cache_names(), vec!["token".to_owned()]);

        relay.cache.get(TOKEN_CACHE_KEY).await?;
        relay.registry.evict_all().await;
        relay.cache.get(TOKEN_CACHE_KEY).await?;

        mock.assert_calls_async(2).await;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn metrics_route_exposes_relay_metrics() -> anyhow::Result<()> {
        let config = relay_config(refused_base_url().await);
        let relay = Relay::build(&config)?;
        let app = router(&config.settings, relay.app_state().await);
        let (handle, addr) = spawn_axum(app).await;
        let client = build_reqwest_client();

        let token_url = format!("http://{}{}", addr, config.settings.server.token_path);
        let response = client.get(&token_url).send().await?;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let metrics_url = format!("http://{}{}", addr, config.settings.metrics.path);
        let response = client.get(&metrics_url).send().await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.text().await?;
        assert!(body.contains("tokenrelay_upstream_fetch_requests_total"));
        assert!(body.contains("tokenrelay_upstream_fetch_failures_total"));

        handle.abort();
        Ok(())
    }
}
