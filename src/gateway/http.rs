//! HTTP Gateway
//!
//! Fetches a JSON array of records from a single endpoint with reqwest.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::time::Duration;

use super::{Gateway, GatewayError, GatewayResult};

/// Configuration for one HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Name used in logs (e.g. "crypto")
    pub name: String,
    /// Full URL of the endpoint returning a JSON array
    pub url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum attempts per fetch (at least one is always made)
    pub max_attempts: u32,
    /// Base delay between attempts; attempt `n` waits `n^2 * base`
    pub retry_backoff_ms: u64,
}

impl HttpGatewayConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Default::default()
        }
    }
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        Self {
            name: "gateway".to_string(),
            url: "http://localhost:3000/api".to_string(),
            request_timeout_ms: 10_000,
            max_attempts: 2,
            retry_backoff_ms: 1000,
        }
    }
}

/// Gateway backed by a JSON-over-HTTP endpoint
pub struct HttpGateway<T> {
    client: Client,
    config: HttpGatewayConfig,
    _record: PhantomData<fn() -> T>,
}

impl<T> HttpGateway<T> {
    /// Create a new gateway with the given configuration
    pub fn new(config: HttpGatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            config,
            _record: PhantomData,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &HttpGatewayConfig {
        &self.config
    }
}

impl<T: DeserializeOwned> HttpGateway<T> {
    /// One GET round trip, no retries
    async fn fetch_once(&self) -> GatewayResult<Vec<T>> {
        let response = self
            .client
            .get(&self.config.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(GatewayError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(GatewayError::from_transport)?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl<T> Gateway<T> for HttpGateway<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch(&self) -> GatewayResult<Vec<T>> {
        let attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = self.config.retry_backoff_ms * (attempt as u64).pow(2);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            attempt += 1;

            match self.fetch_once().await {
                Ok(records) => {
                    tracing::debug!(
                        gateway = %self.config.name,
                        records = records.len(),
                        attempt,
                        "Gateway fetch succeeded"
                    );
                    return Ok(records);
                }
                Err(e) if e.is_transient() && attempt < attempts => {
                    tracing::warn!(
                        gateway = %self.config.name,
                        attempt,
                        error = %e,
                        "Gateway fetch failed, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CryptoRecord;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn test_config(url: String) -> HttpGatewayConfig {
        HttpGatewayConfig {
            name: "crypto".to_string(),
            url,
            request_timeout_ms: 2000,
            max_attempts: 1,
            retry_backoff_ms: 1,
        }
    }

    #[test]
    fn test_default_config() {
        let config = HttpGatewayConfig::default();
        assert_eq!(config.request_timeout_ms, 10_000);
        assert_eq!(config.max_attempts, 2);

        let config = HttpGatewayConfig::new("news", "http://example.com/news");
        assert_eq!(config.name, "news");
        assert_eq!(config.url, "http://example.com/news");
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let router = Router::new().route(
            "/crypto",
            get(|| async {
                Json(vec![CryptoRecord::new("bitcoin", "Bitcoin", "BTC")
                    .price(50000.0)
                    .change_24h(2.5)])
            }),
        );
        let base = spawn_server(router).await;

        let gateway: HttpGateway<CryptoRecord> =
            HttpGateway::new(test_config(format!("{}/crypto", base))).unwrap();
        let records = gateway.fetch().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "bitcoin");
        assert_eq!(records[0].price, 50000.0);
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let router = Router::new().route(
            "/crypto",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
        );
        let base = spawn_server(router).await;

        let gateway: HttpGateway<CryptoRecord> =
            HttpGateway::new(test_config(format!("{}/crypto", base))).unwrap();
        let err = gateway.fetch().await.unwrap_err();

        match err {
            GatewayError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let router = Router::new().route("/crypto", get(|| async { "not json" }));
        let base = spawn_server(router).await;

        let gateway: HttpGateway<CryptoRecord> =
            HttpGateway::new(test_config(format!("{}/crypto", base))).unwrap();
        let err = gateway.fetch().await.unwrap_err();

        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/crypto",
            get(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err((StatusCode::SERVICE_UNAVAILABLE, "warming up"))
                    } else {
                        Ok(Json(vec![CryptoRecord::new("ethereum", "Ethereum", "ETH")]))
                    }
                }
            }),
        );
        let base = spawn_server(router).await;

        let mut config = test_config(format!("{}/crypto", base));
        config.max_attempts = 3;
        let gateway: HttpGateway<CryptoRecord> = HttpGateway::new(config).unwrap();
        let records = gateway.fetch().await.unwrap();

        assert_eq!(records[0].id, "ethereum");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_max_attempts_counts_the_first_request() {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/crypto",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::SERVICE_UNAVAILABLE, "still down")
                }
            }),
        );
        let base = spawn_server(router).await;

        let mut config = test_config(format!("{}/crypto", base));
        config.max_attempts = 2;
        let gateway: HttpGateway<CryptoRecord> = HttpGateway::new(config).unwrap();
        let err = gateway.fetch().await.unwrap_err();

        assert!(matches!(err, GatewayError::Status { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
