//! Network module
use crate::config::CONFIG;
use crate::error::{Result, VkError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode, Url};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, trace, warn};

/// Sends prepared API requests and hands back the raw body
///
/// [`ConnectionPool`] is the production implementation. Anything else
/// (a proxy, a recording stub in tests) can be plugged into
/// [`ApiBuilder::transport`](crate::api::ApiBuilder::transport).
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn get_text(&self, url: Url) -> Result<String>;
}

/// Connection pool for managing HTTP connections
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    client: Client,
    retries: usize,
    min_backoff: Duration,
    max_backoff: Duration,
}

impl ConnectionPool {
    /// Create a new connection pool with custom settings
    pub fn new(client: Client, retries: usize, max_backoff: Duration) -> Self {
        Self {
            client,
            retries,
            min_backoff: Duration::ZERO,
            max_backoff,
        }
    }

    /// Create a connection pool with timeouts and pool sizes from [`CONFIG`]
    pub fn optimized() -> Self {
        let cfg = &CONFIG.network;
        let client = build_optimized_client().unwrap_or_else(|e| {
            warn!(
                "Failed to build optimized client. Use default instead: {}",
                e
            );
            Client::new()
        });

        Self {
            client,
            retries: cfg.retries,
            min_backoff: Duration::ZERO,
            max_backoff: Duration::from_millis(cfg.max_backoff_ms),
        }
    }

    /// Never retry sooner than `delay` after a failed attempt.
    /// [`ApiBuilder`](crate::api::ApiBuilder) sets it to the request delay of
    /// the token owner, so retries keep VK's spacing for this client
    pub fn with_min_backoff(mut self, delay: Duration) -> Self {
        self.min_backoff = delay;
        self
    }

    pub fn retries(&self) -> usize {
        self.retries
    }

    pub fn min_backoff(&self) -> Duration {
        self.min_backoff
    }

    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// Execute a request with exponential backoff retry strategy
    pub async fn execute_with_retry<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: std::future::Future<Output = Result<T>> + Send,
        T: Send,
    {
        let min_backoff_ms = self.min_backoff.as_millis() as u64;
        let mut retries = 0;
        let mut backoff_ms = min_backoff_ms.max(100);

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(VkError::Network(req_err)) => {
                    if !should_retry(&req_err) || retries >= self.retries {
                        return Err(VkError::Network(req_err));
                    }

                    retries += 1;
                    let jitter = rand::random::<u64>() % 100;
                    let delay = Duration::from_millis(backoff_ms + jitter);

                    warn!(
                        "Request failed, retrying ({}/{}): {} after {:?}",
                        retries, self.retries, req_err, delay
                    );

                    sleep(delay).await;
                    backoff_ms = std::cmp::min(backoff_ms * 2, self.max_backoff.as_millis() as u64)
                        .max(min_backoff_ms);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl Transport for ConnectionPool {
    /// Get text response from API with retry capability
    #[tracing::instrument(skip(self, url), fields(path = url.path()))]
    async fn get_text(&self, url: Url) -> Result<String> {
        debug!("Getting response from API...");

        self.execute_with_retry(|| {
            let client = self.client.clone();
            let url = url.clone();

            async move {
                // reqwest errors carry the URL, and the URL carries the token
                let response = client.get(url).send().await.map_err(|e| e.without_url())?;
                let status = response.status();
                trace!("Response status: {}", status);

                if status.is_server_error() {
                    // A status error is a `Network` error, which the retry loop picks up
                    warn!("Server error: {}", status);
                    response.error_for_status_ref().map_err(|e| e.without_url())?;
                }
                validate_response(&status)?;

                let text = response.text().await.map_err(|e| e.without_url())?;
                trace!("Response body length: {} bytes", text.len());
                Ok(text)
            }
        })
        .await
    }
}

/// Validate HTTP response status
pub(crate) fn validate_response(status: &StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else if status.is_server_error() {
        warn!("Server error: {}", status);
        Err(VkError::System(format!("Server error: HTTP {}", status)))
    } else if status.is_client_error() {
        error!("Client error: {}", status);
        Err(VkError::Validation(format!("HTTP error: {}", status)))
    } else {
        warn!("Unexpected status code: {}", status);
        Err(VkError::System(format!(
            "Unexpected HTTP status code: {}",
            status
        )))
    }
}

/// Determine if the request should be retried based on the error
fn should_retry(err: &reqwest::Error) -> bool {
    err.is_timeout()
        || err.is_connect()
        || err.is_request()
        || (err.status().is_some_and(|s| s.is_server_error()))
}

/// Build a client with timeouts and pool sizes from [`CONFIG`]
fn build_optimized_client() -> Result<Client> {
    let cfg = &CONFIG.network;
    let builder = ClientBuilder::new()
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .pool_idle_timeout(Duration::from_secs(cfg.pool_idle_timeout_secs))
        .tcp_nodelay(true)
        .pool_max_idle_per_host(cfg.max_idle_connections)
        .use_rustls_tls();

    builder.build().map_err(VkError::Network)
}
