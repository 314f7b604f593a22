//! Production fetch backend using reqwest with retry logic.

use async_trait::async_trait;
use scrapper_core::{ContentFetcher, HtmlFetcher, InstallError, InstallResult};
use tracing::{debug, warn};
use url::Url;

use crate::config::HttpClientConfig;
use crate::error::{HttpError, HttpResult};

/// HTTP backend implementing both fetch ports over one pooled client.
///
/// Transient failures (transport errors, 5xx, 429) are retried with
/// exponential backoff; other client errors fail on the first attempt.
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl ReqwestBackend {
    /// Create a backend with the given configuration.
    pub fn new(config: &HttpClientConfig) -> InstallResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| InstallError::FetchFailed {
                url: String::new(),
                status: None,
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch a URL and read its body, retrying transient errors.
    ///
    /// The body read is part of each attempt, so a connection dropped
    /// mid-body is retried like a failed request.
    async fn fetch_with_retry<T, F, Fut>(&self, url: &Url, read_body: F) -> HttpResult<T>
    where
        F: Fn(reqwest::Response) -> Fut + Send + Sync,
        Fut: Future<Output = reqwest::Result<T>> + Send,
    {
        let mut attempt: u8 = 0;
        debug!(url = %url, "Fetching");

        loop {
            let error = match self.client.get(url.as_str()).send().await {
                Ok(response) if response.status().is_success() => {
                    match read_body(response).await {
                        Ok(body) => return Ok(body),
                        Err(e) => HttpError::Network(e),
                    }
                }
                Ok(response) => HttpError::Status {
                    status: response.status().as_u16(),
                    url: url.to_string(),
                },
                Err(e) => HttpError::Network(e),
            };

            if !error.is_transient() || attempt >= self.config.max_retries {
                return Err(error);
            }

            attempt += 1;
            let delay = self.config.backoff(attempt);
            warn!(
                url = %url,
                attempt,
                max_retries = self.config.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "Transient fetch failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl HtmlFetcher for ReqwestBackend {
    async fn get_html(&self, url: &Url) -> InstallResult<String> {
        self.fetch_with_retry(url, reqwest::Response::text)
            .await
            .map_err(|e| e.into_install_error(url.as_str()))
    }
}

#[async_trait]
impl ContentFetcher for ReqwestBackend {
    async fn get_bytes(&self, url: &Url) -> InstallResult<Vec<u8>> {
        let bytes = self
            .fetch_with_retry(url, reqwest::Response::bytes)
            .await
            .map_err(|e| e.into_install_error(url.as_str()))?;
        Ok(bytes.to_vec())
    }
}
