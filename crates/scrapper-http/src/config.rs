//! Public configuration for the HTTP backend.

use std::time::Duration;

use scrapper_core::Settings;

/// Configuration for [`ReqwestBackend`](crate::ReqwestBackend).
///
/// # Example
///
/// ```
/// use scrapper_http::HttpClientConfig;
/// use std::time::Duration;
///
/// let config = HttpClientConfig::new()
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("scrapper-installer/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Request timeout
    pub(crate) timeout: Duration,
    /// Maximum number of retry attempts for transient errors
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff
    pub(crate) retry_base_delay: Duration,
    /// Upper bound for a single backoff delay
    pub(crate) retry_max_delay: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("scrapper-http/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(scrapper_core::DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retries: scrapper_core::DEFAULT_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(scrapper_core::DEFAULT_RETRY_BASE_DELAY_MS),
            retry_max_delay: Duration::from_secs(30),
        }
    }
}

impl HttpClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a configuration from installer settings.
    ///
    /// Unset fields keep their defaults.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let mut config = Self::new()
            .with_timeout(Duration::from_secs(
                settings.effective_request_timeout_secs(),
            ))
            .with_max_retries(settings.effective_max_retries())
            .with_retry_delay(Duration::from_millis(
                settings.effective_retry_base_delay_ms(),
            ));
        if let Some(ref agent) = settings.user_agent {
            config = config.with_user_agent(agent.clone());
        }
        config
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retry attempts for transient errors.
    ///
    /// Defaults to 3 retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff retries.
    ///
    /// Defaults to 500ms.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Cap a single backoff delay.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_max_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_max_delay = delay;
        self
    }

    /// Backoff before retry number `attempt` (1-based): `base * 2^(attempt-1)`, capped.
    pub(crate) fn backoff(&self, attempt: u8) -> Duration {
        let exponent = u32::from(attempt.saturating_sub(1));
        let factor = 2u32.saturating_pow(exponent);
        self.retry_base_delay
            .saturating_mul(factor)
            .min(self.retry_max_delay)
    }
}
