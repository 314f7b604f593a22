//! Installer settings and validation.
//!
//! Settings are plain data: the orchestrator loads them however it likes and
//! passes them to the config builders of each component. Nothing here is
//! process-wide.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default bound on concurrent requests of one walk or mirror pass.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Default number of retries for transient fetch failures.
pub const DEFAULT_MAX_RETRIES: u8 = 3;

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default base delay for exponential backoff, in milliseconds.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

/// Upper bound accepted for `max_concurrency`.
const MAX_CONCURRENCY_LIMIT: usize = 64;

/// Errors from loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A field has an out-of-range or empty value.
    #[error("Invalid setting '{field}': {reason}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// The settings document could not be parsed.
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Installer settings.
///
/// All fields are optional so partial documents load; `effective_*`
/// accessors apply the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Maximum concurrent listing fetches / downloads (1-64).
    pub max_concurrency: Option<usize>,

    /// Retries for transient fetch failures.
    pub max_retries: Option<u8>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,

    /// Base delay for exponential backoff in milliseconds.
    pub retry_base_delay_ms: Option<u64>,

    /// User agent sent with every request.
    pub user_agent: Option<String>,

    /// CSS selector marking repository entry links on listing pages.
    pub entry_selector: Option<String>,

    /// Compatibility page overrides keyed by driver binary name (`chromedriver`).
    pub compatibility_pages: BTreeMap<String, String>,
}

impl Settings {
    /// Create settings with every default filled in.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            max_concurrency: Some(DEFAULT_MAX_CONCURRENCY),
            max_retries: Some(DEFAULT_MAX_RETRIES),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry_base_delay_ms: Some(DEFAULT_RETRY_BASE_DELAY_MS),
            user_agent: None,
            entry_selector: None,
            compatibility_pages: BTreeMap::new(),
        }
    }

    /// Parse and validate a JSON settings document.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Get the effective concurrency bound (with default fallback).
    #[must_use]
    pub fn effective_max_concurrency(&self) -> usize {
        self.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY)
    }

    /// Get the effective retry count (with default fallback).
    #[must_use]
    pub fn effective_max_retries(&self) -> u8 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    /// Get the effective request timeout in seconds (with default fallback).
    #[must_use]
    pub fn effective_request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    /// Get the effective backoff base delay in milliseconds (with default fallback).
    #[must_use]
    pub fn effective_retry_base_delay_ms(&self) -> u64 {
        self.retry_base_delay_ms
            .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS)
    }
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(concurrency) = settings.max_concurrency {
        if concurrency == 0 || concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(SettingsError::InvalidValue {
                field: "max_concurrency",
                reason: format!("must be between 1 and {MAX_CONCURRENCY_LIMIT}, got {concurrency}"),
            });
        }
    }

    if settings.request_timeout_secs == Some(0) {
        return Err(SettingsError::InvalidValue {
            field: "request_timeout_secs",
            reason: "must be greater than zero".to_string(),
        });
    }

    if let Some(ref agent) = settings.user_agent {
        if agent.trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                field: "user_agent",
                reason: "must not be empty".to_string(),
            });
        }
    }

    if let Some(ref selector) = settings.entry_selector {
        if selector.trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                field: "entry_selector",
                reason: "must not be empty".to_string(),
            });
        }
    }

    for (driver, page) in &settings.compatibility_pages {
        let valid = Url::parse(page).is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
        if !valid {
            return Err(SettingsError::InvalidValue {
                field: "compatibility_pages",
                reason: format!("page for {driver} is not an http(s) URL: {page}"),
            });
        }
    }

    Ok(())
}
