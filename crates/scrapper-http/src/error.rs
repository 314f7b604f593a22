//! Internal error types for HTTP fetches.
//!
//! These errors are internal to `scrapper-http` and are mapped to
//! [`InstallError::FetchFailed`] at the port boundary.

use scrapper_core::InstallError;
use thiserror::Error;

/// Result type alias for HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors from a single HTTP exchange.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The server answered with a non-success status.
    #[error("request failed with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// Network or HTTP client error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HttpError {
    /// Check if another attempt may succeed: transport errors, 5xx and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Network(e) => !e.is_builder() && !e.is_redirect() && !e.is_decode(),
        }
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
        }
    }

    /// Convert into the domain error for `url`.
    pub fn into_install_error(self, url: &str) -> InstallError {
        InstallError::FetchFailed {
            url: url.to_string(),
            status: self.status(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> HttpError {
        HttpError::Status {
            status: code,
            url: "https://github.com/acme/repo".to_string(),
        }
    }

    #[test]
    fn test_server_errors_and_throttling_are_transient() {
        assert!(status(500).is_transient());
        assert!(status(503).is_transient());
        assert!(status(429).is_transient());
    }

    #[test]
    fn test_client_errors_are_not_transient() {
        assert!(!status(404).is_transient());
        assert!(!status(403).is_transient());
        assert!(!status(400).is_transient());
    }

    #[test]
    fn test_maps_to_fetch_failed() {
        let err = status(404).into_install_error("https://github.com/acme/repo");
        match err {
            InstallError::FetchFailed {
                url,
                status,
                message,
            } => {
                assert_eq!(url, "https://github.com/acme/repo");
                assert_eq!(status, Some(404));
                assert!(message.contains("404"));
            }
            other => panic!("expected FetchFailed, got {other:?}"),
        }
    }
}
