//! In-memory fetchers for tests.
//!
//! Enabled for this crate's own tests and, through the `test-utils` feature,
//! for sibling crates' tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{InstallError, InstallResult};
use crate::ports::{ContentFetcher, HtmlFetcher};

/// Canned response for one URL.
#[derive(Debug, Clone)]
pub enum CannedResponse {
    /// Text body
    Html(String),
    /// Binary body
    Bytes(Vec<u8>),
    /// Fail with the given HTTP status
    Failure(u16),
}

/// A fake fetcher serving canned responses keyed by exact URL.
///
/// Unknown URLs fail with a 404 `FetchFailed`. Every request is recorded, and
/// the highest number of overlapping requests is tracked so tests can check
/// concurrency bounds.
#[derive(Debug, Default)]
pub struct FakeFetcher {
    responses: Mutex<HashMap<String, CannedResponse>>,
    requests: Mutex<Vec<String>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeFetcher {
    /// Create a fetcher with no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    #[must_use]
    pub fn with_html(self, url: &str, html: impl Into<String>) -> Self {
        self.insert(url, CannedResponse::Html(html.into()));
        self
    }

    /// Serve `bytes` for `url`.
    #[must_use]
    pub fn with_bytes(self, url: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(url, CannedResponse::Bytes(bytes.into()));
        self
    }

    /// Fail requests for `url` with `status`.
    #[must_use]
    pub fn with_failure(self, url: &str, status: u16) -> Self {
        self.insert(url, CannedResponse::Failure(status));
        self
    }

    /// Delay every response by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Replace or add a response after construction.
    pub fn insert(&self, url: &str, response: CannedResponse) {
        let key = normalize(url);
        self.responses
            .lock()
            .expect("fake fetcher lock poisoned")
            .insert(key, response);
    }

    /// All requested URLs, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("fake fetcher lock poisoned")
            .clone()
    }

    /// How many times `url` was requested.
    pub fn request_count(&self, url: &str) -> usize {
        let key = normalize(url);
        self.requests().iter().filter(|r| **r == key).count()
    }

    /// Highest number of requests that were in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn respond(&self, url: &Url) -> InstallResult<CannedResponse> {
        let key = url.to_string();
        self.requests
            .lock()
            .expect("fake fetcher lock poisoned")
            .push(key.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let response = self
            .responses
            .lock()
            .expect("fake fetcher lock poisoned")
            .get(&key)
            .cloned();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match response {
            Some(CannedResponse::Failure(status)) => Err(failure(url, status)),
            Some(response) => Ok(response),
            None => Err(failure(url, 404)),
        }
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url).map_or_else(|_| url.to_string(), |u| u.to_string())
}

fn failure(url: &Url, status: u16) -> InstallError {
    InstallError::FetchFailed {
        url: url.to_string(),
        status: Some(status),
        message: format!("canned HTTP {status}"),
    }
}

#[async_trait]
impl HtmlFetcher for FakeFetcher {
    async fn get_html(&self, url: &Url) -> InstallResult<String> {
        match self.respond(url).await? {
            CannedResponse::Html(html) => Ok(html),
            CannedResponse::Bytes(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            CannedResponse::Failure(status) => Err(failure(url, status)),
        }
    }
}

#[async_trait]
impl ContentFetcher for FakeFetcher {
    async fn get_bytes(&self, url: &Url) -> InstallResult<Vec<u8>> {
        match self.respond(url).await? {
            CannedResponse::Html(html) => Ok(html.into_bytes()),
            CannedResponse::Bytes(bytes) => Ok(bytes),
            CannedResponse::Failure(status) => Err(failure(url, status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_fetcher_returns_canned_response() {
        let fetcher = FakeFetcher::new().with_html("https://example.com/page", "<p>hi</p>");
        let url = Url::parse("https://example.com/page").unwrap();

        assert_eq!(fetcher.get_html(&url).await.unwrap(), "<p>hi</p>");
        assert_eq!(fetcher.request_count("https://example.com/page"), 1);
    }

    #[tokio::test]
    async fn test_fake_fetcher_unknown_url_is_404() {
        let fetcher = FakeFetcher::new();
        let url = Url::parse("https://example.com/missing").unwrap();

        assert!(matches!(
            fetcher.get_bytes(&url).await,
            Err(InstallError::FetchFailed {
                status: Some(404),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_fake_fetcher_failure() {
        let fetcher = FakeFetcher::new().with_failure("https://example.com/down", 503);
        let url = Url::parse("https://example.com/down").unwrap();

        assert!(matches!(
            fetcher.get_html(&url).await,
            Err(InstallError::FetchFailed {
                status: Some(503),
                ..
            })
        ));
    }
}
