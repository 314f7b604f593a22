//! reqwest-backed implementation of the `scrapper-core` fetch ports.
//!
//! One [`ReqwestBackend`] serves both listing pages ([`HtmlFetcher`]) and raw
//! file or archive bytes ([`ContentFetcher`]); share it behind an `Arc` so all
//! fetches reuse one connection pool.
//!
//! [`HtmlFetcher`]: scrapper_core::HtmlFetcher
//! [`ContentFetcher`]: scrapper_core::ContentFetcher
#![deny(unused_crate_dependencies)]

mod backend;
mod config;
mod error;

// ============================================================================
// Public API
// ============================================================================

pub use backend::ReqwestBackend;
pub use config::HttpClientConfig;

// Silence unused dev-dependency warnings
#[cfg(test)]
use wiremock as _;
