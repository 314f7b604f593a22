//! Core domain types and port definitions for the scrapper installer.
//!
//! This crate owns the vocabulary shared by the tree walker, the mirror
//! writer and the webdriver resolver:
//!
//! - [`RemoteLocation`]: a file or directory inside a GitHub-hosted repository
//! - [`DiscoveredFiles`]: the deduplicated result of a recursive tree walk
//! - [`HtmlFetcher`] / [`ContentFetcher`]: the network ports adapters implement
//! - [`InstallError`]: the domain-level error every adapter maps into
//!
//! It has no HTTP or HTML-parsing dependencies; those live in the adapter
//! crates.
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod ports;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use domain::{
    DEFAULT_BRANCH, DiscoveredFiles, EntryKind, LISTING_HOST, RAW_HOST, RemoteLocation,
};
pub use error::{InstallError, InstallResult};
pub use ports::{ContentFetcher, HtmlFetcher};
pub use settings::{
    DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RETRY_BASE_DELAY_MS, Settings, SettingsError, validate_settings,
};

// Silence unused dev-dependency warnings
#[cfg(test)]
use mockall as _;
