//! Port definitions (trait abstractions) for external systems.
//!
//! # Design Rules
//!
//! - No `reqwest` or HTML-parser types in any signature
//! - Listing pages come back as text; callers parse them synchronously
//! - Every failure is reported as an `InstallError`

mod fetch;

pub use fetch::{ContentFetcher, HtmlFetcher};

#[cfg(test)]
pub use fetch::{MockContentFetcher, MockHtmlFetcher};
