//! Mirroring of GitHub-hosted source trees onto local disk.
//!
//! A [`TreeWalker`] discovers every file below a repository directory by
//! following entry links on listing pages; a [`MirrorWriter`] fetches each
//! file's raw content and writes it below a destination root.
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use scrapper_core::{ContentFetcher, HtmlFetcher, InstallResult, RemoteLocation};
//! use scrapper_github::{MirrorConfig, MirrorWriter, TreeWalker, mirror_tree};
//!
//! async fn install<F>(fetcher: Arc<F>) -> InstallResult<()>
//! where
//!     F: HtmlFetcher + ContentFetcher + 'static,
//! {
//!     let config = MirrorConfig::new();
//!     let walker = TreeWalker::new(fetcher.clone(), &config)?;
//!     let writer = MirrorWriter::new(fetcher, &config);
//!
//!     // Files land at `package/<path within the repository>`
//!     let root = RemoteLocation::parse("https://github.com/InternetStalker/scrapper")?;
//!     let report = mirror_tree(&walker, &writer, &root, Path::new("package")).await?;
//!     report.into_result()?;
//!     Ok(())
//! }
//! ```
#![deny(unused_crate_dependencies)]

mod config;
mod extract;
mod mirror;
mod walker;

// ============================================================================
// Public API
// ============================================================================

pub use config::{DEFAULT_ENTRY_SELECTOR, MirrorConfig};
pub use extract::{LinkExtractor, SelectorLinkExtractor};
pub use mirror::{MirrorFailure, MirrorReport, MirrorWriter, mirror_tree};
pub use walker::TreeWalker;
