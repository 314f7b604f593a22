//! Resolution and download of browser-automation drivers.
//!
//! A [`DriverResolver`] reads a driver's free-text compatibility page, finds
//! the single release supporting the installed browser version, picks the
//! archive built for the target [`Platform`] from the release page and
//! downloads it.
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use scrapper_core::{ContentFetcher, HtmlFetcher, InstallError, InstallResult};
//! use scrapper_webdriver::{DriverKind, DriverResolver, DriverResolverConfig, Platform};
//!
//! async fn install_chromedriver<F>(fetcher: Arc<F>, chrome_version: u32) -> InstallResult<()>
//! where
//!     F: HtmlFetcher + ContentFetcher + 'static,
//! {
//!     let resolver = DriverResolver::new(
//!         DriverKind::ChromeDriver,
//!         fetcher.clone(),
//!         fetcher,
//!         &DriverResolverConfig::new(),
//!     )?;
//!     let platform = Platform::current().ok_or_else(|| InstallError::UnsupportedPlatform {
//!         driver: "chromedriver".to_string(),
//!         platform: std::env::consts::OS.to_string(),
//!     })?;
//!     resolver.install(chrome_version, platform, Path::new("package/webdrivers")).await?;
//!     Ok(())
//! }
//! ```
#![deny(unused_crate_dependencies)]

mod compat;
mod driver;
mod platform;
mod resolver;

// ============================================================================
// Public API
// ============================================================================

pub use compat::{AssetEntry, CompatibilityTable, CompatibilityTableParser, VersionRange};
pub use driver::DriverKind;
pub use platform::{Arch, OsFamily, Platform};
pub use resolver::{AssetReference, DriverResolver, DriverResolverConfig};
