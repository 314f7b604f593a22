//! Driver resolution: compatibility lookup, asset selection and download.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use scrapper_core::{ContentFetcher, HtmlFetcher, InstallError, InstallResult, Settings};
use tracing::{Instrument, debug, info, info_span, warn};
use url::Url;

use crate::compat::{CompatibilityTableParser, VersionRange, page_links};
use crate::driver::DriverKind;
use crate::platform::Platform;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for one [`DriverResolver`].
///
/// # Example
///
/// ```
/// use scrapper_webdriver::{Arch, DriverResolverConfig, OsFamily, Platform};
///
/// let config = DriverResolverConfig::new()
///     .with_row_container("div.downloads")
///     .with_asset_pattern(
///         Platform::new(OsFamily::Linux, Arch::Aarch64),
///         r"^chromedriver_linux_arm64\.zip$",
///     );
/// ```
#[derive(Debug, Clone, Default)]
pub struct DriverResolverConfig {
    compatibility_url: Option<Url>,
    row_container: Option<String>,
    statement_pattern: Option<String>,
    asset_patterns: Vec<(Platform, String)>,
}

impl DriverResolverConfig {
    /// Create a configuration using each driver's defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a configuration for `driver` from installer settings.
    ///
    /// Picks up a compatibility page override keyed by the driver's binary name.
    #[must_use]
    pub fn from_settings(settings: &Settings, driver: DriverKind) -> Self {
        let mut config = Self::new();
        if let Some(page) = settings.compatibility_pages.get(driver.name()) {
            match Url::parse(page) {
                Ok(url) => config = config.with_compatibility_url(url),
                Err(e) => warn!(
                    driver = %driver,
                    page = %page,
                    error = %e,
                    "Ignoring unparseable compatibility page, using the default"
                ),
            }
        }
        config
    }

    /// Read the compatibility table from `url` instead of the driver's default page.
    #[must_use]
    pub fn with_compatibility_url(mut self, url: Url) -> Self {
        self.compatibility_url = Some(url);
        self
    }

    /// Only read compatibility rows inside elements matching `selector`.
    #[must_use]
    pub fn with_row_container(mut self, selector: impl Into<String>) -> Self {
        self.row_container = Some(selector.into());
        self
    }

    /// Replace the version statement pattern (group 1: first version, group 2: last).
    #[must_use]
    pub fn with_statement_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.statement_pattern = Some(pattern.into());
        self
    }

    /// Add an archive filename pattern for `platform`, tried before the defaults.
    #[must_use]
    pub fn with_asset_pattern(mut self, platform: Platform, pattern: impl Into<String>) -> Self {
        self.asset_patterns.push((platform, pattern.into()));
        self
    }
}

// ============================================================================
// Asset Reference
// ============================================================================

/// A resolved driver archive ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Driver the archive contains
    pub driver: DriverKind,
    /// Platform the archive was built for
    pub platform: Platform,
    /// Browser versions the release supports
    pub range: VersionRange,
    /// Download URL
    pub url: Url,
    /// Archive file name
    pub file_name: String,
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves and installs the driver matching an installed browser.
pub struct DriverResolver {
    driver: DriverKind,
    pages: Arc<dyn HtmlFetcher>,
    content: Arc<dyn ContentFetcher>,
    compatibility_url: Url,
    parser: CompatibilityTableParser,
    asset_patterns: Vec<(Platform, Regex)>,
}

impl DriverResolver {
    /// Create a resolver for `driver`.
    ///
    /// Configured selectors and patterns are compiled here, so configuration
    /// errors surface before any request is made.
    pub fn new(
        driver: DriverKind,
        pages: Arc<dyn HtmlFetcher>,
        content: Arc<dyn ContentFetcher>,
        config: &DriverResolverConfig,
    ) -> InstallResult<Self> {
        let compatibility_url = match config.compatibility_url {
            Some(ref url) => url.clone(),
            None => parse_url(driver.default_compatibility_url())?,
        };

        let mut parser = match config.statement_pattern {
            Some(ref pattern) => CompatibilityTableParser::with_statement_pattern(driver, pattern)?,
            None => CompatibilityTableParser::new(driver)?,
        };
        if let Some(ref selector) = config.row_container {
            parser = parser.with_row_container(selector)?;
        }

        let asset_patterns = config
            .asset_patterns
            .iter()
            .map(|(platform, pattern)| Ok((*platform, compile(pattern)?)))
            .collect::<InstallResult<Vec<_>>>()?;

        Ok(Self {
            driver,
            pages,
            content,
            compatibility_url,
            parser,
            asset_patterns,
        })
    }

    /// Driver this resolver installs.
    pub const fn driver(&self) -> DriverKind {
        self.driver
    }

    /// Find the archive for `installed_version` built for `platform`.
    pub async fn resolve(
        &self,
        installed_version: u32,
        platform: Platform,
    ) -> InstallResult<AssetReference> {
        let patterns = self.patterns_for(platform)?;

        let page = self.pages.get_html(&self.compatibility_url).await?;
        let table = self.parser.parse(&page, &self.compatibility_url);
        let entry = table.match_version(installed_version)?;
        debug!(
            driver = %self.driver,
            version = installed_version,
            release = %entry.url,
            "Matched compatibility row"
        );

        let release_page = self.pages.get_html(&entry.url).await?;
        let asset = page_links(&release_page, &entry.url)
            .into_iter()
            .find_map(|url| {
                let name = file_name(&url)?;
                patterns
                    .iter()
                    .any(|p| p.is_match(&name))
                    .then_some((url, name))
            });

        let Some((url, file_name)) = asset else {
            return Err(self.unsupported(platform));
        };

        Ok(AssetReference {
            driver: self.driver,
            platform,
            range: entry.range,
            url,
            file_name,
        })
    }

    /// Fetch `asset` and write it to `destination`, creating parent directories.
    ///
    /// Returns the number of bytes written.
    pub async fn download(&self, asset: &AssetReference, destination: &Path) -> InstallResult<u64> {
        let bytes = self.content.get_bytes(&asset.url).await?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| InstallError::WriteFailed {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(destination, &bytes)
            .await
            .map_err(|source| InstallError::WriteFailed {
                path: destination.to_path_buf(),
                source,
            })?;

        Ok(bytes.len() as u64)
    }

    /// Resolve, then download into `webdrivers_dir`; returns the archive path.
    ///
    /// Nothing is written when resolution fails.
    pub async fn install(
        &self,
        installed_version: u32,
        platform: Platform,
        webdrivers_dir: &Path,
    ) -> InstallResult<PathBuf> {
        let span = info_span!(
            "install_driver",
            driver = %self.driver,
            version = installed_version,
            platform = %platform
        );

        async {
            let asset = self.resolve(installed_version, platform).await?;
            let destination = webdrivers_dir.join(&asset.file_name);
            let size = self.download(&asset, &destination).await?;

            info!(
                url = %asset.url,
                path = %destination.display(),
                bytes = size,
                binary = %self.driver.binary_name(platform.os),
                "Driver installed"
            );
            Ok(destination)
        }
        .instrument(span)
        .await
    }

    /// Configured patterns for `platform`, then the driver's defaults.
    fn patterns_for(&self, platform: Platform) -> InstallResult<Vec<Regex>> {
        let mut patterns: Vec<Regex> = self
            .asset_patterns
            .iter()
            .filter(|(p, _)| *p == platform)
            .map(|(_, regex)| regex.clone())
            .collect();

        for pattern in self.driver.default_asset_patterns(platform) {
            patterns.push(compile(pattern)?);
        }

        if patterns.is_empty() {
            return Err(self.unsupported(platform));
        }
        Ok(patterns)
    }

    fn unsupported(&self, platform: Platform) -> InstallError {
        InstallError::UnsupportedPlatform {
            driver: self.driver.to_string(),
            platform: platform.to_string(),
        }
    }
}

fn compile(pattern: &str) -> InstallResult<Regex> {
    Regex::new(pattern).map_err(|e| InstallError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn parse_url(url: &str) -> InstallResult<Url> {
    Url::parse(url).map_err(|e| InstallError::InvalidPattern {
        pattern: url.to_string(),
        message: e.to_string(),
    })
}

/// Percent-decoded last path segment, if it is a plain file name.
///
/// Names that would leave the install directory when joined onto it are rejected.
fn file_name(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let name = urlencoding::decode(last).ok()?;
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return None;
    }
    Some(name.into_owned())
}
