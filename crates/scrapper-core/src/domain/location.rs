//! Host-independent model of a location inside a GitHub-hosted repository.
//!
//! Two URL families describe the same location:
//!
//! - listing URLs on [`LISTING_HOST`]:
//!   `/<author>/<repository>[/(tree|blob)/<branch>/<path...>]`
//! - raw-content URLs on [`RAW_HOST`] (files only):
//!   `/<author>/<repository>/<branch>/<path...>`
//!
//! Both parse into the same [`RemoteLocation`]; equality never depends on
//! which host produced a value.

use std::fmt;
use std::path::PathBuf;

use tracing::debug;
use url::Url;

use crate::error::{InstallError, InstallResult};

/// Host serving rendered directory listings and file pages.
pub const LISTING_HOST: &str = "github.com";

/// Host serving unrendered file bytes.
pub const RAW_HOST: &str = "raw.githubusercontent.com";

/// Branch assumed when a listing URL names only the repository.
pub const DEFAULT_BRANCH: &str = "main";

// ============================================================================
// Entry Kind
// ============================================================================

/// Whether a location denotes a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryKind {
    /// Regular file (`blob` on the listing host)
    File,
    /// Directory (`tree` on the listing host)
    Directory,
}

impl EntryKind {
    /// Path marker used by the listing host for this kind.
    pub const fn listing_marker(self) -> &'static str {
        match self {
            Self::File => "blob",
            Self::Directory => "tree",
        }
    }
}

// ============================================================================
// Remote Location
// ============================================================================

/// Immutable location of a file or directory in a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemoteLocation {
    author: String,
    repository: String,
    branch: String,
    path: Vec<String>,
    kind: EntryKind,
}

impl RemoteLocation {
    /// Parse a listing-host or raw-host URL string.
    pub fn parse(url: &str) -> InstallResult<Self> {
        let parsed = Url::parse(url).map_err(|e| InstallError::MalformedLocation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(&parsed)
    }

    /// Build a location from an already parsed URL.
    pub fn from_url(url: &Url) -> InstallResult<Self> {
        let is_raw = match url.host_str() {
            Some(LISTING_HOST) => false,
            Some(RAW_HOST) => true,
            other => {
                return Err(InstallError::InvalidHost {
                    url: url.to_string(),
                    host: other.unwrap_or_default().to_string(),
                });
            }
        };

        let segments = decoded_segments(url)?;
        if is_raw {
            Self::from_raw_segments(url, segments)
        } else {
            Self::from_listing_segments(url, segments)
        }
    }

    fn from_listing_segments(url: &Url, segments: Vec<String>) -> InstallResult<Self> {
        let mut parts = segments.into_iter();
        let (Some(author), Some(repository)) = (parts.next(), parts.next()) else {
            return Err(malformed(url, "expected /<author>/<repository>"));
        };

        // Bare repository URL: root directory on the default branch
        let Some(marker) = parts.next() else {
            return Ok(Self {
                author,
                repository,
                branch: DEFAULT_BRANCH.to_string(),
                path: Vec::new(),
                kind: EntryKind::Directory,
            });
        };

        let kind = match marker.as_str() {
            "tree" => EntryKind::Directory,
            "blob" => EntryKind::File,
            other => {
                return Err(malformed(
                    url,
                    &format!("unknown entry marker `{other}`, expected `tree` or `blob`"),
                ));
            }
        };

        let Some(branch) = parts.next() else {
            return Err(malformed(url, "missing branch after entry marker"));
        };

        let path: Vec<String> = parts.collect();
        if kind == EntryKind::File && path.is_empty() {
            return Err(malformed(url, "file URL without a path"));
        }

        Ok(Self {
            author,
            repository,
            branch,
            path,
            kind,
        })
    }

    fn from_raw_segments(url: &Url, segments: Vec<String>) -> InstallResult<Self> {
        let mut parts = segments.into_iter();
        let (Some(author), Some(repository), Some(branch)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed(url, "expected /<author>/<repository>/<branch>/<path>"));
        };

        let path: Vec<String> = parts.collect();
        if path.is_empty() {
            return Err(malformed(url, "raw URL without a file path"));
        }

        Ok(Self {
            author,
            repository,
            branch,
            path,
            kind: EntryKind::File,
        })
    }

    /// Repository owner (user or organization).
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Repository name.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Branch the location points into.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Path segments below the repository root (empty for the root).
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// File or directory.
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Check if this location denotes a file.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Check if this location denotes a directory.
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Last path segment, `None` for the repository root.
    pub fn file_name(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// Path relative to the repository root, for mirroring onto local disk.
    pub fn relative_path(&self) -> PathBuf {
        self.path.iter().collect()
    }

    /// Listing-host URL: `tree` for directories, `blob` for files.
    pub fn canonical_url(&self) -> Url {
        self.listing_url(false)
    }

    /// Raw-content URL of a file.
    pub fn raw_url(&self) -> InstallResult<Url> {
        if !self.is_file() {
            return Err(InstallError::NotAFile {
                location: self.to_string(),
            });
        }

        let segments = [
            self.author.as_str(),
            self.repository.as_str(),
            self.branch.as_str(),
        ]
        .into_iter()
        .chain(self.path.iter().map(String::as_str));

        Ok(build_url(RAW_HOST, segments))
    }

    /// Derive the location a scraped listing link points to.
    ///
    /// Listing pages render entry links inconsistently: absolute paths
    /// (`/author/repo/blob/main/dir/file`), full URLs, or bare entry names.
    /// Multi-segment paths are rooted at the listing host; bare names are
    /// resolved against this directory.
    pub fn child(&self, link: &str) -> InstallResult<Self> {
        if !self.is_directory() {
            return Err(InstallError::NotADirectory {
                location: self.to_string(),
            });
        }

        if let Ok(absolute) = Url::parse(link) {
            return Self::from_url(&absolute);
        }

        // Protocol-relative: `//github.com/author/repo/...`
        if link.starts_with("//") {
            let absolute = format!("https:{link}");
            let url = Url::parse(&absolute).map_err(|e| InstallError::MalformedLocation {
                url: link.to_string(),
                reason: e.to_string(),
            })?;
            return Self::from_url(&url);
        }

        let trimmed = link.trim_start_matches('/');
        let segment_count = trimmed.split('/').filter(|s| !s.is_empty()).count();

        let target = if segment_count > 1 {
            let rooted = format!("https://{LISTING_HOST}/{trimmed}");
            Url::parse(&rooted).map_err(|e| InstallError::MalformedLocation {
                url: rooted,
                reason: e.to_string(),
            })?
        } else {
            self.listing_url(true)
                .join(trimmed)
                .map_err(|e| InstallError::MalformedLocation {
                    url: link.to_string(),
                    reason: e.to_string(),
                })?
        };

        debug!(link, resolved = %target, "Resolved listing link");
        Self::from_url(&target)
    }

    /// Check if `self` lies strictly below `dir` in the same repository and branch.
    pub fn is_descendant_of(&self, dir: &Self) -> bool {
        self.author == dir.author
            && self.repository == dir.repository
            && self.branch == dir.branch
            && self.path.len() > dir.path.len()
            && self.path.starts_with(&dir.path)
    }

    fn listing_url(&self, as_directory_base: bool) -> Url {
        let segments = [
            self.author.as_str(),
            self.repository.as_str(),
            self.kind.listing_marker(),
            self.branch.as_str(),
        ]
        .into_iter()
        .chain(self.path.iter().map(String::as_str))
        // A trailing empty segment renders as `/`, making the URL a join base
        .chain(as_directory_base.then_some(""));

        build_url(LISTING_HOST, segments)
    }
}

impl fmt::Display for RemoteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_url())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn malformed(url: &Url, reason: &str) -> InstallError {
    InstallError::MalformedLocation {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// Percent-decoded, non-empty path segments of a URL.
fn decoded_segments(url: &Url) -> InstallResult<Vec<String>> {
    let Some(raw_segments) = url.path_segments() else {
        return Err(malformed(url, "URL has no path"));
    };

    let mut segments = Vec::new();
    for segment in raw_segments.filter(|s| !s.is_empty()) {
        let decoded = urlencoding::decode(segment)
            .map_err(|e| malformed(url, &format!("segment `{segment}` is not UTF-8: {e}")))?;

        if decoded == "." || decoded == ".." || decoded.contains(['/', '\\']) {
            return Err(malformed(
                url,
                &format!("segment `{decoded}` would escape the mirror root"),
            ));
        }
        segments.push(decoded.into_owned());
    }

    Ok(segments)
}

fn build_url<'a>(host: &str, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url =
        Url::parse(&format!("https://{host}/")).expect("static host forms a valid base URL");
    url.path_segments_mut()
        .expect("https URLs always have path segments")
        .clear()
        .extend(segments);
    url
}
