//! Domain-level errors for mirroring and driver installation.
//!
//! Adapter crates keep their own implementation errors (HTTP, HTML parsing)
//! and map them into [`InstallError`] at the port boundary.

use std::path::PathBuf;

use thiserror::Error;

use crate::settings::SettingsError;

/// Result type alias for installer operations.
pub type InstallResult<T> = Result<T, InstallError>;

/// Errors from location parsing, tree walking, mirroring and driver resolution.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The URL host is neither the listing host nor the raw-content host.
    #[error("Unsupported host '{host}' in {url}")]
    InvalidHost {
        /// The URL that was parsed
        url: String,
        /// The rejected host (empty if the URL had none)
        host: String,
    },

    /// The URL is on a recognized host but its path has the wrong shape.
    #[error("Malformed repository URL {url}: {reason}")]
    MalformedLocation {
        /// The URL that was parsed
        url: String,
        /// What was wrong with it
        reason: String,
    },

    /// A file-only operation was called on a directory.
    #[error("Not a file: {location}")]
    NotAFile {
        /// Canonical URL of the offending location
        location: String,
    },

    /// A directory-only operation was called on a file.
    #[error("Not a directory: {location}")]
    NotADirectory {
        /// Canonical URL of the offending location
        location: String,
    },

    /// No compatibility range contains the installed browser version.
    #[error("No {driver} release supports browser version {version}")]
    NoCompatibleDriver {
        /// Driver being resolved
        driver: String,
        /// Installed browser major version
        version: u32,
    },

    /// More than one compatibility range contains the installed browser version.
    #[error(
        "Browser version {version} matches several {driver} releases: {}",
        .candidates.join(", ")
    )]
    ResolutionAmbiguous {
        /// Driver being resolved
        driver: String,
        /// Installed browser major version
        version: u32,
        /// Asset links of every matching row
        candidates: Vec<String>,
    },

    /// No release asset matches the requested platform.
    #[error("No {driver} asset for platform {platform}")]
    UnsupportedPlatform {
        /// Driver being resolved
        driver: String,
        /// Platform description (e.g. `linux-aarch64`)
        platform: String,
    },

    /// A network fetch failed (after retries, for transient failures).
    #[error("Failed to fetch {url}: {message}")]
    FetchFailed {
        /// The URL that was requested
        url: String,
        /// HTTP status code, when the server answered
        status: Option<u16>,
        /// Description of the underlying cause
        message: String,
    },

    /// Writing a mirrored file or driver archive failed.
    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailed {
        /// Target path
        path: PathBuf,
        /// Underlying filesystem error
        #[source]
        source: std::io::Error,
    },

    /// A CSS selector from configuration could not be parsed.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        /// The selector text
        selector: String,
        /// Parser message
        message: String,
    },

    /// A filename or statement pattern from configuration could not be compiled.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern text
        pattern: String,
        /// Compiler message
        message: String,
    },

    /// Settings failed to load or validate.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl InstallError {
    /// Check if the error is a caller contract violation rather than a runtime failure.
    ///
    /// Contract violations are surfaced immediately and never retried.
    pub const fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidHost { .. }
                | Self::MalformedLocation { .. }
                | Self::NotAFile { .. }
                | Self::NotADirectory { .. }
                | Self::InvalidSelector { .. }
                | Self::InvalidPattern { .. }
                | Self::Settings(_)
        )
    }

    /// Short category name for logs.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::InvalidHost { .. } => "invalid_host",
            Self::MalformedLocation { .. } => "malformed_location",
            Self::NotAFile { .. } => "not_a_file",
            Self::NotADirectory { .. } => "not_a_directory",
            Self::NoCompatibleDriver { .. } => "no_compatible_driver",
            Self::ResolutionAmbiguous { .. } => "resolution_ambiguous",
            Self::UnsupportedPlatform { .. } => "unsupported_platform",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::WriteFailed { .. } => "write_failed",
            Self::InvalidSelector { .. } => "invalid_selector",
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::Settings(_) => "settings",
        }
    }
}
