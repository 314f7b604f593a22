//! Configuration for tree walks and mirror passes.

use scrapper_core::{DEFAULT_MAX_CONCURRENCY, Settings};

/// Marker the listing host puts on repository entry links.
pub const DEFAULT_ENTRY_SELECTOR: &str = "a.js-navigation-open.Link--primary";

/// Configuration shared by [`TreeWalker`](crate::TreeWalker) and
/// [`MirrorWriter`](crate::MirrorWriter).
///
/// # Example
///
/// ```
/// use scrapper_github::MirrorConfig;
///
/// let config = MirrorConfig::new().with_max_concurrency(4);
/// assert_eq!(config.max_concurrency(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    max_concurrency: usize,
    entry_selector: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            entry_selector: DEFAULT_ENTRY_SELECTOR.to_string(),
        }
    }
}

impl MirrorConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a configuration from installer settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let mut config = Self::new().with_max_concurrency(settings.effective_max_concurrency());
        if let Some(ref selector) = settings.entry_selector {
            config = config.with_entry_selector(selector.clone());
        }
        config
    }

    /// Bound concurrent listing fetches (walks) or downloads (mirror passes).
    ///
    /// Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// CSS selector matching entry links on listing pages.
    #[must_use]
    pub fn with_entry_selector(mut self, selector: impl Into<String>) -> Self {
        self.entry_selector = selector.into();
        self
    }

    /// Concurrency bound, at least 1.
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Entry link selector.
    pub fn entry_selector(&self) -> &str {
        &self.entry_selector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MirrorConfig::new();
        assert_eq!(config.max_concurrency(), 8);
        assert_eq!(config.entry_selector(), DEFAULT_ENTRY_SELECTOR);
    }

    #[test]
    fn test_zero_concurrency_is_raised() {
        assert_eq!(MirrorConfig::new().with_max_concurrency(0).max_concurrency(), 1);
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            max_concurrency: Some(2),
            entry_selector: Some("a.entry".to_string()),
            ..Default::default()
        };
        let config = MirrorConfig::from_settings(&settings);
        assert_eq!(config.max_concurrency(), 2);
        assert_eq!(config.entry_selector(), "a.entry");

        let defaults = MirrorConfig::from_settings(&Settings::default());
        assert_eq!(defaults, MirrorConfig::new());
    }
}
