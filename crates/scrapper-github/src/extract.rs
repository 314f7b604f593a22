//! Entry-link extraction from listing pages.
//!
//! Parsing is synchronous: the DOM is built, queried and dropped inside one
//! call, so it never lives across an `.await`.

use std::collections::HashSet;

use scraper::{Html, Selector};
use scrapper_core::{InstallError, InstallResult};

/// Pulls entry links out of a listing page.
pub trait LinkExtractor: Send + Sync {
    /// `href` values of entry links, in document order, without duplicates.
    fn extract_links(&self, html: &str) -> Vec<String>;
}

/// Extracts the `href` of every element matching a CSS selector.
#[derive(Debug, Clone)]
pub struct SelectorLinkExtractor {
    selector: Selector,
}

impl SelectorLinkExtractor {
    /// Compile `selector`.
    pub fn new(selector: &str) -> InstallResult<Self> {
        let selector = Selector::parse(selector).map_err(|e| InstallError::InvalidSelector {
            selector: selector.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { selector })
    }
}

impl LinkExtractor for SelectorLinkExtractor {
    fn extract_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();

        document
            .select(&self.selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty() && seen.insert(href.to_string()))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ENTRY_SELECTOR;

    const LISTING: &str = r#"
        <html><body>
          <div role="grid">
            <a class="js-navigation-open Link--primary" href="/acme/repo/tree/main">..</a>
            <a class="js-navigation-open Link--primary" href="/acme/repo/tree/main/src/utils">utils</a>
            <a class="js-navigation-open Link--primary" href="/acme/repo/blob/main/src/a.py">a.py</a>
            <a class="Link--secondary" href="/acme/repo/commit/abc123">Initial commit</a>
            <a class="js-navigation-open Link--primary" href="/acme/repo/blob/main/src/a.py">a.py</a>
            <a class="js-navigation-open Link--primary">no href</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_extracts_entry_links_in_document_order() {
        let extractor = SelectorLinkExtractor::new(DEFAULT_ENTRY_SELECTOR).unwrap();
        assert_eq!(
            extractor.extract_links(LISTING),
            vec![
                "/acme/repo/tree/main",
                "/acme/repo/tree/main/src/utils",
                "/acme/repo/blob/main/src/a.py",
            ]
        );
    }

    #[test]
    fn test_custom_selector() {
        let extractor = SelectorLinkExtractor::new("a.Link--secondary").unwrap();
        assert_eq!(
            extractor.extract_links(LISTING),
            vec!["/acme/repo/commit/abc123"]
        );
    }

    #[test]
    fn test_empty_page_has_no_links() {
        let extractor = SelectorLinkExtractor::new(DEFAULT_ENTRY_SELECTOR).unwrap();
        assert!(extractor.extract_links("<html></html>").is_empty());
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(
            SelectorLinkExtractor::new("a[[["),
            Err(InstallError::InvalidSelector { .. })
        ));
    }
}
