//! Parsing of free-text driver compatibility tables.
//!
//! Release pages describe support in prose ("Supports Chrome version 94",
//! "Supports Chrome 90 to 92") next to a link to the release. The page is
//! flattened into a sequence of link and statement events in document order,
//! and every statement is paired with its neighboring link.

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use scrapper_core::{InstallError, InstallResult};
use tracing::{debug, warn};
use url::Url;

use crate::driver::DriverKind;

// ============================================================================
// Version Range
// ============================================================================

/// Inclusive range of browser major versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionRange {
    start: u32,
    end: u32,
}

impl VersionRange {
    /// Create a range; `None` when `start > end`.
    pub const fn new(start: u32, end: u32) -> Option<Self> {
        if start > end {
            return None;
        }
        Some(Self { start, end })
    }

    /// Range covering exactly one version.
    pub const fn single(version: u32) -> Self {
        Self {
            start: version,
            end: version,
        }
    }

    /// First supported version.
    pub const fn start(&self) -> u32 {
        self.start
    }

    /// Last supported version.
    pub const fn end(&self) -> u32 {
        self.end
    }

    /// Check if `version` lies in the range.
    pub const fn contains(&self, version: u32) -> bool {
        self.start <= version && version <= self.end
    }
}

// ============================================================================
// Compatibility Table
// ============================================================================

/// One release row: where to find it and which browser versions it supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// Release page (or archive) link, resolved against the compatibility page
    pub url: Url,
    /// Supported browser versions
    pub range: VersionRange,
}

/// Parsed rows of one driver's compatibility page.
#[derive(Debug, Clone)]
pub struct CompatibilityTable {
    driver: DriverKind,
    entries: Vec<AssetEntry>,
}

impl CompatibilityTable {
    /// Wrap already parsed rows.
    pub const fn new(driver: DriverKind, entries: Vec<AssetEntry>) -> Self {
        Self { driver, entries }
    }

    /// All rows in page order.
    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    /// The single row whose range contains `version`.
    ///
    /// Overlapping rows are malformed input and are reported rather than
    /// resolved by position.
    pub fn match_version(&self, version: u32) -> InstallResult<&AssetEntry> {
        let mut matches = self.entries.iter().filter(|e| e.range.contains(version));

        let Some(first) = matches.next() else {
            return Err(InstallError::NoCompatibleDriver {
                driver: self.driver.to_string(),
                version,
            });
        };

        let others: Vec<&AssetEntry> = matches.collect();
        if others.is_empty() {
            return Ok(first);
        }

        Err(InstallError::ResolutionAmbiguous {
            driver: self.driver.to_string(),
            version,
            candidates: std::iter::once(first)
                .chain(others)
                .map(|e| e.url.to_string())
                .collect(),
        })
    }
}

// ============================================================================
// Parser
// ============================================================================

#[derive(Debug)]
enum Event {
    Link(String),
    Statement(VersionRange),
}

/// Turns a compatibility page into a [`CompatibilityTable`].
#[derive(Debug, Clone)]
pub struct CompatibilityTableParser {
    driver: DriverKind,
    row_container: Option<Selector>,
    statement: Regex,
}

impl CompatibilityTableParser {
    /// Parser for `driver`'s default statement wording.
    pub fn new(driver: DriverKind) -> InstallResult<Self> {
        let pattern = format!(
            r"(?i)\bsupports\s+{}\s+(?:versions?\s+)?(\d+)(?:\s*(?:to|through|-|–)\s*(\d+))?",
            regex::escape(driver.browser())
        );
        Self::with_statement_pattern(driver, &pattern)
    }

    /// Parser with a custom statement pattern.
    ///
    /// Group 1 captures the first supported version, optional group 2 the last.
    pub fn with_statement_pattern(driver: DriverKind, pattern: &str) -> InstallResult<Self> {
        let statement = Regex::new(pattern).map_err(|e| InstallError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        if statement.captures_len() < 2 {
            return Err(InstallError::InvalidPattern {
                pattern: pattern.to_string(),
                message: "pattern must capture the version in group 1".to_string(),
            });
        }

        Ok(Self {
            driver,
            row_container: None,
            statement,
        })
    }

    /// Only read rows inside elements matching `selector`.
    pub fn with_row_container(mut self, selector: &str) -> InstallResult<Self> {
        let parsed = Selector::parse(selector).map_err(|e| InstallError::InvalidSelector {
            selector: selector.to_string(),
            message: e.to_string(),
        })?;
        self.row_container = Some(parsed);
        Ok(self)
    }

    /// Parse the page at `page_url` with body `html`.
    pub fn parse(&self, html: &str, page_url: &Url) -> CompatibilityTable {
        let events = self.events(html);
        let mut entries = Vec::new();
        let mut pending_link: Option<String> = None;
        let mut pending_range: Option<VersionRange> = None;

        for event in events {
            match event {
                Event::Link(href) => {
                    if let Some(range) = pending_range.take() {
                        push_entry(&mut entries, page_url, &href, range);
                    } else {
                        pending_link = Some(href);
                    }
                }
                Event::Statement(range) => {
                    if let Some(href) = pending_link.take() {
                        push_entry(&mut entries, page_url, &href, range);
                    } else {
                        pending_range = Some(range);
                    }
                }
            }
        }

        debug!(driver = %self.driver, rows = entries.len(), "Compatibility table parsed");
        CompatibilityTable::new(self.driver, entries)
    }

    /// Links and statements in document order.
    fn events(&self, html: &str) -> Vec<Event> {
        let document = Html::parse_document(html);
        let roots: Vec<ElementRef<'_>> = match self.row_container {
            Some(ref selector) => document.select(selector).collect(),
            None => vec![document.root_element()],
        };

        let mut events = Vec::new();
        let mut text = String::new();

        for root in roots {
            for node in root.descendants() {
                match node.value() {
                    Node::Element(element) if element.name() == "a" => {
                        if let Some(href) = element.attr("href") {
                            self.flush_statements(&mut text, &mut events);
                            events.push(Event::Link(href.trim().to_string()));
                        }
                    }
                    Node::Text(chunk) => {
                        let inside_link = node.ancestors().any(|ancestor| {
                            ancestor
                                .value()
                                .as_element()
                                .is_some_and(|e| e.name() == "a")
                        });
                        if !inside_link {
                            text.push_str(chunk);
                            text.push(' ');
                        }
                    }
                    _ => {}
                }
            }
            self.flush_statements(&mut text, &mut events);
        }

        events
    }

    fn flush_statements(&self, text: &mut String, events: &mut Vec<Event>) {
        for captures in self.statement.captures_iter(text) {
            let start = captures.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
            let end = captures
                .get(2)
                .map_or(start, |m| m.as_str().parse::<u32>().ok());

            match start.zip(end).and_then(|(s, e)| VersionRange::new(s, e)) {
                Some(range) => events.push(Event::Statement(range)),
                None => warn!(statement = &captures[0], "Ignoring unreadable version statement"),
            }
        }
        text.clear();
    }
}

fn push_entry(entries: &mut Vec<AssetEntry>, page_url: &Url, href: &str, range: VersionRange) {
    match page_url.join(href) {
        Ok(url) => entries.push(AssetEntry { url, range }),
        Err(e) => warn!(href, error = %e, "Ignoring unresolvable release link"),
    }
}

/// Every link on a release page, resolved against the page URL.
pub(crate) fn page_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| page_url.join(href.trim()).ok())
        .collect()
}
