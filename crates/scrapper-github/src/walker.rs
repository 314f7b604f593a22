//! Recursive discovery of every file below a repository directory.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, try_join_all};
use scrapper_core::{DiscoveredFiles, HtmlFetcher, InstallError, InstallResult, RemoteLocation};
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::config::MirrorConfig;
use crate::extract::{LinkExtractor, SelectorLinkExtractor};

/// Walks listing pages to discover files.
///
/// Every subdirectory listed on one page is walked concurrently and the
/// results are merged when all of them finish. Listing fetches are bounded by
/// [`MirrorConfig::max_concurrency`] across the whole walker. The first
/// failing fetch aborts the walk: pending sibling walks are dropped before
/// they issue further requests.
pub struct TreeWalker {
    fetcher: Arc<dyn HtmlFetcher>,
    extractor: Arc<dyn LinkExtractor>,
    permits: Arc<Semaphore>,
}

impl TreeWalker {
    /// Create a walker using the configured entry selector.
    pub fn new(fetcher: Arc<dyn HtmlFetcher>, config: &MirrorConfig) -> InstallResult<Self> {
        let extractor = SelectorLinkExtractor::new(config.entry_selector())?;
        Ok(Self::with_extractor(fetcher, Arc::new(extractor), config))
    }

    /// Create a walker with a custom link extractor.
    pub fn with_extractor(
        fetcher: Arc<dyn HtmlFetcher>,
        extractor: Arc<dyn LinkExtractor>,
        config: &MirrorConfig,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            permits: Arc::new(Semaphore::new(config.max_concurrency())),
        }
    }

    /// Discover every file below `root`.
    #[instrument(skip_all, fields(root = %root))]
    pub async fn walk(&self, root: &RemoteLocation) -> InstallResult<DiscoveredFiles> {
        if !root.is_directory() {
            return Err(InstallError::NotADirectory {
                location: root.to_string(),
            });
        }

        let files = self.walk_directory(root.clone()).await?;
        info!(files = files.len(), "Walk complete");
        Ok(files)
    }

    fn walk_directory(&self, dir: RemoteLocation) -> BoxFuture<'_, InstallResult<DiscoveredFiles>> {
        async move {
            let html = self.fetch_listing(&dir).await?;
            let (mut files, subdirectories) = self.classify_links(&dir, &html)?;

            let nested = try_join_all(
                subdirectories
                    .into_iter()
                    .map(|subdir| self.walk_directory(subdir)),
            )
            .await?;

            for subtree in nested {
                files.merge(subtree);
            }
            Ok(files)
        }
        .boxed()
    }

    async fn fetch_listing(&self, dir: &RemoteLocation) -> InstallResult<String> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| InstallError::FetchFailed {
                url: dir.to_string(),
                status: None,
                message: format!("walk cancelled: {e}"),
            })?;

        debug!(directory = %dir, "Fetching listing");
        self.fetcher.get_html(&dir.canonical_url()).await
    }

    /// Split one listing page into its files and the subdirectories to descend into.
    fn classify_links(
        &self,
        dir: &RemoteLocation,
        html: &str,
    ) -> InstallResult<(DiscoveredFiles, BTreeSet<RemoteLocation>)> {
        let mut files = DiscoveredFiles::new();
        let mut subdirectories = BTreeSet::new();

        for link in self.extractor.extract_links(html) {
            let child = match dir.child(&link) {
                Ok(child) => child,
                Err(
                    e @ (InstallError::InvalidHost { .. } | InstallError::MalformedLocation { .. }),
                ) => {
                    warn!(directory = %dir, link, error = %e, "Skipping unresolvable link");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if !child.is_descendant_of(dir) {
                debug!(directory = %dir, link, "Skipping link outside the directory");
                continue;
            }

            if child.is_file() {
                files.insert(child)?;
            } else {
                subdirectories.insert(child);
            }
        }

        debug!(
            directory = %dir,
            files = files.len(),
            subdirectories = subdirectories.len(),
            "Listing classified"
        );
        Ok((files, subdirectories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrapper_core::testing::FakeFetcher;

    fn entry(href: &str) -> String {
        format!(r#"<a class="js-navigation-open Link--primary" href="{href}">x</a>"#)
    }

    fn listing(hrefs: &[&str]) -> String {
        let rows: String = hrefs.iter().map(|h| entry(h)).collect();
        format!("<html><body>{rows}</body></html>")
    }

    fn location(url: &str) -> RemoteLocation {
        RemoteLocation::parse(url).unwrap()
    }

    fn walker(fetcher: FakeFetcher, config: &MirrorConfig) -> TreeWalker {
        TreeWalker::new(Arc::new(fetcher), config).unwrap()
    }

    #[tokio::test]
    async fn test_walk_finds_nested_files_once() {
        // `sub` is linked twice: once by short name, once by absolute path
        let fetcher = FakeFetcher::new()
            .with_html(
                "https://github.com/acme/repo/tree/main",
                listing(&[
                    "/acme/repo/blob/main/a",
                    "/acme/repo/blob/main/b",
                    "sub",
                    "/acme/repo/tree/main/sub",
                ]),
            )
            .with_html(
                "https://github.com/acme/repo/tree/main/sub",
                listing(&["/acme/repo/blob/main/sub/c", "/acme/repo/tree/main"]),
            );
        let fetcher = Arc::new(fetcher);
        let walker = TreeWalker::new(fetcher.clone(), &MirrorConfig::new()).unwrap();

        let files = walker
            .walk(&location("https://github.com/acme/repo"))
            .await
            .unwrap();

        assert_eq!(
            files.into_sorted_vec(),
            vec![
                location("https://github.com/acme/repo/blob/main/a"),
                location("https://github.com/acme/repo/blob/main/b"),
                location("https://github.com/acme/repo/blob/main/sub/c"),
            ]
        );
        assert_eq!(
            fetcher.request_count("https://github.com/acme/repo/tree/main/sub"),
            1
        );
    }

    #[tokio::test]
    async fn test_walk_of_file_fails() {
        let walker = walker(FakeFetcher::new(), &MirrorConfig::new());
        let result = walker
            .walk(&location("https://github.com/acme/repo/blob/main/a.py"))
            .await;
        assert!(matches!(result, Err(InstallError::NotADirectory { .. })));
    }

    #[tokio::test]
    async fn test_walk_skips_foreign_and_unresolvable_links() {
        let fetcher = FakeFetcher::new().with_html(
            "https://github.com/acme/repo/tree/main/src",
            listing(&[
                "https://gitlab.com/acme/repo/blob/main/src/x.py",
                "/other/repo/blob/main/src/y.py",
                "/acme/repo/tree/main",
                "/acme/repo/blob/main/src/z.py",
            ]),
        );
        let walker = walker(fetcher, &MirrorConfig::new());

        let files = walker
            .walk(&location("https://github.com/acme/repo/tree/main/src"))
            .await
            .unwrap();

        assert_eq!(files.len(), 1);
        assert!(files.contains(&location("https://github.com/acme/repo/blob/main/src/z.py")));
    }

    #[tokio::test]
    async fn test_walk_fails_fast_on_fetch_error() {
        let fetcher = FakeFetcher::new()
            .with_html(
                "https://github.com/acme/repo/tree/main",
                listing(&["/acme/repo/tree/main/ok", "/acme/repo/tree/main/broken"]),
            )
            .with_html(
                "https://github.com/acme/repo/tree/main/ok",
                listing(&["/acme/repo/blob/main/ok/file"]),
            )
            .with_failure("https://github.com/acme/repo/tree/main/broken", 500);
        let walker = walker(fetcher, &MirrorConfig::new());

        let result = walker.walk(&location("https://github.com/acme/repo")).await;

        assert!(matches!(
            result,
            Err(InstallError::FetchFailed {
                status: Some(500),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_walk_failure_stops_queued_listings() {
        // One permit: d1 is fetched, then d2 fails while d3, d4 and d1/deep wait
        let fetcher = FakeFetcher::new()
            .with_latency(std::time::Duration::from_millis(10))
            .with_html(
                "https://github.com/acme/repo/tree/main",
                listing(&[
                    "/acme/repo/tree/main/d1",
                    "/acme/repo/tree/main/d2",
                    "/acme/repo/tree/main/d3",
                    "/acme/repo/tree/main/d4",
                ]),
            )
            .with_html(
                "https://github.com/acme/repo/tree/main/d1",
                listing(&["/acme/repo/tree/main/d1/deep"]),
            )
            .with_failure("https://github.com/acme/repo/tree/main/d2", 503)
            .with_html(
                "https://github.com/acme/repo/tree/main/d3",
                listing(&["/acme/repo/blob/main/d3/f"]),
            )
            .with_html(
                "https://github.com/acme/repo/tree/main/d4",
                listing(&["/acme/repo/blob/main/d4/f"]),
            )
            .with_html(
                "https://github.com/acme/repo/tree/main/d1/deep",
                listing(&["/acme/repo/blob/main/d1/deep/f"]),
            );
        let fetcher = Arc::new(fetcher);
        let walker = TreeWalker::new(
            fetcher.clone(),
            &MirrorConfig::new().with_max_concurrency(1),
        )
        .unwrap();

        let result = walker.walk(&location("https://github.com/acme/repo")).await;

        assert!(matches!(
            result,
            Err(InstallError::FetchFailed {
                status: Some(503),
                ..
            })
        ));
        assert_eq!(
            fetcher.requests(),
            vec![
                "https://github.com/acme/repo/tree/main".to_string(),
                "https://github.com/acme/repo/tree/main/d1".to_string(),
                "https://github.com/acme/repo/tree/main/d2".to_string(),
            ]
        );

        // Dropped walks stay dropped
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_walk_respects_concurrency_bound() {
        let subdirs: Vec<String> = (0..6).map(|i| format!("/acme/repo/tree/main/d{i}")).collect();
        let hrefs: Vec<&str> = subdirs.iter().map(String::as_str).collect();

        let mut fetcher = FakeFetcher::new()
            .with_latency(std::time::Duration::from_millis(20))
            .with_html("https://github.com/acme/repo/tree/main", listing(&hrefs));
        for i in 0..6 {
            fetcher = fetcher.with_html(
                &format!("https://github.com/acme/repo/tree/main/d{i}"),
                listing(&[format!("/acme/repo/blob/main/d{i}/f").as_str()]),
            );
        }
        let fetcher = Arc::new(fetcher);
        let walker = TreeWalker::new(
            fetcher.clone(),
            &MirrorConfig::new().with_max_concurrency(2),
        )
        .unwrap();

        let files = walker
            .walk(&location("https://github.com/acme/repo"))
            .await
            .unwrap();

        assert_eq!(files.len(), 6);
        assert!(fetcher.max_in_flight() <= 2);
        assert_eq!(fetcher.requests().len(), 7);
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let config = MirrorConfig::new().with_entry_selector("a[[[");
        assert!(matches!(
            TreeWalker::new(Arc::new(FakeFetcher::new()), &config),
            Err(InstallError::InvalidSelector { .. })
        ));
    }
}
