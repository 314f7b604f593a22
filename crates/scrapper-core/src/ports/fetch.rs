//! Network fetch ports.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::error::InstallResult;

/// Port for fetching HTML pages (repository listings, driver release pages).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    /// Fetch a page and return its body as text.
    async fn get_html(&self, url: &Url) -> InstallResult<String>;
}

/// Port for fetching raw content (mirrored files, driver archives).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch a resource and return its body bytes.
    async fn get_bytes(&self, url: &Url) -> InstallResult<Vec<u8>>;
}

#[async_trait]
impl<T: HtmlFetcher + ?Sized> HtmlFetcher for Arc<T> {
    async fn get_html(&self, url: &Url) -> InstallResult<String> {
        (**self).get_html(url).await
    }
}

#[async_trait]
impl<T: ContentFetcher + ?Sized> ContentFetcher for Arc<T> {
    async fn get_bytes(&self, url: &Url) -> InstallResult<Vec<u8>> {
        (**self).get_bytes(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InstallError;

    // Verify the traits are object-safe
    fn _assert_object_safe(_: Arc<dyn HtmlFetcher>, _: Arc<dyn ContentFetcher>) {}

    #[tokio::test]
    async fn test_arc_forwards_to_inner_fetcher() {
        let mut mock = MockHtmlFetcher::new();
        mock.expect_get_html()
            .withf(|url| url.as_str() == "https://github.com/acme/repo/tree/main")
            .times(1)
            .returning(|_| Ok("<html></html>".to_string()));

        let shared: Arc<dyn HtmlFetcher> = Arc::new(mock);
        let url = Url::parse("https://github.com/acme/repo/tree/main").unwrap();

        assert_eq!(shared.get_html(&url).await.unwrap(), "<html></html>");
    }

    #[test]
    fn test_arc_forwards_errors() {
        let mut mock = MockContentFetcher::new();
        mock.expect_get_bytes().returning(|url| {
            Err(InstallError::FetchFailed {
                url: url.to_string(),
                status: Some(404),
                message: "Not Found".to_string(),
            })
        });

        let shared = Arc::new(mock);
        let url = Url::parse("https://raw.githubusercontent.com/acme/repo/main/a.py").unwrap();

        let error = tokio_test::assert_err!(tokio_test::block_on(shared.get_bytes(&url)));
        assert!(matches!(
            error,
            InstallError::FetchFailed {
                status: Some(404),
                ..
            }
        ));
    }
}
