//! Persisting discovered files onto local disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use scrapper_core::{ContentFetcher, InstallError, InstallResult, RemoteLocation};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::MirrorConfig;
use crate::walker::TreeWalker;

/// A file that could not be mirrored.
#[derive(Debug)]
pub struct MirrorFailure {
    /// The file that failed
    pub location: RemoteLocation,
    /// Why it failed (`FetchFailed` or `WriteFailed`)
    pub error: InstallError,
}

/// Outcome of a mirror pass.
#[derive(Debug, Default)]
pub struct MirrorReport {
    /// Paths written, sorted
    pub written: Vec<PathBuf>,
    /// Files that could not be mirrored
    pub failures: Vec<MirrorFailure>,
}

impl MirrorReport {
    /// Check if every file was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Written paths, or the first failure when the mirror is incomplete.
    pub fn into_result(self) -> InstallResult<Vec<PathBuf>> {
        match self.failures.into_iter().next() {
            None => Ok(self.written),
            Some(failure) => Err(failure.error),
        }
    }
}

/// Fetches raw file content and writes it below a destination root.
pub struct MirrorWriter {
    fetcher: Arc<dyn ContentFetcher>,
    max_concurrency: usize,
}

impl MirrorWriter {
    /// Create a writer; `config` bounds concurrent downloads in [`persist_all`](Self::persist_all).
    pub fn new(fetcher: Arc<dyn ContentFetcher>, config: &MirrorConfig) -> Self {
        Self {
            fetcher,
            max_concurrency: config.max_concurrency(),
        }
    }

    /// Write `file` to `destination_root / file.path`, creating parent directories.
    ///
    /// Existing files are overwritten, so repeated runs converge on the remote content.
    pub async fn persist(
        &self,
        file: &RemoteLocation,
        destination_root: &Path,
    ) -> InstallResult<PathBuf> {
        let raw_url = file.raw_url()?;
        let bytes = self.fetcher.get_bytes(&raw_url).await?;

        let target = destination_root.join(file.relative_path());
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| InstallError::WriteFailed {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|source| InstallError::WriteFailed {
                path: target.clone(),
                source,
            })?;

        debug!(file = %file, path = %target.display(), bytes = bytes.len(), "File mirrored");
        Ok(target)
    }

    /// Persist every file concurrently; failures are collected, never propagated.
    pub async fn persist_all(
        &self,
        files: impl IntoIterator<Item = RemoteLocation>,
        destination_root: &Path,
    ) -> MirrorReport {
        let span = info_span!("persist_all", destination = %destination_root.display());

        async {
            let outcomes: Vec<_> = stream::iter(files)
                .map(|file| async move {
                    let result = self.persist(&file, destination_root).await;
                    (file, result)
                })
                .buffer_unordered(self.max_concurrency)
                .collect()
                .await;

            let mut report = MirrorReport::default();
            for (location, result) in outcomes {
                match result {
                    Ok(path) => report.written.push(path),
                    Err(error) => {
                        warn!(file = %location, error = %error, "Failed to mirror file");
                        report.failures.push(MirrorFailure { location, error });
                    }
                }
            }
            report.written.sort();

            info!(
                written = report.written.len(),
                failed = report.failures.len(),
                "Mirror pass complete"
            );
            report
        }
        .instrument(span)
        .await
    }
}

/// Walk `root`, then persist everything found below `destination_root`.
///
/// The walk is fail-fast; persistence is best-effort and reported.
pub async fn mirror_tree(
    walker: &TreeWalker,
    writer: &MirrorWriter,
    root: &RemoteLocation,
    destination_root: &Path,
) -> InstallResult<MirrorReport> {
    let files = walker.walk(root).await?;
    Ok(writer
        .persist_all(files.into_sorted_vec(), destination_root)
        .await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrapper_core::testing::FakeFetcher;
    use tempfile::TempDir;

    const FILE_URL: &str = "https://github.com/acme/repo/blob/main/modules/a.py";
    const RAW_URL: &str = "https://raw.githubusercontent.com/acme/repo/main/modules/a.py";

    fn location(url: &str) -> RemoteLocation {
        RemoteLocation::parse(url).unwrap()
    }

    fn writer(fetcher: FakeFetcher) -> MirrorWriter {
        MirrorWriter::new(Arc::new(fetcher), &MirrorConfig::new())
    }

    #[tokio::test]
    async fn test_persist_creates_parents_and_writes_bytes() {
        let temp = TempDir::new().unwrap();
        let writer = writer(FakeFetcher::new().with_bytes(RAW_URL, b"print('a')\n".to_vec()));

        let path = writer.persist(&location(FILE_URL), temp.path()).await.unwrap();

        assert_eq!(path, temp.path().join("modules").join("a.py"));
        assert_eq!(std::fs::read(&path).unwrap(), b"print('a')\n");
    }

    #[tokio::test]
    async fn test_persist_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let writer = writer(FakeFetcher::new().with_bytes(RAW_URL, b"same".to_vec()));
        let file = location(FILE_URL);

        let first = writer.persist(&file, temp.path()).await.unwrap();
        let second = writer.persist(&file, temp.path()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second).unwrap(), b"same");
    }

    #[tokio::test]
    async fn test_persist_overwrites_stale_content() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("modules")).unwrap();
        std::fs::write(temp.path().join("modules/a.py"), b"old content").unwrap();
        let writer = writer(FakeFetcher::new().with_bytes(RAW_URL, b"new".to_vec()));

        writer.persist(&location(FILE_URL), temp.path()).await.unwrap();

        assert_eq!(std::fs::read(temp.path().join("modules/a.py")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_persist_directory_fails() {
        let temp = TempDir::new().unwrap();
        let writer = writer(FakeFetcher::new());

        let result = writer
            .persist(&location("https://github.com/acme/repo/tree/main/modules"), temp.path())
            .await;

        assert!(matches!(result, Err(InstallError::NotAFile { .. })));
    }

    #[tokio::test]
    async fn test_persist_write_failure() {
        let temp = TempDir::new().unwrap();
        // A regular file where the `modules` directory should go
        std::fs::write(temp.path().join("modules"), b"blocker").unwrap();
        let writer = writer(FakeFetcher::new().with_bytes(RAW_URL, b"x".to_vec()));

        let result = writer.persist(&location(FILE_URL), temp.path()).await;

        assert!(matches!(result, Err(InstallError::WriteFailed { .. })));
    }

    #[tokio::test]
    async fn test_persist_all_isolates_failures() {
        let temp = TempDir::new().unwrap();
        let fetcher = FakeFetcher::new()
            .with_bytes(RAW_URL, b"a".to_vec())
            .with_bytes(
                "https://raw.githubusercontent.com/acme/repo/main/setup.py",
                b"setup".to_vec(),
            )
            .with_failure("https://raw.githubusercontent.com/acme/repo/main/broken.py", 404);
        let writer = writer(fetcher);

        let report = writer
            .persist_all(
                vec![
                    location(FILE_URL),
                    location("https://github.com/acme/repo/blob/main/broken.py"),
                    location("https://github.com/acme/repo/blob/main/setup.py"),
                ],
                temp.path(),
            )
            .await;

        assert!(!report.is_complete());
        assert_eq!(
            report.written,
            vec![temp.path().join("modules/a.py"), temp.path().join("setup.py")]
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].location,
            location("https://github.com/acme/repo/blob/main/broken.py")
        );
        assert!(matches!(
            report.into_result(),
            Err(InstallError::FetchFailed {
                status: Some(404),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_persist_all_respects_concurrency_bound() {
        let temp = TempDir::new().unwrap();
        let mut fetcher = FakeFetcher::new().with_latency(std::time::Duration::from_millis(10));
        let mut files = Vec::new();
        for i in 0..8 {
            fetcher = fetcher.with_bytes(
                &format!("https://raw.githubusercontent.com/acme/repo/main/f{i}"),
                vec![b'x'],
            );
            files.push(location(&format!("https://github.com/acme/repo/blob/main/f{i}")));
        }
        let fetcher = Arc::new(fetcher);
        let writer = MirrorWriter::new(fetcher.clone(), &MirrorConfig::new().with_max_concurrency(3));

        let report = writer.persist_all(files, temp.path()).await;

        assert!(report.is_complete());
        assert_eq!(report.written.len(), 8);
        assert!(fetcher.max_in_flight() <= 3);
    }
}
