//! Deduplicated set of files discovered by a tree walk.

use std::collections::HashSet;
use std::collections::hash_set;

use super::location::RemoteLocation;
use crate::error::{InstallError, InstallResult};

/// Files found under a directory, keyed by structural identity.
///
/// Each recursive walk step builds its own set and hands it to its caller,
/// which merges it in; there is no set shared between concurrent walks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredFiles {
    files: HashSet<RemoteLocation>,
}

impl DiscoveredFiles {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; returns `false` if it was already present.
    pub fn insert(&mut self, file: RemoteLocation) -> InstallResult<bool> {
        if !file.is_file() {
            return Err(InstallError::NotAFile {
                location: file.to_string(),
            });
        }
        Ok(self.files.insert(file))
    }

    /// Union another set into this one.
    pub fn merge(&mut self, other: Self) {
        self.files.extend(other.files);
    }

    /// Number of distinct files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if no file was discovered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check membership by structural identity.
    pub fn contains(&self, file: &RemoteLocation) -> bool {
        self.files.contains(file)
    }

    /// Iterate in unspecified order.
    pub fn iter(&self) -> hash_set::Iter<'_, RemoteLocation> {
        self.files.iter()
    }

    /// Files sorted by repository, branch and path.
    pub fn into_sorted_vec(self) -> Vec<RemoteLocation> {
        let mut files: Vec<_> = self.files.into_iter().collect();
        files.sort();
        files
    }
}

impl IntoIterator for DiscoveredFiles {
    type Item = RemoteLocation;
    type IntoIter = hash_set::IntoIter<RemoteLocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiscoveredFiles {
    type Item = &'a RemoteLocation;
    type IntoIter = hash_set::Iter<'a, RemoteLocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> RemoteLocation {
        RemoteLocation::parse(&format!("https://github.com/acme/repo/blob/main/{path}")).unwrap()
    }

    #[test]
    fn test_insert_deduplicates_across_hosts() {
        let mut files = DiscoveredFiles::new();
        assert!(files.insert(file("a.py")).unwrap());

        let same_via_raw =
            RemoteLocation::parse("https://raw.githubusercontent.com/acme/repo/main/a.py")
                .unwrap();
        assert!(!files.insert(same_via_raw).unwrap());
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_insert_rejects_directories() {
        let mut files = DiscoveredFiles::new();
        let dir = RemoteLocation::parse("https://github.com/acme/repo/tree/main/src").unwrap();
        assert!(matches!(
            files.insert(dir),
            Err(InstallError::NotAFile { .. })
        ));
        assert!(files.is_empty());
    }

    #[test]
    fn test_merge_is_a_union() {
        let mut left = DiscoveredFiles::new();
        left.insert(file("a.py")).unwrap();
        left.insert(file("b.py")).unwrap();

        let mut right = DiscoveredFiles::new();
        right.insert(file("b.py")).unwrap();
        right.insert(file("c/d.py")).unwrap();

        left.merge(right);

        assert_eq!(left.len(), 3);
        assert!(left.contains(&file("c/d.py")));
    }

    #[test]
    fn test_into_sorted_vec() {
        let mut files = DiscoveredFiles::new();
        files.insert(file("b.py")).unwrap();
        files.insert(file("a.py")).unwrap();

        let sorted = files.into_sorted_vec();
        assert_eq!(sorted, vec![file("a.py"), file("b.py")]);
    }
}
