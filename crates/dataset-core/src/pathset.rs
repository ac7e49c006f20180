//! Root-relative path sets
//!
//! A [`PathSet`] describes the content of an install root as strings
//! relative to that root. Every path starts with `/`, and directories carry
//! a trailing `/`, so `/sub/` and `/sub` name a directory and a file.

use std::collections::BTreeSet;

use dataset_fs::{NormalizedPath, Storage};
use serde::{Deserialize, Serialize};

/// A single root-relative path.
///
/// Serialized as its path string; the kind is always derived from it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PathEntry {
    path: String,
    is_directory: bool,
}

impl PathEntry {
    /// Create an entry; a trailing `/` marks a directory.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let is_directory = path.ends_with('/');
        Self { path, is_directory }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }
}

impl From<String> for PathEntry {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<PathEntry> for String {
    fn from(entry: PathEntry) -> Self {
        entry.path
    }
}

impl std::fmt::Display for PathEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

/// Unique path entries in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSet {
    entries: BTreeSet<PathEntry>,
}

impl PathSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recursively list `root` through `storage`.
    ///
    /// A root that cannot be listed yields an empty set, since "nothing
    /// installed yet" is an ordinary state. Sub-directories that fail to
    /// list are treated as empty.
    pub fn scan<S: Storage + ?Sized>(storage: &S, root: &NormalizedPath) -> Self {
        let mut set = Self::new();
        // (absolute directory, its root-relative form ending in '/')
        let mut pending = vec![(root.clone(), "/".to_string())];

        while let Some((dir, relative)) = pending.pop() {
            let children = match storage.list_children(&dir) {
                Ok(children) => children,
                Err(e) => {
                    tracing::debug!(path = %dir, error = %e, "listing failed, treating as empty");
                    continue;
                }
            };

            for child in children {
                if child.is_directory {
                    let child_relative = format!("{relative}{}/", child.name);
                    pending.push((dir.join(&child.name), child_relative.clone()));
                    set.insert(PathEntry::new(child_relative));
                } else {
                    set.insert(PathEntry::new(format!("{relative}{}", child.name)));
                }
            }
        }

        set
    }

    /// Build a set from path strings.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        paths.into_iter().map(PathEntry::new).collect()
    }

    /// Insert an entry, returning false if it was already present.
    pub fn insert(&mut self, entry: PathEntry) -> bool {
        self.entries.insert(entry)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains(&PathEntry::new(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = &PathEntry> {
        self.entries.iter()
    }

    /// Directory entries in path order.
    pub fn directories(&self) -> impl Iterator<Item = &PathEntry> {
        self.entries.iter().filter(|e| e.is_directory())
    }

    /// File entries in path order.
    pub fn files(&self) -> impl Iterator<Item = &PathEntry> {
        self.entries.iter().filter(|e| !e.is_directory())
    }
}

impl FromIterator<PathEntry> for PathSet {
    fn from_iter<T: IntoIterator<Item = PathEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a PathEntry;
    type IntoIter = std::collections::btree_set::Iter<'a, PathEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
