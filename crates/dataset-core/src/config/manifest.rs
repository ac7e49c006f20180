//! Expected post-install content of an install root

use crate::pathset::{PathEntry, PathSet};
use crate::{Error, Result};
use dataset_fs::InstallFile;

/// The set of paths a correct installation must contain.
///
/// Built once per install profile and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    entries: PathSet,
}

impl Manifest {
    /// Build a manifest from root-relative paths.
    ///
    /// Duplicates collapse into one entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifestPath`] for a path that does not start
    /// with `/`, is the root itself, has empty, `.` or `..` segments, is
    /// listed both as a file and as a directory, or sits in a directory the
    /// manifest does not list.
    ///
    /// # Example
    ///
    /// ```
    /// use dataset_core::Manifest;
    ///
    /// let manifest = Manifest::new(["/data.csv", "/sub/"]).unwrap();
    /// assert!(manifest.contains("/sub/"));
    /// assert_eq!(manifest.directories().count(), 1);
    /// ```
    pub fn new<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let mut entries = PathSet::new();
        for path in paths {
            let path = path.into();
            validate_entry(&path)?;
            entries.insert(PathEntry::new(path));
        }

        for dir in entries.directories() {
            let as_file = dir.path().trim_end_matches('/');
            if entries.contains(as_file) {
                return Err(Error::InvalidManifestPath {
                    path: as_file.to_string(),
                    reason: "listed both as a file and as a directory".into(),
                });
            }
        }

        // Restoring an entry creates its parents, so every parent must be listed.
        for entry in entries.iter() {
            if let Some(parent) = parent_dir(entry.path())
                && !entries.contains(parent)
            {
                return Err(Error::InvalidManifestPath {
                    path: entry.path().to_string(),
                    reason: format!("parent directory {parent} is not listed"),
                });
            }
        }

        Ok(Self { entries })
    }

    /// The default manifest: a single `/archive.zip`.
    pub fn archive() -> Self {
        let mut entries = PathSet::new();
        entries.insert(PathEntry::new(InstallFile::Archive.as_entry()));
        Self { entries }
    }

    pub fn entries(&self) -> &PathSet {
        &self.entries
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains(path)
    }

    pub fn directories(&self) -> impl Iterator<Item = &PathEntry> {
        self.entries.directories()
    }

    pub fn files(&self) -> impl Iterator<Item = &PathEntry> {
        self.entries.files()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The directory entry holding `path`, or `None` at the top level.
fn parent_dir(path: &str) -> Option<&str> {
    let idx = path.trim_end_matches('/').rfind('/')?;
    (idx > 0).then(|| &path[..=idx])
}

fn validate_entry(path: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidManifestPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if !path.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    if path == "/" {
        return Err(invalid("the install root itself cannot be an entry"));
    }
    if path.contains('\\') {
        return Err(invalid("must use '/' separators"));
    }

    let body = path[1..].strip_suffix('/').unwrap_or(&path[1..]);
    for segment in body.split('/') {
        match segment {
            "" => return Err(invalid("contains an empty segment")),
            "." | ".." => return Err(invalid("contains a relative segment")),
            _ => {}
        }
    }
    Ok(())
}
