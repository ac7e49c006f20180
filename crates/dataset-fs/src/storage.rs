//! Storage collaborator interface
//!
//! The reconciliation engine never touches the filesystem directly. Every
//! read and mutation goes through a [`Storage`] implementation, which keeps
//! transport and archive handling out of the engine and lets tests record
//! the exact sequence of operations.

use crate::{NormalizedPath, Result};

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChildEntry {
    /// File or directory name, without any separator
    pub name: String,
    /// Whether the child is a directory
    pub is_directory: bool,
}

impl ChildEntry {
    /// Create a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
        }
    }

    /// Create a directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
        }
    }
}

/// Primitive operations the installer needs from a storage backend.
pub trait Storage {
    /// List the immediate children of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Listing`] if `path` cannot be listed. Tree
    /// walkers treat this as an empty directory.
    fn list_children(&self, path: &NormalizedPath) -> Result<Vec<ChildEntry>>;

    /// Whether anything exists at `path`.
    fn exists(&self, path: &NormalizedPath) -> bool;

    /// Copy a file or a whole directory from `source_uri` to `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transfer`] on failure, including when `dest`
    /// already exists and `overwrite` is false.
    fn copy(&self, source_uri: &str, dest: &NormalizedPath, overwrite: bool) -> Result<()>;

    /// Delete `path` and everything beneath it. Deleting a missing path succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Delete`] on failure.
    fn delete_subtree(&self, path: &NormalizedPath) -> Result<()>;

    /// Unpack the archive at `archive` into the directory `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Unpack`] on failure.
    fn unpack_archive(&self, archive: &NormalizedPath, dest: &NormalizedPath) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn list_children(&self, path: &NormalizedPath) -> Result<Vec<ChildEntry>> {
        (**self).list_children(path)
    }

    fn exists(&self, path: &NormalizedPath) -> bool {
        (**self).exists(path)
    }

    fn copy(&self, source_uri: &str, dest: &NormalizedPath, overwrite: bool) -> Result<()> {
        (**self).copy(source_uri, dest, overwrite)
    }

    fn delete_subtree(&self, path: &NormalizedPath) -> Result<()> {
        (**self).delete_subtree(path)
    }

    fn unpack_archive(&self, archive: &NormalizedPath, dest: &NormalizedPath) -> Result<()> {
        (**self).unpack_archive(archive, dest)
    }
}
