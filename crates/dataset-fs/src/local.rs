//! [`Storage`] backed by the local filesystem

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::io::{RobustnessConfig, copy_file_atomic, with_retry};
use crate::{ChildEntry, Error, NormalizedPath, Result, Storage};

/// Storage over local paths.
///
/// Source URIs are either `file://` URIs or bare paths. Any other scheme is
/// rejected with [`Error::UnsupportedScheme`]; remote transports plug in as
/// their own [`Storage`] implementations.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    robustness: RobustnessConfig,
}

impl LocalStorage {
    /// Create a LocalStorage with the default retry policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a LocalStorage with a custom retry policy.
    pub fn with_robustness(robustness: RobustnessConfig) -> Self {
        Self { robustness }
    }

    fn resolve_source(uri: &str) -> Result<PathBuf> {
        if let Some(rest) = uri.strip_prefix("file://") {
            return Ok(PathBuf::from(rest));
        }
        if uri.contains("://") {
            return Err(Error::UnsupportedScheme {
                uri: uri.to_string(),
            });
        }
        Ok(PathBuf::from(uri))
    }

    fn copy_tree(&self, src: &Path, dest: &NormalizedPath) -> io::Result<()> {
        fs::create_dir_all(dest.to_native())?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let target = dest.join(&name);
            if entry.file_type()?.is_dir() {
                self.copy_tree(&entry.path(), &target)?;
            } else {
                let path = entry.path();
                with_retry(self.robustness, || copy_file_atomic(&path, &target))?;
            }
        }
        Ok(())
    }

    fn remove_existing(path: &Path) -> io::Result<()> {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
            Ok(_) => fs::remove_file(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Storage for LocalStorage {
    fn list_children(&self, path: &NormalizedPath) -> Result<Vec<ChildEntry>> {
        let native = path.to_native();
        let entries = fs::read_dir(&native).map_err(|e| Error::listing(&native, e))?;

        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::listing(&native, e))?;
            // Symlinks are reported as files so a walk can never loop.
            let is_directory = entry
                .file_type()
                .map_err(|e| Error::listing(entry.path(), e))?
                .is_dir();
            children.push(ChildEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_directory,
            });
        }
        children.sort();
        Ok(children)
    }

    fn exists(&self, path: &NormalizedPath) -> bool {
        path.exists()
    }

    fn copy(&self, source_uri: &str, dest: &NormalizedPath, overwrite: bool) -> Result<()> {
        let src = Self::resolve_source(source_uri)?;
        let dest_native = dest.to_native();
        let transfer_err = |e: io::Error| Error::transfer(source_uri, &dest_native, e);

        if !overwrite && fs::symlink_metadata(&dest_native).is_ok() {
            return Err(transfer_err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "destination exists and overwrite is disabled",
            )));
        }

        let meta = fs::metadata(&src).map_err(transfer_err)?;
        tracing::debug!(source = source_uri, dest = %dest, dir = meta.is_dir(), "copying");

        // A file and a directory cannot share a name, so an entry of the
        // other kind at the destination is replaced outright.
        let dest_meta = fs::symlink_metadata(&dest_native).ok();
        if let Some(existing) = dest_meta
            && existing.is_dir() != meta.is_dir()
        {
            Self::remove_existing(&dest_native).map_err(transfer_err)?;
        }

        if meta.is_dir() {
            self.copy_tree(&src, dest).map_err(transfer_err)
        } else {
            with_retry(self.robustness, || copy_file_atomic(&src, dest)).map_err(transfer_err)
        }
    }

    fn delete_subtree(&self, path: &NormalizedPath) -> Result<()> {
        let native = path.to_native();
        tracing::debug!(path = %path, "deleting");
        Self::remove_existing(&native).map_err(|e| Error::delete(&native, e))
    }

    fn unpack_archive(&self, archive: &NormalizedPath, dest: &NormalizedPath) -> Result<()> {
        let archive_native = archive.to_native();
        let dest_native = dest.to_native();
        let unpack_err = |e: &dyn std::fmt::Display| Error::unpack(&archive_native, &dest_native, e);

        let file = File::open(&archive_native).map_err(|e| unpack_err(&e))?;
        let mut zip = zip::ZipArchive::new(file).map_err(|e| unpack_err(&e))?;
        fs::create_dir_all(&dest_native).map_err(|e| unpack_err(&e))?;

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i).map_err(|e| unpack_err(&e))?;

            // Sanitize the entry path to prevent path traversal
            let outpath = match entry.enclosed_name() {
                Some(path) => dest_native.join(path),
                None => {
                    tracing::warn!(entry = entry.name(), "skipping archive entry with unsafe path");
                    continue;
                }
            };

            if entry.is_dir() {
                fs::create_dir_all(&outpath).map_err(|e| unpack_err(&e))?;
                continue;
            }

            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent).map_err(|e| unpack_err(&e))?;
            }
            let mut outfile = File::create(&outpath).map_err(|e| unpack_err(&e))?;
            io::copy(&mut entry, &mut outfile).map_err(|e| unpack_err(&e))?;
        }

        tracing::debug!(archive = %archive, dest = %dest, entries = zip.len(), "unpacked archive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_source_accepts_file_uris_and_bare_paths() {
        assert_eq!(
            LocalStorage::resolve_source("file:///mnt/src/a.csv").unwrap(),
            PathBuf::from("/mnt/src/a.csv")
        );
        assert_eq!(
            LocalStorage::resolve_source("/mnt/src").unwrap(),
            PathBuf::from("/mnt/src")
        );
    }

    #[test]
    fn resolve_source_rejects_remote_schemes() {
        let err = LocalStorage::resolve_source("s3://bucket/data").unwrap_err();
        assert!(matches!(err, Error::UnsupportedScheme { .. }));
    }
}
