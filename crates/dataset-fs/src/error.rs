//! Error types for dataset-fs

use std::path::PathBuf;

/// Result type for dataset-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dataset-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Listing the children of a path failed.
    ///
    /// Callers walking a tree treat this as "no children".
    #[error("Failed to list {path}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {source_uri} to {dest}: {source}")]
    Transfer {
        source_uri: String,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to unpack {archive} into {dest}: {message}")]
    Unpack {
        archive: PathBuf,
        dest: PathBuf,
        message: String,
    },

    #[error("Unsupported source URI: {uri}")]
    UnsupportedScheme { uri: String },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn listing(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Listing {
            path: path.into(),
            source,
        }
    }

    pub fn transfer(
        source_uri: impl Into<String>,
        dest: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Transfer {
            source_uri: source_uri.into(),
            dest: dest.into(),
            source,
        }
    }

    pub fn delete(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Delete {
            path: path.into(),
            source,
        }
    }

    pub fn unpack(
        archive: impl Into<PathBuf>,
        dest: impl Into<PathBuf>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Unpack {
            archive: archive.into(),
            dest: dest.into(),
            message: message.to_string(),
        }
    }
}
