//! Error types for dataset-core

use crate::reconcile::RepairReport;

/// Result type for dataset-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dataset-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A storage primitive failed while repairing `path`.
    ///
    /// `report` holds the repairs applied before the failure.
    #[error("Repair failed at {path}: {source}")]
    RepairFailed {
        path: String,
        report: Box<RepairReport>,
        #[source]
        source: dataset_fs::Error,
    },

    /// Strict validation found and fixed drift
    #[error("Unexpected modifications to installed datasets: {fixes} fix(es) applied")]
    UnexpectedDrift { fixes: usize },

    /// Install profile is missing required settings
    #[error("Invalid install profile: {message}")]
    InvalidProfile { message: String },

    /// Manifest entry is not a valid root-relative path
    #[error("Invalid manifest path {path:?}: {reason}")]
    InvalidManifestPath { path: String, reason: String },

    /// Staging source selected but not configured
    #[error("Staging source requested but the profile has no staging_source_uri")]
    StagingSourceMissing,

    /// Filesystem error from dataset-fs
    #[error(transparent)]
    Fs(#[from] dataset_fs::Error),
}
