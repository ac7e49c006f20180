//! Install profile loaded from `datasets.toml` (or JSON / YAML)

use dataset_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use super::Manifest;
use crate::{Error, Result};

/// How the datasets land on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallLayout {
    /// Shared datasets installed directly into `datasets_path`
    Datasets,
    /// Per-user archive installed into `archives_path`, then unpacked
    Archive,
}

impl std::fmt::Display for InstallLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Datasets => write!(f, "datasets"),
            Self::Archive => write!(f, "archive"),
        }
    }
}

/// Which configured source URI to install from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceSelection {
    #[default]
    Primary,
    Staging,
}

/// Where datasets come from and where they are installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallProfile {
    /// Base URI of the published datasets
    pub data_source_uri: String,

    /// Base URI of not-yet-published datasets
    #[serde(default)]
    pub staging_source_uri: Option<String>,

    /// Directory the datasets are installed or unpacked into
    #[serde(default)]
    pub datasets_path: Option<String>,

    /// Directory holding `archive.zip`; selects the archive layout
    #[serde(default)]
    pub archives_path: Option<String>,

    /// Human-readable lower bound of a fresh install's duration
    #[serde(default)]
    pub install_min_time: Option<String>,

    /// Human-readable upper bound of a fresh install's duration
    #[serde(default)]
    pub install_max_time: Option<String>,

    /// Expected content of the install root; defaults to `/archive.zip`
    #[serde(default)]
    pub manifest: Option<Vec<String>>,
}

impl InstallProfile {
    /// Load and validate a profile; the format follows the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// profile fails [`InstallProfile::validate`].
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let profile: InstallProfile = ConfigStore::new().load(path)?;
        profile.validate()?;
        tracing::debug!(path = %path, layout = %profile.layout(), "loaded install profile");
        Ok(profile)
    }

    /// Check that the profile names a source and an install location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProfile`] when `data_source_uri` is blank or
    /// neither `datasets_path` nor `archives_path` is set, and
    /// [`Error::InvalidManifestPath`] for a bad manifest entry.
    pub fn validate(&self) -> Result<()> {
        if self.data_source_uri.trim().is_empty() {
            return Err(Error::InvalidProfile {
                message: "data_source_uri must not be empty".into(),
            });
        }
        if self.datasets_path.is_none() && self.archives_path.is_none() {
            return Err(Error::InvalidProfile {
                message: "one of datasets_path or archives_path must be specified".into(),
            });
        }
        self.manifest()?;
        Ok(())
    }

    /// Archive layout whenever `archives_path` is set.
    pub fn layout(&self) -> InstallLayout {
        if self.archives_path.is_some() {
            InstallLayout::Archive
        } else {
            InstallLayout::Datasets
        }
    }

    /// The directory reconciled against the manifest.
    ///
    /// `archives_path` is preferred over `datasets_path`.
    pub fn install_path(&self) -> Result<NormalizedPath> {
        self.archives_path
            .as_deref()
            .or(self.datasets_path.as_deref())
            .map(NormalizedPath::new)
            .ok_or_else(|| Error::InvalidProfile {
                message: "one of datasets_path or archives_path must be specified".into(),
            })
    }

    pub fn datasets_path(&self) -> Option<NormalizedPath> {
        self.datasets_path.as_deref().map(NormalizedPath::new)
    }

    pub fn archives_path(&self) -> Option<NormalizedPath> {
        self.archives_path.as_deref().map(NormalizedPath::new)
    }

    /// Resolve the source URI for `selection`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StagingSourceMissing`] when staging is selected but
    /// not configured.
    pub fn source_uri(&self, selection: SourceSelection) -> Result<&str> {
        match selection {
            SourceSelection::Primary => Ok(&self.data_source_uri),
            SourceSelection::Staging => self
                .staging_source_uri
                .as_deref()
                .ok_or(Error::StagingSourceMissing),
        }
    }

    /// The manifest for this profile.
    pub fn manifest(&self) -> Result<Manifest> {
        match &self.manifest {
            Some(paths) => Manifest::new(paths.iter().cloned()),
            None => Ok(Manifest::archive()),
        }
    }

    /// Expected fresh-install duration, when both bounds are configured.
    pub fn install_window(&self) -> Option<(&str, &str)> {
        Some((
            self.install_min_time.as_deref()?,
            self.install_max_time.as_deref()?,
        ))
    }
}
