//! Install context resolution
//!
//! Loads the install profile named on the command line and builds the
//! pieces every command needs from it.

use std::path::Path;

use dataset_core::{DatasetManager, InstallProfile, SourceSelection};
use dataset_fs::{InstallLock, LocalStorage, NormalizedPath};

use crate::error::{CliError, Result};

/// A loaded and validated install profile.
#[derive(Debug, Clone)]
pub struct InstallContext {
    pub profile: InstallProfile,
}

impl InstallContext {
    /// Load and validate the profile at `profile_path`.
    pub fn load(profile_path: &Path) -> Result<Self> {
        if !profile_path.exists() {
            return Err(CliError::user(format!(
                "No install profile found at {}. Pass --profile <path>.",
                profile_path.display()
            )));
        }
        let profile = InstallProfile::load(&NormalizedPath::new(profile_path))?;
        tracing::debug!(profile = %profile_path.display(), layout = %profile.layout(), "loaded profile");

        Ok(Self { profile })
    }

    pub fn install_path(&self) -> Result<NormalizedPath> {
        Ok(self.profile.install_path()?)
    }

    /// Build a manager over the local filesystem.
    pub fn manager(&self, staging: bool) -> Result<DatasetManager<LocalStorage>> {
        let selection = if staging {
            SourceSelection::Staging
        } else {
            SourceSelection::Primary
        };
        Ok(DatasetManager::from_profile(
            LocalStorage::new(),
            &self.profile,
            selection,
        )?)
    }

    /// Take the advisory lock that sits next to the install root.
    pub fn lock(&self) -> Result<InstallLock> {
        let install_path = self.install_path()?;
        let lock_path = lock_path_for(&install_path);
        InstallLock::acquire(&lock_path).map_err(|e| match e {
            dataset_fs::Error::LockFailed { .. } => CliError::user(format!(
                "Another datasets command is running against {}",
                install_path
            )),
            other => other.into(),
        })
    }
}

/// `<install_path>.lock`, a sibling of the install root.
pub fn lock_path_for(install_path: &NormalizedPath) -> NormalizedPath {
    NormalizedPath::new(format!(
        "{}.lock",
        install_path.as_str().trim_end_matches('/')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_sits_beside_install_root() {
        let path = lock_path_for(&NormalizedPath::new("/data/archives/"));
        assert_eq!(path.as_str(), "/data/archives.lock");
    }

    #[test]
    fn test_missing_profile_is_user_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let err = InstallContext::load(&temp_dir.path().join("datasets.toml")).unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
    }
}
