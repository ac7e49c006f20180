//! DatasetManager implementation

use std::time::Instant;

use dataset_fs::{InstallFile, NormalizedPath, Storage};

use super::action::{InstallAction, InstallState, InstallSummary};
use crate::config::{InstallLayout, InstallProfile, Manifest, SourceSelection};
use crate::reconcile::{Reconciler, RepairPlan, RepairReport};
use crate::{Error, Result};

/// Installs datasets from a source URI and keeps the install root repaired.
///
/// The manager keeps running totals of fixes and repaired paths across
/// `validate` calls. `install` resets them.
pub struct DatasetManager<S> {
    storage: S,
    source_uri: String,
    install_path: NormalizedPath,
    datasets_path: Option<NormalizedPath>,
    layout: InstallLayout,
    manifest: Manifest,
    install_window: Option<(String, String)>,
    totals: RepairReport,
}

impl<S: Storage> DatasetManager<S> {
    /// Create a manager for a classic install straight into `install_path`.
    pub fn new(
        storage: S,
        source_uri: impl Into<String>,
        install_path: NormalizedPath,
        manifest: Manifest,
    ) -> Self {
        Self {
            storage,
            source_uri: source_uri.into(),
            datasets_path: Some(install_path.clone()),
            install_path,
            layout: InstallLayout::Datasets,
            manifest,
            install_window: None,
            totals: RepairReport::clean(),
        }
    }

    /// Create a manager from a loaded profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is invalid, lists a bad manifest
    /// path, or selects a staging source it does not configure.
    pub fn from_profile(
        storage: S,
        profile: &InstallProfile,
        selection: SourceSelection,
    ) -> Result<Self> {
        profile.validate()?;
        Ok(Self {
            storage,
            source_uri: profile.source_uri(selection)?.to_string(),
            install_path: profile.install_path()?,
            datasets_path: profile.datasets_path(),
            layout: profile.layout(),
            manifest: profile.manifest()?,
            install_window: profile
                .install_window()
                .map(|(min, max)| (min.to_string(), max.to_string())),
            totals: RepairReport::clean(),
        })
    }

    /// Whether the install root exists.
    pub fn state(&self) -> InstallState {
        if self.storage.exists(&self.install_path) {
            InstallState::Installed
        } else {
            InstallState::NotInstalled
        }
    }

    /// Install, reinstall or keep the datasets, then reconcile and unpack.
    ///
    /// # Errors
    ///
    /// Returns an error if removing the previous install, transferring the
    /// archive, a repair or unpacking fails.
    pub fn install(&mut self, reinstall: bool) -> Result<InstallSummary> {
        let start = Instant::now();
        self.totals = RepairReport::clean();

        let action = InstallAction::decide(self.state(), reinstall);
        if action == InstallAction::Reinstall {
            self.remove_installed()?;
        }
        if action.transfers() {
            self.transfer()?;
        } else {
            tracing::info!(
                install_path = %self.install_path,
                layout = %self.layout,
                "skipping transfer of existing install"
            );
        }

        self.validate(false)?;
        let unpacked = self.unpack_archive()?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!(%action, fixes = self.totals.fixes, unpacked, elapsed_ms, "dataset installation completed");

        Ok(InstallSummary {
            action,
            fixes: self.totals.fixes,
            repaired_paths: self.totals.repaired_paths.clone(),
            unpacked,
            elapsed_ms,
        })
    }

    /// Reconcile the install root against the manifest.
    ///
    /// The pass is added to the running totals.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RepairFailed`] when a repair fails; the repairs made
    /// before it still count towards the totals. With `fail_fast`, returns
    /// [`Error::UnexpectedDrift`] when the running fix total is non-zero.
    pub fn validate(&mut self, fail_fast: bool) -> Result<RepairReport> {
        let start = Instant::now();
        tracing::info!(install_path = %self.install_path, "validating local assets");

        let result = self.reconciler().validate(&self.manifest);
        let report = match result {
            Ok(report) => report,
            Err(Error::RepairFailed {
                path,
                report,
                source,
            }) => {
                self.absorb(&report);
                return Err(Error::RepairFailed {
                    path,
                    report,
                    source,
                });
            }
            Err(e) => return Err(e),
        };
        self.absorb(&report);

        tracing::info!(
            fixes = self.totals.fixes,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "{}",
            report.summary()
        );

        if fail_fast && self.totals.fixes > 0 {
            return Err(Error::UnexpectedDrift {
                fixes: self.totals.fixes,
            });
        }
        Ok(report)
    }

    /// The repairs `validate` would apply right now.
    pub fn plan(&self) -> Result<RepairPlan> {
        let reconciler = self.reconciler();
        let local = reconciler.snapshot();
        Ok(reconciler.plan(&local, &self.manifest))
    }

    /// Unpack `archive.zip` into the datasets directory.
    ///
    /// Returns `Ok(false)` without unpacking for the datasets layout, when
    /// no datasets directory is configured, or when it already has content.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be unpacked.
    pub fn unpack_archive(&self) -> Result<bool> {
        if self.layout != InstallLayout::Archive {
            tracing::debug!(layout = %self.layout, "nothing to unpack");
            return Ok(false);
        }
        let Some(datasets) = &self.datasets_path else {
            tracing::info!("no datasets_path configured, skipping unpack");
            return Ok(false);
        };

        let populated = match self.storage.list_children(datasets) {
            Ok(children) => !children.is_empty(),
            Err(e) => {
                tracing::debug!(path = %datasets, error = %e, "treating unlistable datasets path as empty");
                false
            }
        };
        if populated {
            tracing::info!(datasets_path = %datasets, "skipping unpack of existing datasets");
            return Ok(false);
        }

        let start = Instant::now();
        let archive = self.install_path.join(InstallFile::Archive.as_str());
        self.storage.unpack_archive(&archive, datasets)?;
        tracing::info!(
            datasets_path = %datasets,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "unpacked datasets"
        );
        Ok(true)
    }

    /// Running fix total since the last `install`.
    pub fn fixes(&self) -> usize {
        self.totals.fixes
    }

    /// Running list of repaired ledger entries since the last `install`.
    pub fn repaired_paths(&self) -> &[String] {
        &self.totals.repaired_paths
    }

    /// Every repair applied since the last `install`, in order.
    pub fn totals(&self) -> &RepairReport {
        &self.totals
    }

    pub fn install_path(&self) -> &NormalizedPath {
        &self.install_path
    }

    pub fn datasets_path(&self) -> Option<&NormalizedPath> {
        self.datasets_path.as_ref()
    }

    pub fn layout(&self) -> InstallLayout {
        self.layout
    }

    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    fn reconciler(&self) -> Reconciler<&S> {
        Reconciler::new(&self.storage, self.source_uri.as_str(), self.install_path.clone())
    }

    fn absorb(&mut self, report: &RepairReport) {
        self.totals = std::mem::take(&mut self.totals).merge(report.clone());
    }

    fn remove_installed(&self) -> Result<()> {
        tracing::info!(install_path = %self.install_path, layout = %self.layout, "removing previous install");
        self.storage.delete_subtree(&self.install_path)?;

        if self.layout == InstallLayout::Archive
            && let Some(datasets) = &self.datasets_path
        {
            self.storage.delete_subtree(datasets)?;
        }
        Ok(())
    }

    fn transfer(&self) -> Result<()> {
        let file = InstallFile::Archive.as_str();
        let source = format!("{}/{file}", self.source_uri.trim_end_matches('/'));
        let dest = self.install_path.join(file);

        tracing::info!(
            from = %source,
            temp = %dest,
            to = ?self.datasets_path.as_ref().map(|p| p.as_str()),
            "installing datasets"
        );
        if let Some((min, max)) = &self.install_window {
            tracing::info!(
                "this can take as little as {min} and upwards to {max}, but it is a one-time operation"
            );
        }

        let start = Instant::now();
        self.storage.copy(&source, &dest, true)?;
        tracing::info!(
            file,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "downloaded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset_test_utils::{MemoryStorage, StorageCall};
    use pretty_assertions::assert_eq;

    fn classic<'a>(storage: &'a MemoryStorage, manifest: &[&str]) -> DatasetManager<&'a MemoryStorage> {
        DatasetManager::new(
            storage,
            "mem://source",
            NormalizedPath::new("/datasets"),
            Manifest::new(manifest.iter().copied()).unwrap(),
        )
    }

    fn archive_profile() -> InstallProfile {
        InstallProfile {
            data_source_uri: "mem://source".into(),
            datasets_path: Some("/datasets".into()),
            archives_path: Some("/archives".into()),
            ..Default::default()
        }
    }

    #[test]
    fn fresh_install_transfers_archive() {
        let storage = MemoryStorage::new();
        storage.add_file("/source/archive.zip");
        let mut manager = classic(&storage, &["/archive.zip"]);

        let summary = manager.install(false).unwrap();

        assert_eq!(summary.action, InstallAction::Fresh);
        assert_eq!(summary.fixes, 0);
        assert!(!summary.unpacked);
        assert_eq!(storage.tree("/datasets"), vec!["/archive.zip"]);
    }

    #[test]
    fn existing_install_is_only_reconciled() {
        let storage = MemoryStorage::new();
        storage.add_file("/source/archive.zip");
        storage.add_file("/datasets/archive.zip");
        storage.add_file("/datasets/stray.csv");
        let mut manager = classic(&storage, &["/archive.zip"]);

        let summary = manager.install(false).unwrap();

        assert_eq!(summary.action, InstallAction::Skip);
        assert_eq!(summary.fixes, 1);
        assert_eq!(
            storage.mutations(),
            vec![StorageCall::Delete {
                path: "/datasets/stray.csv".into()
            }]
        );
    }

    #[test]
    fn archive_reinstall_clears_both_directories_and_unpacks() {
        let storage = MemoryStorage::new();
        storage.add_archive("/source/archive.zip", &["a.csv", "sub/", "sub/b.csv"]);
        storage.add_file("/archives/archive.zip");
        storage.add_file("/datasets/old.csv");
        let mut manager =
            DatasetManager::from_profile(&storage, &archive_profile(), SourceSelection::Primary)
                .unwrap();

        let summary = manager.install(true).unwrap();

        assert_eq!(summary.action, InstallAction::Reinstall);
        assert!(summary.unpacked);
        assert_eq!(
            storage.tree("/datasets"),
            vec!["/a.csv", "/sub/", "/sub/b.csv"]
        );
        assert_eq!(storage.tree("/archives"), vec!["/archive.zip"]);
    }

    #[test]
    fn unpack_skipped_when_datasets_populated() {
        let storage = MemoryStorage::new();
        storage.add_archive("/archives/archive.zip", &["a.csv"]);
        storage.add_file("/datasets/existing.csv");
        let manager =
            DatasetManager::from_profile(&storage, &archive_profile(), SourceSelection::Primary)
                .unwrap();

        assert!(!manager.unpack_archive().unwrap());
        assert_eq!(storage.tree("/datasets"), vec!["/existing.csv"]);
    }

    #[test]
    fn unpack_treats_missing_datasets_dir_as_empty() {
        let storage = MemoryStorage::new();
        storage.add_archive("/archives/archive.zip", &["a.csv"]);
        let manager =
            DatasetManager::from_profile(&storage, &archive_profile(), SourceSelection::Primary)
                .unwrap();

        assert!(manager.unpack_archive().unwrap());
        assert_eq!(storage.tree("/datasets"), vec!["/a.csv"]);
    }

    #[test]
    fn fail_fast_reports_running_total() {
        let storage = MemoryStorage::new();
        storage.add_file("/source/archive.zip");
        storage.add_file("/datasets/archive.zip");
        storage.add_file("/datasets/extra.csv");
        let mut manager = classic(&storage, &["/archive.zip"]);

        let err = manager.validate(true).unwrap_err();

        assert!(matches!(err, Error::UnexpectedDrift { fixes: 1 }));
        assert_eq!(manager.fixes(), 1);
        assert_eq!(manager.repaired_paths(), &[] as &[String]);

        // Clean now, but the running total still counts the earlier fix.
        let err = manager.validate(true).unwrap_err();
        assert!(matches!(err, Error::UnexpectedDrift { fixes: 1 }));
    }

    #[test]
    fn install_resets_running_totals() {
        let storage = MemoryStorage::new();
        storage.add_file("/source/archive.zip");
        storage.add_file("/datasets/archive.zip");
        storage.add_dir("/datasets/junk");
        let mut manager = classic(&storage, &["/archive.zip"]);

        manager.validate(false).unwrap();
        assert_eq!(manager.fixes(), 1);
        assert_eq!(manager.repaired_paths(), &["/junk/".to_string()]);

        let summary = manager.install(false).unwrap();
        assert_eq!(summary.fixes, 0);
        assert_eq!(manager.fixes(), 0);
        assert!(manager.repaired_paths().is_empty());
    }

    #[test]
    fn repair_failure_still_counts_partial_fixes() {
        let storage = MemoryStorage::new();
        storage.add_file("/datasets/archive.zip");
        storage.add_dir("/datasets/junk");
        storage.add_file("/datasets/stray.csv");
        storage.fail_delete("/datasets/stray.csv");
        let mut manager = classic(&storage, &["/archive.zip"]);

        let err = manager.validate(false).unwrap_err();

        assert!(matches!(err, Error::RepairFailed { .. }));
        assert_eq!(manager.fixes(), 1);
        assert_eq!(manager.repaired_paths(), &["/junk/".to_string()]);
    }

    #[test]
    fn totals_accumulate_actions_across_passes() {
        let storage = MemoryStorage::new();
        storage.add_file("/source/archive.zip");
        storage.add_file("/datasets/archive.zip");
        storage.add_file("/datasets/first.csv");
        let mut manager = classic(&storage, &["/archive.zip"]);

        manager.validate(false).unwrap();
        storage.add_dir("/datasets/second");
        manager.validate(false).unwrap();

        let paths: Vec<&str> = manager
            .totals()
            .actions
            .iter()
            .map(|a| a.path.as_str())
            .collect();
        assert_eq!(paths, vec!["/first.csv", "/second/"]);
        assert_eq!(manager.fixes(), 2);
        assert_eq!(manager.repaired_paths(), &["/second/".to_string()]);
    }

    #[test]
    fn skip_never_copies_the_archive() {
        let storage = MemoryStorage::new();
        storage.add_file("/source/archive.zip");
        storage.add_file("/datasets/archive.zip");
        let mut manager = classic(&storage, &["/archive.zip"]);

        let summary = manager.install(false).unwrap();

        assert!(!summary.action.transfers());
        assert!(storage.mutations().is_empty());
    }

    #[test]
    fn plan_does_not_mutate() {
        let storage = MemoryStorage::new();
        storage.add_file("/datasets/stray.csv");
        let manager = classic(&storage, &["/archive.zip"]);

        let plan = manager.plan().unwrap();

        assert_eq!(plan.len(), 2);
        assert!(storage.mutations().is_empty());
    }

    #[test]
    fn staging_without_uri_is_rejected() {
        let storage = MemoryStorage::new();
        let result =
            DatasetManager::from_profile(&storage, &archive_profile(), SourceSelection::Staging);
        assert!(matches!(result, Err(Error::StagingSourceMissing)));
    }
}
