//! Reconciler implementation
//!
//! The Reconciler applies a [`RepairPlan`] to an install root through a
//! [`Storage`] backend. Removals go through `delete_subtree`; restores copy
//! the same root-relative path from the source URI.

use std::time::Instant;

use dataset_fs::{NormalizedPath, Storage};

use super::plan::{RepairAction, RepairPlan};
use super::report::RepairReport;
use crate::config::Manifest;
use crate::pathset::PathSet;
use crate::{Error, Result};

/// Repairs one install root from one source.
pub struct Reconciler<S> {
    storage: S,
    /// Base URI restores are copied from
    source_uri: String,
    /// Install root the manifest is relative to
    root: NormalizedPath,
}

impl<S: Storage> Reconciler<S> {
    /// Create a Reconciler
    ///
    /// # Arguments
    ///
    /// * `storage` - Backend used for listing, copying and deleting
    /// * `source_uri` - Base URI that manifest paths are resolved against
    /// * `root` - The install root being repaired
    pub fn new(storage: S, source_uri: impl Into<String>, root: NormalizedPath) -> Self {
        Self {
            storage,
            source_uri: source_uri.into(),
            root,
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// List the install root as it is right now.
    pub fn snapshot(&self) -> PathSet {
        PathSet::scan(&self.storage, &self.root)
    }

    /// Compute the repairs `reconcile` would apply, without applying them.
    pub fn plan(&self, local: &PathSet, manifest: &Manifest) -> RepairPlan {
        RepairPlan::compute(local, manifest)
    }

    /// Diff `local` against `manifest` and apply every repair in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RepairFailed`] on the first failing primitive. The
    /// error carries the report of repairs applied before the failure; the
    /// remaining repairs are not attempted.
    pub fn reconcile(&self, local: &PathSet, manifest: &Manifest) -> Result<RepairReport> {
        let plan = self.plan(local, manifest);
        let mut report = RepairReport::clean();

        for action in plan.actions() {
            let start = Instant::now();
            if let Err(source) = self.apply(action) {
                tracing::warn!(path = %action.path, error = %source, "repair failed");
                return Err(Error::RepairFailed {
                    path: action.path.clone(),
                    report: Box::new(report),
                    source,
                });
            }
            tracing::info!(
                action = %action.kind,
                path = %action.path,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "repaired"
            );
            report.record(action, plan.ledger().is_recorded(&action.path));
        }

        Ok(report)
    }

    /// Snapshot the install root and reconcile it against `manifest`.
    pub fn validate(&self, manifest: &Manifest) -> Result<RepairReport> {
        let start = Instant::now();
        let local = self.snapshot();
        tracing::debug!(
            root = %self.root,
            entries = local.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "listed local files"
        );
        self.reconcile(&local, manifest)
    }

    fn apply(&self, action: &RepairAction) -> dataset_fs::Result<()> {
        let target = self.root.join_relative(&action.path);
        if action.kind.is_removal() {
            self.storage.delete_subtree(&target)
        } else {
            self.storage.copy(&self.source_for(&action.path), &target, true)
        }
    }

    fn source_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.source_uri.trim_end_matches('/'),
            path.trim_start_matches('/').trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset_test_utils::{MemoryStorage, StorageCall};
    use pretty_assertions::assert_eq;

    const ROOT: &str = "/install";
    const SOURCE: &str = "mem://source";

    fn reconciler(storage: &MemoryStorage) -> Reconciler<&MemoryStorage> {
        Reconciler::new(storage, SOURCE, NormalizedPath::new(ROOT))
    }

    #[test]
    fn source_for_strips_entry_slashes() {
        let storage = MemoryStorage::new();
        let r = reconciler(&storage);
        assert_eq!(r.source_for("/sub/"), "mem://source/sub");
        assert_eq!(r.source_for("/sub/a.csv"), "mem://source/sub/a.csv");
    }

    #[test]
    fn restores_copy_from_matching_source_path() {
        let storage = MemoryStorage::new();
        storage.add_file("/source/sub/a.csv");
        storage.add_file("/source/data.csv");
        storage.clear_calls();

        let manifest = Manifest::new(["/data.csv", "/sub/"]).unwrap();
        let report = reconciler(&storage).reconcile(&PathSet::new(), &manifest).unwrap();

        assert_eq!(report.fixes, 2);
        assert_eq!(
            storage.calls(),
            vec![
                StorageCall::Copy {
                    source: "mem://source/sub".into(),
                    dest: "/install/sub".into(),
                    overwrite: true,
                },
                StorageCall::Copy {
                    source: "mem://source/data.csv".into(),
                    dest: "/install/data.csv".into(),
                    overwrite: true,
                },
            ]
        );
    }

    #[test]
    fn failure_carries_partial_report() {
        let storage = MemoryStorage::new();
        storage.add_dir("/install/old");
        storage.add_file("/install/stray.csv");
        storage.fail_delete("/install/stray.csv");

        let r = reconciler(&storage);
        let local = r.snapshot();
        let err = r.reconcile(&local, &Manifest::new(["/keep.csv"]).unwrap()).unwrap_err();

        match err {
            Error::RepairFailed { path, report, .. } => {
                assert_eq!(path, "/stray.csv");
                assert_eq!(report.fixes, 1);
                assert_eq!(report.repaired_paths, vec!["/old/".to_string()]);
            }
            other => panic!("expected RepairFailed, got {other:?}"),
        }
        // The restore of /keep.csv came after the failure and never ran.
        assert!(!storage.exists(&NormalizedPath::new("/install/keep.csv")));
    }
}
