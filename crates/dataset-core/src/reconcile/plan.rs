//! Repair planning
//!
//! A plan is computed entirely from the initial snapshot. Directory
//! operations cascade, so they are planned before file operations, and the
//! ledger keeps anything beneath an already-planned directory out of the
//! later phases.

use serde::{Deserialize, Serialize};

use crate::config::Manifest;
use crate::ledger::RepairLedger;
use crate::pathset::PathSet;

/// The four kinds of repair, in the order their phases run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairKind {
    /// Delete a directory that is not in the manifest, with its subtree
    RemoveDirectory,
    /// Copy a directory missing from the install root
    RestoreDirectory,
    /// Delete a file that is not in the manifest
    RemoveFile,
    /// Copy a file missing from the install root
    RestoreFile,
}

impl RepairKind {
    /// Whether the action deletes content.
    pub fn is_removal(&self) -> bool {
        matches!(self, Self::RemoveDirectory | Self::RemoveFile)
    }
}

impl std::fmt::Display for RepairKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::RemoveDirectory => "removing extra path",
            Self::RestoreDirectory => "restoring missing path",
            Self::RemoveFile => "removing extra file",
            Self::RestoreFile => "restoring missing file",
        };
        f.write_str(label)
    }
}

/// One repair on a root-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairAction {
    pub kind: RepairKind,
    pub path: String,
}

impl RepairAction {
    fn new(kind: RepairKind, path: &str) -> Self {
        Self {
            kind,
            path: path.to_string(),
        }
    }
}

impl std::fmt::Display for RepairAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.path)
    }
}

/// Ordered repairs for one pass, plus the ledger that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairPlan {
    actions: Vec<RepairAction>,
    ledger: RepairLedger,
}

impl RepairPlan {
    /// Diff `local` against `manifest`.
    ///
    /// Phases run in this order:
    /// 1. extra directories are removed
    /// 2. missing directories are restored
    /// 3. extra files are removed
    /// 4. missing files are restored
    ///
    /// Directories from phases 1 and 2 are recorded in the ledger, and any
    /// candidate the ledger covers is skipped. A local file standing where
    /// the manifest wants a directory is removed in phase 2 right before
    /// the directory is restored.
    pub fn compute(local: &PathSet, manifest: &Manifest) -> Self {
        let mut plan = Self::default();

        for entry in local.directories() {
            let path = entry.path();
            if !manifest.contains(path) && !plan.ledger.covers(path) {
                plan.push(RepairKind::RemoveDirectory, path, true);
            }
        }

        for entry in manifest.directories() {
            let path = entry.path();
            if local.contains(path) || plan.ledger.covers(path) {
                continue;
            }
            let as_file = path.trim_end_matches('/');
            if local.contains(as_file) {
                plan.push(RepairKind::RemoveFile, as_file, true);
            }
            plan.push(RepairKind::RestoreDirectory, path, true);
        }

        for entry in local.files() {
            let path = entry.path();
            if !manifest.contains(path) && !plan.ledger.covers(path) {
                plan.push(RepairKind::RemoveFile, path, false);
            }
        }

        for entry in manifest.files() {
            let path = entry.path();
            if !local.contains(path) && !plan.ledger.covers(path) {
                plan.push(RepairKind::RestoreFile, path, false);
            }
        }

        plan
    }

    fn push(&mut self, kind: RepairKind, path: &str, record: bool) {
        if record {
            self.ledger.record(path);
        }
        self.actions.push(RepairAction::new(kind, path));
    }

    pub fn actions(&self) -> &[RepairAction] {
        &self.actions
    }

    pub fn ledger(&self) -> &RepairLedger {
        &self.ledger
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
