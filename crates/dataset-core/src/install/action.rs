//! Install decision and summary types

use serde::{Deserialize, Serialize};

use crate::reconcile::fix_summary;

/// Whether the install root exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    NotInstalled,
    Installed,
}

/// What `install` does before reconciling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallAction {
    /// Nothing installed yet: transfer
    Fresh,
    /// Installed, but reinstall requested: delete, then transfer
    Reinstall,
    /// Installed and kept: go straight to reconciliation
    Skip,
}

impl InstallAction {
    /// Decide what to do for `state`.
    pub fn decide(state: InstallState, reinstall: bool) -> Self {
        match (state, reinstall) {
            (InstallState::NotInstalled, _) => Self::Fresh,
            (InstallState::Installed, true) => Self::Reinstall,
            (InstallState::Installed, false) => Self::Skip,
        }
    }

    /// Whether the archive is transferred.
    pub fn transfers(&self) -> bool {
        !matches!(self, Self::Skip)
    }
}

impl std::fmt::Display for InstallAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fresh => write!(f, "fresh install"),
            Self::Reinstall => write!(f, "reinstall"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Outcome of one `install` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallSummary {
    pub action: InstallAction,
    /// Repairs applied by the final reconciliation
    pub fixes: usize,
    /// Ledger entries repaired, in order
    pub repaired_paths: Vec<String>,
    /// Whether the archive was unpacked into the datasets directory
    pub unpacked: bool,
    pub elapsed_ms: u64,
}

impl InstallSummary {
    /// One-line outcome of the final reconciliation.
    pub fn outcome(&self) -> String {
        fix_summary(self.fixes)
    }
}
