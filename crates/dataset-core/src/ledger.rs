//! Pass-scoped record of repaired paths
//!
//! Once a directory has been removed or restored as a whole, nothing beneath
//! it may be repaired again in the same pass. The ledger answers that
//! question with [`RepairLedger::covers`].

use std::collections::BTreeSet;

/// Paths already acted upon during one reconciliation pass.
///
/// A recorded directory (`/x/`) covers itself and every path that starts
/// with it. A recorded file path covers exactly itself, so recording `/x`
/// never shadows a sibling such as `/x.bak`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairLedger {
    /// Paths in the order they were recorded
    recorded: Vec<String>,
    index: BTreeSet<String>,
}

impl RepairLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` as repaired, returning false if it was already recorded.
    pub fn record(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if !self.index.insert(path.clone()) {
            return false;
        }
        self.recorded.push(path);
        true
    }

    /// Whether `path` was recorded verbatim.
    pub fn is_recorded(&self, path: &str) -> bool {
        self.index.contains(path)
    }

    /// Whether a recorded entry covers `path`.
    ///
    /// Equivalent to "some recorded directory is a prefix of `path`, or
    /// `path` itself was recorded". Only `path`'s own ancestors are looked
    /// up, so the check does not grow with the ledger.
    pub fn covers(&self, path: &str) -> bool {
        if self.index.contains(path) {
            return true;
        }
        path.match_indices('/')
            .any(|(idx, _)| self.index.contains(&path[..=idx]))
    }

    /// Recorded paths in recording order.
    pub fn paths(&self) -> &[String] {
        &self.recorded
    }

    pub fn len(&self) -> usize {
        self.recorded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded.is_empty()
    }
}
