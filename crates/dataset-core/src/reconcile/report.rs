//! Result of a reconciliation pass

use serde::{Deserialize, Serialize};

use super::plan::RepairAction;

/// What a reconciliation pass repaired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    /// Number of repairs applied
    pub fixes: usize,
    /// Ledger entries acted upon, in order
    pub repaired_paths: Vec<String>,
    /// Every applied action, in order
    pub actions: Vec<RepairAction>,
}

impl RepairReport {
    /// A report with no repairs.
    pub fn clean() -> Self {
        Self::default()
    }

    /// Whether the pass found nothing to repair.
    pub fn is_clean(&self) -> bool {
        self.fixes == 0
    }

    pub(crate) fn record(&mut self, action: &RepairAction, recorded: bool) {
        self.fixes += 1;
        if recorded {
            self.repaired_paths.push(action.path.clone());
        }
        self.actions.push(action.clone());
    }

    /// Append another pass to this one.
    pub fn merge(mut self, other: RepairReport) -> Self {
        self.fixes += other.fixes;
        self.repaired_paths.extend(other.repaired_paths);
        self.actions.extend(other.actions);
        self
    }

    /// One-line outcome, e.g. "Fixed 2 issues".
    pub fn summary(&self) -> String {
        fix_summary(self.fixes)
    }
}

/// One-line outcome for `fixes` repairs.
pub fn fix_summary(fixes: usize) -> String {
    match fixes {
        0 => "Validation completed".to_string(),
        1 => "Fixed 1 issue".to_string(),
        n => format!("Fixed {n} issues"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::RepairKind;

    fn action(kind: RepairKind, path: &str) -> RepairAction {
        RepairAction {
            kind,
            path: path.to_string(),
        }
    }

    #[test]
    fn test_clean_report() {
        let report = RepairReport::clean();
        assert!(report.is_clean());
        assert!(report.repaired_paths.is_empty());
        assert_eq!(report.summary(), "Validation completed");
    }

    #[test]
    fn test_record_counts_every_action() {
        let mut report = RepairReport::clean();
        report.record(&action(RepairKind::RemoveDirectory, "/old/"), true);
        report.record(&action(RepairKind::RemoveFile, "/stray.csv"), false);

        assert_eq!(report.fixes, 2);
        assert_eq!(report.repaired_paths, vec!["/old/".to_string()]);
        assert_eq!(report.actions.len(), 2);
        assert_eq!(report.summary(), "Fixed 2 issues");
    }

    #[test]
    fn test_merge_reports() {
        let mut first = RepairReport::clean();
        first.record(&action(RepairKind::RestoreDirectory, "/sub/"), true);
        let mut second = RepairReport::clean();
        second.record(&action(RepairKind::RestoreFile, "/a.csv"), false);

        let merged = first.merge(second);

        assert_eq!(merged.fixes, 2);
        assert_eq!(merged.repaired_paths, vec!["/sub/".to_string()]);
        assert_eq!(merged.actions[1].path, "/a.csv");
    }

    #[test]
    fn test_single_fix_summary() {
        let mut report = RepairReport::clean();
        report.record(&action(RepairKind::RestoreFile, "/a.csv"), false);
        assert_eq!(report.summary(), "Fixed 1 issue");
    }

    #[test]
    fn test_report_serializes_kinds_in_snake_case() {
        let mut report = RepairReport::clean();
        report.record(&action(RepairKind::RemoveDirectory, "/old/"), true);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fixes"], 1);
        assert_eq!(json["actions"][0]["kind"], "remove_directory");
        assert_eq!(json["repaired_paths"][0], "/old/");
    }
}
