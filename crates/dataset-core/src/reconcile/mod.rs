//! Diff and repair of an install root against its manifest
//!
//! - **plan**: compute the ordered repair actions from a snapshot
//! - **report**: what a pass actually repaired
//! - **reconciler**: apply a plan through a storage backend

mod plan;
mod reconciler;
mod report;

pub use plan::{RepairAction, RepairKind, RepairPlan};
pub use reconciler::Reconciler;
pub use report::{RepairReport, fix_summary};
