//! Reconciliation engine for dataset installs
//!
//! This crate brings an install root into conformance with an expected
//! manifest and repairs only what differs:
//!
//! - **PathSet**: root-relative listing of an install tree (`/dir/`, `/file`)
//! - **Manifest**: the paths a correct install must contain
//! - **RepairLedger**: paths already repaired during one pass
//! - **Reconciler**: four-phase diff and repair in cascade order
//! - **DatasetManager**: fresh install, reinstall or no-op, then reconcile
//!
//! # Architecture
//!
//! ```text
//!                 dataset-cli
//!                      |
//!                dataset-core
//!                      |
//!                 dataset-fs  (Storage: list / copy / delete / unpack)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dataset_core::{DatasetManager, InstallProfile, SourceSelection};
//! use dataset_fs::{LocalStorage, NormalizedPath};
//!
//! let profile = InstallProfile::load(&NormalizedPath::new("datasets.toml"))?;
//! let mut manager = DatasetManager::from_profile(LocalStorage::new(), &profile, SourceSelection::Primary)?;
//! let summary = manager.install(false)?;
//! println!("{} fixes", summary.fixes);
//! ```

pub mod config;
pub mod error;
pub mod install;
pub mod ledger;
pub mod pathset;
pub mod reconcile;

pub use config::{InstallLayout, InstallProfile, Manifest, SourceSelection};
pub use error::{Error, Result};
pub use install::{DatasetManager, InstallAction, InstallState, InstallSummary};
pub use ledger::RepairLedger;
pub use pathset::{PathEntry, PathSet};
pub use reconcile::{Reconciler, RepairAction, RepairKind, RepairPlan, RepairReport};
