//! Install orchestration
//!
//! [`DatasetManager`] decides between a fresh install, a reinstall and a
//! no-op, transfers the archive, reconciles the install root and unpacks
//! the archive when the profile uses the archive layout.

mod action;
mod manager;

pub use action::{InstallAction, InstallState, InstallSummary};
pub use manager::DatasetManager;
