//! Filesystem and storage primitives for the dataset installer
//!
//! Provides normalized path handling, the [`Storage`] collaborator interface
//! consumed by the reconciliation engine, and a [`LocalStorage`]
//! implementation backed by the local filesystem.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod local;
pub mod path;
pub mod storage;

pub use config::ConfigStore;
pub use constants::InstallFile;
pub use error::{Error, Result};
pub use io::{InstallLock, RobustnessConfig};
pub use local::LocalStorage;
pub use path::NormalizedPath;
pub use storage::{ChildEntry, Storage};
