//! Install profiles and manifests
//!
//! An install profile says where datasets come from and where they are
//! installed; the manifest derived from it says what a correct install root
//! contains.
//!
//! # Layouts
//!
//! - **Datasets** - content is installed straight into `datasets_path`
//! - **Archive** - `archive.zip` is installed into `archives_path` and then
//!   unpacked into `datasets_path`
//!
//! # Example
//!
//! ```ignore
//! use dataset_core::config::InstallProfile;
//! use dataset_fs::NormalizedPath;
//!
//! let profile = InstallProfile::load(&NormalizedPath::new("datasets.toml"))?;
//! let manifest = profile.manifest()?;
//! ```

mod manifest;
mod profile;

pub use manifest::Manifest;
pub use profile::{InstallLayout, InstallProfile, SourceSelection};
