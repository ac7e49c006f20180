//! Command implementations for dataset-cli

pub mod install;
pub mod list;
pub mod validate;

pub use install::run_install;
pub use list::run_list;
pub use validate::{ValidateOptions, run_validate};
