//! Shared test utilities for the dataset installer workspace.
//!
//! This crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`memory`]: [`MemoryStorage`], an in-memory [`dataset_fs::Storage`]
//!   that records every call and can inject failures
//! - [`tree`]: [`TestTree`], a temporary directory builder for on-disk tests

pub mod memory;
pub mod tree;

pub use memory::{MemoryStorage, StorageCall};
pub use tree::TestTree;
