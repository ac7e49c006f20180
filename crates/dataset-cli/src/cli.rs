//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dataset_fs::InstallFile;

/// Dataset installer - Install datasets and repair drift in installed copies
#[derive(Parser, Debug)]
#[command(name = "datasets")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Install profile (TOML, JSON or YAML)
    #[arg(
        long,
        global = true,
        env = "DATASETS_PROFILE",
        default_value = InstallFile::Profile.as_str()
    )]
    pub profile: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install the datasets, then validate and unpack them
    ///
    /// An existing install is only validated unless --reinstall is given.
    ///
    /// Examples:
    ///   datasets install               # Install or repair
    ///   datasets install --reinstall   # Remove and install again
    Install {
        /// Remove the existing install first
        #[arg(long)]
        reinstall: bool,

        /// Install from the staging source
        #[arg(long)]
        staging: bool,
    },

    /// Repair the install root against the manifest
    Validate {
        /// Fail when any repair was needed
        #[arg(long)]
        fail_fast: bool,

        /// Show the repairs without applying them
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Restore from the staging source
        #[arg(long)]
        staging: bool,
    },

    /// List the content of the install root
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
