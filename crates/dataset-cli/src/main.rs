//! Dataset installer CLI
//!
//! Installs datasets from a source URI and repairs drift in the install root.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use std::path::Path;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialize logging: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!(profile = %cli.profile.display(), "starting");

    match cli.command {
        Some(cmd) => execute_command(&cli.profile, cmd),
        None => {
            println!("{} Dataset installer", "datasets".green().bold());
            println!();
            println!("Run {} for available commands.", "datasets --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(profile: &Path, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Install { reinstall, staging } => {
            commands::run_install(profile, reinstall, staging)
        }
        Commands::Validate {
            fail_fast,
            dry_run,
            json,
            staging,
        } => commands::run_validate(
            profile,
            commands::ValidateOptions {
                fail_fast,
                dry_run,
                json,
                staging,
            },
        ),
        Commands::List { json } => commands::run_list(profile, json),
    }
}
