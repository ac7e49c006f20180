//! Validate command implementation

use std::path::Path;

use colored::Colorize;
use dataset_core::{Error as CoreError, RepairAction, RepairKind};

use crate::context::InstallContext;
use crate::error::Result;

/// Flags of the validate command
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    pub fail_fast: bool,
    pub dry_run: bool,
    pub json: bool,
    pub staging: bool,
}

/// Run the validate command
///
/// Repairs the install root, or with `dry_run` only shows what would be
/// repaired.
pub fn run_validate(profile: &Path, options: ValidateOptions) -> Result<()> {
    let context = InstallContext::load(profile)?;
    let mut manager = context.manager(options.staging)?;

    if options.dry_run {
        let plan = manager.plan()?;
        if options.json {
            println!("{}", serde_json::to_string_pretty(plan.actions())?);
            return Ok(());
        }
        if plan.is_empty() {
            println!("{} Install root matches the manifest.", "OK".green().bold());
        } else {
            println!("{} Would apply {} repair(s):", "=>".blue().bold(), plan.len());
            for action in plan.actions() {
                print_action(action);
            }
        }
        return Ok(());
    }

    let _lock = context.lock()?;
    if !options.json {
        println!(
            "{} Validating {}",
            "=>".blue().bold(),
            manager.install_path().as_str().cyan()
        );
    }

    let report = match manager.validate(options.fail_fast) {
        Ok(report) => report,
        Err(CoreError::UnexpectedDrift { fixes }) => {
            if !options.json {
                println!("{} Repaired unexpected modifications:", "DRIFTED".red().bold());
                for path in manager.repaired_paths() {
                    println!("   {} {}", "!".red(), path);
                }
            }
            return Err(CoreError::UnexpectedDrift { fixes }.into());
        }
        Err(e) => return Err(e.into()),
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for action in &report.actions {
        print_action(action);
    }
    println!("{} {}", "OK".green().bold(), report.summary());

    Ok(())
}

fn print_action(action: &RepairAction) {
    let marker = match action.kind {
        RepairKind::RemoveDirectory | RepairKind::RemoveFile => "-".red(),
        RepairKind::RestoreDirectory | RepairKind::RestoreFile => "+".green(),
    };
    println!("   {} {}: {}", marker, action.kind, action.path.cyan());
}
