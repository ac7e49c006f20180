//! Install command implementation

use std::path::Path;

use colored::Colorize;
use dataset_core::InstallAction;

use crate::context::InstallContext;
use crate::error::Result;

/// Run the install command
///
/// Installs or reinstalls the datasets, then validates and unpacks them.
pub fn run_install(profile: &Path, reinstall: bool, staging: bool) -> Result<()> {
    let context = InstallContext::load(profile)?;
    let mut manager = context.manager(staging)?;
    let _lock = context.lock()?;

    println!(
        "{} Installing datasets to {}",
        "=>".blue().bold(),
        manager.install_path().as_str().cyan()
    );
    println!("   from {}", manager.source_uri().dimmed());

    let summary = manager.install(reinstall)?;

    match summary.action {
        InstallAction::Fresh => println!("{} Archive transferred", "OK".green().bold()),
        InstallAction::Reinstall => {
            println!("{} Previous install removed and archive transferred", "OK".green().bold())
        }
        InstallAction::Skip => println!(
            "{} Existing install kept, use {} to start over",
            "SKIP".yellow().bold(),
            "datasets install --reinstall".cyan()
        ),
    }

    for path in &summary.repaired_paths {
        println!("   {} {}", "~".yellow(), path);
    }
    println!("{} {}", "OK".green().bold(), summary.outcome());

    if summary.unpacked
        && let Some(datasets) = manager.datasets_path()
    {
        println!("{} Unpacked to {}", "OK".green().bold(), datasets.as_str().cyan());
    }

    println!(
        "{} Dataset installation completed in {} ms",
        "=>".blue().bold(),
        summary.elapsed_ms
    );

    Ok(())
}
