//! List command implementation

use std::path::Path;

use colored::Colorize;
use dataset_core::PathSet;
use dataset_fs::LocalStorage;
use serde::Serialize;

use crate::context::InstallContext;
use crate::error::Result;

#[derive(Serialize)]
struct Listing<'a> {
    install_path: &'a str,
    paths: Vec<&'a str>,
}

/// Run the list command
///
/// Prints every path under the install root, relative to it.
pub fn run_list(profile: &Path, json: bool) -> Result<()> {
    let context = InstallContext::load(profile)?;
    let install_path = context.install_path()?;
    let local = PathSet::scan(&LocalStorage::new(), &install_path);

    if json {
        let listing = Listing {
            install_path: install_path.as_str(),
            paths: local.iter().map(|entry| entry.path()).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("{}", install_path.as_str().bold());
    if local.is_empty() {
        println!("   {}", "(not installed)".dimmed());
        return Ok(());
    }
    for entry in local.iter() {
        if entry.is_directory() {
            println!("   {}", entry.path().cyan());
        } else {
            println!("   {}", entry.path());
        }
    }
    println!();
    println!("{} {} entries", "Total:".dimmed(), local.len());

    Ok(())
}
