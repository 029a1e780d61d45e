//! `devhost list`: domains with a vhost file

use anyhow::{Context as _, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Context;
use crate::cli::ListArgs;
use crate::settings::Settings;
use crate::ui;
use crate::vhost;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct Domain {
    pub domain: String,
    pub file: PathBuf,
}

pub fn run(_ctx: &Context, args: &ListArgs) -> Result<()> {
    let settings = Settings::load()?;
    let vhosts_dir = settings.vhosts_dir();
    let domains = scan(&vhosts_dir)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&domains)?);
        return Ok(());
    }

    ui::header("Configured domains");
    if domains.is_empty() {
        ui::dim(&format!("No virtual hosts in {}", vhosts_dir.display()));
        return Ok(());
    }
    for d in &domains {
        println!(
            "  {} {}",
            d.domain.bold(),
            d.file.display().to_string().dimmed()
        );
    }
    Ok(())
}

/// Regular `*.conf` files in the vhosts directory, sorted by domain
pub(crate) fn scan(vhosts_dir: &Path) -> Result<Vec<Domain>> {
    if !vhosts_dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(vhosts_dir)
        .with_context(|| format!("Reading vhosts directory {}", vhosts_dir.display()))?;

    let mut domains = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Reading {}", vhosts_dir.display()))?;
        if !entry.file_type().is_ok_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        if let Some(domain) = vhost::domain_of(&path) {
            domains.push(Domain { domain, file: path });
        }
    }
    domains.sort_by(|a, b| a.domain.cmp(&b.domain));
    Ok(domains)
}
