//! `devhost delete`: drop a domain's vhost file and hosts entries

use anyhow::{Context as _, Result};
use confpatch::RunMode;
use std::fs;
use std::path::Path;

use crate::Context;
use crate::cli::DeleteArgs;
use crate::commands::{announce_mode, confirm};
use crate::hosts::HostsFile;
use crate::settings::Settings;
use crate::system::apache;
use crate::ui;
use crate::vhost;

pub fn run(ctx: &Context, args: &DeleteArgs) -> Result<()> {
    let mode = RunMode::from_dry_run(args.dry_run);
    let domain = args.domain.trim();
    vhost::validate_domain(domain).map_err(confpatch::Error::from)?;
    let settings = Settings::load()?;

    if !ctx.quiet {
        ui::header(&format!("Removing {domain}"));
    }
    announce_mode(mode);

    if !mode.is_dry_run()
        && !args.yes
        && !confirm(&format!(
            "Delete the domain '{domain}' and its references in {}?",
            settings.hosts_file().display()
        ))?
    {
        ui::info("Deletion aborted by user.");
        return Ok(());
    }

    let conf_file = vhost::conf_file(&settings.vhosts_dir(), domain);
    remove_vhost_file(mode, &conf_file)?;

    let hosts = HostsFile::new(settings.hosts_file(), &settings.hosts.address, mode);
    let removed = hosts
        .remove(domain)
        .with_context(|| format!("Removing {domain} from {}", hosts.path().display()))?;
    let noun = if removed == 1 { "entry" } else { "entries" };
    match (removed, mode.is_dry_run()) {
        (0, _) => ui::dim(&format!("No hosts entry for '{domain}'")),
        (n, true) => ui::dry_run(&format!("would remove {n} hosts {noun} for '{domain}'")),
        (n, false) => ui::success(&format!("Removed {n} hosts {noun} for '{domain}'")),
    }

    apache::restart(mode, !args.no_dns_reset)?;

    if !mode.is_dry_run() {
        ui::success(&format!("Domain '{domain}' removed."));
    }
    Ok(())
}

/// Delete the vhost file; a missing file is reported, not an error.
fn remove_vhost_file(mode: RunMode, conf_file: &Path) -> Result<bool> {
    if !conf_file.exists() {
        ui::warn(&format!("No virtual host file at {}", conf_file.display()));
        return Ok(false);
    }
    if mode.is_dry_run() {
        ui::dry_run(&format!("would delete {}", conf_file.display()));
        return Ok(true);
    }
    fs::remove_file(conf_file)
        .map_err(|e| confpatch::Error::io("Deleting vhost file", conf_file, e))?;
    ui::success(&format!("Deleted {}", conf_file.display()));
    Ok(true)
}
