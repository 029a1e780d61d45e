//! Apache httpd probes and service control

use anyhow::{Context, Result};
use confpatch::RunMode;

use crate::progress;
use crate::runner;
use crate::ui;

/// Check that `apachectl` runs
pub fn check_installed() -> Result<String> {
    runner::run_capture("apachectl", &["-v"])
        .context("Apache is not installed or not accessible. Install it using Homebrew: 'brew install httpd'")
}

/// Check `ps aux` output for an httpd process
pub fn is_running() -> Result<bool> {
    let ps = runner::run_capture("ps", &["aux"]).context("Listing processes")?;
    Ok(lists_httpd(&ps))
}

fn lists_httpd(ps_output: &str) -> bool {
    ps_output.lines().any(|l| l.contains("httpd"))
}

/// Ensure Apache is installed and running, restarting it if it is not.
pub fn verify(mode: RunMode, reset_dns: bool) -> Result<()> {
    ui::info("Checking Apache setup...");
    let version = check_installed()?;
    if let Some(line) = version.lines().next() {
        ui::success(&format!("Apache is installed ({})", line.trim()));
    }

    if is_running()? {
        ui::success("Apache is running.");
        return Ok(());
    }

    ui::warn("Apache is not running.");
    restart(mode, reset_dns)
}

/// Restart Apache and flush the DNS cache
pub fn restart(mode: RunMode, reset_dns: bool) -> Result<()> {
    if mode.is_dry_run() {
        ui::dry_run("would restart Apache (apachectl -k restart)");
        if reset_dns {
            ui::dry_run("would flush the DNS cache");
        }
        return Ok(());
    }

    progress::with_spinner("Restarting Apache...", || {
        runner::run_capture("apachectl", &["-k", "restart"])
    })
    .context("Restarting Apache")?;
    ui::success("Apache restarted.");

    if reset_dns {
        flush_dns()?;
    }
    Ok(())
}

/// Flush the macOS resolver caches so new hosts entries resolve at once
pub fn flush_dns() -> Result<()> {
    runner::run_capture("dscacheutil", &["-flushcache"]).context("Flushing DNS cache")?;
    runner::run_capture("killall", &["-HUP", "mDNSResponder"])
        .context("Restarting mDNSResponder")?;
    ui::success("DNS cache flushed.");
    Ok(())
}

/// Run `apachectl -t` against the current configuration
pub fn config_test() -> Result<(), confpatch::Error> {
    progress::with_spinner("Testing Apache configuration...", || {
        runner::run_capture("apachectl", &["-t"])
    })
    .map(|_| ())
}
