//! MySQL probes, install and service control through Homebrew

use anyhow::{Context, Result, bail};
use confpatch::RunMode;

use crate::progress;
use crate::runner;
use crate::sudo;
use crate::ui;

/// True if `brew services list` shows mysql as started
fn service_started(services: &str) -> bool {
    services.lines().any(|line| {
        let mut fields = line.split_whitespace();
        fields.next() == Some("mysql") && fields.next() == Some("started")
    })
}

pub fn is_installed() -> bool {
    runner::run_quiet("mysql", &["--version"])
}

pub fn is_running() -> Result<bool> {
    let services = sudo::run_as_original_user("brew", &["services", "list"])
        .context("Listing Homebrew services")?;
    Ok(service_started(&services))
}

/// Ensure MySQL is installed and its service started
pub fn verify(mode: RunMode) -> Result<()> {
    ui::info("Checking MySQL setup...");

    if is_installed() {
        ui::success("MySQL is installed.");
    } else if mode.is_dry_run() {
        ui::dry_run("would install MySQL (brew install mysql)");
        return Ok(());
    } else {
        ui::warn("MySQL is not installed. Installing it using Homebrew...");
        progress::with_spinner("Installing MySQL...", || {
            sudo::run_as_original_user("brew", &["install", "mysql"])
        })
        .context("Installing MySQL")?;
        if !is_installed() {
            bail!("MySQL was installed but `mysql --version` still fails");
        }
        ui::success("MySQL installed.");
    }

    if is_running()? {
        ui::success("MySQL is running.");
        return Ok(());
    }

    if mode.is_dry_run() {
        ui::dry_run("would start MySQL (brew services restart mysql)");
        return Ok(());
    }

    ui::warn("MySQL is not running. Starting it...");
    progress::with_spinner("Starting MySQL...", || {
        sudo::run_as_original_user("brew", &["services", "restart", "mysql"])
    })
    .context("Starting MySQL")?;
    ui::success("MySQL started.");
    Ok(())
}
