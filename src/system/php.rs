//! PHP probes, install and mod_php wiring

use anyhow::{Context, Result, bail};
use confpatch::RunMode;

use crate::progress;
use crate::rules;
use crate::runner;
use crate::settings::Settings;
use crate::sudo;
use crate::system::{apache, patch_config};
use crate::ui;

const WORKING_MARKER: &str = "PHP is working!";

pub fn is_installed() -> bool {
    runner::run_quiet("php", &["-v"])
}

/// Run a one-line script and check it prints the marker
pub fn check_working() -> Result<()> {
    let script = format!("echo \"{WORKING_MARKER}\";");
    let output = runner::run_capture("php", &["-r", &script])
        .context("PHP is installed, but running a test script failed")?;
    if !output.contains(WORKING_MARKER) {
        bail!("PHP is installed, but it failed the basic test script (got: {output})");
    }
    ui::success("PHP is working correctly.");
    Ok(())
}

/// Ensure PHP is installed, loaded by Apache and able to run a script.
pub fn verify(mode: RunMode, settings: &Settings, reset_dns: bool) -> Result<()> {
    ui::info("Checking PHP setup...");

    let installed = is_installed();
    if installed {
        ui::success("PHP is installed.");
    } else if mode.is_dry_run() {
        ui::dry_run("would install PHP (brew install php)");
    } else {
        ui::warn("PHP is not installed. Installing it using Homebrew...");
        progress::with_spinner("Installing PHP...", || {
            sudo::run_as_original_user("brew", &["install", "php"])
        })
        .context("Installing PHP")?;
        ui::success("PHP installed.");
    }

    let conf = settings.httpd_conf();
    let changed = patch_config(mode, &conf, &rules::php(&settings.php_module()), "PHP")?;
    if changed {
        apache::restart(mode, reset_dns)?;
    }

    if !installed && mode.is_dry_run() {
        ui::dry_run("would check that PHP runs a test script");
        return Ok(());
    }
    check_working()
}
