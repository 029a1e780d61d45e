pub mod create;
pub mod delete;
pub mod doctor;
pub mod list;

use anyhow::{Context, Result};
use confpatch::RunMode;

use crate::ui;

/// Ask the user to confirm, defaulting to no
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

/// Announce the run mode once at the start of a mutating command
pub(crate) fn announce_mode(mode: RunMode) {
    if mode.is_dry_run() {
        ui::dry_run("no files will be changed, no services restarted");
    }
}
