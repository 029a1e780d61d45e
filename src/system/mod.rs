//! Collaborators outside the patching engine: service probes, installers and
//! the certificate provisioner.

pub mod apache;
pub mod mysql;
pub mod php;
pub mod ssl;

use anyhow::{Context, Result};
use confpatch::{DirectiveRule, Executor, RunMode};
use std::path::Path;

use crate::ui;

/// Apply `rules` to the config file at `path` and report what changed.
///
/// Returns whether the file changed (or, in a dry run, would change).
pub fn patch_config(
    mode: RunMode,
    path: &Path,
    rules: &[DirectiveRule],
    what: &str,
) -> Result<bool> {
    let outcome = Executor::new(mode)
        .apply(path, rules)
        .with_context(|| format!("Enabling {what} in {}", path.display()))?;

    if !outcome.changed {
        ui::success(&format!("{what} already enabled in {}", path.display()));
        return Ok(false);
    }

    if mode.is_dry_run() {
        ui::dry_run(&format!(
            "would enable {what} in {} ({} edit(s))",
            path.display(),
            outcome.plan.len()
        ));
        if let Some(preview) = &outcome.preview {
            ui::diff(&preview.before, &preview.after);
        }
    } else {
        ui::success(&format!(
            "Enabled {what} in {} ({} edit(s))",
            path.display(),
            outcome.plan.len()
        ));
        for planned in &outcome.plan.edits {
            ui::dim(&planned.edit.to_string());
        }
    }
    Ok(true)
}
