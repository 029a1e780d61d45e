//! Mutation executor - applies a rule set to a file, for real or as a preview

use crate::directive::DirectiveRule;
use crate::document::ConfigDocument;
use crate::error::Result;
use crate::mode::RunMode;
use crate::planner::{self, PatchPlan};
use std::path::{Path, PathBuf};

/// What an [`Executor::apply`] call did (or would do) to a file
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    /// File the rules were applied to
    pub path: PathBuf,
    /// Whether any rule was unsatisfied
    pub changed: bool,
    /// The computed plan
    pub plan: PatchPlan,
    /// Content before and after the plan, when it changed anything
    pub preview: Option<Preview>,
}

/// Old and new rendering of a patched file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Content as read
    pub before: String,
    /// Content after the plan
    pub after: String,
}

/// Applies directive rule sets to config files.
#[derive(Debug, Clone, Copy, Default)]
pub struct Executor {
    mode: RunMode,
}

impl Executor {
    /// Create an executor for the given run mode
    pub fn new(mode: RunMode) -> Self {
        Self { mode }
    }

    /// The mode this executor runs in
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Ensure every rule in `rules` is active in the file at `path`.
    ///
    /// In [`RunMode::DryRun`] the file is only read. In [`RunMode::Real`] it
    /// is rewritten in full when, and only when, the plan has edits.
    pub fn apply(&self, path: &Path, rules: &[DirectiveRule]) -> Result<PatchOutcome> {
        let mut doc = ConfigDocument::load(path)?;
        let plan = planner::plan(&doc, rules);

        if plan.is_empty() {
            log::info!("{}: all {} directive(s) already active", path.display(), rules.len());
            return Ok(PatchOutcome {
                path: path.to_path_buf(),
                changed: false,
                plan,
                preview: None,
            });
        }

        let before = doc.render();
        plan.apply_to(&mut doc);
        let after = doc.render();

        if self.mode.is_dry_run() {
            for planned in &plan.edits {
                log::info!(
                    "DRY RUN: would {} in {} ({})",
                    planned.edit,
                    path.display(),
                    planned.rule
                );
            }
        } else {
            doc.save(path)?;
            for planned in &plan.edits {
                log::info!("{}: {} ({})", path.display(), planned.edit, planned.rule);
            }
        }

        Ok(PatchOutcome {
            path: path.to_path_buf(),
            changed: true,
            plan,
            preview: Some(Preview { before, after }),
        })
    }

    /// Plan against the file without touching it, regardless of mode.
    pub fn check(&self, path: &Path, rules: &[DirectiveRule]) -> Result<PatchPlan> {
        let doc = ConfigDocument::load(path)?;
        Ok(planner::plan(&doc, rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::{Matcher, Placement};
    use std::fs;
    use tempfile::TempDir;

    const CONF: &str = "Listen 80\n#LoadModule ssl_module lib/httpd/modules/mod_ssl.so\nServerName localhost\n";

    fn rules() -> Vec<DirectiveRule> {
        vec![
            DirectiveRule::new(
                "ssl_module",
                Matcher::Contains("LoadModule ssl_module".into()),
                ["LoadModule ssl_module lib/httpd/modules/mod_ssl.so"],
            )
            .placed(Placement::Start),
            DirectiveRule::line("vhosts", "Include /opt/homebrew/etc/httpd/extra/vhosts/*.conf"),
        ]
    }

    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("httpd.conf");
        fs::write(&path, CONF).unwrap();
        (dir, path)
    }

    #[test]
    fn test_real_apply_rewrites_file() {
        let (_dir, path) = setup();
        let outcome = Executor::new(RunMode::Real).apply(&path, &rules()).unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.plan.len(), 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Listen 80\nLoadModule ssl_module lib/httpd/modules/mod_ssl.so\nServerName localhost\nInclude /opt/homebrew/etc/httpd/extra/vhosts/*.conf\n"
        );
    }

    #[test]
    fn test_dry_run_never_writes() {
        let (_dir, path) = setup();
        let outcome = Executor::new(RunMode::DryRun).apply(&path, &rules()).unwrap();

        assert!(outcome.changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), CONF);
        let preview = outcome.preview.unwrap();
        assert_eq!(preview.before, CONF);
        assert!(preview.after.ends_with("vhosts/*.conf\n"));
    }

    #[test]
    fn test_second_apply_is_no_op_and_byte_identical() {
        let (_dir, path) = setup();
        let executor = Executor::new(RunMode::Real);
        executor.apply(&path, &rules()).unwrap();
        let once = fs::read(&path).unwrap();

        let outcome = executor.apply(&path, &rules()).unwrap();
        assert!(!outcome.changed);
        assert!(outcome.plan.is_empty());
        assert!(outcome.preview.is_none());
        assert_eq!(fs::read(&path).unwrap(), once);
    }

    #[test]
    fn test_satisfied_file_without_trailing_newline_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("httpd.conf");
        fs::write(&path, "Include /opt/homebrew/etc/httpd/extra/vhosts/*.conf").unwrap();

        let outcome = Executor::new(RunMode::Real)
            .apply(&path, &rules()[1..])
            .unwrap();
        assert!(!outcome.changed);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Include /opt/homebrew/etc/httpd/extra/vhosts/*.conf"
        );
    }

    #[test]
    fn test_missing_file_fails_in_both_modes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.conf");
        assert!(Executor::new(RunMode::Real).apply(&path, &rules()).is_err());
        assert!(Executor::new(RunMode::DryRun).apply(&path, &rules()).is_err());
    }

    #[test]
    fn test_check_does_not_write_in_real_mode() {
        let (_dir, path) = setup();
        let plan = Executor::new(RunMode::Real).check(&path, &rules()).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), CONF);
    }
}
