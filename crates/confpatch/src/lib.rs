//! # confpatch
//!
//! Idempotent patching of hand-edited, line-oriented config files such as
//! Apache's `httpd.conf`, plus a rollback coordinator for multi-step
//! provisioning.
//!
//! ## Core Concepts
//!
//! - **ConfigDocument**: a file held as ordered lines (load/save)
//! - **DirectiveRule**: a directive that must be active, how to recognise it,
//!   and what to insert when it is missing
//! - **PatchPlan**: the minimal edits (insert, uncomment) that activate a
//!   rule set; empty when the file already converged
//! - **Executor**: applies a rule set for real or as a logged dry run
//! - **Operation**: creates artifacts and undoes them if a later step fails
//!
//! ## Example
//!
//! ```no_run
//! use confpatch::{DirectiveRule, Executor, Matcher, Placement, RunMode};
//! use std::path::Path;
//!
//! let rules = [
//!     DirectiveRule::new(
//!         "ssl_module",
//!         Matcher::Contains("LoadModule ssl_module".into()),
//!         ["LoadModule ssl_module lib/httpd/modules/mod_ssl.so"],
//!     )
//!     .placed(Placement::Start),
//!     DirectiveRule::line("vhosts", "Include /opt/homebrew/etc/httpd/extra/vhosts/*.conf"),
//! ];
//!
//! let outcome = Executor::new(RunMode::DryRun)
//!     .apply(Path::new("/opt/homebrew/etc/httpd/httpd.conf"), &rules)?;
//! if outcome.changed {
//!     println!("{} edit(s) pending", outcome.plan.len());
//! }
//! # Ok::<(), confpatch::Error>(())
//! ```
//!
//! Running the same rules twice never adds a line twice: a rule whose
//! directive is already active plans no edit, and an empty plan leaves the
//! file untouched.

pub mod directive;
pub mod document;
pub mod error;
pub mod executor;
pub mod mode;
pub mod planner;
pub mod rollback;

// Re-export main types at crate root
pub use directive::{DEFAULT_MARKER, DirectiveRule, Matcher, Placement, uncomment};
pub use document::ConfigDocument;
pub use error::{Error, ErrorCategory, Result};
pub use executor::{Executor, PatchOutcome, Preview};
pub use mode::RunMode;
pub use planner::{Edit, PatchPlan, PlannedEdit, plan};
pub use rollback::{
    Artifact, ArtifactStore, FsStore, Operation, OperationState, RollbackReport,
};
