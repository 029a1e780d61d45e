//! Run mode shared by every mutating component

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether mutations touch the filesystem or are only reported.
///
/// Decided once from the command line and passed explicitly to every
/// component that mutates state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunMode {
    /// Apply changes for real
    #[default]
    Real,
    /// Compute and log changes, write nothing
    DryRun,
}

impl RunMode {
    /// Build from a `--dry-run` flag.
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Real }
    }

    /// Check if this is a dry run
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real => f.write_str("real"),
            Self::DryRun => f.write_str("dry-run"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dry_run() {
        assert_eq!(RunMode::from_dry_run(true), RunMode::DryRun);
        assert_eq!(RunMode::from_dry_run(false), RunMode::Real);
        assert!(RunMode::DryRun.is_dry_run());
        assert!(!RunMode::default().is_dry_run());
    }
}
