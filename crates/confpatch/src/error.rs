//! Error types for config patching and provisioning.
//!
//! Three families of failure reach callers: filesystem errors (with a
//! dedicated permission variant that tells the user how to fix it), failed
//! external commands, and missing or malformed input.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Categories of errors, used by callers to pick user feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// File open/read/write failure
    Io,
    /// A spawned command exited non-zero
    ExternalCommand,
    /// Required input missing or invalid
    Precondition,
}

impl ErrorCategory {
    /// Get actionable advice for this category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Io => "Check that the path exists and is writable",
            Self::ExternalCommand => "Run the command by hand to see its full output",
            Self::Precondition => "Check the command-line arguments",
        }
    }
}

/// Errors raised by the patching engine and the rollback coordinator.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem operation failed
    #[error("{action} failed for {}: {source}", path.display())]
    Io {
        /// What was being attempted, e.g. "Reading config"
        action: String,
        /// Path the operation touched
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Filesystem operation was refused by the OS
    #[error(
        "{action} failed for {}: permission denied; re-run with elevated permissions (e.g. using sudo)",
        path.display()
    )]
    PermissionDenied {
        /// What was being attempted
        action: String,
        /// Path the operation touched
        path: PathBuf,
    },

    /// External command exited unsuccessfully
    #[error("command `{command}` failed ({status}): {output}")]
    ExternalCommand {
        /// Command line that was run
        command: String,
        /// Exit status description
        status: String,
        /// Captured output, trimmed
        output: String,
    },

    /// Required input missing or invalid
    #[error("{0}")]
    Precondition(String),
}

impl Error {
    /// Wrap an I/O error, mapping permission failures to [`Error::PermissionDenied`].
    pub fn io(action: impl Into<String>, path: impl AsRef<Path>, source: io::Error) -> Self {
        let action = action.into();
        let path = path.as_ref().to_path_buf();
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { action, path }
        } else {
            Self::Io {
                action,
                path,
                source,
            }
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io { .. } | Self::PermissionDenied { .. } => ErrorCategory::Io,
            Self::ExternalCommand { .. } => ErrorCategory::ExternalCommand,
            Self::Precondition(_) => ErrorCategory::Precondition,
        }
    }
}

/// Result type for patching operations.
pub type Result<T> = std::result::Result<T, Error>;
