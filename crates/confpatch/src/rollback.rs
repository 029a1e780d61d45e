//! Provisioning rollback coordinator
//!
//! An [`Operation`] creates filesystem artifacts (directories, files) and
//! records an undo action for each one it actually created. If a later step
//! fails, the undo actions run newest-first; if everything succeeds the list
//! is dropped and the artifacts stay.
//!
//! ```no_run
//! use confpatch::{Operation, RunMode};
//! use std::path::Path;
//!
//! let result = Operation::run("add virtual host", RunMode::Real, |op| {
//!     op.create_dir(Path::new("/tmp/site/public"))?;
//!     op.write_file(Path::new("/tmp/site/public/index.php"), b"<?php\n")?;
//!     Ok::<_, confpatch::Error>(())
//! });
//! ```

use crate::error::{Error, Result};
use crate::mode::RunMode;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem primitives the coordinator needs.
///
/// Implemented by [`FsStore`] for the real filesystem; tests substitute an
/// in-memory store.
pub trait ArtifactStore {
    /// Whether anything exists at `path`
    fn exists(&self, path: &Path) -> bool;
    /// Create exactly one directory (parent must exist)
    fn create_dir(&self, path: &Path) -> io::Result<()>;
    /// Read a file, `None` if it does not exist
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;
    /// Create or truncate a file with `contents`
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
    /// Remove a file
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    /// Remove an empty directory
    fn remove_dir(&self, path: &Path) -> io::Result<()>;
}

/// [`ArtifactStore`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl ArtifactStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists() || path.is_symlink()
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}

/// Something an operation created, with enough state to undo it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Directory that did not exist before
    CreatedDir(PathBuf),
    /// File that did not exist before
    CreatedFile(PathBuf),
    /// File that was overwritten; holds its previous content
    ReplacedFile {
        /// Path of the file
        path: PathBuf,
        /// Bytes before the overwrite
        previous: Vec<u8>,
    },
}

impl Artifact {
    /// Path of the artifact
    pub fn path(&self) -> &Path {
        match self {
            Self::CreatedDir(p) | Self::CreatedFile(p) => p,
            Self::ReplacedFile { path, .. } => path,
        }
    }

    fn undo<S: ArtifactStore + ?Sized>(&self, store: &S) -> io::Result<()> {
        match self {
            Self::CreatedDir(path) => store.remove_dir(path),
            Self::CreatedFile(path) => store.remove_file(path),
            Self::ReplacedFile { path, previous } => store.write(path, previous),
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatedDir(p) => write!(f, "directory {}", p.display()),
            Self::CreatedFile(p) => write!(f, "file {}", p.display()),
            Self::ReplacedFile { path, .. } => write!(f, "file {} (replaced)", path.display()),
        }
    }
}

/// Lifecycle of an [`Operation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    /// Begun, nothing created yet
    Started,
    /// At least one creation step ran
    CreatingArtifacts,
    /// Undoing artifacts after a failure
    RollingBack,
    /// Finished successfully, artifacts kept
    Committed,
    /// Finished unsuccessfully, artifacts removed
    Failed,
}

/// Outcome of a rollback
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RollbackReport {
    /// Artifacts undone, newest first
    pub undone: Vec<PathBuf>,
    /// Artifacts that could not be undone, with the reason
    pub failures: Vec<(PathBuf, String)>,
}

impl RollbackReport {
    /// True when every artifact was undone
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A named unit of provisioning work that owns the artifacts it created.
pub struct Operation<S: ArtifactStore = FsStore> {
    name: String,
    mode: RunMode,
    store: S,
    artifacts: Vec<Artifact>,
    state: OperationState,
}

impl Operation<FsStore> {
    /// Begin an operation on the real filesystem
    pub fn begin(name: impl Into<String>, mode: RunMode) -> Self {
        Self::with_store(name, mode, FsStore)
    }

    /// Run `steps` as one operation on the real filesystem.
    ///
    /// See [`Operation::run_with_store`].
    pub fn run<T, E, F>(
        name: impl Into<String>,
        mode: RunMode,
        steps: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<T, E>,
        E: fmt::Display,
    {
        Self::run_with_store(name, mode, FsStore, steps)
    }
}

impl<S: ArtifactStore> Operation<S> {
    /// Begin an operation backed by `store`
    pub fn with_store(name: impl Into<String>, mode: RunMode, store: S) -> Self {
        let name = name.into();
        log::debug!("Operation '{}' started ({})", name, mode);
        Self {
            name,
            mode,
            store,
            artifacts: Vec::new(),
            state: OperationState::Started,
        }
    }

    /// Run `steps`, committing on success and rolling back on failure.
    ///
    /// The error returned is always the one produced by `steps`; problems
    /// during rollback are logged, never surfaced in its place.
    pub fn run_with_store<T, E, F>(
        name: impl Into<String>,
        mode: RunMode,
        store: S,
        steps: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<T, E>,
        E: fmt::Display,
    {
        let mut op = Self::with_store(name, mode, store);
        match steps(&mut op) {
            Ok(value) => {
                op.commit();
                Ok(value)
            }
            Err(err) => {
                log::error!("Operation '{}' failed: {}", op.name, err);
                op.rollback();
                Err(err)
            }
        }
    }

    /// Name of the operation
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mode the operation runs in
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Current lifecycle state
    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Artifacts registered so far, oldest first
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    fn mark_creating(&mut self) {
        if self.state == OperationState::Started {
            self.state = OperationState::CreatingArtifacts;
        }
    }

    /// Create `path` and any missing parents.
    ///
    /// Only directories that did not exist are registered, outermost first,
    /// so rollback never removes a directory the operation did not create.
    pub fn create_dir(&mut self, path: &Path) -> Result<()> {
        self.mark_creating();
        if self.mode.is_dry_run() {
            log::info!("DRY RUN: would create directory {}", path.display());
            return Ok(());
        }

        let mut missing: Vec<&Path> = path
            .ancestors()
            .take_while(|p| !p.as_os_str().is_empty() && !self.store.exists(p))
            .collect();
        missing.reverse();

        for dir in missing {
            self.store
                .create_dir(dir)
                .map_err(|e| Error::io("Creating directory", dir, e))?;
            log::debug!("Created directory {}", dir.display());
            self.artifacts.push(Artifact::CreatedDir(dir.to_path_buf()));
        }
        Ok(())
    }

    /// Write `contents` to `path`, creating or replacing the file.
    pub fn write_file(&mut self, path: &Path, contents: &[u8]) -> Result<()> {
        self.mark_creating();
        if self.mode.is_dry_run() {
            log::info!("DRY RUN: would write {}", path.display());
            return Ok(());
        }

        let previous = self
            .store
            .read(path)
            .map_err(|e| Error::io("Reading existing file", path, e))?;
        self.store
            .write(path, contents)
            .map_err(|e| Error::io("Writing file", path, e))?;
        log::debug!("Wrote {}", path.display());

        self.artifacts.push(match previous {
            Some(previous) => Artifact::ReplacedFile {
                path: path.to_path_buf(),
                previous,
            },
            None => Artifact::CreatedFile(path.to_path_buf()),
        });
        Ok(())
    }

    /// Write `contents` to `path` unless a file is already there.
    ///
    /// Returns whether the file was (or, in a dry run, would be) written.
    pub fn write_file_if_absent(&mut self, path: &Path, contents: &[u8]) -> Result<bool> {
        if self.store.exists(path) {
            log::debug!("Keeping existing {}", path.display());
            return Ok(false);
        }
        self.write_file(path, contents)?;
        Ok(true)
    }

    /// Undo every registered artifact, newest first, best effort.
    pub fn rollback(&mut self) -> RollbackReport {
        self.state = OperationState::RollingBack;
        let mut report = RollbackReport::default();

        while let Some(artifact) = self.artifacts.pop() {
            match artifact.undo(&self.store) {
                Ok(()) => {
                    log::info!("Rolled back {}", artifact);
                    report.undone.push(artifact.path().to_path_buf());
                }
                Err(e) => {
                    log::warn!("Could not roll back {}: {}", artifact, e);
                    report
                        .failures
                        .push((artifact.path().to_path_buf(), e.to_string()));
                }
            }
        }

        self.state = OperationState::Failed;
        report
    }

    /// Keep every artifact and forget the undo list.
    pub fn commit(&mut self) -> usize {
        let kept = self.artifacts.len();
        self.artifacts.clear();
        self.state = OperationState::Committed;
        log::debug!("Operation '{}' committed ({} artifact(s))", self.name, kept);
        kept
    }
}

impl<S: ArtifactStore> Drop for Operation<S> {
    fn drop(&mut self) {
        if self.state == OperationState::CreatingArtifacts && !self.artifacts.is_empty() {
            log::warn!(
                "Operation '{}' dropped before commit, rolling back",
                self.name
            );
            self.rollback();
        }
    }
}
