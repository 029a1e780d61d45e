//! Hosts-file editor
//!
//! An entry is a non-comment line whose host tokens (everything after the
//! address) include the domain. Matching by token keeps `blog.local` from
//! being mistaken for `myblog.local`.

use confpatch::{ConfigDocument, Result, RunMode};
use std::path::{Path, PathBuf};

/// Result of [`HostsFile::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

/// The system hosts file
#[derive(Debug, Clone)]
pub struct HostsFile {
    path: PathBuf,
    address: String,
    mode: RunMode,
}

/// True if `line` maps some address to `domain`
pub fn is_entry_for(line: &str, domain: &str) -> bool {
    let line = line.trim_start();
    if line.starts_with('#') {
        return false;
    }
    let content = line.split('#').next().unwrap_or_default();
    content.split_whitespace().skip(1).any(|host| host == domain)
}

impl HostsFile {
    pub fn new(path: impl Into<PathBuf>, address: impl Into<String>, mode: RunMode) -> Self {
        Self {
            path: path.into(),
            address: address.into(),
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether `domain` already has an entry
    pub fn contains(&self, domain: &str) -> Result<bool> {
        let doc = ConfigDocument::load(&self.path)?;
        Ok(doc.lines().iter().any(|l| is_entry_for(l, domain)))
    }

    /// Map `domain` to the configured address unless it is already mapped.
    pub fn add(&self, domain: &str) -> Result<AddOutcome> {
        let doc = ConfigDocument::load(&self.path)?;
        if doc.lines().iter().any(|l| is_entry_for(l, domain)) {
            log::info!("{} already maps {}", self.path.display(), domain);
            return Ok(AddOutcome::AlreadyExists);
        }

        let entry = format!("{} {}", self.address, domain);
        if self.mode.is_dry_run() {
            log::info!("DRY RUN: would add '{}' to {}", entry, self.path.display());
            return Ok(AddOutcome::Added);
        }

        let mut doc = doc;
        if doc.lines().last().is_some_and(|l| !l.trim().is_empty()) {
            doc.push("");
        }
        doc.push(entry.clone());
        doc.save(&self.path)?;
        log::info!("Added '{}' to {}", entry, self.path.display());
        Ok(AddOutcome::Added)
    }

    /// Drop every entry for `domain`, returning how many lines went.
    pub fn remove(&self, domain: &str) -> Result<usize> {
        let mut doc = ConfigDocument::load(&self.path)?;
        let removed = doc.retain_lines(|l| !is_entry_for(l, domain));

        if removed.is_empty() {
            log::info!("{} has no entry for {}", self.path.display(), domain);
            return Ok(0);
        }

        for line in &removed {
            if self.mode.is_dry_run() {
                log::info!("DRY RUN: would remove '{}' from {}", line, self.path.display());
            } else {
                log::info!("Removing '{}' from {}", line, self.path.display());
            }
        }
        if !self.mode.is_dry_run() {
            doc.save(&self.path)?;
        }
        Ok(removed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HOSTS: &str = "##\n# Host Database\n##\n127.0.0.1\tlocalhost\n255.255.255.255\tbroadcasthost\n::1             localhost\n";

    fn setup(mode: RunMode) -> (TempDir, HostsFile) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");
        fs::write(&path, HOSTS).unwrap();
        (dir, HostsFile::new(path, "127.0.0.1", mode))
    }

    #[test]
    fn test_is_entry_for() {
        assert!(is_entry_for("127.0.0.1 blog.local", "blog.local"));
        assert!(is_entry_for("127.0.0.1\tapi.local blog.local", "blog.local"));
        assert!(is_entry_for("  127.0.0.1 blog.local # dev", "blog.local"));
        assert!(!is_entry_for("127.0.0.1 myblog.local", "blog.local"));
        assert!(!is_entry_for("# 127.0.0.1 blog.local", "blog.local"));
        assert!(!is_entry_for("blog.local", "blog.local"));
        assert!(!is_entry_for("127.0.0.1 x # blog.local", "blog.local"));
    }

    #[test]
    fn test_add_then_add_again() {
        let (_dir, hosts) = setup(RunMode::Real);

        assert_eq!(hosts.add("myproject.local").unwrap(), AddOutcome::Added);
        let once = fs::read_to_string(hosts.path()).unwrap();
        assert!(once.ends_with("::1             localhost\n\n127.0.0.1 myproject.local\n"));

        assert_eq!(
            hosts.add("myproject.local").unwrap(),
            AddOutcome::AlreadyExists
        );
        assert_eq!(fs::read_to_string(hosts.path()).unwrap(), once);
    }

    #[test]
    fn test_add_dry_run_writes_nothing() {
        let (_dir, hosts) = setup(RunMode::DryRun);
        assert_eq!(hosts.add("myproject.local").unwrap(), AddOutcome::Added);
        assert_eq!(fs::read_to_string(hosts.path()).unwrap(), HOSTS);
        assert!(!hosts.contains("myproject.local").unwrap());
    }

    #[test]
    fn test_remove_only_matching_entries() {
        let (_dir, hosts) = setup(RunMode::Real);
        hosts.add("blog.local").unwrap();
        hosts.add("myblog.local").unwrap();

        assert_eq!(hosts.remove("blog.local").unwrap(), 1);
        assert!(!hosts.contains("blog.local").unwrap());
        assert!(hosts.contains("myblog.local").unwrap());
        assert!(hosts.contains("localhost").unwrap());
        assert_eq!(hosts.remove("blog.local").unwrap(), 0);
    }

    #[test]
    fn test_remove_dry_run_reports_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");
        let content = format!("{HOSTS}127.0.0.1 blog.local\n");
        fs::write(&path, &content).unwrap();

        let hosts = HostsFile::new(&path, "127.0.0.1", RunMode::DryRun);
        assert_eq!(hosts.remove("blog.local").unwrap(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_missing_hosts_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let hosts = HostsFile::new(dir.path().join("nope"), "127.0.0.1", RunMode::Real);
        let err = hosts.add("blog.local").unwrap_err();
        assert_eq!(err.category(), confpatch::ErrorCategory::Io);
    }
}
