//! Path resolution for devhost
//!
//! # Environment Variables
//!
//! - `DEVHOST_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/devhost`)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `DEVHOST_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/devhost` (if set)
//! 3. `~/.config/devhost`
//!
//! Under `sudo` the home directory is root's, so the config of the invoking
//! user is looked up through `SUDO_USER` first.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "DEVHOST_CONFIG_DIR";

/// Name of the settings file inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Get the devhost config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("devhost");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = user_home().context("Could not determine home directory")?;
    let path = home.join(".config").join("devhost");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Path of the settings file
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Home directory of the user who invoked devhost, even under sudo
fn user_home() -> Option<PathBuf> {
    if let Ok(user) = std::env::var("SUDO_USER")
        && !user.is_empty()
        && user != "root"
    {
        let candidate = Path::new("/Users").join(&user);
        if candidate.is_dir() {
            return Some(candidate);
        }
        let candidate = Path::new("/home").join(&user);
        if candidate.is_dir() {
            return Some(candidate);
        }
    }
    dirs::home_dir()
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables are left as written.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

/// Make `path` absolute against the current directory
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Could not determine current directory")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Tests in this module share process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Helper to run a test with temporary env var
    ///
    /// # Safety
    /// This function uses unsafe env::set_var/remove_var which can cause issues
    /// if other threads read environment variables concurrently.
    /// Only use in single-threaded test contexts.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: Tests run in isolation and don't read env vars concurrently
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: Tests run in isolation
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    fn without_env_var<F, R>(key: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: Tests run in isolation and don't read env vars concurrently
        unsafe { env::remove_var(key) };
        let result = f();
        if let Some(v) = original {
            // SAFETY: Tests run in isolation
            unsafe { env::set_var(key, v) };
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        with_env_var(ENV_CONFIG_DIR, "/custom/devhost", || {
            assert_eq!(config_dir().unwrap(), PathBuf::from("/custom/devhost"));
            assert_eq!(
                config_file().unwrap(),
                PathBuf::from("/custom/devhost/config.toml")
            );
        });
    }

    #[test]
    fn test_config_dir_xdg() {
        let _guard = ENV_LOCK.lock().unwrap();
        without_env_var(ENV_CONFIG_DIR, || {
            with_env_var("XDG_CONFIG_HOME", "/tmp/xdg-devhost-test", || {
                assert_eq!(
                    config_dir().unwrap(),
                    PathBuf::from("/tmp/xdg-devhost-test/devhost")
                );
            });
        });
    }

    #[test]
    fn test_expand_with_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand("~/sites/blog"), home.join("sites").join("blog"));
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        let result = expand("/path/$NONEXISTENT_DEVHOST_VAR/file");
        assert_eq!(result, PathBuf::from("/path/$NONEXISTENT_DEVHOST_VAR/file"));
    }

    #[test]
    fn test_absolute_keeps_absolute_paths() {
        assert_eq!(
            absolute(Path::new("/srv/www")).unwrap(),
            PathBuf::from("/srv/www")
        );
        let rel = absolute(Path::new("site")).unwrap();
        assert!(rel.is_absolute());
        assert!(rel.ends_with("site"));
    }
}
