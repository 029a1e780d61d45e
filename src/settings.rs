//! User settings: where httpd, the certificates and the hosts file live
//!
//! Every field has a default matching a stock Homebrew install on Apple
//! silicon, so the settings file is optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths;

const HTTPD_PREFIX: &str = "/opt/homebrew/etc/httpd";

/// Root of the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub apache: ApacheSettings,

    #[serde(default)]
    pub ssl: SslSettings,

    #[serde(default)]
    pub hosts: HostsSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApacheSettings {
    /// Directory holding httpd.conf
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Shared object loaded for PHP
    #[serde(default = "default_php_module")]
    pub php_module: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SslSettings {
    #[serde(default = "default_cert_file")]
    pub cert_file: String,

    #[serde(default = "default_key_file")]
    pub key_file: String,

    /// Validity of generated certificates
    #[serde(default = "default_days")]
    pub days: u32,

    /// Distinguished name passed to `openssl req -subj`
    #[serde(default = "default_subject")]
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostsSettings {
    #[serde(default = "default_hosts_path")]
    pub path: String,

    /// Address new domains resolve to
    #[serde(default = "default_address")]
    pub address: String,
}

fn default_prefix() -> String {
    HTTPD_PREFIX.to_string()
}

fn default_php_module() -> String {
    "/opt/homebrew/opt/php/lib/httpd/modules/libphp.so".to_string()
}

fn default_cert_file() -> String {
    format!("{HTTPD_PREFIX}/ssl/server.crt")
}

fn default_key_file() -> String {
    format!("{HTTPD_PREFIX}/ssl/server.key")
}

fn default_days() -> u32 {
    365
}

fn default_subject() -> String {
    "/C=US/ST=State/L=City/O=Organization/OU=Unit/CN=localhost".to_string()
}

fn default_hosts_path() -> String {
    "/etc/hosts".to_string()
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

impl Default for ApacheSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            php_module: default_php_module(),
        }
    }
}

impl Default for SslSettings {
    fn default() -> Self {
        Self {
            cert_file: default_cert_file(),
            key_file: default_key_file(),
            days: default_days(),
            subject: default_subject(),
        }
    }
}

impl Default for HostsSettings {
    fn default() -> Self {
        Self {
            path: default_hosts_path(),
            address: default_address(),
        }
    }
}

impl Settings {
    /// Load settings from the devhost config directory
    pub fn load() -> Result<Self> {
        let path = paths::config_file()?;
        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults when it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read settings file: {}", path.display()))?;
        let settings: Self =
            toml::from_str(&content).context("Invalid TOML format in devhost settings")?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Main httpd configuration file
    pub fn httpd_conf(&self) -> PathBuf {
        paths::expand(&self.apache.prefix).join("httpd.conf")
    }

    /// Directory holding one `<domain>.conf` per virtual host
    pub fn vhosts_dir(&self) -> PathBuf {
        paths::expand(&self.apache.prefix).join("extra").join("vhosts")
    }

    /// Stock TLS configuration shipped with httpd
    pub fn ssl_conf(&self) -> PathBuf {
        paths::expand(&self.apache.prefix)
            .join("extra")
            .join("httpd-ssl.conf")
    }

    pub fn php_module(&self) -> PathBuf {
        paths::expand(&self.apache.php_module)
    }

    pub fn cert_file(&self) -> PathBuf {
        paths::expand(&self.ssl.cert_file)
    }

    pub fn key_file(&self) -> PathBuf {
        paths::expand(&self.ssl.key_file)
    }

    pub fn hosts_file(&self) -> PathBuf {
        paths::expand(&self.hosts.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(
            settings.httpd_conf(),
            PathBuf::from("/opt/homebrew/etc/httpd/httpd.conf")
        );
        assert_eq!(
            settings.vhosts_dir(),
            PathBuf::from("/opt/homebrew/etc/httpd/extra/vhosts")
        );
        assert_eq!(
            settings.ssl_conf(),
            PathBuf::from("/opt/homebrew/etc/httpd/extra/httpd-ssl.conf")
        );
        assert_eq!(
            settings.cert_file(),
            PathBuf::from("/opt/homebrew/etc/httpd/ssl/server.crt")
        );
        assert_eq!(settings.hosts_file(), PathBuf::from("/etc/hosts"));
        assert_eq!(settings.hosts.address, "127.0.0.1");
        assert_eq!(settings.ssl.days, 365);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[apache]\nprefix = \"/usr/local/etc/httpd\"\n\n[ssl]\ndays = 30\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(
            settings.httpd_conf(),
            PathBuf::from("/usr/local/etc/httpd/httpd.conf")
        );
        assert_eq!(settings.ssl.days, 30);
        assert_eq!(settings.ssl.subject, default_subject());
        assert_eq!(settings.apache.php_module, default_php_module());
        assert_eq!(settings.hosts, HostsSettings::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[apache\nprefix = ").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_serializes_back_to_toml() {
        let content = toml::to_string_pretty(&Settings::default()).unwrap();
        assert!(content.contains("[apache]"));
        assert!(content.contains("prefix = \"/opt/homebrew/etc/httpd\""));
        let parsed: Settings = toml::from_str(&content).unwrap();
        assert_eq!(parsed, Settings::default());
    }
}
