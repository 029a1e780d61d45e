//! Virtual-host layout and configuration template.
//!
//! A domain `D` with document root `R` owns:
//!
//! - `<vhosts_dir>/D.conf`, the two-block (port 80 and 443) vhost file
//! - `R/public/`, served as the document root, with a placeholder `index.php`
//! - `R/_logs/D/{error_log,access_log}` and `R/_logs/D/ssl/{error_log,access_log}`

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

const DOMAIN_PATTERN: &str =
    r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$";

static DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DOMAIN_PATTERN).expect("domain pattern is a valid regex"));

/// Why a domain name was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain is required")]
    Empty,

    #[error("'{0}' is not a valid domain name (letters, digits, '-' and '.' only)")]
    Invalid(String),
}

impl From<DomainError> for confpatch::Error {
    fn from(err: DomainError) -> Self {
        Self::Precondition(err.to_string())
    }
}

/// Check that `domain` is a plain host name safe to use in paths and config.
pub fn validate_domain(domain: &str) -> Result<(), DomainError> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(DomainError::Empty);
    }
    let valid = domain.len() <= 253 && DOMAIN_RE.is_match(domain);
    if valid {
        Ok(())
    } else {
        Err(DomainError::Invalid(domain.to_string()))
    }
}

/// Every path a virtual host touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VhostLayout {
    pub domain: String,
    pub root: PathBuf,
    pub conf_file: PathBuf,
    pub public_dir: PathBuf,
    pub index_file: PathBuf,
    pub log_dir: PathBuf,
    pub ssl_log_dir: PathBuf,
}

impl VhostLayout {
    pub fn new(domain: &str, root: &Path, vhosts_dir: &Path) -> Self {
        let log_dir = root.join("_logs").join(domain);
        let public_dir = root.join("public");
        Self {
            domain: domain.to_string(),
            root: root.to_path_buf(),
            conf_file: conf_file(vhosts_dir, domain),
            index_file: public_dir.join("index.php"),
            public_dir,
            ssl_log_dir: log_dir.join("ssl"),
            log_dir,
        }
    }

    pub fn error_log(&self) -> PathBuf {
        self.log_dir.join("error_log")
    }

    pub fn access_log(&self) -> PathBuf {
        self.log_dir.join("access_log")
    }

    pub fn ssl_error_log(&self) -> PathBuf {
        self.ssl_log_dir.join("error_log")
    }

    pub fn ssl_access_log(&self) -> PathBuf {
        self.ssl_log_dir.join("access_log")
    }

    /// Render the vhost file
    pub fn render(&self, cert_file: &Path, key_file: &Path) -> String {
        let domain = &self.domain;
        let root = self.root.display();
        let directory = directory_block(&root.to_string());
        format!(
            r#"<VirtualHost {domain}:80>
    ServerName {domain}
    DocumentRoot "{root}/public"
    ErrorLog "{error_log}"
    CustomLog "{access_log}" common

{directory}</VirtualHost>

<VirtualHost {domain}:443>
    ServerName {domain}
    DocumentRoot "{root}/public"
    SSLEngine on
    SSLCipherSuite ALL:!ADH:!EXPORT56:RC4+RSA:+HIGH:+MEDIUM:+LOW:+SSLv2:+EXP:+eNULL
    SSLCertificateFile {cert}
    SSLCertificateKeyFile {key}
    ErrorLog "{ssl_error_log}"
    CustomLog "{ssl_access_log}" common

{directory}</VirtualHost>
"#,
            error_log = self.error_log().display(),
            access_log = self.access_log().display(),
            ssl_error_log = self.ssl_error_log().display(),
            ssl_access_log = self.ssl_access_log().display(),
            cert = cert_file.display(),
            key = key_file.display(),
        )
    }

    /// Placeholder page written into a fresh document root
    pub fn index_php(&self) -> String {
        format!(
            "<?php\necho 'It worked! You are on {} domain.';\n",
            self.domain
        )
    }
}

fn directory_block(root: &str) -> String {
    format!(
        r#"    <Directory "{root}">
        Options FollowSymLinks Multiviews Indexes
        MultiviewsMatch Any
        AllowOverride All
        Require all granted
    </Directory>
"#
    )
}

/// Path of the vhost file for `domain`
pub fn conf_file(vhosts_dir: &Path, domain: &str) -> PathBuf {
    vhosts_dir.join(format!("{domain}.conf"))
}

/// Domain served by a vhost file, derived from its name
pub fn domain_of(conf_file: &Path) -> Option<String> {
    if conf_file.extension()? != "conf" {
        return None;
    }
    conf_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
}
