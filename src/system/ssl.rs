//! Self-signed certificate provisioning and mod_ssl wiring

use anyhow::{Context, Result};
use confpatch::{Operation, RunMode};
use std::path::Path;

use crate::runner;
use crate::rules;
use crate::settings::Settings;
use crate::system::patch_config;
use crate::ui;

/// What [`ensure_certificates`] found or did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertOutcome {
    Existing,
    Generated,
}

/// Arguments for `openssl req` producing a self-signed pair
pub fn openssl_args<'a>(
    cert: &'a str,
    key: &'a str,
    days: &'a str,
    subject: &'a str,
) -> [&'a str; 13] {
    [
        "req", "-x509", "-nodes", "-days", days, "-newkey", "rsa:2048", "-keyout", key, "-out",
        cert, "-subj", subject,
    ]
}

/// Make sure a certificate and key exist, generating both when either is missing.
///
/// The certificate directory is created inside a rolled-back operation, so a
/// failed `openssl` run does not leave an empty directory behind.
pub fn ensure_certificates(
    mode: RunMode,
    cert: &Path,
    key: &Path,
    days: u32,
    subject: &str,
) -> Result<CertOutcome> {
    ui::info("Checking for SSL certificates...");
    if cert.is_file() && key.is_file() {
        ui::success("SSL certificates already exist.");
        return Ok(CertOutcome::Existing);
    }

    ui::warn(&format!(
        "SSL certificate not found at {}. Generating a self-signed certificate...",
        cert.display()
    ));

    Operation::run("generate certificate", mode, |op| -> Result<CertOutcome> {
        for dir in [cert.parent(), key.parent()].into_iter().flatten() {
            op.create_dir(dir)
                .with_context(|| format!("Creating SSL directory {}", dir.display()))?;
        }

        let cert_arg = cert.to_string_lossy();
        let key_arg = key.to_string_lossy();
        let days_arg = days.to_string();
        let args = openssl_args(&cert_arg, &key_arg, &days_arg, subject);

        if mode.is_dry_run() {
            ui::dry_run(&format!("would run openssl {}", args.join(" ")));
            return Ok(CertOutcome::Generated);
        }

        runner::run_capture("openssl", &args).context("Generating self-signed SSL certificate")?;
        ui::success("Self-signed SSL certificate generated:");
        ui::kv("Certificate", &cert.display().to_string());
        ui::kv("Key", &key.display().to_string());
        Ok(CertOutcome::Generated)
    })
}

/// Provision certificates and enable TLS in httpd.conf.
///
/// Returns whether httpd.conf changed.
pub fn enable(mode: RunMode, settings: &Settings) -> Result<bool> {
    let cert = settings.cert_file();
    let key = settings.key_file();
    ensure_certificates(mode, &cert, &key, settings.ssl.days, &settings.ssl.subject)?;

    let rules = rules::ssl(&settings.ssl_conf(), &cert, &key);
    patch_config(mode, &settings.httpd_conf(), &rules, "SSL")
}
