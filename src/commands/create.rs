//! `devhost create`: services, hosts entry, vhost and TLS for one domain

use anyhow::{Context as _, Result};
use confpatch::{ArtifactStore, Operation, RunMode};
use std::path::Path;

use crate::Context;
use crate::cli::CreateArgs;
use crate::commands::announce_mode;
use crate::hosts::{AddOutcome, HostsFile};
use crate::paths;
use crate::rules;
use crate::settings::Settings;
use crate::system::{self, apache, mysql, php, ssl};
use crate::ui;
use crate::vhost::{self, VhostLayout};

pub fn run(ctx: &Context, args: &CreateArgs) -> Result<()> {
    let mode = RunMode::from_dry_run(args.dry_run);
    let reset_dns = !args.no_dns_reset;
    let domain = args.domain.trim();
    vhost::validate_domain(domain).map_err(confpatch::Error::from)?;
    let root = paths::absolute(require_doc_root(&args.doc_root)?)?;
    let settings = Settings::load()?;

    if !ctx.quiet {
        ui::header(&format!("Setting up {domain}"));
        ui::kv("Document root", &root.display().to_string());
        ui::kv("httpd.conf", &settings.httpd_conf().display().to_string());
    }
    announce_mode(mode);

    ui::section("System checks");
    apache::verify(mode, reset_dns).context("Apache check failed")?;
    mysql::verify(mode).context("MySQL check failed")?;
    php::verify(mode, &settings, reset_dns).context("PHP check failed")?;
    ui::success("All checks passed.");

    ui::section("Hosts file");
    let hosts = HostsFile::new(settings.hosts_file(), &settings.hosts.address, mode);
    match hosts
        .add(domain)
        .with_context(|| format!("Adding {domain} to {}", hosts.path().display()))?
    {
        AddOutcome::Added if mode.is_dry_run() => {
            ui::dry_run(&format!("would add '{domain}' to {}", hosts.path().display()));
        }
        AddOutcome::Added => ui::success(&format!("Added '{domain}' to the hosts file.")),
        AddOutcome::AlreadyExists => {
            ui::success(&format!("'{domain}' already exists in the hosts file."));
        }
    }

    ui::section("Apache configuration");
    system::patch_config(
        mode,
        &settings.httpd_conf(),
        &rules::vhost_include(&settings.vhosts_dir()),
        "virtual hosts",
    )?;
    // The vhost's TLS block needs mod_ssl, so TLS is on before the vhost is tested.
    ssl::enable(mode, &settings)?;

    ui::section("Virtual host");
    let layout = VhostLayout::new(domain, &root, &settings.vhosts_dir());
    Operation::run(format!("add virtual host for {domain}"), mode, |op| {
        write_vhost(op, &layout, &settings.cert_file(), &settings.key_file())?;
        if !mode.is_dry_run() {
            apache::config_test().context("Apache rejected the new configuration")?;
            ui::success("Apache configuration test passed.");
        }
        Ok::<_, anyhow::Error>(())
    })
    .with_context(|| format!("Adding virtual host for {domain}"))?;

    if mode.is_dry_run() {
        ui::dry_run(&format!(
            "would write {}",
            layout.conf_file.display()
        ));
    } else {
        ui::success(&format!(
            "Virtual host for '{domain}' created at {}",
            layout.conf_file.display()
        ));
    }

    apache::restart(mode, reset_dns)?;

    println!();
    if mode.is_dry_run() {
        ui::info("Dry run complete. Re-run without --dry-run to apply.");
    } else {
        ui::success("All changes applied successfully!");
        ui::info(&format!(
            "You should now be able to access your project at http://{domain} or https://{domain}"
        ));
    }
    Ok(())
}

/// Reject an empty or blank `--doc-root` before it resolves to the cwd.
fn require_doc_root(doc_root: &Path) -> Result<&Path, confpatch::Error> {
    if doc_root.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(confpatch::Error::Precondition(
            "document root is required".to_string(),
        ));
    }
    Ok(doc_root)
}

/// Create the directories and files of one virtual host inside `op`.
///
/// A pre-existing `index.php` is kept; a pre-existing vhost file is replaced
/// and restored if the operation later rolls back.
pub fn write_vhost<S: ArtifactStore>(
    op: &mut Operation<S>,
    layout: &VhostLayout,
    cert_file: &Path,
    key_file: &Path,
) -> Result<()> {
    let vhosts_dir = layout
        .conf_file
        .parent()
        .context("vhost file has no parent directory")?;
    op.create_dir(vhosts_dir).context("Creating vhosts directory")?;
    op.create_dir(&layout.ssl_log_dir)
        .context("Creating log directories")?;
    op.create_dir(&layout.public_dir)
        .context("Creating public directory")?;

    if op
        .write_file_if_absent(&layout.index_file, layout.index_php().as_bytes())
        .context("Writing index.php")?
    {
        log::info!("Placeholder page at {}", layout.index_file.display());
    } else {
        ui::dim(&format!("Keeping existing {}", layout.index_file.display()));
    }

    if layout.conf_file.exists() {
        ui::warn(&format!(
            "Replacing existing {}",
            layout.conf_file.display()
        ));
    }
    op.write_file(
        &layout.conf_file,
        layout.render(cert_file, key_file).as_bytes(),
    )
    .with_context(|| format!("Writing vhost file {}", layout.conf_file.display()))?;
    Ok(())
}
