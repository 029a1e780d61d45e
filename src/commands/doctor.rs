//! `devhost doctor`: read-only health check of the local stack

use anyhow::Result;
use colored::Colorize;
use confpatch::{Executor, RunMode};

use crate::Context;
use crate::commands::list;
use crate::hosts::HostsFile;
use crate::paths;
use crate::rules;
use crate::runner;
use crate::settings::Settings;
use crate::system::{apache, mysql};
use crate::ui;

struct Issue {
    category: &'static str,
    summary: String,
    detail: Option<String>,
    fix_cmd: Option<String>,
}

pub fn run(_ctx: &Context) -> Result<()> {
    ui::header("devhost Health Check");

    let mut issues: Vec<Issue> = Vec::new();

    let settings = check_settings(&mut issues);
    check_commands(&mut issues);
    check_services(&mut issues);
    check_httpd_conf(&settings, &mut issues);
    check_certificates(&settings, &mut issues);
    check_hosts(&settings, &mut issues);

    println!();
    if issues.is_empty() {
        ui::success("Everything is set up.");
    } else {
        print_issue_summary(&issues);
    }

    Ok(())
}

fn print_issue_summary(issues: &[Issue]) {
    let count = issues.len();
    let label = if count == 1 { "Issue" } else { "Issues" };
    ui::header(&format!("{count} {label} Found"));

    for (i, issue) in issues.iter().enumerate() {
        println!(
            "  {}  {} {}",
            format!("{}.", i + 1).bold(),
            issue.summary,
            format!("[{}]", issue.category).dimmed()
        );
        if let Some(detail) = &issue.detail {
            for line in detail.lines() {
                println!("      {}", line.dimmed());
            }
        }
        if let Some(cmd) = &issue.fix_cmd {
            println!("      {} {}", "$".dimmed(), cmd.bold());
        }
        println!();
    }
}

fn check_settings(issues: &mut Vec<Issue>) -> Settings {
    ui::section("Settings");

    let path = match paths::config_file() {
        Ok(p) => p,
        Err(e) => {
            issues.push(Issue {
                category: "Settings",
                summary: "Could not locate the settings file".into(),
                detail: Some(format!("{e:#}")),
                fix_cmd: None,
            });
            return Settings::default();
        }
    };

    match Settings::load_from(&path) {
        Ok(settings) => {
            if path.exists() {
                println!("  {} {}", "✓".green(), path.display());
            } else {
                println!(
                    "  {} {} {}",
                    "○".dimmed(),
                    path.display(),
                    "(not found, using defaults)".dimmed()
                );
            }
            settings
        }
        Err(e) => {
            println!("  {} {} {}", "✗".red(), path.display(), "(invalid)".red());
            issues.push(Issue {
                category: "Settings",
                summary: format!("{} is invalid", path.display()),
                detail: Some(format!("{e:#}")),
                fix_cmd: Some(format!("$EDITOR {}", path.display())),
            });
            Settings::default()
        }
    }
}

fn check_commands(issues: &mut Vec<Issue>) {
    ui::section("Required Commands");

    let commands = [
        ("brew", "Package manager", "Visit https://brew.sh for install instructions"),
        ("apachectl", "Apache httpd", "brew install httpd"),
        ("mysql", "MySQL client", "brew install mysql"),
        ("php", "PHP runtime", "brew install php"),
        ("openssl", "Certificate generation", "brew install openssl"),
    ];

    for (cmd, desc, install_hint) in commands {
        if runner::command_exists(cmd) {
            println!("  {} {} - {}", "✓".green(), cmd, desc.dimmed());
        } else {
            println!("  {} {} - {} {}", "✗".red(), cmd, desc, "(missing)".red());
            issues.push(Issue {
                category: "Required Commands",
                summary: format!("{cmd} is not installed"),
                detail: Some(desc.to_string()),
                fix_cmd: Some(install_hint.to_string()),
            });
        }
    }
}

fn check_services(issues: &mut Vec<Issue>) {
    ui::section("Services");

    match apache::is_running() {
        Ok(true) => println!("  {} Apache is running", "✓".green()),
        _ => {
            println!("  {} Apache is not running", "✗".red());
            issues.push(Issue {
                category: "Services",
                summary: "Apache is not running".into(),
                detail: None,
                fix_cmd: Some("sudo apachectl -k restart".into()),
            });
        }
    }

    if !mysql::is_installed() {
        return;
    }
    match mysql::is_running() {
        Ok(true) => println!("  {} MySQL is running", "✓".green()),
        _ => {
            println!("  {} MySQL is not running", "✗".red());
            issues.push(Issue {
                category: "Services",
                summary: "MySQL is not running".into(),
                detail: None,
                fix_cmd: Some("brew services restart mysql".into()),
            });
        }
    }
}

fn check_httpd_conf(settings: &Settings, issues: &mut Vec<Issue>) {
    ui::section("httpd.conf");

    let conf = settings.httpd_conf();
    let executor = Executor::new(RunMode::DryRun);
    for set in rules::all(settings) {
        match executor.check(&conf, &set.rules) {
            Ok(plan) if plan.is_empty() => {
                println!("  {} {}", "✓".green(), set.name);
            }
            Ok(plan) => {
                println!(
                    "  {} {} {}",
                    "○".yellow(),
                    set.name,
                    format!("({} edit(s) pending)", plan.len()).yellow()
                );
                issues.push(Issue {
                    category: "httpd.conf",
                    summary: format!("{} not fully enabled in {}", set.name, conf.display()),
                    detail: Some(
                        plan.edits
                            .iter()
                            .map(|e| e.edit.to_string())
                            .collect::<Vec<_>>()
                            .join("\n"),
                    ),
                    fix_cmd: Some("sudo devhost create --domain <domain> --doc-root <dir>".into()),
                });
            }
            Err(e) => {
                println!("  {} {} {}", "✗".red(), set.name, "(unreadable)".red());
                issues.push(Issue {
                    category: "httpd.conf",
                    summary: format!("Could not read {}", conf.display()),
                    detail: Some(format!("{e}\n{}", e.category().advice())),
                    fix_cmd: None,
                });
                return;
            }
        }
    }
}

fn check_certificates(settings: &Settings, issues: &mut Vec<Issue>) {
    ui::section("TLS");

    for (label, path) in [
        ("Certificate", settings.cert_file()),
        ("Key", settings.key_file()),
    ] {
        if path.is_file() {
            println!("  {} {} {}", "✓".green(), label, path.display().to_string().dimmed());
        } else {
            println!("  {} {} {}", "✗".red(), label, "(missing)".red());
            issues.push(Issue {
                category: "TLS",
                summary: format!("{label} not found at {}", path.display()),
                detail: Some("Generated on the next `devhost create`".into()),
                fix_cmd: None,
            });
        }
    }
}

fn check_hosts(settings: &Settings, issues: &mut Vec<Issue>) {
    ui::section("Hosts file");

    let path = settings.hosts_file();
    if let Err(e) = std::fs::metadata(&path) {
        println!("  {} {} {}", "✗".red(), path.display(), "(unreadable)".red());
        issues.push(Issue {
            category: "Hosts file",
            summary: format!("Could not read {}", path.display()),
            detail: Some(e.to_string()),
            fix_cmd: None,
        });
        return;
    }
    println!("  {} {}", "✓".green(), path.display());

    let domains = match list::scan(&settings.vhosts_dir()) {
        Ok(domains) => domains,
        Err(e) => {
            log::warn!("Skipping hosts entry check: {e:#}");
            return;
        }
    };
    let hosts = HostsFile::new(&path, &settings.hosts.address, RunMode::DryRun);
    for d in domains {
        match hosts.contains(&d.domain) {
            Ok(true) => println!("  {} {}", "✓".green(), d.domain),
            Ok(false) => {
                println!("  {} {} {}", "✗".red(), d.domain, "(no hosts entry)".red());
                issues.push(Issue {
                    category: "Hosts file",
                    summary: format!("{} has a virtual host but no hosts entry", d.domain),
                    detail: Some(d.file.display().to_string()),
                    fix_cmd: Some(format!(
                        "echo '{} {}' | sudo tee -a {}",
                        settings.hosts.address,
                        d.domain,
                        path.display()
                    )),
                });
            }
            Err(e) => {
                issues.push(Issue {
                    category: "Hosts file",
                    summary: format!("Could not read {}", path.display()),
                    detail: Some(e.to_string()),
                    fix_cmd: None,
                });
                return;
            }
        }
    }
}
