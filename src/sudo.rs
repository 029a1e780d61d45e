//! Privilege handling
//!
//! Commands that write httpd.conf, the vhosts directory or the hosts file
//! need root. Instead of failing halfway, devhost re-executes itself through
//! `sudo` before touching anything. Homebrew refuses to run as root, so
//! installs are dropped back to the invoking user.

use anyhow::{Context, Result, bail};
use std::process::{Command, Stdio};

use crate::runner;

/// Check if the effective user is root
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

/// Name of the user who ran `sudo devhost`, if any
pub fn original_user() -> Option<String> {
    std::env::var("SUDO_USER")
        .ok()
        .filter(|u| !u.is_empty() && u != "root")
}

/// Re-run the current process under sudo and return its exit code.
pub fn relaunch_with_sudo() -> Result<i32> {
    let exe = std::env::current_exe().context("Could not locate the devhost executable")?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    eprintln!();
    eprintln!("  Sudo required: devhost edits system files (httpd.conf, /etc/hosts)");
    eprintln!();
    log::info!("Relaunching via sudo: {} {}", exe.display(), args.join(" "));

    let status = Command::new("sudo")
        .arg(&exe)
        .args(&args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .context("Failed to execute sudo")?;

    match status.code() {
        Some(code) => Ok(code),
        None => bail!("devhost was terminated by a signal while running under sudo"),
    }
}

/// Build a command that runs `cmd` as the invoking user when under sudo.
///
/// Outside sudo the command runs as the current user unchanged.
pub fn as_original_user(cmd: &str, args: &[&str]) -> Command {
    match original_user() {
        Some(user) => {
            let mut command = Command::new("sudo");
            command.args(["-u", user.as_str(), "-H", cmd]).args(args);
            command.env("USER", &user);
            command
        }
        None => {
            let mut command = Command::new(cmd);
            command.args(args);
            command
        }
    }
}

/// Run `cmd` as the invoking user and capture its output
pub fn run_as_original_user(cmd: &str, args: &[&str]) -> Result<String, confpatch::Error> {
    runner::run_capture_with(&mut as_original_user(cmd, args), cmd, args)
}
