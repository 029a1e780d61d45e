//! Child-process helpers.
//!
//! Failures come back as [`confpatch::Error::ExternalCommand`] carrying the
//! command line and its trimmed output, so callers can attach context.

use confpatch::Error;
use std::process::{Command, ExitStatus, Output, Stdio};

fn command_line(cmd: &str, args: &[&str]) -> String {
    if args.is_empty() {
        cmd.to_string()
    } else {
        format!("{} {}", cmd, args.join(" "))
    }
}

fn spawn_error(cmd: &str, args: &[&str], err: &std::io::Error) -> Error {
    Error::ExternalCommand {
        command: command_line(cmd, args),
        status: "not started".to_string(),
        output: err.to_string(),
    }
}

fn failure(cmd: &str, args: &[&str], status: ExitStatus, output: &Output) -> Error {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let text = if stderr.trim().is_empty() {
        stdout.trim().to_string()
    } else {
        stderr.trim().to_string()
    };
    Error::ExternalCommand {
        command: command_line(cmd, args),
        status: status.to_string(),
        output: text,
    }
}

/// Run a command and capture stdout, failing on a non-zero exit
pub fn run_capture(cmd: &str, args: &[&str]) -> Result<String, Error> {
    run_capture_with(Command::new(cmd).args(args), cmd, args)
}

/// Run a prepared command and capture stdout, failing on a non-zero exit.
///
/// `cmd` and `args` are only used to describe the command in errors.
pub fn run_capture_with(
    command: &mut Command,
    cmd: &str,
    args: &[&str],
) -> Result<String, Error> {
    log::debug!("Running: {}", command_line(cmd, args));
    let output = command.output().map_err(|e| spawn_error(cmd, args, &e))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(failure(cmd, args, output.status, &output))
    }
}

/// Run a command silently, returning success/failure
pub fn run_quiet(cmd: &str, args: &[&str]) -> bool {
    Command::new(cmd)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Check if a command exists
pub fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
