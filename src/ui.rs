//! Terminal status lines and dry-run diffs.
//!
//! Everything here prints to stdout; `log` output goes to stderr and is
//! controlled separately by `-v`/`-q`.

use colored::Colorize;
use similar::{ChangeTag, TextDiff};

pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Muted detail line, indented under the current section
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Bold title underlined to its own width
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// What a real run would have done
pub fn dry_run(msg: &str) {
    println!("{} {}", "DRY RUN".yellow().bold(), msg);
}

// ============================================================================
// Diffs
// ============================================================================

/// Changed lines between two renderings, prefixed with `+ ` or `- `
pub fn diff_lines(before: &str, after: &str) -> Vec<String> {
    TextDiff::from_lines(before, after)
        .iter_all_changes()
        .filter_map(|change| {
            let line = change.value().trim_end_matches('\n');
            match change.tag() {
                ChangeTag::Delete => Some(format!("- {line}")),
                ChangeTag::Insert => Some(format!("+ {line}")),
                ChangeTag::Equal => None,
            }
        })
        .collect()
}

/// Print a coloured line diff, indented under the current step
pub fn diff(before: &str, after: &str) {
    let lines = diff_lines(before, after);
    if lines.is_empty() {
        println!("    {}", "(no changes)".dimmed());
        return;
    }
    for line in lines {
        if line.starts_with('+') {
            println!("    {}", line.green());
        } else {
            println!("    {}", line.red());
        }
    }
}
