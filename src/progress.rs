//! Spinners shown while a blocking command runs.
//!
//! The spinner ticks on indicatif's own thread from before the call until it
//! returns, and is hidden when stderr is not a terminal.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner with a message
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ");
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Run `f` with a spinner showing `msg`; the spinner is always cleared.
pub fn with_spinner<T, E, F>(msg: &str, f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
{
    let pb = spinner(msg);
    let result = f();
    pb.finish_and_clear();
    result
}
