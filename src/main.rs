mod cli;
mod commands;
mod hosts;
mod paths;
mod progress;
mod rules;
mod runner;
mod settings;
mod sudo;
mod system;
mod ui;
mod vhost;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if cli.command.needs_root() && !sudo::is_root() {
        let code = sudo::relaunch_with_sudo()?;
        std::process::exit(code);
    }

    let ctx = Context { quiet: cli.quiet };

    match cli.command {
        Command::Create(args) => commands::create::run(&ctx, &args),
        Command::Delete(args) => commands::delete::run(&ctx, &args),
        Command::List(args) => commands::list::run(&ctx, &args),
        Command::Doctor => commands::doctor::run(&ctx),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "devhost", &mut io::stdout());
            Ok(())
        }
    }
}
