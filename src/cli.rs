use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "devhost")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Provision local Apache/PHP/MySQL virtual hosts", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Set up a local domain: services, hosts entry, vhost and TLS
    Create(CreateArgs),

    /// Remove a local domain's vhost and hosts entry
    Delete(DeleteArgs),

    /// List configured domains
    List(ListArgs),

    /// Check services and whether httpd.conf is fully configured
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Command {
    /// Whether the command writes system files and must run as root
    pub fn needs_root(&self) -> bool {
        match self {
            Self::Create(args) => !args.dry_run,
            Self::Delete(args) => !args.dry_run,
            _ => false,
        }
    }
}

#[derive(Args)]
pub struct CreateArgs {
    /// Local domain to set up (e.g., myproject.local)
    #[arg(short, long)]
    pub domain: String,

    /// Project directory; `<doc-root>/public` is served
    #[arg(long, visible_alias = "doc_root", value_name = "DIR")]
    pub doc_root: PathBuf,

    /// Show what would change without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Skip flushing the DNS cache after restarting Apache
    #[arg(long)]
    pub no_dns_reset: bool,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Local domain to remove
    #[arg(short, long)]
    pub domain: String,

    /// Show what would be removed without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Skip flushing the DNS cache after restarting Apache
    #[arg(long)]
    pub no_dns_reset: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}
