//! Roster: keep the public team roster in step with the agent directory.
//!
//! # Usage
//!
//! ```text
//! roster init --office <id|name> [--office ...] (--directory-file <path> | --directory-url <url> [--api-key <key>])
//! roster config show [--json]
//! roster config path
//! roster preview [--json]
//! roster sync [--background] [--budget-secs <n>] [--json]
//! roster report [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    config::ConfigCommand, init::InitArgs, preview::PreviewArgs, report::ReportArgs,
    sync::SyncArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "roster",
    version,
    about = "Reconcile the public team roster against the agent directory",
    long_about = None,
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write ~/.roster/config.yaml.
    Init(InitArgs),

    /// Inspect the sync configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Show what a sync would do without writing anything.
    Preview(PreviewArgs),

    /// Run a sync and record its report.
    Sync(SyncArgs),

    /// Show the report of the last sync run.
    Report(ReportArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
        Commands::Preview(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Report(args) => args.run(),
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
