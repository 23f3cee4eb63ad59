//! embedsync: vendor meta-hymo sources into the ksud embedded tree.
//!
//! # Usage
//!
//! ```text
//! embedsync [--tool-dir DIR] [--manifest FILE] [-v]            # same as `sync`
//! embedsync sync [--yes] [--no-refresh] [--dry-run]
//! embedsync diff
//! embedsync list [--json]
//! ```
//!
//! Exit status: 0 all entries synced, 1 aborted, 2 some entries failed.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{diff::DiffArgs, list::ListArgs, sync::SyncArgs};
use embedsync_sync::EXIT_ABORTED;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "embedsync",
    version,
    about = "Sync upstream hymo sources into the ksud embedded tree",
    long_about = None,
)]
struct Cli {
    /// Directory the tool lives in (defaults to the executable's directory).
    #[arg(long, global = true, value_name = "DIR")]
    tool_dir: Option<PathBuf>,

    /// YAML manifest overriding the built-in mapping and naming.
    #[arg(long, global = true, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Log pipeline steps to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Locate, refresh, transform and write every mapped file (default).
    Sync(SyncArgs),

    /// Show unified diff of what sync would write.
    Diff(DiffArgs),

    /// Print the mapping table in processing order.
    List(ListArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub tool_dir: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(EXIT_ABORTED)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(cli.verbose);

    let global = GlobalArgs {
        tool_dir: cli.tool_dir,
        manifest: cli.manifest,
    };
    let result = match cli.command.unwrap_or_else(|| Commands::Sync(SyncArgs::default())) {
        Commands::Sync(args) => args.run(&global),
        Commands::Diff(args) => args.run(&global),
        Commands::List(args) => args.run(&global),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(EXIT_ABORTED)
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
