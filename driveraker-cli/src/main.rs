//! driveraker, incremental document sync index CLI.
//!
//! # Usage
//!
//! ```text
//! driveraker init --sync-root <dir> [--index-path <file>] [--fill-factor <n>]
//! driveraker resolve [--listing <file|->] [--report <file>] [--sync-output <file>]
//!                    [--sync-root <dir>] [--dry-run] [--keys] [--json]
//! driveraker status [--json] [--keys]
//! driveraker lookup <key>
//! ```

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{init::InitArgs, lookup::LookupArgs, resolve::ResolveArgs, status::StatusArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "driveraker",
    version,
    about = "Track which synced documents still need converting and publishing",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` wins when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write ~/.driveraker/config.yaml.
    Init(InitArgs),

    /// Decide which documents are new or modified and record them in the index.
    Resolve(ResolveArgs),

    /// Show the shape of the persisted index.
    Status(StatusArgs),

    /// Look up a single key in the index.
    Lookup(LookupArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Resolve(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Lookup(args) => args.run(),
    }
}

/// Logs go to stderr so stdout stays a clean work-set listing.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
