//! Scenario runner for the creature task scheduler.
//!
//! Run with: `creature-sim run <scenario>` or `creature-sim check`.
//! The data directory defaults to `$CREATURE_DATA_DIR`, then `./data`.

mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{Check, Run};

/// Drive creature AI scenarios from the command line
#[derive(Parser)]
#[command(name = "creature-sim")]
#[command(about = "Run and validate creature AI scenarios", long_about = None)]
#[command(version)]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run one scenario and print what happened
    Run(Run),

    /// Load every behavior and scenario and report problems
    Check(Check),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for CREATURE_DATA_DIR and RUST_LOG)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::init(cli.log_file.as_deref())?;

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
        Command::Check(cmd) => cmd.execute(),
    }
}
