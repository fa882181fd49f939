//! Subcommands of the scenario runner.

mod check;
mod run;

pub use check::Check;
pub use run::Run;

use std::path::PathBuf;

/// `--data-dir`, else `$CREATURE_DATA_DIR`, else `./data`.
fn data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os("CREATURE_DATA_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}
