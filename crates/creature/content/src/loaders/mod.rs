//! Content loaders for reading creature data from files.
//!
//! Every loader parses into the shapes in [`crate::formats`] and then
//! validates through the core builders, so errors surface at load time with
//! the file and task they came from.

pub mod behavior;
pub mod config;
pub mod factory;
pub mod scenario;

pub use behavior::{BehaviorLoader, BehaviorSet};
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use scenario::ScenarioLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
