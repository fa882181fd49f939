//! Engine settings loader.

use std::path::Path;

use creature_core::AiSettings;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`AiSettings`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from a TOML file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed, or when the values do
    /// not validate.
    pub fn load(path: &Path) -> LoadResult<AiSettings> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<AiSettings> {
        let settings: AiSettings = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        settings
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid config: {}", e))?;
        Ok(settings)
    }
}
