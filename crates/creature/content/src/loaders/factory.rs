//! Content factory for loading everything a simulation needs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use creature_core::AiSettings;

use crate::formats::ScenarioSpec;
use crate::loaders::{BehaviorLoader, BehaviorSet, ConfigLoader, LoadResult, ScenarioLoader};

/// Content factory that loads creature content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── behaviors/
/// │   ├── sheep.ron
/// │   └── wolf-male.ron
/// └── scenarios/
///     └── meadow.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine settings from `config.toml`, or the defaults when the file
    /// is absent.
    pub fn load_config(&self) -> LoadResult<AiSettings> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(AiSettings::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load every behavior set from `behaviors/`.
    pub fn load_behaviors(&self) -> LoadResult<BTreeMap<String, BehaviorSet>> {
        BehaviorLoader::load_dir(&self.data_dir.join("behaviors"))
    }

    /// Load a scenario from `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<ScenarioSpec> {
        let path = self.data_dir.join("scenarios").join(format!("{}.ron", name));
        ScenarioLoader::load(&path)
    }

    /// Names of the scenarios in `scenarios/`, sorted.
    pub fn scenario_names(&self) -> LoadResult<Vec<String>> {
        let dir = self.data_dir.join("scenarios");
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", dir.display(), e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn loads_a_full_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("behaviors")).unwrap();
        fs::create_dir(dir.path().join("scenarios")).unwrap();
        fs::write(dir.path().join("config.toml"), "world_seed = 7\n").unwrap();
        fs::write(
            dir.path().join("behaviors").join("sheep.ron"),
            "[(behavior: Wander(radius: Some(4.0)))]",
        )
        .unwrap();
        fs::write(
            dir.path().join("scenarios").join("meadow.ron"),
            r#"(name: "meadow", entities: [(code: "sheep", position: (0.0, 0.0, 0.0))])"#,
        )
        .unwrap();

        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap().world_seed, 7);
        assert!(factory.load_behaviors().unwrap().contains_key("sheep"));
        assert_eq!(factory.load_scenario("meadow").unwrap().name, "meadow");
        assert!(factory.load_scenario("missing").is_err());
        assert_eq!(factory.scenario_names().unwrap(), vec!["meadow".to_string()]);
    }

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap(), AiSettings::default());
    }
}
