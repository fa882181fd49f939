//! Behavior set loader.
//!
//! A behavior file lists the tasks of one creature type. The file stem names
//! the set, so `behaviors/wolf-male.ron` is picked up by every scenario
//! entity whose behavior (or code) is `wolf-male`.

use std::collections::BTreeMap;
use std::path::Path;

use creature_core::{ConfigError, TaskDefinition};
use tracing::debug;

use crate::formats::TaskSpec;
use crate::loaders::{LoadResult, read_file};

/// Validated tasks of one creature type.
#[derive(Clone, Debug, PartialEq)]
pub struct BehaviorSet {
    pub name: String,
    pub tasks: Vec<TaskDefinition>,
}

impl BehaviorSet {
    /// Converts raw entries, tagging errors with the set name.
    ///
    /// # Errors
    ///
    /// Returns the first entry that fails validation.
    pub fn from_specs(
        name: impl Into<String>,
        specs: Vec<TaskSpec>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let tasks = specs
            .into_iter()
            .map(|spec| spec.into_definition().map_err(|e| e.for_entity(&name)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { name, tasks })
    }
}

/// Loader for behavior files in RON or JSON.
pub struct BehaviorLoader;

impl BehaviorLoader {
    /// Load one behavior file. The format follows the extension.
    ///
    /// RON format: `Vec<TaskSpec>`
    ///
    /// ```ron
    /// #![enable(implicit_some)]
    /// [
    ///     (behavior: Wander(radius: 6.0), priority: 1.0),
    ///     (behavior: FleeEntity(flee_distance: 20.0), priority: 5.0,
    ///      targeting: (seeking_range: 12.0, entity_codes: ["wolf-*"])),
    /// ]
    /// ```
    pub fn load(path: &Path) -> LoadResult<BehaviorSet> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| anyhow::anyhow!("Behavior file {} has no usable name", path.display()))?;
        let content = read_file(path)?;
        let specs = match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::parse_ron(&content)?,
            Some("json") => serde_json::from_str(&content).map_err(|e| {
                anyhow::anyhow!("Failed to parse behavior JSON at {:?}: {}", path, e)
            })?,
            other => anyhow::bail!(
                "Unsupported behavior format {:?} at {}",
                other.unwrap_or(""),
                path.display()
            ),
        };
        let set = BehaviorSet::from_specs(name, specs)
            .map_err(|e| anyhow::anyhow!("Invalid behavior {}: {}", path.display(), e))?;
        debug!(behavior = %set.name, tasks = set.tasks.len(), "behavior loaded");
        Ok(set)
    }

    pub fn parse_ron(content: &str) -> LoadResult<Vec<TaskSpec>> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse behavior RON: {}", e))
    }

    /// Load every `.ron` and `.json` file in a directory, keyed by name.
    ///
    /// # Errors
    ///
    /// Fails on the first unreadable or invalid file, and when two files
    /// share a stem.
    pub fn load_dir(dir: &Path) -> LoadResult<BTreeMap<String, BehaviorSet>> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| anyhow::anyhow!("Failed to read entry in {}: {}", dir.display(), e))?
                .path();
            let supported = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext, "ron" | "json"));
            if path.is_file() && supported {
                paths.push(path);
            }
        }
        paths.sort();

        let mut sets = BTreeMap::new();
        for path in paths {
            let set = Self::load(&path)?;
            if sets.contains_key(&set.name) {
                anyhow::bail!("Behavior '{}' is defined twice in {}", set.name, dir.display());
            }
            sets.insert(set.name.clone(), set);
        }
        Ok(sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use creature_core::TaskKind;
    use std::fs;

    const SHEEP: &str = r#"#![enable(implicit_some)]
[
    (behavior: Wander(radius: 6.0), priority: 1.0),
    (
        code: "flee",
        behavior: FleeEntity(flee_distance: 20.0, alarm_range: 16.0),
        priority: 5.0,
        targeting: (seeking_range: 12.0, entity_codes: ["wolf-*"]),
    ),
]"#;

    #[test]
    fn ron_file_loads_under_its_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheep.ron");
        fs::write(&path, SHEEP).unwrap();

        let set = BehaviorLoader::load(&path).unwrap();
        assert_eq!(set.name, "sheep");
        let kinds: Vec<_> = set.tasks.iter().map(TaskDefinition::kind).collect();
        assert_eq!(kinds, vec![TaskKind::Wander, TaskKind::FleeEntity]);
        assert_eq!(set.tasks[1].code(), "flee");
    }

    #[test]
    fn json_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hare.json");
        fs::write(
            &path,
            r#"[{"behavior": {"Idle": {"stop_range": 4.0}}, "duration_ms": [1000, 2000]}]"#,
        )
        .unwrap();

        let set = BehaviorLoader::load(&path).unwrap();
        assert_eq!(set.tasks[0].kind(), TaskKind::Idle);
    }

    #[test]
    fn invalid_task_names_file_and_entity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wolf.ron");
        fs::write(
            &path,
            "[(behavior: Wander(radius: Some(5.0)), cooldown_ms: Some((900, 100)))]",
        )
        .unwrap();

        let message = BehaviorLoader::load(&path).unwrap_err().to_string();
        assert!(message.contains("wolf.ron"));
        assert!(message.contains("cooldown_ms"));
    }

    #[test]
    fn directory_skips_other_files_and_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sheep.ron"), SHEEP).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let sets = BehaviorLoader::load_dir(dir.path()).unwrap();
        assert_eq!(sets.keys().collect::<Vec<_>>(), vec!["sheep"]);

        fs::write(
            dir.path().join("sheep.json"),
            r#"[{"behavior": {"Wander": {}}}]"#,
        )
        .unwrap();
        assert!(BehaviorLoader::load_dir(dir.path()).is_err());
    }
}
