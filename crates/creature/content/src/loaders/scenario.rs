//! Scenario loader.

use std::collections::HashSet;
use std::path::Path;

use crate::formats::{ScenarioSpec, ScriptedAction};
use crate::loaders::{LoadResult, read_file};

/// Loader for simulation scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load and check a scenario.
    ///
    /// RON format: [`ScenarioSpec`]
    pub fn load(path: &Path) -> LoadResult<ScenarioSpec> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid scenario {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<ScenarioSpec> {
        let scenario: ScenarioSpec = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;
        Self::check(&scenario)?;
        Ok(scenario)
    }

    /// Entity handles must be unique and every scripted event must name a
    /// placed entity.
    fn check(scenario: &ScenarioSpec) -> LoadResult<()> {
        if scenario.tick_ms == 0 {
            anyhow::bail!("tick_ms must be positive");
        }
        if !(0.0..24.0).contains(&scenario.start_hour) {
            anyhow::bail!("start_hour {} is outside [0, 24)", scenario.start_hour);
        }

        let mut handles = HashSet::new();
        for entity in &scenario.entities {
            if !handles.insert(entity.handle()) {
                anyhow::bail!("entity '{}' is placed twice", entity.handle());
            }
        }

        for event in &scenario.events {
            let named: Vec<&str> = match &event.action {
                ScriptedAction::Attack {
                    attacker, victim, ..
                } => vec![attacker.as_str(), victim.as_str()],
                ScriptedAction::Teleport { entity, .. }
                | ScriptedAction::Despawn { entity }
                | ScriptedAction::Emotion { entity, .. } => vec![entity.as_str()],
                ScriptedAction::Notify { entity, about, .. } => {
                    std::iter::once(entity.as_str()).chain(about.as_deref()).collect()
                }
                ScriptedAction::SetLight { .. } | ScriptedAction::SetTemperature { .. } => {
                    Vec::new()
                }
            };
            if let Some(unknown) = named.into_iter().find(|name| !handles.contains(name)) {
                anyhow::bail!(
                    "event at {}ms names unknown entity '{}'",
                    event.at_ms,
                    unknown
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_handles_are_rejected() {
        let text = r#"(
            name: "twins",
            entities: [
                (code: "sheep", position: (0.0, 0.0, 0.0)),
                (code: "sheep", position: (1.0, 0.0, 0.0)),
            ],
        )"#;
        let err = ScenarioLoader::parse(text).unwrap_err();
        assert!(err.to_string().contains("placed twice"));
    }

    #[test]
    fn events_must_name_placed_entities() {
        let text = r#"(
            name: "ghost",
            entities: [(code: "sheep", position: (0.0, 0.0, 0.0))],
            events: [(at_ms: 10, action: Despawn(entity: "wolf"))],
        )"#;
        let err = ScenarioLoader::parse(text).unwrap_err();
        assert!(err.to_string().contains("'wolf'"));
    }
}
