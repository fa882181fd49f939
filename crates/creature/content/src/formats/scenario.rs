use std::collections::BTreeMap;

use creature_core::{GameMode, Vec3};
use serde::{Deserialize, Serialize};

/// World setup for a simulation run.
///
/// Scenarios place creatures, points of interest and obstacles. Behaviors
/// are loaded separately and matched to creatures by `behavior` name (the
/// creature code when unset), so the same behavior file drives every
/// scenario a creature appears in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    pub name: String,
    /// Overrides the configured world seed.
    pub seed: Option<u64>,
    #[serde(default = "default_start_hour")]
    pub start_hour: f32,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Run length used when the caller does not pick one.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    /// In-game hours that pass per simulated second.
    #[serde(default = "default_hours_per_second")]
    pub hours_per_second: f64,
    #[serde(default)]
    pub environment: EnvironmentSpec,
    #[serde(default)]
    pub pois: Vec<PoiSpec>,
    /// Projectile codes the world can spawn. Others are rejected.
    #[serde(default)]
    pub projectile_types: Vec<String>,
    /// Playback length of animations by code, at speed 1.
    #[serde(default)]
    pub animations: BTreeMap<String, u64>,
    pub entities: Vec<EntitySpec>,
    /// Scripted interventions, applied before the tick they fall in.
    #[serde(default)]
    pub events: Vec<ScriptedEvent>,
}

fn default_start_hour() -> f32 {
    8.0
}

fn default_tick_ms() -> u64 {
    50
}

fn default_duration_ms() -> u64 {
    30_000
}

fn default_hours_per_second() -> f64 {
    1.0 / 60.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentSpec {
    /// Light level outside every zone.
    pub light: u8,
    #[serde(default)]
    pub light_zones: Vec<LightZone>,
    pub temperature: f32,
    /// Axis-aligned boxes that block sight and movement.
    #[serde(default)]
    pub blockers: Vec<Blocker>,
}

impl Default for EnvironmentSpec {
    fn default() -> Self {
        Self {
            light: 15,
            light_zones: Vec::new(),
            temperature: 20.0,
            blockers: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightZone {
    pub center: (f32, f32, f32),
    pub radius: f32,
    pub level: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Blocker {
    pub min: (f32, f32, f32),
    pub max: (f32, f32, f32),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoiSpec {
    pub kind: String,
    pub position: (f32, f32, f32),
}

/// One creature or player placed in the world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntitySpec {
    /// Scenario-local handle used by scripted events. Defaults to the code.
    pub name: Option<String>,
    pub code: String,
    pub position: (f32, f32, f32),
    /// Behavior set to attach; defaults to `code`. Players never get one.
    pub behavior: Option<String>,
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default)]
    pub herd: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_health")]
    pub health: f32,
    pub eye_height: Option<f32>,
    #[serde(default)]
    pub fear_reduction: f32,
    pub player: Option<PlayerSpec>,
    #[serde(default)]
    pub swimming: bool,
    #[serde(default)]
    pub feet_in_liquid: bool,
    #[serde(default)]
    pub sneaking: bool,
    /// Emotion states active from the start, with no expiry.
    #[serde(default)]
    pub emotions: Vec<String>,
}

fn default_weight() -> f32 {
    1.0
}

fn default_health() -> f32 {
    10.0
}

impl EntitySpec {
    pub fn handle(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.code)
    }

    pub fn behavior_name(&self) -> &str {
        self.behavior.as_deref().unwrap_or(&self.code)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerSpec {
    #[serde(default)]
    pub game_mode: GameMode,
    #[serde(default = "default_range_multiplier")]
    pub seeking_range_multiplier: f32,
}

fn default_range_multiplier() -> f32 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedEvent {
    pub at_ms: u64,
    pub action: ScriptedAction,
}

/// Interventions a scenario can schedule. Entities are named by handle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScriptedAction {
    /// `attacker` hits `victim`, recording the attack for retaliation.
    Attack {
        attacker: String,
        victim: String,
        damage: f32,
    },
    Teleport {
        entity: String,
        position: (f32, f32, f32),
    },
    Despawn { entity: String },
    /// Sets an emotion state, expiring after `duration_ms` when given.
    Emotion {
        entity: String,
        state: String,
        duration_ms: Option<u64>,
    },
    SetLight { level: u8 },
    SetTemperature { value: f32 },
    Notify {
        entity: String,
        key: String,
        about: Option<String>,
    },
}

/// Converts a scenario coordinate triple.
pub fn vec3((x, y, z): (f32, f32, f32)) -> Vec3 {
    Vec3::new(x, y, z)
}
