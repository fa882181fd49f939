//! Raw task descriptions as written in behavior files.

use creature_core::tasks::{
    FleeSettings, IdleSettings, MeleeSettings, ProjectileSettings, SeekPoiSettings, SeekSettings,
    StayInRangeSettings, TurretSettings, WanderSettings,
};
use creature_core::{
    AnimationBinding, Behavior, CodePattern, ConfigError, ErrorContext, SoundBinding, Span,
    TaskConfig, TaskDefinition, TaskKind, TargetingConfig,
};
use serde::{Deserialize, Serialize};

use super::TargetingSpec;

/// One entry of a behavior file.
///
/// Every field except `behavior` is optional; omitted values take the
/// engine defaults. Ranges are written as `(min, max)` pairs.
///
/// ```ron
/// (
///     behavior: MeleeAttack(damage: 4.0, attack_range: 2.5),
///     priority: 3.0,
///     cooldown_ms: (1500, 2000),
///     targeting: (seeking_range: 12.0, entity_codes: ["sheep-*"]),
/// )
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskSpec {
    /// Unique task code on the entity. Defaults to the kind name.
    pub code: Option<String>,
    pub behavior: BehaviorSpec,
    pub id: Option<String>,
    pub slot: Option<usize>,
    pub priority: Option<f32>,
    pub priority_for_cancel: Option<f32>,
    pub execution_chance: Option<f32>,
    pub initial_cooldown_ms: Option<(u64, u64)>,
    pub cooldown_ms: Option<(u64, u64)>,
    pub cooldown_hours: Option<(f64, f64)>,
    pub duration_ms: Option<(u64, u64)>,
    #[serde(default)]
    pub when_in_emotion_state: Vec<String>,
    #[serde(default)]
    pub when_not_in_emotion_state: Vec<String>,
    pub when_swimming: Option<bool>,
    pub when_feet_in_liquid: Option<bool>,
    #[serde(default)]
    pub day_time_frames: Vec<(f32, f32)>,
    pub day_time_jitter_hours: Option<f32>,
    pub light_level: Option<(u8, u8)>,
    pub temperature: Option<(f32, f32)>,
    /// Window in milliseconds; enables the recently-attacked gate.
    pub skip_if_recently_attacked: Option<u64>,
    pub animation: Option<AnimationSpec>,
    pub sound: Option<SoundSpec>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Search and filter settings. Only valid on targeting kinds.
    pub targeting: Option<TargetingSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationSpec {
    pub code: String,
    pub speed: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoundSpec {
    pub asset: String,
    pub range: Option<f32>,
    pub volume: Option<f32>,
    pub pitch: Option<f32>,
    pub delay_ms: Option<u64>,
    pub repeat_ms: Option<u64>,
    pub chance: Option<f32>,
}

/// Kind-specific settings. Omitted values take the kind's defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BehaviorSpec {
    Idle {
        stop_range: Option<f32>,
        #[serde(default)]
        stop_codes: Vec<String>,
    },
    Wander {
        radius: Option<f32>,
        speed: Option<f32>,
        tolerance: Option<f32>,
    },
    SeekPoi {
        poi_kind: String,
        search_range: Option<f32>,
        speed: Option<f32>,
        tolerance: Option<f32>,
    },
    FleeEntity {
        flee_distance: Option<f32>,
        speed: Option<f32>,
        alarm_range: Option<f32>,
    },
    SeekEntity {
        speed: Option<f32>,
        arrive_distance: Option<f32>,
        max_follow_range: Option<f32>,
        alarm_range: Option<f32>,
    },
    MeleeAttack {
        damage: Option<f32>,
        attack_range: Option<f32>,
        attack_duration_ms: Option<u64>,
        damage_at_ms: Option<u64>,
    },
    StayInRange {
        min_range: f32,
        max_range: f32,
        speed: Option<f32>,
    },
    TurretMode {
        firing_range: (f32, f32),
        abort_range: f32,
        projectile: String,
        projectile_damage: Option<f32>,
        projectile_speed: Option<f32>,
        dispersion: Option<f32>,
        fallback_task: Option<String>,
    },
}

impl Default for BehaviorSpec {
    fn default() -> Self {
        BehaviorSpec::Wander {
            radius: None,
            speed: None,
            tolerance: None,
        }
    }
}

impl BehaviorSpec {
    pub fn kind(&self) -> TaskKind {
        match self {
            BehaviorSpec::Idle { .. } => TaskKind::Idle,
            BehaviorSpec::Wander { .. } => TaskKind::Wander,
            BehaviorSpec::SeekPoi { .. } => TaskKind::SeekPoi,
            BehaviorSpec::FleeEntity { .. } => TaskKind::FleeEntity,
            BehaviorSpec::SeekEntity { .. } => TaskKind::SeekEntity,
            BehaviorSpec::MeleeAttack { .. } => TaskKind::MeleeAttack,
            BehaviorSpec::StayInRange { .. } => TaskKind::StayInRange,
            BehaviorSpec::TurretMode { .. } => TaskKind::TurretMode,
        }
    }

    fn into_behavior(self, targeting: Option<TargetingConfig>) -> Behavior {
        let targeting = targeting.unwrap_or_default();
        match self {
            BehaviorSpec::Idle {
                stop_range,
                stop_codes,
            } => Behavior::Idle(IdleSettings {
                stop_range,
                stop_codes: stop_codes.iter().map(|code| CodePattern::parse(code)).collect(),
            }),
            BehaviorSpec::Wander {
                radius,
                speed,
                tolerance,
            } => {
                let defaults = WanderSettings::default();
                Behavior::Wander(WanderSettings {
                    radius: radius.unwrap_or(defaults.radius),
                    speed: speed.unwrap_or(defaults.speed),
                    tolerance: tolerance.unwrap_or(defaults.tolerance),
                })
            }
            BehaviorSpec::SeekPoi {
                poi_kind,
                search_range,
                speed,
                tolerance,
            } => {
                let defaults = SeekPoiSettings::new(poi_kind);
                Behavior::SeekPoi(SeekPoiSettings {
                    search_range: search_range.unwrap_or(defaults.search_range),
                    speed: speed.unwrap_or(defaults.speed),
                    tolerance: tolerance.unwrap_or(defaults.tolerance),
                    ..defaults
                })
            }
            BehaviorSpec::FleeEntity {
                flee_distance,
                speed,
                alarm_range,
            } => {
                let defaults = FleeSettings::default();
                Behavior::FleeEntity(
                    targeting,
                    FleeSettings {
                        flee_distance: flee_distance.unwrap_or(defaults.flee_distance),
                        speed: speed.unwrap_or(defaults.speed),
                        alarm_range,
                    },
                )
            }
            BehaviorSpec::SeekEntity {
                speed,
                arrive_distance,
                max_follow_range,
                alarm_range,
            } => {
                let defaults = SeekSettings::default();
                Behavior::SeekEntity(
                    targeting,
                    SeekSettings {
                        speed: speed.unwrap_or(defaults.speed),
                        arrive_distance: arrive_distance.unwrap_or(defaults.arrive_distance),
                        max_follow_range,
                        alarm_range,
                    },
                )
            }
            BehaviorSpec::MeleeAttack {
                damage,
                attack_range,
                attack_duration_ms,
                damage_at_ms,
            } => {
                let defaults = MeleeSettings::default();
                Behavior::MeleeAttack(
                    targeting,
                    MeleeSettings {
                        damage: damage.unwrap_or(defaults.damage),
                        attack_range: attack_range.unwrap_or(defaults.attack_range),
                        attack_duration_ms: attack_duration_ms
                            .unwrap_or(defaults.attack_duration_ms),
                        damage_at_ms: damage_at_ms.unwrap_or(defaults.damage_at_ms),
                    },
                )
            }
            BehaviorSpec::StayInRange {
                min_range,
                max_range,
                speed,
            } => {
                let defaults = StayInRangeSettings::new(Span::new(min_range, max_range));
                Behavior::StayInRange(
                    targeting,
                    StayInRangeSettings {
                        speed: speed.unwrap_or(defaults.speed),
                        ..defaults
                    },
                )
            }
            BehaviorSpec::TurretMode {
                firing_range,
                abort_range,
                projectile,
                projectile_damage,
                projectile_speed,
                dispersion,
                fallback_task,
            } => {
                let defaults = ProjectileSettings::new(projectile);
                let projectile = ProjectileSettings {
                    damage: projectile_damage.unwrap_or(defaults.damage),
                    speed: projectile_speed.unwrap_or(defaults.speed),
                    dispersion: dispersion.unwrap_or(defaults.dispersion),
                    ..defaults
                };
                let mut settings = TurretSettings::new(
                    Span::new(firing_range.0, firing_range.1),
                    abort_range,
                    projectile,
                );
                if let Some(fallback) = fallback_task {
                    settings = settings.with_fallback(fallback);
                }
                Behavior::TurretMode(targeting, settings)
            }
        }
    }
}

impl TaskSpec {
    /// The code the task will be registered under.
    pub fn resolved_code(&self) -> String {
        self.code
            .clone()
            .unwrap_or_else(|| self.behavior.kind().to_string())
    }

    /// Validates the entry through the core builders.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, naming the task.
    pub fn into_definition(self) -> Result<TaskDefinition, ConfigError> {
        let code = self.resolved_code();
        let kind = self.behavior.kind();

        let targeting = match self.targeting {
            Some(_) if !kind.is_targeting() => {
                return Err(ConfigError::InvalidValue {
                    field: "targeting",
                    reason: format!("'{kind}' tasks do not pick targets"),
                    context: ErrorContext::task(&code),
                });
            }
            Some(spec) => Some(spec.into_config(&code)?),
            None => None,
        };

        let mut builder = TaskConfig::builder(code.as_str());
        if let Some(id) = self.id {
            builder = builder.id(id);
        }
        if let Some(slot) = self.slot {
            builder = builder.slot(slot);
        }
        if let Some(priority) = self.priority {
            builder = builder.priority(priority);
        }
        if let Some(priority) = self.priority_for_cancel {
            builder = builder.priority_for_cancel(priority);
        }
        if let Some(chance) = self.execution_chance {
            builder = builder.execution_chance(chance);
        }
        if let Some((min, max)) = self.initial_cooldown_ms {
            builder = builder.initial_cooldown_ms(min, max);
        }
        if let Some((min, max)) = self.cooldown_ms {
            builder = builder.cooldown_ms(min, max);
        }
        if let Some((min, max)) = self.cooldown_hours {
            builder = builder.cooldown_hours(min, max);
        }
        if let Some((min, max)) = self.duration_ms {
            builder = builder.duration_ms(min, max);
        }
        for state in self.when_in_emotion_state {
            builder = builder.when_in_emotion_state(state);
        }
        for state in self.when_not_in_emotion_state {
            builder = builder.when_not_in_emotion_state(state);
        }
        if let Some(swimming) = self.when_swimming {
            builder = builder.when_swimming(swimming);
        }
        if let Some(in_liquid) = self.when_feet_in_liquid {
            builder = builder.when_feet_in_liquid(in_liquid);
        }
        for (from, to) in self.day_time_frames {
            builder = builder.day_time_frame(from, to);
        }
        if let Some(width) = self.day_time_jitter_hours {
            builder = builder.day_time_jitter_hours(width);
        }
        if let Some((min, max)) = self.light_level {
            builder = builder.light_level(min, max);
        }
        if let Some((min, max)) = self.temperature {
            builder = builder.temperature(min, max);
        }
        if let Some(window) = self.skip_if_recently_attacked {
            builder = builder.skip_if_recently_attacked(window);
        }
        if let Some(animation) = self.animation {
            let mut binding = AnimationBinding::new(animation.code);
            if let Some(speed) = animation.speed {
                binding.speed = speed;
            }
            builder = builder.animation(binding);
        }
        if let Some(sound) = self.sound {
            builder = builder.sound(sound.into_binding());
        }
        for tag in self.tags {
            builder = builder.tag(tag);
        }

        let config = builder.build()?;
        let definition = TaskDefinition::new(config, self.behavior.into_behavior(targeting));
        Ok(definition)
    }
}

impl SoundSpec {
    fn into_binding(self) -> SoundBinding {
        let mut binding = SoundBinding::new(self.asset);
        if let Some(range) = self.range {
            binding.range = range;
        }
        if let Some(volume) = self.volume {
            binding.volume = volume;
        }
        if let Some(pitch) = self.pitch {
            binding.pitch = pitch;
        }
        if let Some(delay) = self.delay_ms {
            binding.delay_ms = delay;
        }
        binding.repeat_ms = self.repeat_ms;
        if let Some(chance) = self.chance {
            binding.chance = chance;
        }
        binding
    }
}
