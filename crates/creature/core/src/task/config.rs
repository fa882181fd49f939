//! Immutable task configuration and its validating builder.
//!
//! A [`TaskConfig`] is produced once per task by [`TaskConfigBuilder::build`]
//! and never changes afterwards. Randomized values (cooldown windows, the
//! duration cap) are stored as [`Span`]s and resolved to a single deadline
//! each time the task runs.

use crate::config::AiSettings;
use crate::error::ConfigError;

/// Inclusive `[min, max]` interval.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Span<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub const fn exactly(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// A window of the 24 hour virtual day during which a task may start.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayTimeFrame {
    pub from_hour: f32,
    pub to_hour: f32,
}

impl DayTimeFrame {
    pub const fn new(from_hour: f32, to_hour: f32) -> Self {
        Self { from_hour, to_hour }
    }

    pub fn matches(&self, hour: f32) -> bool {
        hour >= self.from_hour && hour <= self.to_hour
    }
}

/// Animation started when the task starts and stopped when it finishes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationBinding {
    pub code: String,
    pub speed: f32,
}

impl AnimationBinding {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            speed: 1.0,
        }
    }
}

/// Sound played while the task runs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoundBinding {
    pub asset: String,
    pub range: f32,
    pub volume: f32,
    pub pitch: f32,
    /// Delay after the task starts before the first playback.
    pub delay_ms: u64,
    /// Replay interval while the task keeps running.
    pub repeat_ms: Option<u64>,
    /// Probability that any given playback actually happens.
    pub chance: f32,
}

impl SoundBinding {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            range: 24.0,
            volume: 1.0,
            pitch: 1.0,
            delay_ms: 0,
            repeat_ms: None,
            chance: 1.0,
        }
    }
}

/// Validated, immutable configuration shared by every task kind.
///
/// Instances can only be created through [`TaskConfig::builder`].
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct TaskConfig {
    /// Task code, unique per entity (`wander`, `turretmode`, ...).
    pub code: String,
    /// Optional designer-facing identifier.
    pub id: Option<String>,
    pub slot: usize,
    pub priority: f32,
    /// Priority a competing task must exceed to interrupt this one.
    pub priority_for_cancel: f32,
    /// Probability that the task is considered at all on a given tick.
    pub execution_chance: f32,
    /// Cooldown applied once when the owning manager is built.
    pub initial_cooldown_ms: Span<u64>,
    /// Short cooldown after each run, in simulated milliseconds.
    pub cooldown_ms: Span<u64>,
    /// Long cooldown after each run, in in-game hours.
    pub cooldown_hours: Span<f64>,
    /// Hard cap on a single run.
    pub duration_ms: Option<Span<u64>>,
    pub when_in_emotion_state: Vec<String>,
    pub when_not_in_emotion_state: Vec<String>,
    pub when_swimming: Option<bool>,
    pub when_feet_in_liquid: Option<bool>,
    pub day_time_frames: Vec<DayTimeFrame>,
    /// Width of the random offset added to the hour before matching frames.
    pub day_time_jitter_hours: f32,
    pub light_level: Span<u8>,
    pub temperature: Option<Span<f32>>,
    pub skip_if_recently_attacked: bool,
    pub recently_attacked_window_ms: u64,
    pub animation: Option<AnimationBinding>,
    pub sound: Option<SoundBinding>,
    /// Tags applied to the owner while the task runs.
    pub tags: Vec<String>,
}

impl TaskConfig {
    pub const DEFAULT_DAY_TIME_JITTER_HOURS: f32 = 0.3;
    pub const DEFAULT_RECENTLY_ATTACKED_WINDOW_MS: u64 = 10_000;

    pub fn builder(code: impl Into<String>) -> TaskConfigBuilder {
        TaskConfigBuilder::new(code)
    }
}

/// Builder for [`TaskConfig`]. Every range is checked in [`Self::build`].
#[derive(Clone, Debug)]
pub struct TaskConfigBuilder {
    code: String,
    id: Option<String>,
    slot: usize,
    priority: f32,
    priority_for_cancel: Option<f32>,
    execution_chance: f32,
    initial_cooldown_ms: Span<u64>,
    cooldown_ms: Span<u64>,
    cooldown_hours: Span<f64>,
    duration_ms: Option<Span<u64>>,
    when_in_emotion_state: Vec<String>,
    when_not_in_emotion_state: Vec<String>,
    when_swimming: Option<bool>,
    when_feet_in_liquid: Option<bool>,
    day_time_frames: Vec<DayTimeFrame>,
    day_time_jitter_hours: f32,
    light_level: Span<u8>,
    temperature: Option<Span<f32>>,
    skip_if_recently_attacked: bool,
    recently_attacked_window_ms: u64,
    animation: Option<AnimationBinding>,
    sound: Option<SoundBinding>,
    tags: Vec<String>,
}

impl TaskConfigBuilder {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            id: None,
            slot: 0,
            priority: 1.0,
            priority_for_cancel: None,
            execution_chance: 1.0,
            initial_cooldown_ms: Span::exactly(0),
            cooldown_ms: Span::exactly(0),
            cooldown_hours: Span::exactly(0.0),
            duration_ms: None,
            when_in_emotion_state: Vec::new(),
            when_not_in_emotion_state: Vec::new(),
            when_swimming: None,
            when_feet_in_liquid: None,
            day_time_frames: Vec::new(),
            day_time_jitter_hours: TaskConfig::DEFAULT_DAY_TIME_JITTER_HOURS,
            light_level: Span::new(0, AiSettings::MAX_LIGHT_LEVEL),
            temperature: None,
            skip_if_recently_attacked: false,
            recently_attacked_window_ms: TaskConfig::DEFAULT_RECENTLY_ATTACKED_WINDOW_MS,
            animation: None,
            sound: None,
            tags: Vec::new(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn slot(mut self, slot: usize) -> Self {
        self.slot = slot;
        self
    }

    pub fn priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    pub fn priority_for_cancel(mut self, priority: f32) -> Self {
        self.priority_for_cancel = Some(priority);
        self
    }

    pub fn execution_chance(mut self, chance: f32) -> Self {
        self.execution_chance = chance;
        self
    }

    pub fn initial_cooldown_ms(mut self, min: u64, max: u64) -> Self {
        self.initial_cooldown_ms = Span::new(min, max);
        self
    }

    pub fn cooldown_ms(mut self, min: u64, max: u64) -> Self {
        self.cooldown_ms = Span::new(min, max);
        self
    }

    pub fn cooldown_hours(mut self, min: f64, max: f64) -> Self {
        self.cooldown_hours = Span::new(min, max);
        self
    }

    pub fn duration_ms(mut self, min: u64, max: u64) -> Self {
        self.duration_ms = Some(Span::new(min, max));
        self
    }

    pub fn when_in_emotion_state(mut self, code: impl Into<String>) -> Self {
        self.when_in_emotion_state.push(code.into());
        self
    }

    pub fn when_not_in_emotion_state(mut self, code: impl Into<String>) -> Self {
        self.when_not_in_emotion_state.push(code.into());
        self
    }

    pub fn when_swimming(mut self, swimming: bool) -> Self {
        self.when_swimming = Some(swimming);
        self
    }

    pub fn when_feet_in_liquid(mut self, in_liquid: bool) -> Self {
        self.when_feet_in_liquid = Some(in_liquid);
        self
    }

    pub fn day_time_frame(mut self, from_hour: f32, to_hour: f32) -> Self {
        self.day_time_frames.push(DayTimeFrame::new(from_hour, to_hour));
        self
    }

    pub fn day_time_jitter_hours(mut self, width: f32) -> Self {
        self.day_time_jitter_hours = width;
        self
    }

    pub fn light_level(mut self, min: u8, max: u8) -> Self {
        self.light_level = Span::new(min, max);
        self
    }

    pub fn temperature(mut self, min: f32, max: f32) -> Self {
        self.temperature = Some(Span::new(min, max));
        self
    }

    pub fn skip_if_recently_attacked(mut self, window_ms: u64) -> Self {
        self.skip_if_recently_attacked = true;
        self.recently_attacked_window_ms = window_ms;
        self
    }

    pub fn animation(mut self, animation: AnimationBinding) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn sound(mut self, sound: SoundBinding) -> Self {
        self.sound = Some(sound);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Validates and freezes the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the task for an empty code, an
    /// out-of-range slot, a non-finite priority, a probability outside
    /// `[0, 1]`, any interval whose min exceeds its max, or day-time frames
    /// outside `[0, 24]`.
    pub fn build(self) -> Result<TaskConfig, ConfigError> {
        let code = self.code.as_str();
        if code.trim().is_empty() {
            return Err(ConfigError::value("code", "must not be empty", code));
        }
        if self.slot >= AiSettings::SLOT_COUNT {
            return Err(ConfigError::InvalidSlot {
                slot: self.slot,
                max: AiSettings::SLOT_COUNT,
                context: crate::ErrorContext::task(code),
            });
        }
        if !self.priority.is_finite() {
            return Err(ConfigError::value("priority", "must be finite", code));
        }
        let priority_for_cancel = self.priority_for_cancel.unwrap_or(self.priority);
        if !priority_for_cancel.is_finite() {
            return Err(ConfigError::value("priority_for_cancel", "must be finite", code));
        }
        check_probability("execution_chance", self.execution_chance, code)?;

        check_ms_span("initial_cooldown_ms", self.initial_cooldown_ms, code)?;
        check_ms_span("cooldown_ms", self.cooldown_ms, code)?;
        if !self.cooldown_hours.is_ordered() || self.cooldown_hours.min < 0.0 {
            return Err(ConfigError::range(
                "cooldown_hours",
                self.cooldown_hours.min,
                self.cooldown_hours.max,
                code,
            ));
        }
        if let Some(duration) = self.duration_ms {
            check_ms_span("duration_ms", duration, code)?;
        }

        if !self.light_level.is_ordered() || self.light_level.max > AiSettings::MAX_LIGHT_LEVEL {
            return Err(ConfigError::range(
                "light_level",
                f64::from(self.light_level.min),
                f64::from(self.light_level.max),
                code,
            ));
        }
        if let Some(temperature) = self.temperature {
            if !temperature.is_ordered() {
                return Err(ConfigError::range(
                    "temperature",
                    f64::from(temperature.min),
                    f64::from(temperature.max),
                    code,
                ));
            }
        }
        for frame in &self.day_time_frames {
            let in_day =
                (0.0..=24.0).contains(&frame.from_hour) && (0.0..=24.0).contains(&frame.to_hour);
            if frame.from_hour > frame.to_hour || !in_day {
                return Err(ConfigError::range(
                    "day_time_frames",
                    f64::from(frame.from_hour),
                    f64::from(frame.to_hour),
                    code,
                ));
            }
        }
        if !(self.day_time_jitter_hours >= 0.0) {
            return Err(ConfigError::value(
                "day_time_jitter_hours",
                "must be non-negative",
                code,
            ));
        }

        if let Some(sound) = &self.sound {
            check_probability("sound.chance", sound.chance, code)?;
            if !(sound.range > 0.0) || !(sound.volume >= 0.0) {
                return Err(ConfigError::value(
                    "sound",
                    "range must be positive and volume non-negative",
                    code,
                ));
            }
        }
        if let Some(animation) = &self.animation {
            if animation.code.is_empty() {
                return Err(ConfigError::value("animation.code", "must not be empty", code));
            }
        }

        Ok(TaskConfig {
            code: self.code,
            id: self.id,
            slot: self.slot,
            priority: self.priority,
            priority_for_cancel,
            execution_chance: self.execution_chance,
            initial_cooldown_ms: self.initial_cooldown_ms,
            cooldown_ms: self.cooldown_ms,
            cooldown_hours: self.cooldown_hours,
            duration_ms: self.duration_ms,
            when_in_emotion_state: self.when_in_emotion_state,
            when_not_in_emotion_state: self.when_not_in_emotion_state,
            when_swimming: self.when_swimming,
            when_feet_in_liquid: self.when_feet_in_liquid,
            day_time_frames: self.day_time_frames,
            day_time_jitter_hours: self.day_time_jitter_hours,
            light_level: self.light_level,
            temperature: self.temperature,
            skip_if_recently_attacked: self.skip_if_recently_attacked,
            recently_attacked_window_ms: self.recently_attacked_window_ms,
            animation: self.animation,
            sound: self.sound,
            tags: self.tags,
        })
    }
}

fn check_probability(field: &'static str, value: f32, task: &str) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::value(
            field,
            format!("must be within [0, 1], got {value}"),
            task,
        ))
    }
}

fn check_ms_span(field: &'static str, span: Span<u64>, task: &str) -> Result<(), ConfigError> {
    if span.is_ordered() {
        Ok(())
    } else {
        Err(ConfigError::range(field, span.min as f64, span.max as f64, task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_priority_defaults_to_priority() {
        let config = TaskConfig::builder("wander").priority(1.5).build().unwrap();
        assert_eq!(config.priority_for_cancel, 1.5);

        let config = TaskConfig::builder("wander")
            .priority(1.5)
            .priority_for_cancel(3.0)
            .build()
            .unwrap();
        assert_eq!(config.priority_for_cancel, 3.0);
    }

    #[test]
    fn rejects_inverted_light_range() {
        let err = TaskConfig::builder("sleep").light_level(20, 4).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { field: "light_level", .. }));
    }

    #[test]
    fn rejects_decreasing_day_time_frame() {
        let err = TaskConfig::builder("sleep")
            .day_time_frame(20.0, 6.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { field: "day_time_frames", .. }));
    }

    #[test]
    fn rejects_slot_outside_table() {
        let err = TaskConfig::builder("idle")
            .slot(AiSettings::SLOT_COUNT)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSlot { .. }));
    }

    #[test]
    fn rejects_inverted_cooldown_and_bad_chance() {
        assert!(TaskConfig::builder("idle").cooldown_ms(500, 100).build().is_err());
        assert!(TaskConfig::builder("idle").cooldown_hours(2.0, 1.0).build().is_err());
        assert!(TaskConfig::builder("idle").execution_chance(1.5).build().is_err());
    }

    #[test]
    fn span_contains_is_inclusive() {
        let span = Span::new(2u8, 5u8);
        assert!(span.contains(2));
        assert!(span.contains(5));
        assert!(!span.contains(6));
    }
}
