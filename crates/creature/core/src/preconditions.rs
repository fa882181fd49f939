//! The ordered precondition pipeline shared by every task.
//!
//! Stages run in a fixed order and stop at the first failure:
//!
//! 1. execution chance
//! 2. cooldown (millisecond and in-game hour deadlines)
//! 3. entity state (swimming, feet in liquid)
//! 4. emotion state allow and deny lists
//! 5. light level at the owner
//! 6. day-time frames, with a jitter rolled once per evaluation
//! 7. temperature at the owner
//! 8. recently attacked
//!
//! Each stage is a pure predicate exposed on its own so tasks can reuse a
//! single check. [`evaluate`] is the only function that consumes randomness.
use bitflags::bitflags;

use crate::env::{EmotionOracle, TaskRng};
use crate::task::{Cooldown, DayTimeFrame, Span, TaskConfig, TaskContext};
use crate::types::{AttackRecord, EntityFlags, WorldTime};

bitflags! {
    /// Selection of pipeline stages to run.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Stages: u16 {
        const CHANCE            = 1 << 0;
        const COOLDOWN          = 1 << 1;
        const ENTITY_STATE      = 1 << 2;
        const EMOTION           = 1 << 3;
        const LIGHT             = 1 << 4;
        const DAY_TIME          = 1 << 5;
        const TEMPERATURE       = 1 << 6;
        const RECENTLY_ATTACKED = 1 << 7;
    }
}

/// The gate that rejected a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PreconditionFailure {
    ExecutionChance,
    Cooldown,
    EntityState,
    EmotionState,
    LightLevel,
    DayTime,
    Temperature,
    RecentlyAttacked,
    /// The owning entity no longer resolves.
    OwnerMissing,
}

/// Runs the selected stages for `config` in pipeline order.
///
/// # Errors
///
/// Returns the first stage that failed.
pub fn evaluate(
    config: &TaskConfig,
    cooldown: &Cooldown,
    ctx: &mut TaskContext<'_, '_>,
    stages: Stages,
) -> Result<(), PreconditionFailure> {
    if stages.contains(Stages::CHANCE) && !check_chance(config.execution_chance, ctx.rng()) {
        return Err(PreconditionFailure::ExecutionChance);
    }
    let time = *ctx.time();
    if stages.contains(Stages::COOLDOWN) && !check_cooldown(cooldown, &time) {
        return Err(PreconditionFailure::Cooldown);
    }

    let owner = ctx.owner_view().ok_or(PreconditionFailure::OwnerMissing)?;

    if stages.contains(Stages::ENTITY_STATE) && !check_entity_state(config, owner.flags) {
        return Err(PreconditionFailure::EntityState);
    }
    if stages.contains(Stages::EMOTION) && !check_emotions(config, ctx.emotions()) {
        return Err(PreconditionFailure::EmotionState);
    }
    if stages.contains(Stages::LIGHT) && config.light_level != full_light_range() {
        let level = ctx.environment().light_level(owner.position);
        if !check_light(config.light_level, level) {
            return Err(PreconditionFailure::LightLevel);
        }
    }
    if stages.contains(Stages::DAY_TIME) && !config.day_time_frames.is_empty() {
        let jitter = ctx.rng().jitter(config.day_time_jitter_hours);
        if !check_day_time(&config.day_time_frames, time.hour_of_day(), jitter) {
            return Err(PreconditionFailure::DayTime);
        }
    }
    if stages.contains(Stages::TEMPERATURE) {
        if let Some(range) = config.temperature {
            let temperature = ctx.environment().temperature(owner.position);
            if !check_temperature(Some(range), temperature) {
                return Err(PreconditionFailure::Temperature);
            }
        }
    }
    if stages.contains(Stages::RECENTLY_ATTACKED)
        && config.skip_if_recently_attacked
        && was_recently_attacked(
            owner.last_attack,
            config.recently_attacked_window_ms,
            time.elapsed_ms,
        )
    {
        return Err(PreconditionFailure::RecentlyAttacked);
    }

    Ok(())
}

fn full_light_range() -> Span<u8> {
    Span::new(0, crate::AiSettings::MAX_LIGHT_LEVEL)
}

pub fn check_chance(probability: f32, rng: &mut TaskRng) -> bool {
    rng.chance(probability)
}

pub fn check_cooldown(cooldown: &Cooldown, time: &WorldTime) -> bool {
    cooldown.is_ready(time)
}

pub fn check_entity_state(config: &TaskConfig, flags: EntityFlags) -> bool {
    let swimming_ok = config
        .when_swimming
        .is_none_or(|required| flags.contains(EntityFlags::SWIMMING) == required);
    let liquid_ok = config
        .when_feet_in_liquid
        .is_none_or(|required| flags.contains(EntityFlags::FEET_IN_LIQUID) == required);
    swimming_ok && liquid_ok
}

pub fn check_emotions(config: &TaskConfig, emotions: &dyn EmotionOracle) -> bool {
    let allowed = config.when_in_emotion_state.is_empty()
        || config
            .when_in_emotion_state
            .iter()
            .any(|state| emotions.is_in_state(state));
    allowed
        && !config
            .when_not_in_emotion_state
            .iter()
            .any(|state| emotions.is_in_state(state))
}

pub fn check_light(range: Span<u8>, level: u8) -> bool {
    range.contains(level)
}

/// `hour` is on the 24 hour virtual clock; `jitter` is added before
/// matching. Passes when no frames are configured.
pub fn check_day_time(frames: &[DayTimeFrame], hour: f32, jitter: f32) -> bool {
    if frames.is_empty() {
        return true;
    }
    let hour = hour + jitter;
    frames.iter().any(|frame| frame.matches(hour))
}

pub fn check_temperature(range: Option<Span<f32>>, temperature: f32) -> bool {
    range.is_none_or(|range| range.contains(temperature))
}

/// Whether the last attack happened within `window_ms` of `now_ms`.
pub fn was_recently_attacked(
    last_attack: Option<AttackRecord>,
    window_ms: u64,
    now_ms: u64,
) -> bool {
    last_attack.is_some_and(|attack| now_ms.saturating_sub(attack.at_ms) < window_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, MockEmotions};
    use crate::types::{EntityId, EntityView, Vec3};

    fn owner() -> EntityId {
        EntityId::new(1, 0)
    }

    #[test]
    fn emotion_allow_and_deny_lists() {
        let config = TaskConfig::builder("flee")
            .when_in_emotion_state("fleeondamage")
            .when_in_emotion_state("alarmherdondamage")
            .when_not_in_emotion_state("saturated")
            .build()
            .unwrap();

        let mut emotions = MockEmotions::default();
        assert!(!check_emotions(&config, &emotions));
        emotions.active.insert("alarmherdondamage".into());
        assert!(check_emotions(&config, &emotions));
        emotions.active.insert("saturated".into());
        assert!(!check_emotions(&config, &emotions));
    }

    #[test]
    fn entity_state_must_equal_when_set() {
        let config = TaskConfig::builder("swim").when_swimming(true).build().unwrap();
        assert!(check_entity_state(&config, EntityFlags::SWIMMING));
        assert!(!check_entity_state(&config, EntityFlags::ON_GROUND));

        let unconstrained = TaskConfig::builder("walk").build().unwrap();
        assert!(check_entity_state(&unconstrained, EntityFlags::SWIMMING));
    }

    #[test]
    fn day_time_with_jitter() {
        let frames = [DayTimeFrame::new(6.0, 10.0), DayTimeFrame::new(18.0, 20.0)];
        assert!(check_day_time(&frames, 6.0, 0.0));
        assert!(check_day_time(&frames, 10.0, 0.0));
        assert!(!check_day_time(&frames, 12.0, 0.0));
        assert!(check_day_time(&frames, 5.9, 0.15));
        assert!(!check_day_time(&frames, 5.9, -0.1));
        assert!(check_day_time(&[], 3.0, 0.0));
    }

    #[test]
    fn light_and_temperature_ranges_are_inclusive() {
        assert!(check_light(Span::new(0, 7), 7));
        assert!(!check_light(Span::new(0, 7), 8));
        assert!(check_temperature(None, -40.0));
        assert!(check_temperature(Some(Span::new(-5.0, 30.0)), 30.0));
        assert!(!check_temperature(Some(Span::new(-5.0, 30.0)), 31.0));
    }

    #[test]
    fn recently_attacked_window() {
        let attack = Some(AttackRecord {
            source: EntityId::new(9, 0),
            at_ms: 1_000,
        });
        assert!(was_recently_attacked(attack, 5_000, 5_999));
        assert!(!was_recently_attacked(attack, 5_000, 6_000));
        assert!(!was_recently_attacked(None, 5_000, 0));
    }

    #[test]
    fn pipeline_reports_first_failing_stage() {
        let config = TaskConfig::builder("sleep")
            .light_level(0, 4)
            .temperature(0.0, 10.0)
            .build()
            .unwrap();
        let cooldown = Cooldown::default();
        let mut harness = Harness::new(owner());
        harness.world.insert(EntityView::new(owner(), "hare", Vec3::ZERO));
        harness.world.light = 12;
        harness.world.temperature = 25.0;

        let result = harness.with_ctx(0, |ctx| evaluate(&config, &cooldown, ctx, Stages::all()));
        assert_eq!(result, Err(PreconditionFailure::LightLevel));

        let result = harness.with_ctx(0, |ctx| {
            evaluate(&config, &cooldown, ctx, Stages::all() - Stages::LIGHT)
        });
        assert_eq!(result, Err(PreconditionFailure::Temperature));

        harness.world.light = 2;
        harness.world.temperature = 5.0;
        let result = harness.with_ctx(0, |ctx| evaluate(&config, &cooldown, ctx, Stages::all()));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn missing_owner_fails_after_cooldown() {
        let config = TaskConfig::builder("idle").build().unwrap();
        let mut harness = Harness::new(owner());
        let result = harness.with_ctx(0, |ctx| {
            evaluate(&config, &Cooldown::default(), ctx, Stages::all())
        });
        assert_eq!(result, Err(PreconditionFailure::OwnerMissing));
    }
}
