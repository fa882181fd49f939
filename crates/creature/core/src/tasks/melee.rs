use tracing::{debug, warn};

use crate::env::DamageRequest;
use crate::error::{AiError, ConfigError};
use crate::targeting::{Targeting, TargetingConfig};
use crate::task::{AiTask, TargetingTask, TaskBase, TaskConfig, TaskContext};
use crate::types::EntityView;

use super::check_positive;

#[derive(Clone, Debug, PartialEq)]
pub struct MeleeSettings {
    pub damage: f32,
    /// Reach, measured between entity positions.
    pub attack_range: f32,
    /// Length of one attack.
    pub attack_duration_ms: u64,
    /// Offset into the attack at which the hit lands.
    pub damage_at_ms: u64,
}

impl Default for MeleeSettings {
    fn default() -> Self {
        Self {
            damage: 2.0,
            attack_range: 2.0,
            attack_duration_ms: 1500,
            damage_at_ms: 500,
        }
    }
}

/// Strikes a target within reach once per run.
///
/// With retaliation enabled in its targeting configuration, a recent
/// attacker is preferred over the nearest candidate.
#[derive(Debug)]
pub struct MeleeAttackTask {
    base: TaskBase,
    targeting: Targeting,
    settings: MeleeSettings,
    damage_dealt: bool,
}

impl MeleeAttackTask {
    /// # Errors
    ///
    /// Damage must not be negative, reach must be positive and the hit must
    /// land within the attack.
    pub fn new(
        config: TaskConfig,
        targeting: TargetingConfig,
        settings: MeleeSettings,
    ) -> Result<Self, ConfigError> {
        check_positive("attack_range", settings.attack_range, &config.code)?;
        if !(settings.damage >= 0.0 && settings.damage.is_finite()) {
            return Err(ConfigError::value(
                "damage",
                format!("must not be negative, got {}", settings.damage),
                &config.code,
            ));
        }
        if settings.damage_at_ms > settings.attack_duration_ms {
            return Err(ConfigError::range(
                "damage_at_ms",
                settings.damage_at_ms as f64,
                settings.attack_duration_ms as f64,
                &config.code,
            ));
        }
        Ok(Self {
            base: TaskBase::new(config),
            targeting: Targeting::new(targeting),
            settings,
            damage_dealt: false,
        })
    }

    pub fn damage_dealt(&self) -> bool {
        self.damage_dealt
    }

    fn in_reach(&self, owner: &EntityView, target: &EntityView, ctx: &TaskContext<'_, '_>) -> bool {
        owner.position.distance(target.position) <= self.settings.attack_range
            && self
                .targeting
                .has_direct_contact(owner, target, &ctx.sensing())
    }

    fn strike(&mut self, ctx: &mut TaskContext<'_, '_>) {
        let hit = {
            let view = ctx.sensing();
            match (ctx.owner_view(), self.targeting.resolve(&view)) {
                (Some(owner), Some(target)) => {
                    (target.alive && self.in_reach(owner, target, ctx)).then_some(target.id)
                }
                _ => None,
            }
        };
        self.damage_dealt = true;
        let Some(target) = hit else {
            debug!(entity = %ctx.owner(), task = %self.base.code(), "attack missed");
            return;
        };
        let request = DamageRequest {
            source: ctx.owner(),
            target,
            amount: self.settings.damage,
        };
        if let Err(err) = ctx.commands().apply_damage(request) {
            warn!(
                entity = %ctx.owner(),
                task = %self.base.code(),
                %target,
                code = err.error_code(),
                "damage not applied: {err}"
            );
        }
    }
}

impl AiTask for MeleeAttackTask {
    fn base(&self) -> &TaskBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TaskBase {
        &mut self.base
    }

    fn should_execute(&mut self, ctx: &mut TaskContext<'_, '_>) -> bool {
        if !self.base.should_start(ctx) || self.targeting.acquire(ctx).is_none() {
            return false;
        }
        let view = ctx.sensing();
        match (ctx.owner_view(), self.targeting.resolve(&view)) {
            (Some(owner), Some(target)) => self.in_reach(owner, target, ctx),
            _ => false,
        }
    }

    fn start_execute(&mut self, ctx: &mut TaskContext<'_, '_>) {
        self.base.start(ctx);
        self.damage_dealt = false;
    }

    fn continue_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _dt: f32) -> bool {
        if !self.base.update(ctx) {
            return false;
        }
        let elapsed = ctx.now_ms().saturating_sub(self.base.started_at_ms());
        if !self.damage_dealt && elapsed >= self.settings.damage_at_ms {
            self.strike(ctx);
        }
        elapsed < self.settings.attack_duration_ms
    }

    fn as_targeting(&self) -> Option<&dyn TargetingTask> {
        Some(self)
    }

    fn as_targeting_mut(&mut self) -> Option<&mut dyn TargetingTask> {
        Some(self)
    }
}

impl TargetingTask for MeleeAttackTask {
    fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    fn targeting_mut(&mut self) -> &mut Targeting {
        &mut self.targeting
    }
}
