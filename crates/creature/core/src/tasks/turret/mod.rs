//! Ranged attack driven by the turret-mode state machine.
//!
//! The task only gathers inputs and applies side effects; every decision is
//! made by the pure [`next_transition`]. Inputs are re-evaluated on each
//! tick and whenever the owner reports a stopped animation, so a late or
//! early animation event never leaves the machine stuck.
mod fsm;

pub use fsm::{
    ANIM_FIRE, ANIM_HOLD, ANIM_LOAD, ANIM_LOAD_FROM_POSE, ANIM_RELOAD, ANIM_TURRET, ANIM_UNLOAD,
    HOLD_BEFORE_FIRE_SECS, HOLD_LIMIT_SECS, RangeBand, STATE_TIMEOUT_SECS, TargetStatus,
    Transition, TurretInputs, TurretState, next_transition,
};

use tracing::{debug, warn};

use crate::env::{AnimationRequest, ProjectileSpec};
use crate::error::{AiError, ConfigError, ErrorContext};
use crate::targeting::{Targeting, TargetingConfig};
use crate::task::{
    AiTask, ManagerCommand, Span, TargetingTask, TaskBase, TaskConfig, TaskContext, TaskDirectory,
};
use crate::types::{EntityView, Vec3};

use super::check_positive;

/// Projectile launched on each shot.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSettings {
    /// Entity code of the projectile, e.g. `thrownstone`.
    pub code: String,
    pub damage: f32,
    /// Launch speed in blocks per second.
    pub speed: f32,
    /// Maximum random deviation per axis of the unit aim vector.
    pub dispersion: f32,
}

impl ProjectileSettings {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            damage: 1.0,
            speed: 20.0,
            dispersion: 0.05,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TurretSettings {
    /// Distances at which the turret loads and fires.
    pub firing_range: Span<f32>,
    /// Closer than this the turret gives up and hands over to the fallback.
    pub abort_range: f32,
    pub projectile: ProjectileSettings,
    /// Targeting task of the same entity that takes over on abort.
    pub fallback_task: String,
}

impl TurretSettings {
    pub const DEFAULT_FALLBACK: &'static str = "stayinrange";

    pub fn new(firing_range: Span<f32>, abort_range: f32, projectile: ProjectileSettings) -> Self {
        Self {
            firing_range,
            abort_range,
            projectile,
            fallback_task: Self::DEFAULT_FALLBACK.to_owned(),
        }
    }

    pub fn with_fallback(mut self, code: impl Into<String>) -> Self {
        self.fallback_task = code.into();
        self
    }

    fn validate(&self, task: &str) -> Result<(), ConfigError> {
        let firing = self.firing_range;
        if !(firing.min >= 0.0 && firing.is_ordered() && firing.max.is_finite()) {
            return Err(ConfigError::range(
                "firing_range",
                f64::from(firing.min),
                f64::from(firing.max),
                task,
            ));
        }
        if !(self.abort_range >= 0.0 && self.abort_range < firing.max) {
            return Err(ConfigError::value(
                "abort_range",
                format!(
                    "must lie in [0, {}), got {}",
                    firing.max, self.abort_range
                ),
                task,
            ));
        }
        check_positive("projectile.speed", self.projectile.speed, task)?;
        if !(self.projectile.damage >= 0.0 && self.projectile.dispersion >= 0.0) {
            return Err(ConfigError::value(
                "projectile",
                "damage and dispersion must not be negative",
                task,
            ));
        }
        if self.projectile.code.is_empty() {
            return Err(ConfigError::MissingField {
                field: "projectile.code",
                context: ErrorContext::task(task),
            });
        }
        if self.fallback_task.is_empty() {
            return Err(ConfigError::MissingField {
                field: "fallback_task",
                context: ErrorContext::task(task),
            });
        }
        Ok(())
    }
}

/// Throws projectiles at a target from a distance.
#[derive(Debug)]
pub struct TurretModeTask {
    base: TaskBase,
    targeting: Targeting,
    settings: TurretSettings,
    state: TurretState,
    state_entered_ms: u64,
    animation: Option<&'static str>,
    animation_finished: bool,
}

impl TurretModeTask {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the ranges or the projectile are invalid.
    pub fn new(
        config: TaskConfig,
        targeting: TargetingConfig,
        settings: TurretSettings,
    ) -> Result<Self, ConfigError> {
        settings.validate(&config.code)?;
        Ok(Self {
            base: TaskBase::new(config),
            targeting: Targeting::new(targeting),
            settings,
            state: TurretState::Idle,
            state_entered_ms: 0,
            animation: None,
            animation_finished: false,
        })
    }

    pub fn state(&self) -> TurretState {
        self.state
    }

    pub fn settings(&self) -> &TurretSettings {
        &self.settings
    }

    fn band(&self, owner: &EntityView, target: Option<&EntityView>) -> RangeBand {
        let Some(target) = target else {
            return RangeBand::Outside;
        };
        RangeBand::classify(
            owner.position.distance(target.position),
            self.settings.abort_range,
            self.settings.firing_range.min,
            self.settings.firing_range.max,
            self.targeting.effective_range(owner),
        )
    }

    fn inputs(&self, ctx: &TaskContext<'_, '_>, owner: &EntityView) -> TurretInputs {
        let view = ctx.sensing();
        let target = self.targeting.resolve(&view);
        let range = self.targeting.effective_range(owner);
        let valid = target.is_some_and(|target| {
            self.targeting.keeps_target(owner, target, range, &view)
                && self.targeting.has_direct_contact(owner, target, &view)
        });
        let animation_done = self.animation_finished
            || self
                .animation
                .is_none_or(|code| !ctx.animations_ref().is_running(code));

        TurretInputs {
            elapsed_secs: ctx.now_ms().saturating_sub(self.state_entered_ms) as f32 / 1000.0,
            target: if valid {
                TargetStatus::Valid
            } else {
                TargetStatus::Lost
            },
            band: self.band(owner, target),
            animation_done,
        }
    }

    /// Evaluates one transition and applies it.
    fn step(&mut self, ctx: &mut TaskContext<'_, '_>) {
        if self.state == TurretState::Stop {
            return;
        }
        let Some(owner) = ctx.owner_view() else {
            self.state = TurretState::Stop;
            return;
        };
        let inputs = self.inputs(ctx, owner);
        match next_transition(self.state, &inputs) {
            Transition::Stay => {}
            Transition::Enter { state, animation } => self.enter(ctx, state, animation),
            Transition::Fire => {
                if self.fire(ctx, owner) {
                    self.enter(ctx, TurretState::TurretModeFired, Some(ANIM_FIRE));
                } else {
                    self.enter(ctx, TurretState::Stop, None);
                }
            }
            Transition::Abort => self.abort(ctx),
        }
    }

    fn enter(
        &mut self,
        ctx: &mut TaskContext<'_, '_>,
        state: TurretState,
        animation: Option<&'static str>,
    ) {
        debug!(
            entity = %ctx.owner(),
            task = %self.base.code(),
            from = <&'static str>::from(self.state),
            state = <&'static str>::from(state),
            "turret transition"
        );
        if let Some(previous) = self.animation.take() {
            ctx.animations().stop(previous);
        }
        if let Some(code) = animation {
            ctx.animations().start(AnimationRequest::new(code));
        }
        self.animation = animation;
        self.animation_finished = false;
        self.state = state;
        self.state_entered_ms = ctx.now_ms();
    }

    /// Launches a projectile at the target. Returns `false` when no shot
    /// could be made.
    fn fire(&mut self, ctx: &mut TaskContext<'_, '_>, owner: &EntityView) -> bool {
        let Some((target_id, target_eye)) = self
            .targeting
            .resolve(&ctx.sensing())
            .map(|target| (target.id, target.eye_position()))
        else {
            return false;
        };
        let origin = owner.eye_position();
        let aim = (target_eye - origin).normalize();
        let spread = self.settings.projectile.dispersion * 2.0;
        let deviation = Vec3::new(
            ctx.rng().jitter(spread),
            ctx.rng().jitter(spread),
            ctx.rng().jitter(spread),
        );
        let projectile = ProjectileSpec {
            code: self.settings.projectile.code.clone(),
            shooter: owner.id,
            origin,
            velocity: (aim + deviation).normalize() * self.settings.projectile.speed,
            damage: self.settings.projectile.damage,
        };
        match ctx.commands().spawn_projectile(projectile) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    entity = %ctx.owner(),
                    task = %self.base.code(),
                    target = %target_id,
                    code = err.error_code(),
                    "turret could not fire: {err}"
                );
                false
            }
        }
    }

    fn abort(&mut self, ctx: &mut TaskContext<'_, '_>) {
        let target = self.targeting.target();
        debug!(
            entity = %ctx.owner(),
            task = %self.base.code(),
            state = <&'static str>::from(self.state),
            fallback = %self.settings.fallback_task,
            "turret aborted"
        );
        ctx.request(ManagerCommand::StartTask {
            code: self.settings.fallback_task.clone(),
            target,
        });
        self.enter(ctx, TurretState::Stop, None);
    }
}

impl AiTask for TurretModeTask {
    fn base(&self) -> &TaskBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TaskBase {
        &mut self.base
    }

    fn after_initialize(&mut self, directory: &TaskDirectory) -> Result<(), ConfigError> {
        let fallback = &self.settings.fallback_task;
        if !directory.contains(fallback) {
            return Err(ConfigError::MissingDependency {
                required: fallback.clone(),
                context: ErrorContext::task(self.base.code()),
            });
        }
        if !directory.is_targeting(fallback) {
            return Err(ConfigError::value(
                "fallback_task",
                format!("task '{fallback}' does not accept a target"),
                self.base.code(),
            ));
        }
        Ok(())
    }

    fn should_execute(&mut self, ctx: &mut TaskContext<'_, '_>) -> bool {
        if !self.base.should_start(ctx) {
            return false;
        }
        if self.targeting.acquire(ctx).is_none() {
            return false;
        }
        let Some(owner) = ctx.owner_view() else {
            return false;
        };
        let target = self.targeting.resolve(&ctx.sensing());
        !matches!(self.band(owner, target), RangeBand::Abort | RangeBand::Outside)
    }

    fn start_execute(&mut self, ctx: &mut TaskContext<'_, '_>) {
        self.base.start(ctx);
        self.state = TurretState::Idle;
        self.state_entered_ms = ctx.now_ms();
        self.animation = None;
        self.animation_finished = false;
        self.step(ctx);
    }

    fn continue_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _dt: f32) -> bool {
        if !self.base.update(ctx) {
            return false;
        }
        self.step(ctx);
        self.state != TurretState::Stop
    }

    fn finish_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _cancelled: bool) {
        if let Some(code) = self.animation.take() {
            ctx.animations().stop(code);
        }
        self.state = TurretState::Idle;
        self.animation_finished = false;
        self.base.finish(ctx);
    }

    fn on_animation_stopped(&mut self, ctx: &mut TaskContext<'_, '_>, code: &str) {
        if !self.base.is_active() || self.animation != Some(code) {
            return;
        }
        self.animation_finished = true;
        self.step(ctx);
    }

    fn as_targeting(&self) -> Option<&dyn TargetingTask> {
        Some(self)
    }

    fn as_targeting_mut(&mut self) -> Option<&mut dyn TargetingTask> {
        Some(self)
    }
}

impl TargetingTask for TurretModeTask {
    fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    fn targeting_mut(&mut self) -> &mut Targeting {
        &mut self.targeting
    }
}
