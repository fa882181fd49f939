use tracing::warn;

use crate::env::{MoveRequest, PathStatus};
use crate::error::ConfigError;
use crate::targeting::{Targeting, TargetingConfig};
use crate::task::{AiTask, TargetingTask, TaskBase, TaskConfig, TaskContext};
use crate::types::{EntityView, NotifyData, Vec3};

use super::{NOTIFY_FLEE_ENTITY, alert_herd, check_positive};

#[derive(Clone, Debug, PartialEq)]
pub struct FleeSettings {
    /// Distance from the threat at which the entity feels safe.
    pub flee_distance: f32,
    pub speed: f32,
    /// Herd members within this range are told to flee too.
    pub alarm_range: Option<f32>,
}

impl Default for FleeSettings {
    fn default() -> Self {
        Self {
            flee_distance: 24.0,
            speed: 4.0,
            alarm_range: None,
        }
    }
}

/// Runs directly away from a threat until out of reach.
#[derive(Debug)]
pub struct FleeEntityTask {
    base: TaskBase,
    targeting: Targeting,
    settings: FleeSettings,
}

impl FleeEntityTask {
    /// # Errors
    ///
    /// Flee distance, speed and alarm range must be positive.
    pub fn new(
        config: TaskConfig,
        targeting: TargetingConfig,
        settings: FleeSettings,
    ) -> Result<Self, ConfigError> {
        check_positive("flee_distance", settings.flee_distance, &config.code)?;
        check_positive("speed", settings.speed, &config.code)?;
        if let Some(range) = settings.alarm_range {
            check_positive("alarm_range", range, &config.code)?;
        }
        Ok(Self {
            base: TaskBase::new(config),
            targeting: Targeting::new(targeting),
            settings,
        })
    }

    /// Point `flee_distance` away from the threat on the far side of the
    /// owner.
    fn escape_point(&self, owner: &EntityView, threat: &EntityView) -> Vec3 {
        let mut away = owner.position - threat.position;
        away.y = 0.0;
        let away = match away.normalize() {
            direction if direction == Vec3::ZERO => Vec3::new(1.0, 0.0, 0.0),
            direction => direction,
        };
        owner.position + away * self.settings.flee_distance
    }

    fn run(&self, ctx: &mut TaskContext<'_, '_>) -> bool {
        let (Some(owner), Some(threat)) = (ctx.owner_view(), self.targeting.resolve(&ctx.sensing()))
        else {
            return false;
        };
        let destination = self.escape_point(owner, threat);
        ctx.path()
            .walk_towards(MoveRequest::new(destination, self.settings.speed, 1.0))
    }
}

impl AiTask for FleeEntityTask {
    fn base(&self) -> &TaskBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TaskBase {
        &mut self.base
    }

    fn should_execute(&mut self, ctx: &mut TaskContext<'_, '_>) -> bool {
        self.base.should_start(ctx) && self.targeting.acquire(ctx).is_some()
    }

    fn start_execute(&mut self, ctx: &mut TaskContext<'_, '_>) {
        self.base.start(ctx);
        if !self.run(ctx) {
            return;
        }
        if let (Some(range), Some(threat)) = (self.settings.alarm_range, self.targeting.target()) {
            alert_herd(ctx, range, NOTIFY_FLEE_ENTITY, &NotifyData::Entity(threat));
        }
    }

    fn continue_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _dt: f32) -> bool {
        if !self.base.update(ctx) {
            return false;
        }
        let distance = {
            let view = ctx.sensing();
            match (ctx.owner_view(), self.targeting.resolve(&view)) {
                (Some(owner), Some(threat)) => owner.position.distance(threat.position),
                _ => {
                    warn!(entity = %ctx.owner(), task = %self.base.code(), "flee target vanished");
                    return false;
                }
            }
        };
        if distance >= self.settings.flee_distance {
            return false;
        }
        match ctx.path_ref().status() {
            PathStatus::Moving => true,
            PathStatus::Stuck => false,
            // Arrived but the threat followed; pick a new escape point.
            PathStatus::ReachedGoal | PathStatus::Idle => self.run(ctx),
        }
    }

    fn can_continue_execute(&self, ctx: &TaskContext<'_, '_>) -> bool {
        ctx.path_ref().is_ready()
    }

    fn finish_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _cancelled: bool) {
        if ctx.path_ref().is_active() {
            ctx.path().stop();
        }
        self.targeting.clear_target();
        self.base.finish(ctx);
    }

    fn notify(&mut self, key: &str, data: &NotifyData) -> bool {
        if key != NOTIFY_FLEE_ENTITY || self.base.is_active() {
            return false;
        }
        let Some(threat) = data.entity() else {
            return false;
        };
        self.targeting.set_target(Some(threat));
        true
    }

    fn as_targeting(&self) -> Option<&dyn TargetingTask> {
        Some(self)
    }

    fn as_targeting_mut(&mut self) -> Option<&mut dyn TargetingTask> {
        Some(self)
    }
}

impl TargetingTask for FleeEntityTask {
    fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    fn targeting_mut(&mut self) -> &mut Targeting {
        &mut self.targeting
    }
}
