use tracing::debug;

use crate::env::{MoveRequest, PathStatus};
use crate::error::ConfigError;
use crate::targeting::{Targeting, TargetingConfig};
use crate::task::{AiTask, Span, TargetingTask, TaskBase, TaskConfig, TaskContext};
use crate::types::{EntityView, Vec3};

use super::check_positive;

#[derive(Clone, Debug, PartialEq)]
pub struct StayInRangeSettings {
    /// Distance band to keep from the target.
    pub range: Span<f32>,
    pub speed: f32,
}

impl StayInRangeSettings {
    pub fn new(range: Span<f32>) -> Self {
        Self { range, speed: 2.5 }
    }
}

/// Keeps a target at a distance inside a band, backing off when it comes
/// too close and closing in when it gets too far. Ends once the band is
/// reached. Ranged tasks use it as the fallback after an abort.
#[derive(Debug)]
pub struct StayInRangeTask {
    base: TaskBase,
    targeting: Targeting,
    settings: StayInRangeSettings,
}

enum Adjustment {
    Hold,
    Move(Vec3),
}

impl StayInRangeTask {
    /// # Errors
    ///
    /// The band must be ordered and non-negative and the speed positive.
    pub fn new(
        config: TaskConfig,
        targeting: TargetingConfig,
        settings: StayInRangeSettings,
    ) -> Result<Self, ConfigError> {
        let range = settings.range;
        if !(range.min >= 0.0 && range.max > 0.0 && range.is_ordered()) {
            return Err(ConfigError::range(
                "range",
                f64::from(range.min),
                f64::from(range.max),
                &config.code,
            ));
        }
        check_positive("speed", settings.speed, &config.code)?;
        Ok(Self {
            base: TaskBase::new(config),
            targeting: Targeting::new(targeting),
            settings,
        })
    }

    fn adjustment(&self, owner: &EntityView, target: &EntityView) -> Adjustment {
        let distance = owner.position.horizontal_distance(target.position);
        let band = self.settings.range;
        if band.contains(distance) {
            return Adjustment::Hold;
        }
        let mut outward = owner.position - target.position;
        outward.y = 0.0;
        let outward = match outward.normalize() {
            direction if direction == Vec3::ZERO => Vec3::new(1.0, 0.0, 0.0),
            direction => direction,
        };
        let desired = (band.min + band.max) / 2.0;
        Adjustment::Move(target.position + outward * desired)
    }
}

impl AiTask for StayInRangeTask {
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
            (Some(owner), Some(target)) => {
                matches!(self.adjustment(owner, target), Adjustment::Move(_))
            }
            _ => false,
        }
    }

    fn continue_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _dt: f32) -> bool {
        if !self.base.update(ctx) {
            return false;
        }
        let adjustment = {
            let view = ctx.sensing();
            let (Some(owner), Some(target)) = (ctx.owner_view(), self.targeting.resolve(&view))
            else {
                debug!(
                    entity = %ctx.owner(),
                    task = %self.base.code(),
                    "no target to keep in range"
                );
                return false;
            };
            let range = self.targeting.effective_range(owner);
            if !self.targeting.keeps_target(owner, target, range, &view) {
                return false;
            }
            self.adjustment(owner, target)
        };
        match adjustment {
            Adjustment::Hold => false,
            Adjustment::Move(destination) => match ctx.path_ref().status() {
                PathStatus::Stuck => false,
                PathStatus::Moving => {
                    ctx.path().retarget(destination);
                    true
                }
                PathStatus::ReachedGoal | PathStatus::Idle => ctx
                    .path()
                    .walk_towards(MoveRequest::new(destination, self.settings.speed, 0.5)),
            },
        }
    }

    fn can_continue_execute(&self, ctx: &TaskContext<'_, '_>) -> bool {
        ctx.path_ref().is_ready()
    }

    fn finish_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _cancelled: bool) {
        if ctx.path_ref().is_active() {
            ctx.path().stop();
        }
        self.base.finish(ctx);
    }

    fn as_targeting(&self) -> Option<&dyn TargetingTask> {
        Some(self)
    }

    fn as_targeting_mut(&mut self) -> Option<&mut dyn TargetingTask> {
        Some(self)
    }
}

impl TargetingTask for StayInRangeTask {
    fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    fn targeting_mut(&mut self) -> &mut Targeting {
        &mut self.targeting
    }
}
