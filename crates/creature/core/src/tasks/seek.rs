use tracing::{debug, warn};

use crate::env::{MoveRequest, PathStatus};
use crate::error::ConfigError;
use crate::targeting::{Targeting, TargetingConfig};
use crate::task::{AiTask, TargetingTask, TaskBase, TaskConfig, TaskContext};
use crate::types::NotifyData;

use super::{NOTIFY_SEEK_ENTITY, alert_herd, check_positive};

#[derive(Clone, Debug, PartialEq)]
pub struct SeekSettings {
    pub speed: f32,
    /// Distance to the target at which the chase counts as done.
    pub arrive_distance: f32,
    /// Give up when the target gets farther than this. Defaults to 1.5x the
    /// seeking range when unset.
    pub max_follow_range: Option<f32>,
    /// Herd members within this range join the chase.
    pub alarm_range: Option<f32>,
}

impl Default for SeekSettings {
    fn default() -> Self {
        Self {
            speed: 3.0,
            arrive_distance: 1.5,
            max_follow_range: None,
            alarm_range: None,
        }
    }
}

/// Chases a target and recruits nearby herd members.
#[derive(Debug)]
pub struct SeekEntityTask {
    base: TaskBase,
    targeting: Targeting,
    settings: SeekSettings,
}

impl SeekEntityTask {
    /// # Errors
    ///
    /// Speed and the distances must be positive.
    pub fn new(
        config: TaskConfig,
        targeting: TargetingConfig,
        settings: SeekSettings,
    ) -> Result<Self, ConfigError> {
        check_positive("speed", settings.speed, &config.code)?;
        check_positive("arrive_distance", settings.arrive_distance, &config.code)?;
        for (field, range) in [
            ("max_follow_range", settings.max_follow_range),
            ("alarm_range", settings.alarm_range),
        ] {
            if let Some(range) = range {
                check_positive(field, range, &config.code)?;
            }
        }
        Ok(Self {
            base: TaskBase::new(config),
            targeting: Targeting::new(targeting),
            settings,
        })
    }

    fn follow_range(&self) -> f32 {
        self.settings
            .max_follow_range
            .unwrap_or(self.targeting.config().seeking_range * 1.5)
    }
}

impl AiTask for SeekEntityTask {
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
        let Some(position) = self
            .targeting
            .resolve(&ctx.sensing())
            .map(|target| target.position)
        else {
            return;
        };
        ctx.path().walk_towards(MoveRequest::new(
            position,
            self.settings.speed,
            self.settings.arrive_distance,
        ));
        if let (Some(range), Some(target)) = (self.settings.alarm_range, self.targeting.target()) {
            let recruited = alert_herd(ctx, range, NOTIFY_SEEK_ENTITY, &NotifyData::Entity(target));
            debug!(entity = %ctx.owner(), task = %self.base.code(), recruited, "herd alerted");
        }
    }

    fn continue_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _dt: f32) -> bool {
        if !self.base.update(ctx) {
            return false;
        }
        let (target_position, distance, valid) = {
            let view = ctx.sensing();
            let Some(owner) = ctx.owner_view() else {
                return false;
            };
            let Some(target) = self.targeting.resolve(&view) else {
                warn!(entity = %ctx.owner(), task = %self.base.code(), "seek target vanished");
                return false;
            };
            let range = self.follow_range();
            (
                target.position,
                owner.position.distance(target.position),
                self.targeting.keeps_target(owner, target, range, &view),
            )
        };
        if !valid || distance <= self.settings.arrive_distance {
            return false;
        }
        match ctx.path_ref().status() {
            PathStatus::Stuck => false,
            PathStatus::Moving => {
                ctx.path().retarget(target_position);
                true
            }
            PathStatus::ReachedGoal | PathStatus::Idle => ctx.path().walk_towards(MoveRequest::new(
                target_position,
                self.settings.speed,
                self.settings.arrive_distance,
            )),
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

    fn notify(&mut self, key: &str, data: &NotifyData) -> bool {
        if key != NOTIFY_SEEK_ENTITY || self.base.is_active() {
            return false;
        }
        let Some(target) = data.entity() else {
            return false;
        };
        self.targeting.set_target(Some(target));
        true
    }

    fn as_targeting(&self) -> Option<&dyn TargetingTask> {
        Some(self)
    }

    fn as_targeting_mut(&mut self) -> Option<&mut dyn TargetingTask> {
        Some(self)
    }
}

impl TargetingTask for SeekEntityTask {
    fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    fn targeting_mut(&mut self) -> &mut Targeting {
        &mut self.targeting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targeting::HerdFilter;
    use crate::testing::Harness;
    use crate::types::{AttackRecord, EntityId, EntityView, Vec3};

    const OWNER: EntityId = EntityId::new(1, 0);
    const PREY: EntityId = EntityId::new(2, 0);
    const PACKMATE: EntityId = EntityId::new(3, 0);
    const FAR_PACKMATE: EntityId = EntityId::new(4, 0);

    fn seek() -> SeekEntityTask {
        let config = TaskConfig::builder("seekentity").build().unwrap();
        let targeting = TargetingConfig::builder(16.0)
            .herd(HerdFilter::DifferentHerd)
            .build("seekentity")
            .unwrap();
        let settings = SeekSettings {
            alarm_range: Some(10.0),
            ..SeekSettings::default()
        };
        SeekEntityTask::new(config, targeting, settings).unwrap()
    }

    fn harness() -> Harness {
        let mut harness = Harness::new(OWNER);
        harness.world.insert(EntityView::new(OWNER, "wolf-male", Vec3::ZERO).with_herd(3));
        harness.world.insert(EntityView::new(PREY, "sheep", Vec3::new(12.0, 0.0, 0.0)));
        harness.world.insert(
            EntityView::new(PACKMATE, "wolf-female", Vec3::new(0.0, 0.0, 4.0)).with_herd(3),
        );
        harness.world.insert(
            EntityView::new(FAR_PACKMATE, "wolf-female", Vec3::new(0.0, 0.0, 30.0)).with_herd(3),
        );
        harness
    }

    #[test]
    fn chase_recruits_packmates_in_range() {
        let mut harness = harness();
        let mut task = seek();

        assert!(harness.with_ctx(0, |ctx| task.should_execute(ctx)));
        assert_eq!(task.target(), Some(PREY));
        harness.with_ctx(0, |ctx| task.start_execute(ctx));

        assert_eq!(harness.agent.path.target, Some(Vec3::new(12.0, 0.0, 0.0)));
        assert_eq!(
            harness.agent.notifier.sent,
            vec![(PACKMATE, NOTIFY_SEEK_ENTITY.to_owned(), NotifyData::Entity(PREY))]
        );
    }

    #[test]
    fn follows_moving_target_until_close() {
        let mut harness = harness();
        let mut task = seek();
        assert!(harness.with_ctx(0, |ctx| task.should_execute(ctx)));
        harness.with_ctx(0, |ctx| task.start_execute(ctx));

        if let Some(prey) = harness.world.get_mut(PREY) {
            prey.position = Vec3::new(14.0, 0.0, 0.0);
        }
        assert!(harness.with_ctx(100, |ctx| task.continue_execute(ctx, 0.1)));
        assert_eq!(harness.agent.path.target, Some(Vec3::new(14.0, 0.0, 0.0)));

        if let Some(prey) = harness.world.get_mut(PREY) {
            prey.position = Vec3::new(1.0, 0.0, 0.0);
        }
        assert!(!harness.with_ctx(200, |ctx| task.continue_execute(ctx, 0.1)));
    }

    #[test]
    fn gives_up_when_target_despawns() {
        let mut harness = harness();
        let mut task = seek();
        assert!(harness.with_ctx(0, |ctx| task.should_execute(ctx)));
        harness.with_ctx(0, |ctx| task.start_execute(ctx));

        harness.world.remove(PREY);
        assert!(!harness.with_ctx(100, |ctx| task.continue_execute(ctx, 0.1)));
    }

    #[test]
    fn chases_an_attacker_its_filters_would_skip() {
        const BEAR: EntityId = EntityId::new(7, 0);
        let mut harness = Harness::new(OWNER);
        let mut owner = EntityView::new(OWNER, "wolf-male", Vec3::ZERO);
        owner.last_attack = Some(AttackRecord {
            source: BEAR,
            at_ms: 0,
        });
        harness.world.insert(owner);
        harness.world.insert(EntityView::new(BEAR, "bear", Vec3::new(8.0, 0.0, 0.0)));

        let config = TaskConfig::builder("seekentity").build().unwrap();
        let targeting = TargetingConfig::builder(16.0)
            .entity_code("sheep")
            .retaliate(10_000)
            .build("seekentity")
            .unwrap();
        let mut task = SeekEntityTask::new(config, targeting, SeekSettings::default()).unwrap();

        assert!(harness.with_ctx(500, |ctx| task.should_execute(ctx)));
        assert_eq!(task.target(), Some(BEAR));
        harness.with_ctx(500, |ctx| task.start_execute(ctx));
        assert!(harness.with_ctx(550, |ctx| task.continue_execute(ctx, 0.05)));
        // Still on it after the retaliation window.
        assert!(harness.with_ctx(12_000, |ctx| task.continue_execute(ctx, 0.05)));

        if let Some(bear) = harness.world.get_mut(BEAR) {
            bear.alive = false;
        }
        assert!(!harness.with_ctx(12_050, |ctx| task.continue_execute(ctx, 0.05)));
    }

    #[test]
    fn notification_sets_target_when_idle() {
        let mut task = seek();
        assert!(task.notify(NOTIFY_SEEK_ENTITY, &NotifyData::Entity(PREY)));
        assert_eq!(task.target(), Some(PREY));
    }
}
