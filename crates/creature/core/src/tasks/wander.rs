use tracing::debug;

use crate::env::{MoveRequest, PathStatus};
use crate::error::ConfigError;
use crate::task::{AiTask, TaskBase, TaskConfig, TaskContext};
use crate::types::Vec3;

use super::check_positive;

#[derive(Clone, Debug, PartialEq)]
pub struct WanderSettings {
    /// Maximum horizontal offset of the picked destination.
    pub radius: f32,
    pub speed: f32,
    pub tolerance: f32,
}

impl Default for WanderSettings {
    fn default() -> Self {
        Self {
            radius: 8.0,
            speed: 1.5,
            tolerance: 0.5,
        }
    }
}

/// Walks to a random nearby point.
#[derive(Debug)]
pub struct WanderTask {
    base: TaskBase,
    settings: WanderSettings,
    destination: Option<Vec3>,
}

impl WanderTask {
    /// # Errors
    ///
    /// Radius, speed and tolerance must be positive.
    pub fn new(config: TaskConfig, settings: WanderSettings) -> Result<Self, ConfigError> {
        check_positive("radius", settings.radius, &config.code)?;
        check_positive("speed", settings.speed, &config.code)?;
        check_positive("tolerance", settings.tolerance, &config.code)?;
        Ok(Self {
            base: TaskBase::new(config),
            settings,
            destination: None,
        })
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }
}

impl AiTask for WanderTask {
    fn base(&self) -> &TaskBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TaskBase {
        &mut self.base
    }

    fn should_execute(&mut self, ctx: &mut TaskContext<'_, '_>) -> bool {
        self.base.should_start(ctx) && ctx.owner_view().is_some()
    }

    fn start_execute(&mut self, ctx: &mut TaskContext<'_, '_>) {
        self.base.start(ctx);
        let Some(origin) = ctx.owner_view().map(|view| view.position) else {
            return;
        };
        let width = self.settings.radius * 2.0;
        let offset = Vec3::new(ctx.rng().jitter(width), 0.0, ctx.rng().jitter(width));
        let destination = origin + offset;
        self.destination = Some(destination);
        ctx.path().walk_towards(MoveRequest::new(
            destination,
            self.settings.speed,
            self.settings.tolerance,
        ));
    }

    fn continue_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _dt: f32) -> bool {
        if !self.base.update(ctx) || self.destination.is_none() {
            return false;
        }
        match ctx.path_ref().status() {
            PathStatus::Moving => true,
            PathStatus::Stuck => {
                debug!(entity = %ctx.owner(), task = %self.base.code(), "wander got stuck");
                false
            }
            PathStatus::ReachedGoal | PathStatus::Idle => false,
        }
    }

    fn can_continue_execute(&self, ctx: &TaskContext<'_, '_>) -> bool {
        ctx.path_ref().is_ready()
    }

    fn finish_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _cancelled: bool) {
        if self.destination.take().is_some() && ctx.path_ref().is_active() {
            ctx.path().stop();
        }
        self.base.finish(ctx);
    }
}
