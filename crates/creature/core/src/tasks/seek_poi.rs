use tracing::{debug, warn};

use crate::env::{MoveRequest, PathStatus, Poi};
use crate::error::{ConfigError, ErrorContext};
use crate::task::{AiTask, TaskBase, TaskConfig, TaskContext};

use super::check_positive;

#[derive(Clone, Debug, PartialEq)]
pub struct SeekPoiSettings {
    /// POI type to walk to, e.g. `food` or `nest`.
    pub poi_kind: String,
    pub search_range: f32,
    pub speed: f32,
    pub tolerance: f32,
}

impl SeekPoiSettings {
    pub fn new(poi_kind: impl Into<String>) -> Self {
        Self {
            poi_kind: poi_kind.into(),
            search_range: 32.0,
            speed: 1.5,
            tolerance: 1.0,
        }
    }
}

/// Navigates to the nearest point of interest of one type.
///
/// Uses the traverser's computed-path request and waits, through
/// [`AiTask::can_continue_execute`], until the traverser reports ready.
#[derive(Debug)]
pub struct SeekPoiTask {
    base: TaskBase,
    settings: SeekPoiSettings,
    poi: Option<Poi>,
}

impl SeekPoiTask {
    /// # Errors
    ///
    /// The POI kind must be set and the distances positive.
    pub fn new(config: TaskConfig, settings: SeekPoiSettings) -> Result<Self, ConfigError> {
        if settings.poi_kind.is_empty() {
            return Err(ConfigError::MissingField {
                field: "poi_kind",
                context: ErrorContext::task(&config.code),
            });
        }
        check_positive("search_range", settings.search_range, &config.code)?;
        check_positive("speed", settings.speed, &config.code)?;
        check_positive("tolerance", settings.tolerance, &config.code)?;
        Ok(Self {
            base: TaskBase::new(config),
            settings,
            poi: None,
        })
    }

    /// The POI picked by the last successful search.
    pub fn poi(&self) -> Option<&Poi> {
        self.poi.as_ref()
    }
}

impl AiTask for SeekPoiTask {
    fn base(&self) -> &TaskBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TaskBase {
        &mut self.base
    }

    fn should_execute(&mut self, ctx: &mut TaskContext<'_, '_>) -> bool {
        if !self.base.should_start(ctx) {
            return false;
        }
        let Some(owner) = ctx.owner_view() else {
            return false;
        };
        self.poi = ctx.pois().nearest_poi(
            owner.position,
            self.settings.search_range,
            &self.settings.poi_kind,
            &mut |_: &Poi| true,
        );
        self.poi.is_some()
    }

    fn start_execute(&mut self, ctx: &mut TaskContext<'_, '_>) {
        self.base.start(ctx);
        let Some(poi) = &self.poi else {
            return;
        };
        let request = MoveRequest::new(poi.position, self.settings.speed, self.settings.tolerance);
        if !ctx.path().navigate_to(request) {
            warn!(
                entity = %ctx.owner(),
                task = %self.base.code(),
                poi = poi.id,
                "path request to poi rejected"
            );
            self.poi = None;
        }
    }

    fn continue_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _dt: f32) -> bool {
        if !self.base.update(ctx) {
            return false;
        }
        let Some(poi) = &self.poi else {
            return false;
        };
        match ctx.path_ref().status() {
            PathStatus::Moving => true,
            PathStatus::ReachedGoal => {
                debug!(
                    entity = %ctx.owner(),
                    task = %self.base.code(),
                    poi = poi.id,
                    "reached poi"
                );
                false
            }
            PathStatus::Stuck => {
                warn!(
                    entity = %ctx.owner(),
                    task = %self.base.code(),
                    poi = poi.id,
                    "poi unreachable"
                );
                false
            }
            PathStatus::Idle => false,
        }
    }

    fn can_continue_execute(&self, ctx: &TaskContext<'_, '_>) -> bool {
        ctx.path_ref().is_ready()
    }

    fn finish_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _cancelled: bool) {
        if self.poi.take().is_some() && ctx.path_ref().is_active() {
            ctx.path().stop();
        }
        self.base.finish(ctx);
    }
}
