use crate::error::{ConfigError, ErrorContext};
use crate::targeting::CodePattern;
use crate::task::{AiTask, TaskBase, TaskConfig, TaskContext};
use crate::types::EntityView;

use super::check_positive;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdleSettings {
    /// Interrupt the idle when another entity comes this close.
    pub stop_range: Option<f32>,
    /// Entity codes that interrupt the idle. Empty means any creature.
    pub stop_codes: Vec<CodePattern>,
}

/// Stands still playing the configured animation for the configured
/// duration.
#[derive(Debug)]
pub struct IdleTask {
    base: TaskBase,
    settings: IdleSettings,
}

impl IdleTask {
    /// # Errors
    ///
    /// An idle needs a duration, and a stop range must be positive.
    pub fn new(config: TaskConfig, settings: IdleSettings) -> Result<Self, ConfigError> {
        if config.duration_ms.is_none() {
            return Err(ConfigError::MissingField {
                field: "duration_ms",
                context: ErrorContext::task(&config.code),
            });
        }
        if let Some(range) = settings.stop_range {
            check_positive("stop_range", range, &config.code)?;
        }
        Ok(Self {
            base: TaskBase::new(config),
            settings,
        })
    }

    fn disturbed(&self, ctx: &TaskContext<'_, '_>) -> bool {
        let (Some(range), Some(owner)) = (self.settings.stop_range, ctx.owner_view()) else {
            return false;
        };
        let codes = &self.settings.stop_codes;
        ctx.entities()
            .nearest_entity(
                owner.position,
                range,
                crate::env::SearchType::Creatures,
                &mut |view: &EntityView| {
                    view.id != owner.id
                        && view.alive
                        && (codes.is_empty() || codes.iter().any(|code| code.matches(&view.code)))
                },
            )
            .is_some()
    }
}

impl AiTask for IdleTask {
    fn base(&self) -> &TaskBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TaskBase {
        &mut self.base
    }

    fn should_execute(&mut self, ctx: &mut TaskContext<'_, '_>) -> bool {
        self.base.should_start(ctx) && !self.disturbed(ctx)
    }

    fn continue_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _dt: f32) -> bool {
        self.base.update(ctx) && !self.disturbed(ctx)
    }
}
