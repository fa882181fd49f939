//! The task contract and the state every task shares.
//!
//! A task is one behavior competing for control of its entity. The manager
//! drives it through a fixed lifecycle:
//!
//! 1. [`AiTask::should_execute`] is polled every tick while the task is idle
//! 2. [`AiTask::start_execute`] runs at most once per positive answer
//! 3. [`AiTask::continue_execute`] and [`AiTask::can_continue_execute`] are
//!    both evaluated every tick while active
//! 4. [`AiTask::finish_execute`] runs exactly once per start, whether the task
//!    completed or was preempted
//!
//! # Design
//!
//! There is no task class hierarchy. Shared behavior is composed from
//! [`TaskBase`] (preconditions, cooldown, side effects) and, for tasks that
//! pick other entities, [`crate::targeting::Targeting`]. Capabilities other
//! tasks need to query (for example "can this task accept a target") are
//! exposed through accessor methods such as [`AiTask::as_targeting_mut`]
//! rather than by downcasting.
mod base;
mod config;
mod context;
mod cooldown;

pub use base::TaskBase;
pub use config::{
    AnimationBinding, DayTimeFrame, SoundBinding, Span, TaskConfig, TaskConfigBuilder,
};
pub use context::{SenseView, TaskContext};
pub use cooldown::Cooldown;

use std::fmt;

use crate::error::ConfigError;
use crate::targeting::Targeting;
use crate::types::{EntityId, NotifyData};

/// Imperative request from a task to its own manager.
///
/// Queued during a task call and applied by the manager as soon as the call
/// returns.
#[derive(Clone, Debug, PartialEq)]
pub enum ManagerCommand {
    /// Force-start a task of the same entity, handing it an optional target.
    StartTask {
        code: String,
        target: Option<EntityId>,
    },
    /// Force-stop a task of the same entity.
    StopTask { code: String },
}

/// Behavior module driven by a [`crate::TaskManager`].
pub trait AiTask: fmt::Debug {
    fn base(&self) -> &TaskBase;

    fn base_mut(&mut self) -> &mut TaskBase;

    fn code(&self) -> &str {
        &self.base().config().code
    }

    fn slot(&self) -> usize {
        self.base().config().slot
    }

    fn priority(&self) -> f32 {
        self.base().config().priority
    }

    fn priority_for_cancel(&self) -> f32 {
        self.base().config().priority_for_cancel
    }

    /// Resolves dependencies on sibling tasks once every task of the entity
    /// has been built.
    ///
    /// # Errors
    ///
    /// A missing or incompatible dependency is a fatal [`ConfigError`] that
    /// prevents the entity's AI from starting.
    fn after_initialize(&mut self, _directory: &TaskDirectory) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Whether the task wants to start now. Called every tick while idle.
    fn should_execute(&mut self, ctx: &mut TaskContext<'_, '_>) -> bool;

    fn start_execute(&mut self, ctx: &mut TaskContext<'_, '_>) {
        self.base_mut().start(ctx);
    }

    /// Advances the task by `dt` seconds. Returns `false` when done.
    fn continue_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _dt: f32) -> bool {
        self.base_mut().update(ctx)
    }

    /// Secondary gate. While it is `false` the task is neither advanced nor
    /// finished; the manager polls again next tick.
    fn can_continue_execute(&self, _ctx: &TaskContext<'_, '_>) -> bool {
        true
    }

    fn finish_execute(&mut self, ctx: &mut TaskContext<'_, '_>, _cancelled: bool) {
        self.base_mut().finish(ctx);
    }

    /// Handles a notification. Returning `true` asks the manager to start
    /// this task on the next tick.
    fn notify(&mut self, _key: &str, _data: &NotifyData) -> bool {
        false
    }

    /// An animation of the owner stopped playing.
    fn on_animation_stopped(&mut self, _ctx: &mut TaskContext<'_, '_>, _code: &str) {}

    fn as_targeting(&self) -> Option<&dyn TargetingTask> {
        None
    }

    fn as_targeting_mut(&mut self) -> Option<&mut dyn TargetingTask> {
        None
    }
}

/// Capability of tasks that act on another entity.
pub trait TargetingTask {
    fn targeting(&self) -> &Targeting;

    fn targeting_mut(&mut self) -> &mut Targeting;

    fn target(&self) -> Option<EntityId> {
        self.targeting().target()
    }

    fn set_target(&mut self, target: Option<EntityId>) {
        self.targeting_mut().set_target(target);
    }
}

/// Read-only listing of an entity's tasks, handed to
/// [`AiTask::after_initialize`].
#[derive(Clone, Debug, Default)]
pub struct TaskDirectory {
    entries: Vec<DirectoryEntry>,
}

#[derive(Clone, Debug)]
struct DirectoryEntry {
    code: String,
    slot: usize,
    targeting: bool,
}

impl TaskDirectory {
    pub fn from_tasks(tasks: &[Box<dyn AiTask>]) -> Self {
        let entries = tasks
            .iter()
            .map(|task| DirectoryEntry {
                code: task.code().to_owned(),
                slot: task.slot(),
                targeting: task.as_targeting().is_some(),
            })
            .collect();
        Self { entries }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|entry| entry.code == code)
    }

    /// Whether `code` names a task that accepts a target.
    pub fn is_targeting(&self, code: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.code == code && entry.targeting)
    }

    pub fn slot_of(&self, code: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.slot)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
