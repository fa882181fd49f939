//! Slot-based task scheduler.
//!
//! Every entity owns one [`TaskManager`]. Tasks are partitioned into
//! [`AiSettings::SLOT_COUNT`] slots; at most one task runs per slot and tasks
//! in different slots run side by side (looking at a target while walking
//! toward it).
//!
//! # Tick order
//!
//! 1. tasks that accepted a notification since the last tick are started
//! 2. idle tasks are polled in descending priority order (registration order
//!    breaks ties); a candidate whose `should_execute` holds starts in an
//!    empty slot, or displaces the incumbent when its priority exceeds the
//!    incumbent's cancel-priority
//! 3. every active task whose `can_continue_execute` holds is advanced, and
//!    finished when `continue_execute` returns `false`
//!
//! # Design
//!
//! Tasks never call back into the manager. Force-start and force-stop
//! requests are queued through the [`TaskContext`] and applied right after
//! the task call that issued them, bounded by
//! [`AiSettings::max_command_chain`]. Cross-entity notifications arrive
//! through [`TaskManager::notify`], which only marks the accepting tasks; the
//! start happens on this manager's own tick so the caller's scheduler is
//! never re-entered.
mod builder;

pub use builder::TaskManagerBuilder;

use arrayvec::ArrayVec;
use tracing::{debug, warn};

use crate::config::AiSettings;
use crate::env::{AgentEnv, TaskRng};
use crate::task::{AiTask, ManagerCommand, TaskContext};
use crate::types::{EntityId, NotifyData, WorldTime};

struct TaskEntry {
    task: Box<dyn AiTask>,
    enabled: bool,
    notified: bool,
}

/// Per-entity task scheduler.
pub struct TaskManager {
    owner: EntityId,
    entity_code: String,
    settings: AiSettings,
    tasks: Vec<TaskEntry>,
    /// Task indices sorted by descending priority, ties by index.
    order: Vec<usize>,
    slots: [Option<usize>; AiSettings::SLOT_COUNT],
    rng: TaskRng,
    pending: Vec<ManagerCommand>,
}

impl TaskManager {
    pub fn builder(owner: EntityId, entity_code: impl Into<String>) -> TaskManagerBuilder {
        TaskManagerBuilder::new(owner, entity_code)
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn entity_code(&self) -> &str {
        &self.entity_code
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, code: &str) -> Option<&dyn AiTask> {
        self.index_of(code).map(|index| self.tasks[index].task.as_ref())
    }

    pub fn tasks(&self) -> impl Iterator<Item = &dyn AiTask> {
        self.tasks.iter().map(|entry| entry.task.as_ref())
    }

    pub fn is_task_active(&self, code: &str) -> bool {
        self.index_of(code)
            .is_some_and(|index| self.slots.contains(&Some(index)))
    }

    /// Code of the task occupying `slot`.
    pub fn active_task(&self, slot: usize) -> Option<&str> {
        self.slots
            .get(slot)
            .copied()
            .flatten()
            .map(|index| self.tasks[index].task.code())
    }

    pub fn active_tasks(&self) -> ArrayVec<&str, { AiSettings::SLOT_COUNT }> {
        self.slots
            .iter()
            .flatten()
            .map(|&index| self.tasks[index].task.code())
            .collect()
    }

    /// Enables or disables a task. A disabled task is never selected; if it
    /// is running it is cancelled on the next tick.
    pub fn set_task_enabled(&mut self, code: &str, enabled: bool) -> bool {
        match self.index_of(code) {
            Some(index) => {
                self.tasks[index].enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Offers a notification to every task. Tasks that accept it are started
    /// on the next tick, provided they may take their slot. Returns whether
    /// any task accepted.
    pub fn notify(&mut self, key: &str, data: &NotifyData) -> bool {
        let mut accepted = false;
        for entry in &mut self.tasks {
            if entry.enabled && entry.task.notify(key, data) {
                entry.notified = true;
                accepted = true;
            }
        }
        if accepted {
            debug!(entity = %self.owner, key, "notification accepted");
        }
        accepted
    }

    /// Runs one scheduling tick. `dt` is the simulated time step in seconds.
    pub fn tick(&mut self, env: &mut AgentEnv<'_>, time: WorldTime, dt: f32) {
        self.cancel_disabled(env, time);
        self.start_notified(env, time);
        self.select(env, time);
        self.advance(env, time, dt);
    }

    /// Starts `code` immediately, cancelling the task in its slot. A target is
    /// handed over when the task accepts one. Returns `false` for unknown
    /// codes.
    pub fn execute_task(
        &mut self,
        env: &mut AgentEnv<'_>,
        time: WorldTime,
        code: &str,
        target: Option<EntityId>,
    ) -> bool {
        let started = self.force_start(env, time, code, target);
        self.drain(env, time);
        started
    }

    /// Stops `code` if it is running. Returns whether it was.
    pub fn stop_task(&mut self, env: &mut AgentEnv<'_>, time: WorldTime, code: &str) -> bool {
        let stopped = self.force_stop(env, time, code);
        self.drain(env, time);
        stopped
    }

    /// Cancels every running task.
    pub fn stop_all(&mut self, env: &mut AgentEnv<'_>, time: WorldTime) {
        for slot in 0..AiSettings::SLOT_COUNT {
            if let Some(index) = self.slots[slot] {
                self.finish_index(env, time, index, true);
            }
        }
        self.pending.clear();
    }

    /// Forwards an animation-stopped event to the running tasks.
    pub fn on_animation_stopped(&mut self, env: &mut AgentEnv<'_>, time: WorldTime, code: &str) {
        for slot in 0..AiSettings::SLOT_COUNT {
            if let Some(index) = self.slots[slot] {
                self.call(env, time, index, |task, ctx| task.on_animation_stopped(ctx, code));
                self.drain(env, time);
            }
        }
    }

    /// The owner left the world. Every running task is cancelled.
    pub fn on_despawn(&mut self, env: &mut AgentEnv<'_>, time: WorldTime) {
        debug!(entity = %self.owner, "despawn, stopping all tasks");
        self.stop_all(env, time);
    }

    fn index_of(&self, code: &str) -> Option<usize> {
        self.tasks.iter().position(|entry| entry.task.code() == code)
    }

    fn is_active(&self, index: usize) -> bool {
        let slot = self.tasks[index].task.slot();
        self.slots[slot] == Some(index)
    }

    /// Whether `index` may take its slot from the current incumbent.
    fn may_take_slot(&self, index: usize) -> bool {
        let task = &self.tasks[index].task;
        match self.slots[task.slot()] {
            None => true,
            Some(incumbent) => {
                incumbent != index
                    && task.priority() > self.tasks[incumbent].task.priority_for_cancel()
            }
        }
    }

    fn cancel_disabled(&mut self, env: &mut AgentEnv<'_>, time: WorldTime) {
        for slot in 0..AiSettings::SLOT_COUNT {
            if let Some(index) = self.slots[slot] {
                if !self.tasks[index].enabled {
                    self.finish_index(env, time, index, true);
                    self.drain(env, time);
                }
            }
        }
    }

    fn start_notified(&mut self, env: &mut AgentEnv<'_>, time: WorldTime) {
        for index in 0..self.tasks.len() {
            if !std::mem::take(&mut self.tasks[index].notified) {
                continue;
            }
            if self.tasks[index].enabled && !self.is_active(index) && self.may_take_slot(index) {
                self.start_index(env, time, index, None);
                self.drain(env, time);
            }
        }
    }

    fn select(&mut self, env: &mut AgentEnv<'_>, time: WorldTime) {
        for position in 0..self.order.len() {
            let index = self.order[position];
            if !self.tasks[index].enabled || self.is_active(index) || !self.may_take_slot(index) {
                continue;
            }
            let wants = self.call(env, time, index, |task, ctx| task.should_execute(ctx));
            self.drain(env, time);
            if wants && !self.is_active(index) && self.may_take_slot(index) {
                self.start_index(env, time, index, None);
                self.drain(env, time);
            }
        }
    }

    fn advance(&mut self, env: &mut AgentEnv<'_>, time: WorldTime, dt: f32) {
        for slot in 0..AiSettings::SLOT_COUNT {
            let Some(index) = self.slots[slot] else {
                continue;
            };
            let ready = self.call(env, time, index, |task, ctx| task.can_continue_execute(ctx));
            if !ready {
                continue;
            }
            let keep_going =
                self.call(env, time, index, |task, ctx| task.continue_execute(ctx, dt));
            self.drain(env, time);
            if !keep_going && self.slots[slot] == Some(index) {
                self.finish_index(env, time, index, false);
                self.drain(env, time);
            }
        }
    }

    fn force_start(
        &mut self,
        env: &mut AgentEnv<'_>,
        time: WorldTime,
        code: &str,
        target: Option<EntityId>,
    ) -> bool {
        let Some(index) = self.index_of(code) else {
            warn!(entity = %self.owner, task = code, "cannot start unknown task");
            return false;
        };
        if self.is_active(index) {
            if let Some(targeting) = self.tasks[index].task.as_targeting_mut() {
                targeting.set_target(target);
            }
            return true;
        }
        self.start_index(env, time, index, Some(target));
        true
    }

    fn force_stop(&mut self, env: &mut AgentEnv<'_>, time: WorldTime, code: &str) -> bool {
        match self.index_of(code) {
            Some(index) if self.is_active(index) => {
                self.finish_index(env, time, index, true);
                true
            }
            _ => false,
        }
    }

    /// Starts `index`, cancelling the incumbent of its slot. `target` is
    /// `Some` for hand-offs, in which case the task's target is replaced.
    fn start_index(
        &mut self,
        env: &mut AgentEnv<'_>,
        time: WorldTime,
        index: usize,
        target: Option<Option<EntityId>>,
    ) {
        let slot = self.tasks[index].task.slot();
        if let Some(incumbent) = self.slots[slot] {
            self.finish_index(env, time, incumbent, true);
        }
        if let Some(target) = target {
            if let Some(targeting) = self.tasks[index].task.as_targeting_mut() {
                targeting.set_target(target);
            }
        }
        self.slots[slot] = Some(index);
        self.call(env, time, index, |task, ctx| task.start_execute(ctx));
        debug!(
            entity = %self.owner,
            task = self.tasks[index].task.code(),
            slot,
            "task started"
        );
    }

    fn finish_index(
        &mut self,
        env: &mut AgentEnv<'_>,
        time: WorldTime,
        index: usize,
        cancelled: bool,
    ) {
        let slot = self.tasks[index].task.slot();
        if self.slots[slot] != Some(index) {
            return;
        }
        self.slots[slot] = None;
        self.call(env, time, index, |task, ctx| task.finish_execute(ctx, cancelled));
        debug!(
            entity = %self.owner,
            task = self.tasks[index].task.code(),
            slot,
            cancelled,
            "task finished"
        );
    }

    /// Applies queued manager commands, including any they cause in turn.
    fn drain(&mut self, env: &mut AgentEnv<'_>, time: WorldTime) {
        let mut applied = 0;
        while !self.pending.is_empty() {
            if applied >= self.settings.max_command_chain {
                warn!(
                    entity = %self.owner,
                    dropped = self.pending.len(),
                    "manager command chain too long, dropping the rest"
                );
                self.pending.clear();
                return;
            }
            let command = self.pending.remove(0);
            applied += 1;
            match command {
                ManagerCommand::StartTask { code, target } => {
                    self.force_start(env, time, &code, target);
                }
                ManagerCommand::StopTask { code } => {
                    self.force_stop(env, time, &code);
                }
            }
        }
    }

    fn call<R>(
        &mut self,
        env: &mut AgentEnv<'_>,
        time: WorldTime,
        index: usize,
        f: impl FnOnce(&mut dyn AiTask, &mut TaskContext<'_, '_>) -> R,
    ) -> R {
        let Self {
            owner,
            settings,
            tasks,
            rng,
            pending,
            ..
        } = self;
        let mut ctx = TaskContext::new(*owner, time, env, rng, pending, settings);
        f(tasks[index].task.as_mut(), &mut ctx)
    }
}

#[cfg(test)]
mod tests;
