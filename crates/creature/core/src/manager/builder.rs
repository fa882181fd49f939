use std::collections::BTreeSet;

use tracing::error;

use crate::config::AiSettings;
use crate::env::TaskRng;
use crate::error::{AiError, ConfigError, ErrorContext};
use crate::task::{AiTask, TaskDirectory};
use crate::types::{EntityId, WorldTime};

use super::{TaskEntry, TaskManager};

/// Assembles a [`TaskManager`] and runs the one-time initialization.
///
/// # Examples
///
/// ```ignore
/// let manager = TaskManager::builder(id, "wolf-male")
///     .settings(settings)
///     .task(wander)
///     .task(melee)
///     .build(&time)?;
/// ```
pub struct TaskManagerBuilder {
    owner: EntityId,
    entity_code: String,
    settings: AiSettings,
    tasks: Vec<Box<dyn AiTask>>,
}

impl TaskManagerBuilder {
    pub fn new(owner: EntityId, entity_code: impl Into<String>) -> Self {
        Self {
            owner,
            entity_code: entity_code.into(),
            settings: AiSettings::default(),
            tasks: Vec::new(),
        }
    }

    pub fn settings(mut self, settings: AiSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Registers a task. Registration order breaks priority ties.
    pub fn task(mut self, task: Box<dyn AiTask>) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn tasks(mut self, tasks: impl IntoIterator<Item = Box<dyn AiTask>>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Validates the task set, resolves inter-task dependencies, seeds the
    /// entity's RNG and applies initial cooldowns.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] is fatal for this entity: it is logged with the
    /// entity and task codes and returned, and no manager is created.
    pub fn build(self, time: &WorldTime) -> Result<TaskManager, ConfigError> {
        let entity_code = self.entity_code.clone();
        self.assemble(time).map_err(|err| {
            let err = err.for_entity(&entity_code);
            error!(
                entity = %entity_code,
                code = err.error_code(),
                severity = err.severity().as_str(),
                "task manager initialization failed: {err}"
            );
            err
        })
    }

    fn assemble(self, time: &WorldTime) -> Result<TaskManager, ConfigError> {
        self.settings.validate()?;

        if self.tasks.len() > AiSettings::MAX_TASKS {
            return Err(ConfigError::TooManyTasks {
                count: self.tasks.len(),
                max: AiSettings::MAX_TASKS,
                context: ErrorContext::default(),
            });
        }

        {
            let mut seen = BTreeSet::new();
            for task in &self.tasks {
                if !seen.insert(task.code()) {
                    return Err(ConfigError::DuplicateTask {
                        context: ErrorContext::task(task.code()),
                    });
                }
            }
        }

        let directory = TaskDirectory::from_tasks(&self.tasks);
        let mut tasks = self.tasks;
        for task in &mut tasks {
            let code = task.code().to_owned();
            task.after_initialize(&directory)
                .map_err(|err| err.for_task(&code))?;
        }

        let mut rng = TaskRng::for_entity(self.settings.world_seed, self.owner);
        for task in &mut tasks {
            task.base_mut().arm_initial_cooldown(time, &mut rng);
        }

        let mut order: Vec<usize> = (0..tasks.len()).collect();
        order.sort_by(|&a, &b| tasks[b].priority().total_cmp(&tasks[a].priority()));

        Ok(TaskManager {
            owner: self.owner,
            entity_code: self.entity_code,
            settings: self.settings,
            tasks: tasks
                .into_iter()
                .map(|task| TaskEntry {
                    task,
                    enabled: true,
                    notified: false,
                })
                .collect(),
            order,
            slots: [None; AiSettings::SLOT_COUNT],
            rng,
            pending: Vec::new(),
        })
    }
}
