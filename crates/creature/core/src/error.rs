//! Common error infrastructure for creature-core.
//!
//! Configuration problems are detected once, when tasks are built and a
//! [`crate::TaskManager`] is assembled. They are fatal for the owning entity:
//! its AI never starts with a partially valid task set. Runtime problems
//! (a vanished target, a missing projectile type) are recovered locally by
//! the task that hits them and surface only as [`crate::CommandError`] values
//! and warnings in the log.
//!
//! # Design Principles
//!
//! - **Rich Context**: configuration errors name the task and entity involved
//! - **Severity Classification**: errors are categorized for recovery strategies
//! - **Stable Codes**: every variant exposes a static identifier for tests and logs

use std::fmt;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition. The task falls back to its cooldown or re-searches.
    ///
    /// Examples: target despawned, projectile type not registered
    Recoverable,

    /// Invalid data that must be fixed before the entity can run.
    ///
    /// Examples: min above max, slot out of range
    Validation,

    /// Unexpected state inconsistency inside the engine.
    Internal,

    /// The entity's AI cannot be started at all.
    ///
    /// Examples: a required companion task is missing
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error prevents the entity's AI from starting.
    pub const fn blocks_startup(&self) -> bool {
        matches!(self, Self::Validation | Self::Fatal)
    }
}

/// Where a configuration error was found.
///
/// Task builders fill in the task code; the manager builder adds the entity
/// code before the error is reported.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Code of the entity type whose AI was being initialized.
    pub entity_code: Option<String>,

    /// Code of the offending task.
    pub task_code: Option<String>,
}

impl ErrorContext {
    /// Creates a context naming only the task.
    #[must_use]
    pub fn task(code: impl Into<String>) -> Self {
        Self {
            entity_code: None,
            task_code: Some(code.into()),
        }
    }

    /// Attaches an entity code to this context (builder pattern).
    #[must_use]
    pub fn with_entity(mut self, code: impl Into<String>) -> Self {
        self.entity_code = Some(code.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.task_code, &self.entity_code) {
            (Some(task), Some(entity)) => write!(f, "task '{task}' on entity '{entity}'"),
            (Some(task), None) => write!(f, "task '{task}'"),
            (None, Some(entity)) => write!(f, "entity '{entity}'"),
            (None, None) => write!(f, "global settings"),
        }
    }
}

/// Common trait for all creature-core errors.
pub trait AiError: fmt::Display + fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns the context information for this error, if available.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised while validating configuration or assembling a task manager.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field}: min {min} exceeds max {max} ({context})")]
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
        context: ErrorContext,
    },

    #[error("{field}: breakpoints must be non-decreasing ({context})")]
    NotNonDecreasing {
        field: &'static str,
        context: ErrorContext,
    },

    #[error("{field}: {reason} ({context})")]
    InvalidValue {
        field: &'static str,
        reason: String,
        context: ErrorContext,
    },

    #[error("slot {slot} is out of range, entities have {max} slots ({context})")]
    InvalidSlot {
        slot: usize,
        max: usize,
        context: ErrorContext,
    },

    #[error("missing required field '{field}' ({context})")]
    MissingField {
        field: &'static str,
        context: ErrorContext,
    },

    #[error("required task '{required}' is not registered ({context})")]
    MissingDependency {
        required: String,
        context: ErrorContext,
    },

    #[error("task code registered twice ({context})")]
    DuplicateTask { context: ErrorContext },

    #[error("{count} tasks registered, at most {max} are allowed ({context})")]
    TooManyTasks {
        count: usize,
        max: usize,
        context: ErrorContext,
    },

    #[error("unknown task kind '{kind}' ({context})")]
    UnknownTaskKind { kind: String, context: ErrorContext },
}

impl ConfigError {
    fn context_mut(&mut self) -> &mut ErrorContext {
        use ConfigError::*;
        match self {
            InvalidRange { context, .. }
            | NotNonDecreasing { context, .. }
            | InvalidValue { context, .. }
            | InvalidSlot { context, .. }
            | MissingField { context, .. }
            | MissingDependency { context, .. }
            | DuplicateTask { context }
            | TooManyTasks { context, .. }
            | UnknownTaskKind { context, .. } => context,
        }
    }

    /// Records the entity code on this error unless one is already present.
    #[must_use]
    pub fn for_entity(mut self, entity_code: &str) -> Self {
        let context = self.context_mut();
        if context.entity_code.is_none() {
            context.entity_code = Some(entity_code.to_owned());
        }
        self
    }

    /// Records the task code on this error unless one is already present.
    #[must_use]
    pub fn for_task(mut self, task_code: &str) -> Self {
        let context = self.context_mut();
        if context.task_code.is_none() {
            context.task_code = Some(task_code.to_owned());
        }
        self
    }

    pub(crate) fn range(field: &'static str, min: f64, max: f64, task: &str) -> Self {
        ConfigError::InvalidRange {
            field,
            min,
            max,
            context: ErrorContext::task(task),
        }
    }

    pub(crate) fn value(field: &'static str, reason: impl Into<String>, task: &str) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
            context: ErrorContext::task(task),
        }
    }
}

impl AiError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        use ConfigError::*;
        match self {
            MissingDependency { .. } | TooManyTasks { .. } => ErrorSeverity::Fatal,
            InvalidRange { .. }
            | NotNonDecreasing { .. }
            | InvalidValue { .. }
            | InvalidSlot { .. }
            | MissingField { .. }
            | DuplicateTask { .. }
            | UnknownTaskKind { .. } => ErrorSeverity::Validation,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        use ConfigError::*;
        match self {
            InvalidRange { context, .. }
            | NotNonDecreasing { context, .. }
            | InvalidValue { context, .. }
            | InvalidSlot { context, .. }
            | MissingField { context, .. }
            | MissingDependency { context, .. }
            | DuplicateTask { context }
            | TooManyTasks { context, .. }
            | UnknownTaskKind { context, .. } => Some(context),
        }
    }

    fn error_code(&self) -> &'static str {
        use ConfigError::*;
        match self {
            InvalidRange { .. } => "CONFIG_INVALID_RANGE",
            NotNonDecreasing { .. } => "CONFIG_NOT_NON_DECREASING",
            InvalidValue { .. } => "CONFIG_INVALID_VALUE",
            InvalidSlot { .. } => "CONFIG_INVALID_SLOT",
            MissingField { .. } => "CONFIG_MISSING_FIELD",
            MissingDependency { .. } => "CONFIG_MISSING_DEPENDENCY",
            DuplicateTask { .. } => "CONFIG_DUPLICATE_TASK",
            TooManyTasks { .. } => "CONFIG_TOO_MANY_TASKS",
            UnknownTaskKind { .. } => "CONFIG_UNKNOWN_TASK_KIND",
        }
    }
}
