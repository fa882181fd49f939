//! Errors raised while assembling or driving a world.

use creature_core::{AiError, ConfigError, ErrorSeverity};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("entity '{entity}' has an invalid task set: {source}")]
    Config {
        entity: String,
        #[source]
        source: ConfigError,
    },

    #[error("entity '{entity}' uses unknown behavior '{behavior}'")]
    UnknownBehavior { entity: String, behavior: String },

    #[error("no entity named '{0}'")]
    UnknownEntity(String),

    #[error("invalid scenario: {0}")]
    InvalidConfig(String),
}

impl AiError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Config { source, .. } => source.severity(),
            RuntimeError::UnknownBehavior { .. } | RuntimeError::InvalidConfig(_) => {
                ErrorSeverity::Fatal
            }
            RuntimeError::UnknownEntity(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::Config { source, .. } => source.error_code(),
            RuntimeError::UnknownBehavior { .. } => "RUNTIME_UNKNOWN_BEHAVIOR",
            RuntimeError::UnknownEntity(_) => "RUNTIME_UNKNOWN_ENTITY",
            RuntimeError::InvalidConfig(_) => "RUNTIME_INVALID_CONFIG",
        }
    }
}
