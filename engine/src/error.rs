//! Error taxonomy for the decision engine
//!
//! Every variant is fatal for the current decision. Nothing here is retried
//! internally because the engine performs no I/O.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that abort a decision
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Empty or inconsistent input state
    #[error("malformed game state: {0}")]
    MalformedState(String),

    /// The solver was asked to run zero iterations
    #[error("invalid iteration count: {0} (at least one iteration is required)")]
    InvalidIterationCount(u32),

    /// Solver settings that cannot produce a meaningful strategy
    #[error("invalid solver config: {0}")]
    InvalidConfig(String),

    /// The hand evaluator could not rank a showdown hand
    #[error("unresolved showdown: {0}")]
    UnresolvedShowdown(String),
}

impl EngineError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        EngineError::MalformedState(msg.into())
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::InvalidConfig(err.to_string())
    }
}

/// Convenience alias used throughout the engine
pub type Result<T> = std::result::Result<T, EngineError>;
