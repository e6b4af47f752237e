//! Error types for the `redrag-runner` crate.

use thiserror::Error;

/// Reasons an answer could not be produced.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The question was empty or whitespace.
    #[error("question must not be empty")]
    EmptyQuestion,

    /// The generation backend failed.
    #[error(transparent)]
    Generation(#[from] redrag_core::CoreError),

    /// The runner was built without a required component.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;
