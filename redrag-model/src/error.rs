//! Error types for the `redrag-model` crate.

use thiserror::Error;

/// Errors raised by semantic cache backends.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The cache backend rejected an operation.
    #[error("Cache error ({backend}): {message}")]
    Cache {
        /// The cache backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error propagated from `redrag-core` (embedding, generation, Redis).
    #[error(transparent)]
    Core(#[from] redrag_core::CoreError),
}

impl From<redis::RedisError> for ModelError {
    fn from(e: redis::RedisError) -> Self {
        ModelError::Core(e.into())
    }
}

/// A convenience result type for model and cache operations.
pub type Result<T> = std::result::Result<T, ModelError>;
