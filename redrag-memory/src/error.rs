//! Error types for the `redrag-memory` crate.

use thiserror::Error;

/// Errors raised by chat history backends.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// A stored message could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The storage backend failed.
    #[error(transparent)]
    Core(#[from] redrag_core::CoreError),
}

impl From<redis::RedisError> for MemoryError {
    fn from(e: redis::RedisError) -> Self {
        MemoryError::Core(e.into())
    }
}

/// A convenience result type for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
