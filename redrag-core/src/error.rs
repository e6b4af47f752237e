//! Error types for the `redrag-core` crate.

use thiserror::Error;

/// Errors raised by the core gateways.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The generation backend failed or returned something unusable.
    #[error("Model error ({model}): {message}")]
    Model {
        /// The model that was being invoked.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// A Redis command or connection failed.
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}

/// A convenience result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
