//! Error types for the `redrag-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred while turning raw text into documents.
    #[error("Chunking error: {0}")]
    ChunkingError(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the ingest or query workflow.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// An error propagated from `redrag-core` (embedding, Redis).
    #[error(transparent)]
    Core(#[from] redrag_core::CoreError),
}

impl From<redis::RedisError> for RagError {
    fn from(e: redis::RedisError) -> Self {
        RagError::Core(e.into())
    }
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
