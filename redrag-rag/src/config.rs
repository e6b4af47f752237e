//! Configuration for chunking and retrieval.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// The vector index algorithm used by the Redis backend.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexAlgorithm {
    /// Approximate search over a hierarchical navigable small world graph.
    #[default]
    Hnsw,
    /// Exact brute-force search.
    Flat,
}

impl IndexAlgorithm {
    /// The RediSearch keyword for this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexAlgorithm::Hnsw => "HNSW",
            IndexAlgorithm::Flat => "FLAT",
        }
    }
}

impl fmt::Display for IndexAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexAlgorithm {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "HNSW" => Ok(IndexAlgorithm::Hnsw),
            "FLAT" => Ok(IndexAlgorithm::Flat),
            other => Err(RagError::ConfigError(format!("unknown indexing algorithm '{other}'"))),
        }
    }
}

/// How texts are split before embedding.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    /// Split on paragraph, line, sentence and word boundaries first.
    #[default]
    Recursive,
    /// Split by character count only.
    Fixed,
}

impl FromStr for ChunkingStrategy {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "recursive" => Ok(ChunkingStrategy::Recursive),
            "fixed" => Ok(ChunkingStrategy::Fixed),
            other => Err(RagError::ConfigError(format!("unknown chunking strategy '{other}'"))),
        }
    }
}

/// Configuration parameters for ingestion and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Splitting strategy.
    pub chunking: ChunkingStrategy,
    /// Number of documents retrieved per question.
    pub top_k: usize,
    /// Name of the vector index (collection).
    pub index_name: String,
    /// Index algorithm for backends that support a choice.
    pub indexing: IndexAlgorithm,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            chunking: ChunkingStrategy::Recursive,
            top_k: 10,
            index_name: "documents".to_string(),
            indexing: IndexAlgorithm::Hnsw,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the splitting strategy.
    pub fn chunking(mut self, chunking: ChunkingStrategy) -> Self {
        self.config.chunking = chunking;
        self
    }

    /// Set the number of documents retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the vector index name.
    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.config.index_name = name.into();
        self
    }

    /// Set the index algorithm.
    pub fn indexing(mut self, indexing: IndexAlgorithm) -> Self {
        self.config.indexing = indexing;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `index_name` is empty
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.config.index_name.trim().is_empty() {
            return Err(RagError::ConfigError("index_name must not be empty".to_string()));
        }
        Ok(self.config)
    }
}
