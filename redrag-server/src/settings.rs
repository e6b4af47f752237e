//! Service settings.
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. environment variables (a `.env` file is loaded first by the binary)
//! 4. command line flags, applied by the binary
//!
//! ```toml
//! redis_url = "redis://redis:6379"
//! ollama_model = "mistral"
//! cors_origins = ["http://localhost:3000", "https://chat.example.com"]
//! storage = "memory"
//! ```

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use redrag_rag::{ChunkingStrategy, IndexAlgorithm};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SettingsError};

/// Where sessions, documents, and cached responses are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Redis,
    /// Process memory; nothing survives a restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StorageBackend::Redis),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("expected 'redis' or 'memory', got '{other}'")),
        }
    }
}

/// Which embedding implementation to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    #[default]
    Ollama,
    /// In-process ONNX model; requires the `fastembed` feature.
    Fastembed,
}

impl FromStr for EmbeddingBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ollama" => Ok(EmbeddingBackend::Ollama),
            "fastembed" => Ok(EmbeddingBackend::Fastembed),
            other => Err(format!("expected 'ollama' or 'fastembed', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub redis_url: String,
    /// Seconds a cached response lives.
    pub redis_cache_ttl: u64,
    /// Maximum cosine distance for a semantic cache hit.
    pub redis_distance_threshold: f32,

    pub ollama_base_url: String,
    pub ollama_model: String,
    pub max_tokens: u32,
    pub temperature: f32,

    pub index_name: String,
    pub indexing: IndexAlgorithm,
    pub embedding_backend: EmbeddingBackend,
    pub embedding_model: String,
    pub embedding_dimensions: usize,

    /// Seconds of inactivity before a session transcript expires.
    pub memory_ttl: u64,
    /// Only the most recent N messages go into the prompt history; unset
    /// means the whole transcript.
    pub memory_max_messages: Option<usize>,

    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub chunking: ChunkingStrategy,
    pub top_k: usize,

    pub request_timeout_secs: u64,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub storage: StorageBackend,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            redis_url: "redis://localhost:6379".to_string(),
            redis_cache_ttl: 3600,
            redis_distance_threshold: 0.2,
            ollama_base_url: redrag_rag::DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: "llama2".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            index_name: "documents".to_string(),
            indexing: IndexAlgorithm::Hnsw,
            embedding_backend: EmbeddingBackend::Ollama,
            embedding_model: "all-minilm".to_string(),
            embedding_dimensions: 384,
            memory_ttl: 1800,
            memory_max_messages: None,
            chunk_size: 1000,
            chunk_overlap: 200,
            chunking: ChunkingStrategy::Recursive,
            top_k: 10,
            request_timeout_secs: 120,
            cors_origins: vec!["http://localhost:3000".to_string()],
            log_level: "info".to_string(),
            storage: StorageBackend::Redis,
        }
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse().map_err(|e: T::Err| SettingsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

fn overlay<T, F>(lookup: &F, key: &str, field: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(key) {
        *field = parse(key, &value)?;
    }
    Ok(())
}

impl Settings {
    /// Defaults overlaid with the TOML file at `path`, if given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`, which maps a variable name to its value.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        overlay(&lookup, "REDRAG_HOST", &mut self.host)?;
        overlay(&lookup, "REDRAG_PORT", &mut self.port)?;
        overlay(&lookup, "REDIS_URL", &mut self.redis_url)?;
        overlay(&lookup, "REDIS_CACHE_TTL", &mut self.redis_cache_ttl)?;
        overlay(&lookup, "REDIS_DISTANCE_THRESHOLD", &mut self.redis_distance_threshold)?;
        overlay(&lookup, "OLLAMA_BASE_URL", &mut self.ollama_base_url)?;
        overlay(&lookup, "OLLAMA_MODEL", &mut self.ollama_model)?;
        overlay(&lookup, "MAX_TOKENS", &mut self.max_tokens)?;
        overlay(&lookup, "TEMPERATURE", &mut self.temperature)?;
        overlay(&lookup, "INDEX_NAME", &mut self.index_name)?;
        overlay(&lookup, "INDEXING", &mut self.indexing)?;
        overlay(&lookup, "EMBEDDING_BACKEND", &mut self.embedding_backend)?;
        overlay(&lookup, "EMBEDDING_MODEL", &mut self.embedding_model)?;
        overlay(&lookup, "EMBEDDING_DIMENSIONS", &mut self.embedding_dimensions)?;
        overlay(&lookup, "MEMORY_TTL", &mut self.memory_ttl)?;
        overlay(&lookup, "CHUNK_SIZE", &mut self.chunk_size)?;
        overlay(&lookup, "CHUNK_OVERLAP", &mut self.chunk_overlap)?;
        overlay(&lookup, "CHUNKING", &mut self.chunking)?;
        overlay(&lookup, "TOP_K", &mut self.top_k)?;
        overlay(&lookup, "REQUEST_TIMEOUT_SECS", &mut self.request_timeout_secs)?;
        overlay(&lookup, "LOG_LEVEL", &mut self.log_level)?;
        overlay(&lookup, "STORAGE_BACKEND", &mut self.storage)?;

        if let Some(value) = lookup("MEMORY_MAX_MESSAGES") {
            self.memory_max_messages = match value.trim() {
                "" => None,
                n => Some(parse("MEMORY_MAX_MESSAGES", n)?),
            };
        }

        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(())
    }

    /// Reject inconsistent settings before any backend is built.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| -> Result<()> { Err(SettingsError::Invalid(message.to_string())) };

        if self.chunk_size == 0 {
            return invalid("chunk_size must be greater than 0");
        }
        if self.chunk_overlap >= self.chunk_size {
            return invalid("chunk_overlap must be less than chunk_size");
        }
        if self.top_k == 0 {
            return invalid("top_k must be greater than 0");
        }
        if !(0.0..=2.0).contains(&self.redis_distance_threshold) {
            return invalid("redis_distance_threshold must be between 0 and 2");
        }
        if self.redis_cache_ttl == 0 || self.memory_ttl == 0 {
            return invalid("redis_cache_ttl and memory_ttl must be greater than 0");
        }
        if self.request_timeout_secs == 0 {
            return invalid("request_timeout_secs must be greater than 0");
        }
        if self.memory_max_messages == Some(0) {
            return invalid("memory_max_messages must be greater than 0 when set");
        }
        if self.embedding_dimensions == 0 {
            return invalid("embedding_dimensions must be greater than 0");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn memory_ttl(&self) -> Duration {
        Duration::from_secs(self.memory_ttl)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.redis_cache_ttl)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
