//! # redrag-model
//!
//! Text generation for redrag.
//!
//! - [`OllamaLlm`] - a local Ollama server (`/api/generate`)
//! - [`CachedLlm`] - fronts any [`Llm`](redrag_core::Llm) with a [`SemanticCache`]
//!   keyed on the question
//! - [`RedisSemanticCache`] / [`InMemorySemanticCache`] - cache backends keyed
//!   by question embedding
//! - [`CacheService`] - fail-soft cache administration
//! - [`MockLlm`] - scripted model for tests and offline runs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use redrag_model::{CacheConfig, CachedLlm, InMemorySemanticCache, OllamaConfig, OllamaLlm};
//!
//! let llm = Arc::new(OllamaLlm::new(OllamaConfig::new("http://localhost:11434", "llama2")));
//! let cache = Arc::new(InMemorySemanticCache::new(embedder, CacheConfig::default()));
//! let cached = CachedLlm::new(llm, cache);
//! let answer = cached.answer("What is Redis?", &prompt).await?;
//! ```

pub mod cache;
pub mod cached;
pub mod error;
pub mod mock;
pub mod ollama;
pub mod service;

pub use cache::{CacheConfig, InMemorySemanticCache, RedisSemanticCache, SemanticCache};
pub use cached::CachedLlm;
pub use error::{ModelError, Result};
pub use mock::MockLlm;
pub use ollama::{OllamaConfig, OllamaLlm};
pub use service::CacheService;
