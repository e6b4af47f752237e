//! # redrag-rag
//!
//! Retrieval for redrag: chunking, embeddings and vector search.
//!
//! ## Overview
//!
//! - [`DocumentService`] - splits raw texts into overlapping, metadata-tagged [`Document`]s
//! - [`DocumentStore`] - embeds documents into a vector index and runs similarity search
//! - [`VectorStore`] - storage backends: [`RedisVectorStore`] (RediSearch) and
//!   [`InMemoryVectorStore`]
//! - [`OllamaEmbeddingProvider`] - embeddings from a local Ollama server
//! - `FastEmbedProvider` - in-process ONNX embeddings (feature `fastembed`)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use redrag_core::RedisHandle;
//! use redrag_rag::{DocumentService, DocumentStore, IndexAlgorithm, OllamaEmbeddingProvider, RedisVectorStore};
//!
//! let handle = RedisHandle::open("redis://localhost:6379")?;
//! let store = DocumentStore::builder()
//!     .index_name("documents")
//!     .embedding_provider(Arc::new(OllamaEmbeddingProvider::default()))
//!     .vector_store(Arc::new(RedisVectorStore::new(handle, IndexAlgorithm::Hnsw)))
//!     .build()?;
//!
//! let documents = DocumentService::default().sample_documents();
//! store.add_documents(&documents).await;
//! let hits = store.similarity_search("what is redis?", 3).await;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod document_service;
pub mod error;
#[cfg(feature = "fastembed")]
pub mod fastembed;
pub mod inmemory;
pub mod ollama;
pub mod redis_store;
pub mod store;
pub mod vectorstore;

pub use chunking::{Chunker, FixedSizeChunker, RecursiveChunker};
pub use config::{ChunkingStrategy, IndexAlgorithm, RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, Metadata, SearchResult};
pub use document_service::DocumentService;
pub use error::{RagError, Result};
#[cfg(feature = "fastembed")]
pub use fastembed::FastEmbedProvider;
pub use inmemory::InMemoryVectorStore;
pub use ollama::{DEFAULT_OLLAMA_URL, OllamaEmbeddingProvider};
pub use redis_store::RedisVectorStore;
pub use store::{DocumentStore, DocumentStoreBuilder};
pub use vectorstore::VectorStore;
