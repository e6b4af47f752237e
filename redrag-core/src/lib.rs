//! Core traits and shared plumbing for redrag.
//!
//! This crate holds the seams every other redrag crate builds on:
//!
//! - [`EmbeddingProvider`] - turns text into fixed-dimension vectors
//! - [`Llm`] - sends a prompt to a generation backend and returns text
//! - [`RedisHandle`] - a lazily connected, shareable Redis connection
//! - [`CoreError`] - the error type shared by the traits above

pub mod connection;
pub mod embedding;
pub mod error;
pub mod llm;

pub use connection::{RedisHandle, SearchHit, parse_search_reply, vector_to_bytes};
pub use embedding::{EmbeddingProvider, cosine_similarity};
pub use error::{CoreError, Result};
pub use llm::Llm;
