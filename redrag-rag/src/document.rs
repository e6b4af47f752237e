//! Data types for documents, stored chunks, and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key-value metadata attached to a document.
pub type Metadata = HashMap<String, String>;

/// A unit of retrieval: a piece of text and its metadata.
///
/// Documents produced by [`DocumentService`](crate::DocumentService) always
/// carry `source` and `chunk_id` metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The text content.
    pub content: String,
    /// Key-value metadata.
    pub metadata: Metadata,
}

impl Document {
    /// Create a document from content and metadata.
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self { content: content.into(), metadata }
    }
}

/// A [`Document`] as persisted in a vector store, with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique storage identifier.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
    /// Metadata carried over from the document.
    pub metadata: Metadata,
}

impl Chunk {
    /// Drop the storage id and embedding, keeping content and metadata.
    pub fn into_document(self) -> Document {
        Document { content: self.text, metadata: self.metadata }
    }
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity (higher is more relevant).
    pub score: f32,
}
