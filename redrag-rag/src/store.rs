//! Vector store gateway.
//!
//! The [`DocumentStore`] composes an [`EmbeddingProvider`] and a
//! [`VectorStore`] over one named index and exposes document-level operations:
//! embed → upsert for ingestion, embed → search for retrieval.
//!
//! Every operation comes in two flavours. The `try_*` methods return typed
//! [`Result`]s so callers can tell "no results" from "backend down". The plain
//! methods are fail-soft: they log the error and return an empty result.
//!
//! # Example
//!
//! ```rust,ignore
//! use redrag_rag::{DocumentStore, InMemoryVectorStore};
//!
//! let store = DocumentStore::builder()
//!     .index_name("documents")
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! store.ensure_index().await?;
//! store.add_documents(&documents).await;
//! let hits = store.similarity_search_with_score("what is redis?", 3).await;
//! ```

use std::sync::Arc;

use redrag_core::EmbeddingProvider;
use tracing::{error, info};
use uuid::Uuid;

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Document-level gateway over one vector index.
#[derive(Clone)]
pub struct DocumentStore {
    index_name: String,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl DocumentStore {
    /// Create a new [`DocumentStoreBuilder`].
    pub fn builder() -> DocumentStoreBuilder {
        DocumentStoreBuilder::default()
    }

    /// The name of the index this gateway reads and writes.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Create the index if it does not exist yet.
    ///
    /// The index is created with the dimensionality reported by the
    /// configured [`EmbeddingProvider`].
    pub async fn ensure_index(&self) -> Result<()> {
        let dimensions = self.embedding_provider.dimensions();
        self.vector_store.create_collection(&self.index_name, dimensions).await.map_err(|e| {
            error!(index = %self.index_name, error = %e, "failed to create index");
            RagError::PipelineError(format!("failed to create index '{}': {e}", self.index_name))
        })
    }

    /// Drop the index together with every stored document.
    ///
    /// Dropping an index that does not exist succeeds.
    pub async fn drop_index(&self) -> Result<()> {
        self.vector_store.delete_collection(&self.index_name).await.map_err(|e| {
            error!(index = %self.index_name, error = %e, "failed to drop index");
            RagError::PipelineError(format!("failed to drop index '{}': {e}", self.index_name))
        })?;
        info!(index = %self.index_name, "dropped index");
        Ok(())
    }

    /// Embed and store `documents`, returning the stored chunks.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] if the index cannot be created or
    /// embedding or storage fails.
    pub async fn try_add_documents(&self, documents: &[Document]) -> Result<Vec<Chunk>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        self.ensure_index().await?;

        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(error = %e, "embedding failed during ingestion");
            RagError::PipelineError(format!("embedding failed: {e}"))
        })?;

        if embeddings.len() != documents.len() {
            return Err(RagError::PipelineError(format!(
                "embedding provider returned {} vectors for {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        let chunks: Vec<Chunk> = documents
            .iter()
            .zip(embeddings)
            .map(|(document, embedding)| Chunk {
                id: Uuid::new_v4().to_string(),
                text: document.content.clone(),
                embedding,
                metadata: document.metadata.clone(),
            })
            .collect();

        self.vector_store.upsert(&self.index_name, &chunks).await.map_err(|e| {
            error!(index = %self.index_name, error = %e, "upsert failed during ingestion");
            RagError::PipelineError(format!("upsert failed: {e}"))
        })?;

        info!(count = chunks.len(), "added documents to vector store");
        Ok(chunks)
    }

    /// Fail-soft [`try_add_documents`](Self::try_add_documents): returns the
    /// number of documents stored, `0` on failure.
    pub async fn add_documents(&self, documents: &[Document]) -> usize {
        match self.try_add_documents(documents).await {
            Ok(chunks) => chunks.len(),
            Err(e) => {
                error!(error = %e, "error adding documents");
                0
            }
        }
    }

    /// Retrieve the `top_k` documents most similar to `query` with their
    /// cosine similarity, most relevant first.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] if embedding or search fails.
    pub async fn try_similarity_search_with_score(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<(Document, f32)>> {
        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            RagError::PipelineError(format!("query embedding failed: {e}"))
        })?;

        let results =
            self.vector_store.search(&self.index_name, &query_embedding, top_k).await.map_err(
                |e| {
                    error!(index = %self.index_name, error = %e, "vector store search failed");
                    RagError::PipelineError(format!(
                        "search failed in index '{}': {e}",
                        self.index_name
                    ))
                },
            )?;

        info!(result_count = results.len(), "found similar documents");
        Ok(results.into_iter().map(|r| (r.chunk.into_document(), r.score)).collect())
    }

    /// Like [`try_similarity_search_with_score`](Self::try_similarity_search_with_score)
    /// without the scores.
    pub async fn try_similarity_search(&self, query: &str, top_k: usize) -> Result<Vec<Document>> {
        let scored = self.try_similarity_search_with_score(query, top_k).await?;
        Ok(scored.into_iter().map(|(document, _)| document).collect())
    }

    /// Fail-soft similarity search: empty on failure.
    pub async fn similarity_search(&self, query: &str, top_k: usize) -> Vec<Document> {
        self.try_similarity_search(query, top_k).await.unwrap_or_else(|e| {
            error!(error = %e, "error in similarity search");
            Vec::new()
        })
    }

    /// Fail-soft similarity search with scores: empty on failure.
    pub async fn similarity_search_with_score(
        &self,
        query: &str,
        top_k: usize,
    ) -> Vec<(Document, f32)> {
        self.try_similarity_search_with_score(query, top_k).await.unwrap_or_else(|e| {
            error!(error = %e, "error in similarity search with score");
            Vec::new()
        })
    }

    /// Whether the vector store backend answers.
    pub async fn is_connected(&self) -> bool {
        self.vector_store.ping().await.is_ok()
    }
}

/// Builder for constructing a [`DocumentStore`].
///
/// All fields are required. Call [`build()`](DocumentStoreBuilder::build)
/// to validate and produce the gateway.
#[derive(Default)]
pub struct DocumentStoreBuilder {
    index_name: Option<String>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
}

impl DocumentStoreBuilder {
    /// Set the index (collection) name.
    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Build the [`DocumentStore`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<DocumentStore> {
        let index_name = self
            .index_name
            .ok_or_else(|| RagError::ConfigError("index_name is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;

        Ok(DocumentStore { index_name, embedding_provider, vector_store })
    }
}
