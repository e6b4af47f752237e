//! Retrieval tests for the document store over the in-memory backend.

use std::sync::Arc;

use async_trait::async_trait;
use redrag_core::{EmbeddingProvider, Result as CoreResult};
use redrag_rag::{DocumentService, DocumentStore, InMemoryVectorStore};

const KEYWORDS: &[&str] = &["python", "redis", "machine", "fastapi", "vector"];

/// Embeds text as keyword occurrence counts, so retrieval is predictable.
struct KeywordEmbedder;

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> CoreResult<Vec<f32>> {
        let lower = text.to_lowercase();
        Ok(KEYWORDS.iter().map(|k| lower.matches(k).count() as f32).collect())
    }

    fn dimensions(&self) -> usize {
        KEYWORDS.len()
    }
}

fn store(vector_store: Arc<InMemoryVectorStore>) -> DocumentStore {
    DocumentStore::builder()
        .index_name("documents")
        .embedding_provider(Arc::new(KeywordEmbedder))
        .vector_store(vector_store)
        .build()
        .unwrap()
}

#[tokio::test]
async fn sample_corpus_retrieves_redis_document_first() {
    let backend = Arc::new(InMemoryVectorStore::new());
    let store = store(backend.clone());
    let documents = DocumentService::default().sample_documents();

    assert_eq!(store.add_documents(&documents).await, 5);
    assert_eq!(backend.len("documents").await, Some(5));

    let results = store.similarity_search_with_score("redis", 3).await;
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0.metadata["topic"], "redis");
    assert!(results[0].1 > 0.99);
    assert!(results.windows(2).all(|w| w[0].1 >= w[1].1));

    let top = store.similarity_search("redis", 1).await;
    assert_eq!(top[0].metadata["source"], "redis_docs");
}

#[tokio::test]
async fn search_on_missing_index_is_fail_soft() {
    let store = store(Arc::new(InMemoryVectorStore::new()));

    assert!(store.similarity_search("redis", 3).await.is_empty());
    assert!(store.try_similarity_search("redis", 3).await.is_err());
}

#[tokio::test]
async fn adding_nothing_stores_nothing() {
    let backend = Arc::new(InMemoryVectorStore::new());
    let store = store(backend.clone());

    assert_eq!(store.add_documents(&[]).await, 0);
    assert_eq!(backend.len("documents").await, None);
    assert!(store.is_connected().await);
}

#[tokio::test]
async fn ensure_index_is_idempotent() {
    let backend = Arc::new(InMemoryVectorStore::new());
    let store = store(backend.clone());
    let documents = DocumentService::default().sample_documents();

    store.add_documents(&documents[..1]).await;
    store.ensure_index().await.unwrap();
    assert_eq!(backend.len("documents").await, Some(1));

}

#[tokio::test]
async fn drop_index_removes_documents_and_tolerates_a_missing_index() {
    let backend = Arc::new(InMemoryVectorStore::new());
    let store = store(backend.clone());
    store.add_documents(&DocumentService::default().sample_documents()).await;

    store.drop_index().await.unwrap();
    assert_eq!(backend.len("documents").await, None);
    assert!(store.similarity_search("python", 1).await.is_empty());
    store.drop_index().await.unwrap();

    assert_eq!(store.add_documents(&DocumentService::default().sample_documents()).await, 5);
}

#[test]
fn builder_requires_every_field() {
    assert!(DocumentStore::builder().index_name("documents").build().is_err());
}
