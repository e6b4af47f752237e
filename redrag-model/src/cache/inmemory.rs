//! Process-local semantic cache.
//!
//! Entries expire on the tokio clock, so tests can advance time.

use std::sync::Arc;

use async_trait::async_trait;
use redrag_core::{EmbeddingProvider, cosine_similarity};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::{CacheConfig, SemanticCache};
use crate::error::Result;

#[derive(Debug)]
struct Entry {
    question: String,
    llm_id: String,
    embedding: Vec<f32>,
    response: String,
    expires_at: Instant,
}

/// A [`SemanticCache`] kept in process memory, searched by brute force.
pub struct InMemorySemanticCache {
    embedder: Arc<dyn EmbeddingProvider>,
    config: CacheConfig,
    entries: RwLock<Vec<Entry>>,
}

impl InMemorySemanticCache {
    /// An empty cache that embeds questions with `embedder`.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: CacheConfig) -> Self {
        Self { embedder, config, entries: RwLock::new(Vec::new()) }
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().await.iter().filter(|e| e.expires_at > now).count()
    }

    /// Whether no live entries remain.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SemanticCache for InMemorySemanticCache {
    async fn lookup(&self, question: &str, llm_id: &str) -> Result<Option<String>> {
        let query = self.embedder.embed(question).await?;
        let now = Instant::now();
        let entries = self.entries.read().await;

        let nearest = entries
            .iter()
            .filter(|e| e.llm_id == llm_id && e.expires_at > now)
            .map(|e| (1.0 - cosine_similarity(&e.embedding, &query), e))
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(match nearest {
            Some((distance, entry)) if distance <= self.config.distance_threshold => {
                debug!(distance, llm_id, "semantic cache hit");
                Some(entry.response.clone())
            }
            _ => None,
        })
    }

    async fn store(&self, question: &str, llm_id: &str, response: &str) -> Result<()> {
        let embedding = self.embedder.embed(question).await?;
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        entries.retain(|e| e.expires_at > now && !(e.question == question && e.llm_id == llm_id));
        entries.push(Entry {
            question: question.to_string(),
            llm_id: llm_id.to_string(),
            embedding,
            response: response.to_string(),
            expires_at: now + self.config.ttl,
        });
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}
