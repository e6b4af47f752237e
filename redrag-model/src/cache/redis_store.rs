//! RediSearch-backed semantic cache.
//!
//! Entries are hashes under `{index}:{sha256(llm_id, question)}` holding the
//! question, the response, a `llm_hash` tag identifying the model, and the
//! question embedding. The index is created on first use and recreated after
//! [`clear`](SemanticCache::clear) drops it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use redrag_core::{EmbeddingProvider, RedisHandle, parse_search_reply, vector_to_bytes};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{CacheConfig, SemanticCache};
use crate::error::{ModelError, Result};

/// Default index name.
pub const DEFAULT_INDEX: &str = "llmcache";

const DISTANCE_FIELD: &str = "vector_distance";

/// A [`SemanticCache`] stored in Redis and searched with a KNN query.
pub struct RedisSemanticCache {
    handle: RedisHandle,
    embedder: Arc<dyn EmbeddingProvider>,
    config: CacheConfig,
    index: String,
    index_ready: AtomicBool,
}

impl RedisSemanticCache {
    pub fn new(handle: RedisHandle, embedder: Arc<dyn EmbeddingProvider>, config: CacheConfig) -> Self {
        Self {
            handle,
            embedder,
            config,
            index: DEFAULT_INDEX.to_string(),
            index_ready: AtomicBool::new(false),
        }
    }

    /// Use a different index name.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    fn key(&self, question: &str, llm_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(llm_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(question.as_bytes());
        format!("{}:{:x}", self.index, hasher.finalize())
    }

    async fn ensure_index(&self) -> Result<()> {
        if self.index_ready.load(Ordering::Acquire) {
            return Ok(());
        }

        let mut conn = self.handle.connection().await?;
        let created: redis::RedisResult<()> = redis::cmd("FT.CREATE")
            .arg(&self.index)
            .arg("ON")
            .arg("HASH")
            .arg("PREFIX")
            .arg(1)
            .arg(format!("{}:", self.index))
            .arg("SCHEMA")
            .arg("question")
            .arg("TEXT")
            .arg("NOINDEX")
            .arg("response")
            .arg("TEXT")
            .arg("NOINDEX")
            .arg("llm_hash")
            .arg("TAG")
            .arg("embedding")
            .arg("VECTOR")
            .arg("HNSW")
            .arg(6)
            .arg("TYPE")
            .arg("FLOAT32")
            .arg("DIM")
            .arg(self.embedder.dimensions())
            .arg("DISTANCE_METRIC")
            .arg("COSINE")
            .query_async(&mut conn)
            .await;

        match created {
            Ok(()) => debug!(index = %self.index, "created semantic cache index"),
            Err(e) if e.to_string().to_ascii_lowercase().contains("index already exists") => {}
            Err(e) => {
                return Err(ModelError::Cache { backend: "redis".into(), message: e.to_string() });
            }
        }

        self.index_ready.store(true, Ordering::Release);
        Ok(())
    }
}

fn llm_hash(llm_id: &str) -> String {
    format!("{:x}", Sha256::digest(llm_id.as_bytes()))
}

#[async_trait]
impl SemanticCache for RedisSemanticCache {
    async fn lookup(&self, question: &str, llm_id: &str) -> Result<Option<String>> {
        self.ensure_index().await?;
        let embedding = self.embedder.embed(question).await?;

        let mut conn = self.handle.connection().await?;
        let reply: Vec<redis::Value> = redis::cmd("FT.SEARCH")
            .arg(&self.index)
            .arg(format!(
                "(@llm_hash:{{{}}})=>[KNN 1 @embedding $vec AS {DISTANCE_FIELD}]",
                llm_hash(llm_id)
            ))
            .arg("PARAMS")
            .arg(2)
            .arg("vec")
            .arg(vector_to_bytes(&embedding))
            .arg("RETURN")
            .arg(2)
            .arg("response")
            .arg(DISTANCE_FIELD)
            .arg("DIALECT")
            .arg(2)
            .query_async(&mut conn)
            .await?;

        let Some(mut hit) = parse_search_reply(&reply)?.into_iter().next() else {
            return Ok(None);
        };
        let distance: f32 =
            hit.fields.get(DISTANCE_FIELD).and_then(|d| d.parse().ok()).unwrap_or(f32::MAX);

        if distance <= self.config.distance_threshold {
            debug!(distance, llm_id, "semantic cache hit");
            Ok(hit.fields.remove("response"))
        } else {
            Ok(None)
        }
    }

    async fn store(&self, question: &str, llm_id: &str, response: &str) -> Result<()> {
        self.ensure_index().await?;
        let embedding = self.embedder.embed(question).await?;
        let key = self.key(question, llm_id);
        let ttl = self.config.ttl.as_secs().max(1);

        let mut conn = self.handle.connection().await?;
        let () = redis::pipe()
            .atomic()
            .cmd("HSET")
            .arg(&key)
            .arg("question")
            .arg(question)
            .arg("response")
            .arg(response)
            .arg("llm_hash")
            .arg(llm_hash(llm_id))
            .arg("embedding")
            .arg(vector_to_bytes(&embedding))
            .ignore()
            .cmd("EXPIRE")
            .arg(&key)
            .arg(ttl)
            .ignore()
            .query_async(&mut conn)
            .await?;

        debug!(llm_id, "stored response in semantic cache");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.handle.connection().await?;
        let dropped: redis::RedisResult<()> =
            redis::cmd("FT.DROPINDEX").arg(&self.index).arg("DD").query_async(&mut conn).await;
        self.index_ready.store(false, Ordering::Release);

        match dropped {
            Ok(()) => Ok(()),
            Err(e) => {
                let message = e.to_string().to_ascii_lowercase();
                if message.contains("unknown index") || message.contains("no such index") {
                    Ok(())
                } else {
                    Err(ModelError::Cache { backend: "redis".into(), message: e.to_string() })
                }
            }
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(self.handle.ping().await?)
    }
}
