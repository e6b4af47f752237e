//! Semantic response cache.
//!
//! Entries are keyed by the embedding of the question, so a lookup hits when a
//! previously answered question is close enough in meaning, not only when the
//! text matches exactly. Entries are scoped to the model that produced them.

mod inmemory;
mod redis_store;

use std::time::Duration;

use async_trait::async_trait;

pub use self::inmemory::InMemorySemanticCache;
pub use self::redis_store::RedisSemanticCache;
use crate::error::Result;

/// Matching and expiry settings shared by the cache backends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheConfig {
    /// Maximum cosine distance (`1 - similarity`) for a hit.
    pub distance_threshold: f32,
    /// How long an entry lives after it is stored.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { distance_threshold: 0.2, ttl: Duration::from_secs(3600) }
    }
}

/// A store of previous model responses looked up by question similarity.
#[async_trait]
pub trait SemanticCache: Send + Sync {
    /// The cached response for the nearest question answered by `llm_id`, if
    /// it is within the distance threshold and has not expired.
    async fn lookup(&self, question: &str, llm_id: &str) -> Result<Option<String>>;

    /// Remember `response` as the answer `llm_id` gave to `question`.
    async fn store(&self, question: &str, llm_id: &str, response: &str) -> Result<()>;

    /// Drop every entry. Clearing an empty cache succeeds.
    async fn clear(&self) -> Result<()>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
