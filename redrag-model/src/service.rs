//! Cache administration for the HTTP layer.

use std::sync::Arc;

use tracing::{error, info};

use crate::cache::SemanticCache;

/// Fail-soft administration of a [`SemanticCache`].
#[derive(Clone)]
pub struct CacheService {
    cache: Arc<dyn SemanticCache>,
}

impl CacheService {
    /// Administer `cache`.
    pub fn new(cache: Arc<dyn SemanticCache>) -> Self {
        Self { cache }
    }

    /// Drop every cached response. Returns `false` if the backend failed.
    pub async fn clear_cache(&self) -> bool {
        match self.cache.clear().await {
            Ok(()) => {
                info!("semantic cache cleared");
                true
            }
            Err(e) => {
                error!(error = %e, "error clearing cache");
                false
            }
        }
    }

    /// Whether the cache backend answers.
    pub async fn is_connected(&self) -> bool {
        self.cache.ping().await.is_ok()
    }
}
