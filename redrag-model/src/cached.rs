//! Semantic caching in front of any [`Llm`].
//!
//! The cache key is the user's question, not the rendered prompt. Prompts
//! share the system instruction and usually most of the retrieved context,
//! so two unrelated questions would embed almost identically.

use std::sync::Arc;

use redrag_core::{Llm, Result};
use tracing::{debug, warn};

use crate::cache::SemanticCache;

/// A model fronted by a [`SemanticCache`] keyed on the question.
///
/// On a hit the inner model is not called. On a miss the inner model is
/// invoked with the full prompt and its answer stored under the question.
/// Cache failures are logged and treated as misses; only inner model errors
/// are returned.
#[derive(Clone)]
pub struct CachedLlm {
    inner: Arc<dyn Llm>,
    cache: Arc<dyn SemanticCache>,
}

impl CachedLlm {
    /// Front `inner` with `cache`.
    pub fn new(inner: Arc<dyn Llm>, cache: Arc<dyn SemanticCache>) -> Self {
        Self { inner, cache }
    }

    /// Name of the wrapped model; cache entries are scoped to it.
    pub fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    /// Answer `question`, rendering the model call from `prompt` on a miss.
    pub async fn answer(&self, question: &str, prompt: &str) -> Result<String> {
        let model = self.inner.model_name();

        match self.cache.lookup(question, model).await {
            Ok(Some(response)) => {
                debug!(model, "answered from semantic cache");
                return Ok(response);
            }
            Ok(None) => debug!(model, "semantic cache miss"),
            Err(e) => warn!(model, error = %e, "semantic cache lookup failed"),
        }

        let response = self.inner.invoke(prompt).await?;

        if let Err(e) = self.cache.store(question, model, &response).await {
            warn!(model, error = %e, "failed to store response in semantic cache");
        }
        Ok(response)
    }
}
