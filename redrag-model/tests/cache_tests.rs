//! Semantic cache behaviour through the cached model layer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redrag_core::{EmbeddingProvider, Result as CoreResult};
use redrag_model::{
    CacheConfig, CacheService, CachedLlm, InMemorySemanticCache, MockLlm, ModelError,
    SemanticCache,
};

const KEYWORDS: &[&str] = &["redis", "python", "cache", "vector"];

/// Embeds text as keyword occurrence counts plus a small length component,
/// so near-duplicate questions land close together.
struct KeywordEmbedder;

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> CoreResult<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> =
            KEYWORDS.iter().map(|k| lower.matches(k).count() as f32).collect();
        vector.push(0.1);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        KEYWORDS.len() + 1
    }
}

fn cache() -> Arc<InMemorySemanticCache> {
    Arc::new(InMemorySemanticCache::new(Arc::new(KeywordEmbedder), CacheConfig::default()))
}

/// Renders a prompt whose bulk is the same for every question, the way
/// retrieved context and the system instruction dominate real prompts.
fn prompt_for(question: &str) -> String {
    format!(
        "System: answer using the context.\nContext: Redis is a cache. Python is a language.\nHuman: {question}"
    )
}

#[tokio::test]
async fn near_duplicate_question_skips_the_model() {
    let model = Arc::new(MockLlm::new("llama2").with_response("Redis is an in-memory store."));
    let cached = CachedLlm::new(model.clone(), cache());

    let first = cached.answer("What is Redis?", &prompt_for("What is Redis?")).await.unwrap();
    let second = cached.answer("what is redis??", &prompt_for("what is redis??")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(model.calls(), 1);
    assert_eq!(cached.model_name(), "llama2");
}

#[tokio::test]
async fn distinct_question_reaches_the_model() {
    let model = Arc::new(MockLlm::new("llama2"));
    let cached = CachedLlm::new(model.clone(), cache());

    cached.answer("Tell me about Redis", "Human: Tell me about Redis").await.unwrap();
    let answer = cached.answer("Tell me about Python", "Human: Tell me about Python").await.unwrap();

    assert_eq!(answer, "echo: Human: Tell me about Python");
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn shared_prompt_context_does_not_make_questions_collide() {
    let model = Arc::new(MockLlm::new("llama2"));
    let cached = CachedLlm::new(model.clone(), cache());

    let redis = cached.answer("What is Redis?", &prompt_for("What is Redis?")).await.unwrap();
    let python = cached
        .answer("How do I install Python?", &prompt_for("How do I install Python?"))
        .await
        .unwrap();

    assert_ne!(redis, python);
    assert!(python.ends_with("Human: How do I install Python?"));
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn model_sees_the_prompt_not_the_question() {
    let model = Arc::new(MockLlm::new("llama2"));
    let cached = CachedLlm::new(model.clone(), cache());

    cached.answer("What is Redis?", &prompt_for("What is Redis?")).await.unwrap();

    assert_eq!(model.prompts(), vec![prompt_for("What is Redis?")]);
}

#[tokio::test]
async fn entries_are_scoped_to_the_model() {
    let cache = cache();
    cache.store("What is Redis?", "llama2", "from llama").await.unwrap();

    assert_eq!(cache.lookup("What is Redis?", "llama2").await.unwrap().as_deref(), Some("from llama"));
    assert_eq!(cache.lookup("What is Redis?", "mistral").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn entries_expire() {
    let cache = Arc::new(InMemorySemanticCache::new(
        Arc::new(KeywordEmbedder),
        CacheConfig { ttl: Duration::from_secs(10), ..CacheConfig::default() },
    ));
    cache.store("What is Redis?", "llama2", "answer").await.unwrap();
    assert_eq!(cache.len().await, 1);

    tokio::time::advance(Duration::from_secs(11)).await;
    assert_eq!(cache.lookup("What is Redis?", "llama2").await.unwrap(), None);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn clear_cache_twice_succeeds() {
    let cache = cache();
    cache.store("What is Redis?", "llama2", "answer").await.unwrap();
    let service = CacheService::new(cache.clone());

    assert!(service.clear_cache().await);
    assert!(service.clear_cache().await);
    assert!(cache.is_empty().await);
    assert!(service.is_connected().await);
}

/// A cache whose backend is down.
struct DownCache;

#[async_trait]
impl SemanticCache for DownCache {
    async fn lookup(&self, _: &str, _: &str) -> redrag_model::Result<Option<String>> {
        Err(down())
    }

    async fn store(&self, _: &str, _: &str, _: &str) -> redrag_model::Result<()> {
        Err(down())
    }

    async fn clear(&self) -> redrag_model::Result<()> {
        Err(down())
    }
}

fn down() -> ModelError {
    ModelError::Cache { backend: "test".into(), message: "connection refused".into() }
}

#[tokio::test]
async fn cache_failures_fall_through_to_the_model() {
    let model = Arc::new(MockLlm::new("llama2").with_response("fresh"));
    let cached = CachedLlm::new(model.clone(), Arc::new(DownCache));

    assert_eq!(cached.answer("What is Redis?", "Human: What is Redis?").await.unwrap(), "fresh");
    assert_eq!(model.calls(), 1);
    assert!(!CacheService::new(Arc::new(DownCache)).clear_cache().await);
}

#[tokio::test]
async fn model_errors_are_not_cached() {
    let model = Arc::new(MockLlm::new("llama2").failing("model offline"));
    let cache = cache();
    let cached = CachedLlm::new(model.clone(), cache.clone());

    assert!(cached.answer("What is Redis?", "Human: What is Redis?").await.is_err());
    assert!(cache.is_empty().await);
}
