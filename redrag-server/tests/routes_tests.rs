//! HTTP contract tests driving the router in-process.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use redrag_core::{CoreError, EmbeddingProvider, Result as CoreResult};
use redrag_memory::{InMemoryHistoryStore, SessionMemory};
use redrag_model::{
    CacheConfig, CacheService, CachedLlm, InMemorySemanticCache, MockLlm, ModelError,
    SemanticCache,
};
use redrag_rag::{DocumentService, DocumentStore, InMemoryVectorStore};
use redrag_runner::RagRunner;
use redrag_server::{AppState, ServerConfig, app_router, seed_sample_documents};
use serde_json::Value;
use tower::ServiceExt;

const KEYWORDS: &[&str] = &["python", "redis", "machine", "fastapi", "vector"];

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

struct OfflineEmbedder;

#[async_trait]
impl EmbeddingProvider for OfflineEmbedder {
    async fn embed(&self, _: &str) -> CoreResult<Vec<f32>> {
        Err(CoreError::Embedding { provider: "test".into(), message: "offline".into() })
    }

    fn dimensions(&self) -> usize {
        KEYWORDS.len() + 1
    }
}

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

struct TestApp {
    router: Router,
    llm: Arc<MockLlm>,
}

async fn test_app_with(
    embedder: Arc<dyn EmbeddingProvider>,
    cache: Arc<dyn SemanticCache>,
    llm: MockLlm,
) -> TestApp {
    let store = DocumentStore::builder()
        .index_name("documents")
        .embedding_provider(embedder)
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .build()
        .unwrap();
    seed_sample_documents(&store, &DocumentService::default()).await;

    let llm = Arc::new(llm);
    let runner = RagRunner::builder()
        .document_store(store)
        .memory(SessionMemory::new(Arc::new(InMemoryHistoryStore::new(Duration::from_secs(1800)))))
        .llm(llm.clone())
        .cached_llm(CachedLlm::new(llm.clone(), cache.clone()))
        .top_k(1)
        .build()
        .unwrap();

    let router = app_router(AppState::new(runner, CacheService::new(cache)), &ServerConfig::default());
    TestApp { router, llm }
}

async fn test_app() -> TestApp {
    let cache = Arc::new(InMemorySemanticCache::new(Arc::new(KeywordEmbedder), CacheConfig::default()));
    test_app_with(
        Arc::new(KeywordEmbedder),
        cache,
        MockLlm::new("llama2").with_response("Redis is an in-memory store."),
    )
    .await
}

async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn root_reports_health() {
    let app = test_app().await;
    let (status, body) = send(&app.router, "GET", "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["redis_service"], true);
    assert_eq!(body["services"]["llm_service"], true);
    assert_eq!(body["services"]["cache_service"], true);
}

#[tokio::test]
async fn chat_returns_the_response_shape() {
    let app = test_app().await;
    let (status, body) =
        send(&app.router, "POST", "/chat?question=What%20is%20Redis%3F&session_id=s1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Redis is an in-memory store.");
    assert_eq!(body["context_used"], true);
    assert_eq!(body["memory_used"], true);
    assert_eq!(body["model_used"], "llama2");
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn repeated_chat_is_served_from_cache() {
    let app = test_app().await;
    let uri = "/chat?question=What%20is%20Redis%3F&use_memory=false";

    send(&app.router, "POST", uri).await;
    let (_, body) = send(&app.router, "POST", uri).await;
    assert_eq!(body["success"], true);
    assert_eq!(app.llm.calls(), 1);

    send(&app.router, "POST", &format!("{uri}&use_cache=false")).await;
    assert_eq!(app.llm.calls(), 2);
}

#[tokio::test]
async fn chat_without_question_is_a_client_error() {
    let app = test_app().await;
    let (status, body) = send(&app.router, "POST", "/chat?session_id=s1").await;

    assert!(status.is_client_error());
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn failing_model_is_reported_in_the_body() {
    let cache = Arc::new(InMemorySemanticCache::new(Arc::new(KeywordEmbedder), CacheConfig::default()));
    let app = test_app_with(Arc::new(KeywordEmbedder), cache, MockLlm::new("llama2").failing("offline")).await;
    let (status, body) = send(&app.router, "POST", "/chat?question=hello").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["response"].as_str().unwrap().starts_with("I apologize"));
}

#[tokio::test]
async fn clear_memory_confirms_the_session() {
    let app = test_app().await;
    send(&app.router, "POST", "/chat?question=What%20is%20Redis%3F&session_id=s1").await;

    let (status, body) = send(&app.router, "POST", "/clear-memory/s1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Memory cleared for session: s1");

    send(&app.router, "POST", "/chat?question=Tell%20me%20more&session_id=s1&use_cache=false").await;
    let prompts = app.llm.prompts();
    assert!(!prompts.last().unwrap().contains("human: What is Redis?"));
}

#[tokio::test]
async fn clear_cache_succeeds_twice() {
    let app = test_app().await;
    for _ in 0..2 {
        let (status, body) = send(&app.router, "POST", "/clear-cache").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Cache cleared successfully");
    }
}

#[tokio::test]
async fn clear_cache_failure_is_a_server_error() {
    let app = test_app_with(Arc::new(KeywordEmbedder), Arc::new(DownCache), MockLlm::new("llama2")).await;
    let (status, body) = send(&app.router, "POST", "/clear-cache").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].is_string());

    let (_, root) = send(&app.router, "GET", "/").await;
    assert_eq!(root["services"]["cache_service"], true);
}

#[tokio::test]
async fn search_returns_scored_documents() {
    let app = test_app().await;
    let (status, body) = send(&app.router, "GET", "/search?query=redis&k=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "redis");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["metadata"]["topic"], "redis");
    assert!(results[0]["content"].as_str().unwrap().starts_with("Redis"));
    assert!(results[0]["score"].as_f64().unwrap() > results[1]["score"].as_f64().unwrap());
}

#[tokio::test]
async fn search_failure_is_a_server_error() {
    let cache = Arc::new(InMemorySemanticCache::new(Arc::new(KeywordEmbedder), CacheConfig::default()));
    let app = test_app_with(Arc::new(OfflineEmbedder), cache, MockLlm::new("llama2")).await;
    let (status, body) = send(&app.router, "GET", "/search?query=redis").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("offline"));
}
