//! HTTP routes.

use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use redrag_memory::SessionMemory;
use redrag_model::CacheService;
use redrag_rag::{DocumentStore, Metadata};
use redrag_runner::{ChatRequest, ChatResponse, RagRunner};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub runner: RagRunner,
    pub cache: CacheService,
}

impl AppState {
    pub fn new(runner: RagRunner, cache: CacheService) -> Self {
        Self { runner, cache }
    }

    fn document_store(&self) -> &DocumentStore {
        self.runner.document_store()
    }

    fn memory(&self) -> &SessionMemory {
        self.runner.memory()
    }
}

/// HTTP-level settings for [`app_router`].
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec!["http://localhost:3000".to_string()],
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// A JSON `{ "detail": ... }` error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, detail: detail.into() }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self { status: rejection.status(), detail: rejection.body_text() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

pub fn app_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/chat", post(chat))
        .route("/clear-memory/{session_id}", post(clear_memory))
        .route("/clear-cache", post(clear_cache))
        .route("/search", get(search))
        .with_state(state)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    let redis_service = state.document_store().is_connected().await;
    let cache_service = state.cache.is_connected().await;

    Json(json!({
        "message": "redrag retrieval-augmented generation service is running!",
        "status": "healthy",
        "services": {
            "redis_service": redis_service,
            "llm_service": !state.runner.model_name().is_empty(),
            "cache_service": cache_service,
        },
    }))
}

fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    if seconds < 60.0 {
        format!("{seconds:.2} seconds")
    } else {
        format!("{:.2} minutes", seconds / 60.0)
    }
}

async fn chat(
    State(state): State<AppState>,
    request: Result<Query<ChatRequest>, QueryRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Query(request) = request?;
    let started = Instant::now();
    let response = state.runner.generate(&request).await;

    let elapsed = format_elapsed(started.elapsed());
    if response.success {
        info!(session_id = %request.session_id, "chat executed in {elapsed}");
    } else {
        error!(session_id = %request.session_id, "chat failed after {elapsed}");
    }
    Ok(Json(response))
}

async fn clear_memory(State(state): State<AppState>, Path(session_id): Path<String>) -> Json<Value> {
    state.memory().clear(&session_id).await;
    Json(json!({ "message": format!("Memory cleared for session: {session_id}") }))
}

async fn clear_cache(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    if state.cache.clear_cache().await {
        Ok(Json(json!({ "message": "Cache cleared successfully" })))
    } else {
        Err(ApiError::internal("Failed to clear cache"))
    }
}

fn default_k() -> usize {
    redrag_runner::DEFAULT_TOP_K
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub content: String,
    pub metadata: Metadata,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
}

async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params?;
    let scored = state
        .document_store()
        .try_similarity_search_with_score(&params.query, params.k)
        .await
        .map_err(|e| {
            error!(error = %e, "error searching documents");
            ApiError::internal(e.to_string())
        })?;

    let results = scored
        .into_iter()
        .map(|(document, score)| SearchHit {
            content: document.content,
            metadata: document.metadata,
            score,
        })
        .collect();

    Ok(Json(SearchResponse { query: params.query, results }))
}
