//! Wiring of backends from [`Settings`].

use std::sync::Arc;

use anyhow::Context;
use redrag_core::{EmbeddingProvider, Llm, RedisHandle};
use redrag_memory::{ChatHistoryStore, InMemoryHistoryStore, RedisHistoryStore, SessionMemory};
use redrag_model::{
    CacheConfig, CacheService, CachedLlm, InMemorySemanticCache, OllamaConfig, OllamaLlm,
    RedisSemanticCache, SemanticCache,
};
use redrag_rag::{
    DocumentService, DocumentStore, InMemoryVectorStore, OllamaEmbeddingProvider, RagConfig,
    RedisVectorStore, VectorStore,
};
use redrag_runner::RagRunner;
use tracing::{info, warn};

use crate::server::AppState;
use crate::settings::{EmbeddingBackend, Settings, StorageBackend};

/// Everything the HTTP layer and startup seeding need.
pub struct Services {
    pub state: AppState,
    pub documents: DocumentService,
}

fn embedding_provider(
    settings: &Settings,
    client: reqwest::Client,
) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    match settings.embedding_backend {
        EmbeddingBackend::Ollama => Ok(Arc::new(
            OllamaEmbeddingProvider::new(&settings.ollama_base_url)
                .with_model(&settings.embedding_model)
                .with_dimensions(settings.embedding_dimensions)
                .with_client(client),
        )),
        #[cfg(feature = "fastembed")]
        EmbeddingBackend::Fastembed => {
            let _ = client;
            Ok(Arc::new(redrag_rag::FastEmbedProvider::new(&settings.embedding_model, None)?))
        }
        #[cfg(not(feature = "fastembed"))]
        EmbeddingBackend::Fastembed => {
            anyhow::bail!("EMBEDDING_BACKEND=fastembed requires the `fastembed` feature")
        }
    }
}

type Backends = (Arc<dyn VectorStore>, Arc<dyn ChatHistoryStore>, Arc<dyn SemanticCache>);

fn storage_backends(
    settings: &Settings,
    embedder: Arc<dyn EmbeddingProvider>,
) -> anyhow::Result<Backends> {
    let cache_config = CacheConfig {
        distance_threshold: settings.redis_distance_threshold,
        ttl: settings.cache_ttl(),
    };

    let backends: Backends = match settings.storage {
        StorageBackend::Redis => {
            let handle = RedisHandle::open(&settings.redis_url)
                .with_context(|| format!("invalid REDIS_URL '{}'", settings.redis_url))?;
            let vectors: Arc<dyn VectorStore> =
                Arc::new(RedisVectorStore::new(handle.clone(), settings.indexing));
            let history: Arc<dyn ChatHistoryStore> =
                Arc::new(RedisHistoryStore::new(handle.clone(), settings.memory_ttl()));
            let cache: Arc<dyn SemanticCache> =
                Arc::new(RedisSemanticCache::new(handle, embedder, cache_config));
            (vectors, history, cache)
        }
        StorageBackend::Memory => {
            let vectors: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
            let history: Arc<dyn ChatHistoryStore> =
                Arc::new(InMemoryHistoryStore::new(settings.memory_ttl()));
            let cache: Arc<dyn SemanticCache> =
                Arc::new(InMemorySemanticCache::new(embedder, cache_config));
            (vectors, history, cache)
        }
    };
    Ok(backends)
}

/// Session memory over `history`, windowed when `memory_max_messages` is set.
fn session_memory(settings: &Settings, history: Arc<dyn ChatHistoryStore>) -> SessionMemory {
    let memory = SessionMemory::new(history);
    match settings.memory_max_messages {
        Some(n) => memory.with_max_messages(n),
        None => memory,
    }
}

/// Build every gateway described by `settings`.
///
/// Redis connections are opened lazily, so this succeeds while Redis is down.
pub fn build_services(settings: &Settings) -> anyhow::Result<Services> {
    let rag = RagConfig::builder()
        .chunk_size(settings.chunk_size)
        .chunk_overlap(settings.chunk_overlap)
        .chunking(settings.chunking)
        .top_k(settings.top_k)
        .index_name(&settings.index_name)
        .indexing(settings.indexing)
        .build()?;

    let client = reqwest::Client::builder()
        .timeout(settings.request_timeout())
        .build()
        .context("failed to build HTTP client")?;

    let embedder = embedding_provider(settings, client.clone())?;
    let (vector_store, history, cache) = storage_backends(settings, embedder.clone())?;

    let document_store = DocumentStore::builder()
        .index_name(&rag.index_name)
        .embedding_provider(embedder)
        .vector_store(vector_store)
        .build()?;

    let llm: Arc<dyn Llm> = Arc::new(OllamaLlm::with_client(
        OllamaConfig::new(&settings.ollama_base_url, &settings.ollama_model)
            .with_temperature(settings.temperature)
            .with_max_tokens(settings.max_tokens),
        client,
    ));
    let cached_llm = CachedLlm::new(llm.clone(), cache.clone());

    let runner = RagRunner::builder()
        .document_store(document_store)
        .memory(session_memory(settings, history))
        .llm(llm)
        .cached_llm(cached_llm)
        .top_k(rag.top_k)
        .build()?;

    info!(
        storage = ?settings.storage,
        model = %settings.ollama_model,
        index = %rag.index_name,
        "all services initialized"
    );

    Ok(Services {
        state: AppState::new(runner, CacheService::new(cache)),
        documents: DocumentService::from_config(&rag),
    })
}

/// Ingest the sample corpus if the index has no documents yet.
///
/// Returns the number of documents added.
pub async fn seed_sample_documents(store: &DocumentStore, documents: &DocumentService) -> usize {
    if !store.is_connected().await {
        warn!("document store unreachable, skipping sample documents");
        return 0;
    }

    if store.similarity_search("test", 1).await.is_empty() {
        let added = store.add_documents(&documents.sample_documents()).await;
        info!(added, "documents initialized");
        added
    } else {
        info!("documents already exist, skipping initialization");
        0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use redrag_memory::Role;

    use super::*;

    #[tokio::test]
    async fn memory_window_follows_settings() {
        let history: Arc<dyn ChatHistoryStore> =
            Arc::new(InMemoryHistoryStore::new(Duration::from_secs(60)));
        let settings = Settings { memory_max_messages: Some(2), ..Settings::default() };
        let memory = session_memory(&settings, history.clone());

        memory.add_message("s1", Role::Human, "first").await;
        memory.add_message("s1", Role::System, "second").await;
        memory.add_message("s1", Role::Human, "third").await;

        assert_eq!(memory.get_history_text("s1").await, "system: second\nhuman: third");

        let unbounded = session_memory(&Settings::default(), history);
        assert_eq!(unbounded.get_history_text("s1").await.lines().count(), 3);
    }
}
