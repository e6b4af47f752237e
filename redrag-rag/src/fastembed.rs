//! Local ONNX embedding provider built on `fastembed`.
//!
//! Only available with the `fastembed` feature. The model is downloaded (or
//! loaded from `cache_dir`) when the provider is constructed, so a missing
//! model fails at startup rather than on the first request.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use redrag_core::{CoreError, EmbeddingProvider, Result};
use tracing::info;

const PROVIDER: &str = "fastembed";

/// An [`EmbeddingProvider`] running a sentence-transformer model in-process.
pub struct FastEmbedProvider {
    model: Arc<Mutex<TextEmbedding>>,
    model_id: String,
    dimensions: usize,
}

fn error(message: impl Into<String>) -> CoreError {
    CoreError::Embedding { provider: PROVIDER.into(), message: message.into() }
}

/// Map a model identifier to a fastembed model and its dimensionality.
fn resolve_model(model_id: &str) -> Result<(EmbeddingModel, usize)> {
    let name = model_id.rsplit('/').next().unwrap_or(model_id).to_ascii_lowercase();
    match name.as_str() {
        "all-minilm-l6-v2" | "all-minilm" => Ok((EmbeddingModel::AllMiniLML6V2, 384)),
        "all-minilm-l12-v2" => Ok((EmbeddingModel::AllMiniLML12V2, 384)),
        "bge-small-en-v1.5" => Ok((EmbeddingModel::BGESmallENV15, 384)),
        "bge-base-en-v1.5" => Ok((EmbeddingModel::BGEBaseENV15, 768)),
        _ => Err(error(format!("unsupported model '{model_id}'"))),
    }
}

impl FastEmbedProvider {
    /// Load `model_id` (e.g. `sentence-transformers/all-MiniLM-L6-v2`).
    pub fn new(model_id: &str, cache_dir: Option<PathBuf>) -> Result<Self> {
        let (model, dimensions) = resolve_model(model_id)?;
        let mut options = InitOptions::new(model);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        info!(model = model_id, "initializing embedding model");
        let embedder = TextEmbedding::try_new(options).map_err(|e| error(e.to_string()))?;
        info!(model = model_id, dimensions, "embedding model initialized");

        Ok(Self { model: Arc::new(Mutex::new(embedder)), model_id: model_id.to_string(), dimensions })
    }

    /// The identifier this provider was created with.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text]).await?.pop().ok_or_else(|| error("no embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || {
            let mut embedder = model.lock().map_err(|_| error("model lock poisoned"))?;
            embedder.embed(owned, None).map_err(|e| error(e.to_string()))
        })
        .await
        .map_err(|e| error(format!("embedding task failed: {e}")))?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
