//! Text generation backend trait.

use async_trait::async_trait;

use crate::error::Result;

/// A generation backend that turns a fully assembled prompt into text.
///
/// Implementations hold no per-request state and are shared across requests
/// behind an `Arc<dyn Llm>`.
#[async_trait]
pub trait Llm: Send + Sync {
    /// The model identifier reported back to callers (e.g. `llama2`).
    fn model_name(&self) -> &str;

    /// Send `prompt` to the backend and return the generated text.
    async fn invoke(&self, prompt: &str) -> Result<String>;
}
