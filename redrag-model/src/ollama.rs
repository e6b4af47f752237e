//! Ollama text generation via `/api/generate`.
//!
//! # Example
//!
//! ```rust,ignore
//! use redrag_core::Llm;
//! use redrag_model::{OllamaConfig, OllamaLlm};
//!
//! let llm = OllamaLlm::new(
//!     OllamaConfig::new("http://localhost:11434", "llama2")
//!         .with_temperature(0.7)
//!         .with_max_tokens(1000),
//! );
//! let answer = llm.invoke("Why is the sky blue?").await?;
//! ```

use async_trait::async_trait;
use redrag_core::{CoreError, Llm, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Connection and sampling settings for [`OllamaLlm`].
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Server root, e.g. `http://localhost:11434`.
    pub base_url: String,
    /// Model tag to generate with, e.g. `llama2`.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens (`num_predict`).
    pub max_tokens: u32,
}

impl OllamaConfig {
    /// Settings for `model` on the server at `base_url`, with temperature
    /// 0.7 and at most 1000 generated tokens.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), model: model.into(), temperature: 0.7, max_tokens: 1000 }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the generated token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// An [`Llm`] backed by a local Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: reqwest::Client,
    endpoint: String,
    config: OllamaConfig,
}

impl OllamaLlm {
    /// Create a client with a default HTTP client.
    pub fn new(config: OllamaConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_client(config: OllamaConfig, client: reqwest::Client) -> Self {
        let endpoint = format!("{}/api/generate", config.base_url.trim_end_matches('/'));
        Self { client, endpoint, config }
    }

    fn error(&self, message: impl Into<String>) -> CoreError {
        CoreError::Model { model: self.config.model.clone(), message: message.into() }
    }

    fn request<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[async_trait]
impl Llm for OllamaLlm {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.config.model, prompt_len = prompt.len(), "generating");

        let response =
            self.client.post(&self.endpoint).json(&self.request(prompt)).send().await.map_err(
                |e| {
                    error!(model = %self.config.model, error = %e, "request failed");
                    self.error(format!("request failed: {e}"))
                },
            )?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);
            error!(model = %self.config.model, %status, "API error");
            return Err(self.error(format!("API returned {status}: {detail}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| self.error(format!("failed to parse response: {e}")))?;
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_disables_streaming_and_sets_options() {
        let llm = OllamaLlm::new(
            OllamaConfig::new("http://ollama:11434/", "llama2").with_max_tokens(64),
        );
        assert_eq!(llm.endpoint, "http://ollama:11434/api/generate");

        let body = serde_json::to_value(llm.request("hi")).unwrap();
        assert_eq!(body["model"], "llama2");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 64);
    }

    #[tokio::test]
    async fn unreachable_server_is_a_model_error() {
        let llm = OllamaLlm::new(OllamaConfig::new("http://127.0.0.1:1", "llama2"));
        let err = llm.invoke("hello").await.unwrap_err();
        assert!(matches!(err, CoreError::Model { ref model, .. } if model == "llama2"));
    }
}
