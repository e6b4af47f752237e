//! Scripted [`Llm`] for tests and offline runs.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use redrag_core::{CoreError, Llm, Result};

#[derive(Debug, Clone)]
enum Behaviour {
    Echo,
    Fixed(String),
    Fail(String),
}

/// A mock model that records prompts and answers without a backend.
///
/// ```rust,ignore
/// let llm = MockLlm::new("mock").with_response("Redis is a data store.");
/// assert_eq!(llm.invoke("What is Redis?").await?, "Redis is a data store.");
/// assert_eq!(llm.calls(), 1);
/// ```
#[derive(Debug)]
pub struct MockLlm {
    name: String,
    behaviour: Behaviour,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockLlm {
    /// A mock that answers `"echo: {prompt}"`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behaviour: Behaviour::Echo,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `response`.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.behaviour = Behaviour::Fixed(response.into());
        self
    }

    /// Fail every call with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.behaviour = Behaviour::Fail(message.into());
        self
    }

    /// How many times the model was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn model_name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        match &self.behaviour {
            Behaviour::Echo => Ok(format!("echo: {prompt}")),
            Behaviour::Fixed(response) => Ok(response.clone()),
            Behaviour::Fail(message) => {
                Err(CoreError::Model { model: self.name.clone(), message: message.clone() })
            }
        }
    }
}
