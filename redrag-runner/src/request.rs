use serde::{Deserialize, Serialize};

/// Session used when the caller does not name one.
pub const DEFAULT_SESSION: &str = "default";

fn default_session() -> String {
    DEFAULT_SESSION.to_string()
}

fn enabled() -> bool {
    true
}

/// One question and the features to use while answering it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default = "default_session")]
    pub session_id: String,
    /// Read the session transcript and record this exchange in it.
    #[serde(default = "enabled")]
    pub use_memory: bool,
    /// Retrieve context from the document store.
    #[serde(default = "enabled")]
    pub use_vector_search: bool,
    /// Answer through the semantic cache when one is configured.
    #[serde(default = "enabled")]
    pub use_cache: bool,
}

impl ChatRequest {
    /// A request for `question` in the default session with every feature on.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            session_id: default_session(),
            use_memory: true,
            use_vector_search: true,
            use_cache: true,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_memory(mut self, enabled: bool) -> Self {
        self.use_memory = enabled;
        self
    }

    pub fn with_vector_search(mut self, enabled: bool) -> Self {
        self.use_vector_search = enabled;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }
}

/// The answer and which features actually contributed to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub context_used: bool,
    pub memory_used: bool,
    pub model_used: String,
    pub success: bool,
}

impl ChatResponse {
    /// The apology returned when no answer could be produced.
    pub fn failure(error: impl std::fmt::Display, model_used: impl Into<String>) -> Self {
        Self {
            response: format!("I apologize, but I encountered an error: {error}"),
            context_used: false,
            memory_used: false,
            model_used: model_used.into(),
            success: false,
        }
    }
}
