//! The retrieval-augmented answer pipeline.
//!
//! For each [`ChatRequest`] the runner, in order:
//!
//! 1. retrieves the `top_k` most similar documents (if vector search is on)
//! 2. reads the session's history text (if memory is on)
//! 3. renders the prompt and invokes the model, or answers from the semantic
//!    cache when the same question was answered recently (if the cache is on)
//! 4. records the question and answer in the session (if memory is on)
//!
//! Only step 4 mutates state, and it runs only after a successful answer.

use std::sync::Arc;
use std::time::Instant;

use redrag_core::Llm;
use redrag_memory::{Role, SessionMemory};
use redrag_model::CachedLlm;
use redrag_rag::DocumentStore;
use tracing::{error, info, warn};

use crate::error::{Result, RunnerError};
use crate::prompt::build_prompt;
use crate::request::{ChatRequest, ChatResponse};

/// Number of documents retrieved per question unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 10;

/// Answers questions using retrieved context and session memory.
#[derive(Clone)]
pub struct RagRunner {
    document_store: DocumentStore,
    memory: SessionMemory,
    llm: Arc<dyn Llm>,
    cached_llm: Option<CachedLlm>,
    top_k: usize,
}

impl RagRunner {
    pub fn builder() -> RagRunnerBuilder {
        RagRunnerBuilder::default()
    }

    /// The model reported in responses.
    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    pub fn document_store(&self) -> &DocumentStore {
        &self.document_store
    }

    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    /// Answer `request`, returning why it failed if no answer was produced.
    ///
    /// Retrieval failures do not fail the request; they leave the context
    /// empty and `context_used` false.
    pub async fn try_generate(&self, request: &ChatRequest) -> Result<ChatResponse> {
        if request.question.trim().is_empty() {
            return Err(RunnerError::EmptyQuestion);
        }
        let question = request.question.as_str();

        let (context, context_used) = if request.use_vector_search {
            self.retrieve_context(question).await
        } else {
            (String::new(), false)
        };

        let chat_history = if request.use_memory {
            self.memory.get_history_text(&request.session_id).await
        } else {
            String::new()
        };

        let prompt = build_prompt(&context, &chat_history, question);
        let response = match (&self.cached_llm, request.use_cache) {
            (Some(cached), true) => cached.answer(question, &prompt).await?,
            _ => self.llm.invoke(&prompt).await?,
        };

        if request.use_memory {
            self.memory.add_message(&request.session_id, Role::Human, question).await;
            self.memory.add_message(&request.session_id, Role::System, &response).await;
        }

        Ok(ChatResponse {
            response,
            context_used,
            memory_used: request.use_memory,
            model_used: self.llm.model_name().to_string(),
            success: true,
        })
    }

    /// Fail-soft [`try_generate`](Self::try_generate): failures become an
    /// apology with `success: false`.
    pub async fn generate(&self, request: &ChatRequest) -> ChatResponse {
        let started = Instant::now();
        match self.try_generate(request).await {
            Ok(response) => {
                info!(
                    session_id = %request.session_id,
                    context_used = response.context_used,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "generated response"
                );
                response
            }
            Err(e) => {
                error!(session_id = %request.session_id, error = %e, "error in RAG response");
                ChatResponse::failure(e, self.llm.model_name())
            }
        }
    }

    async fn retrieve_context(&self, question: &str) -> (String, bool) {
        match self.document_store.try_similarity_search(question, self.top_k).await {
            Ok(documents) => {
                let context = documents
                    .iter()
                    .map(|d| d.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                (context, true)
            }
            Err(e) => {
                warn!(error = %e, "retrieval failed, answering without context");
                (String::new(), false)
            }
        }
    }
}

/// Builder for [`RagRunner`].
///
/// The document store, session memory, and model are required. The cached
/// model and `top_k` are optional.
#[derive(Default)]
pub struct RagRunnerBuilder {
    document_store: Option<DocumentStore>,
    memory: Option<SessionMemory>,
    llm: Option<Arc<dyn Llm>>,
    cached_llm: Option<CachedLlm>,
    top_k: Option<usize>,
}

impl RagRunnerBuilder {
    pub fn document_store(mut self, store: DocumentStore) -> Self {
        self.document_store = Some(store);
        self
    }

    pub fn memory(mut self, memory: SessionMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Cache consulted when a request asks for it, usually wrapping the same
    /// model passed to [`llm`](Self::llm). Entries are keyed on the question.
    pub fn cached_llm(mut self, cached: CachedLlm) -> Self {
        self.cached_llm = Some(cached);
        self
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if a required component is missing or
    /// `top_k` is zero.
    pub fn build(self) -> Result<RagRunner> {
        let document_store = self
            .document_store
            .ok_or_else(|| RunnerError::Config("document_store is required".to_string()))?;
        let memory =
            self.memory.ok_or_else(|| RunnerError::Config("memory is required".to_string()))?;
        let llm = self.llm.ok_or_else(|| RunnerError::Config("llm is required".to_string()))?;
        let top_k = self.top_k.unwrap_or(DEFAULT_TOP_K);
        if top_k == 0 {
            return Err(RunnerError::Config("top_k must be greater than 0".to_string()));
        }

        Ok(RagRunner { document_store, memory, llm, cached_llm: self.cached_llm, top_k })
    }
}
