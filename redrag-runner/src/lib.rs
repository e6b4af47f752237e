//! # redrag-runner
//!
//! Orchestrates one retrieval-augmented answer: retrieve context, read the
//! session history, prompt the model, record the exchange.
//!
//! ```rust,ignore
//! use redrag_runner::{ChatRequest, RagRunner};
//!
//! let runner = RagRunner::builder()
//!     .document_store(store)
//!     .memory(memory)
//!     .llm(llm)
//!     .cached_llm(cached)
//!     .build()?;
//!
//! let answer = runner.generate(&ChatRequest::new("What is Redis?").with_session("s1")).await;
//! ```

pub mod error;
pub mod prompt;
pub mod request;
pub mod runner;

pub use error::{Result, RunnerError};
pub use prompt::build_prompt;
pub use request::{ChatRequest, ChatResponse, DEFAULT_SESSION};
pub use runner::{DEFAULT_TOP_K, RagRunner, RagRunnerBuilder};
