//! # redrag-server
//!
//! HTTP API for redrag:
//!
//! | route | purpose |
//! |-------|---------|
//! | `GET /` | health and backend status |
//! | `POST /chat` | answer a question (query parameters) |
//! | `POST /clear-memory/{session_id}` | drop a session transcript |
//! | `POST /clear-cache` | drop every cached response |
//! | `GET /search` | similarity search over the document index |

pub mod app;
pub mod error;
pub mod server;
pub mod settings;
pub mod telemetry;

pub use app::{Services, build_services, seed_sample_documents};
pub use error::SettingsError;
pub use server::{ApiError, AppState, ServerConfig, app_router};
pub use settings::{EmbeddingBackend, Settings, StorageBackend};
pub use telemetry::init_tracing;
