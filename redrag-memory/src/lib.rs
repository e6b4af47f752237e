//! # redrag-memory
//!
//! Conversation memory for redrag.
//!
//! A session is an append-only list of [`Message`]s that expires after a period
//! of inactivity. [`SessionMemory`] is the service the orchestrator talks to;
//! storage is pluggable through [`ChatHistoryStore`]:
//!
//! - [`RedisHistoryStore`] - one Redis list per session with `EXPIRE`
//! - [`InMemoryHistoryStore`] - process-local, for offline runs and tests

pub mod error;
pub mod inmemory;
pub mod message;
pub mod redis_store;
pub mod service;
pub mod store;

pub use error::{MemoryError, Result};
pub use inmemory::InMemoryHistoryStore;
pub use message::{Message, Role};
pub use redis_store::RedisHistoryStore;
pub use service::SessionMemory;
pub use store::ChatHistoryStore;
