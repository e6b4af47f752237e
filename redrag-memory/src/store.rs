//! Storage backend trait for session transcripts.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;

/// A backend holding one ordered message list per session.
///
/// Backends own expiry: a session that has not been appended to for the
/// configured time-to-live reads as empty.
#[async_trait]
pub trait ChatHistoryStore: Send + Sync {
    /// Append `message` to the end of the session's transcript and refresh
    /// its expiry.
    async fn append(&self, session_id: &str, message: &Message) -> Result<()>;

    /// All messages of the session, oldest first.
    async fn messages(&self, session_id: &str) -> Result<Vec<Message>>;

    /// Delete the session's transcript. Clearing an unknown session is not an error.
    async fn clear(&self, session_id: &str) -> Result<()>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
