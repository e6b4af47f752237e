//! Fail-soft session memory service.

use std::sync::Arc;

use tracing::{debug, error};

use crate::message::{Message, Role};
use crate::store::ChatHistoryStore;

/// Per-session conversation memory over a [`ChatHistoryStore`].
///
/// Storage failures are logged and never returned: reads degrade to an empty
/// transcript and writes are dropped.
#[derive(Clone)]
pub struct SessionMemory {
    store: Arc<dyn ChatHistoryStore>,
    max_messages: Option<usize>,
}

impl SessionMemory {
    /// Memory over `store` with no history window.
    pub fn new(store: Arc<dyn ChatHistoryStore>) -> Self {
        Self { store, max_messages: None }
    }

    /// Limit the history text to the most recent `n` messages.
    pub fn with_max_messages(mut self, n: usize) -> Self {
        self.max_messages = Some(n);
        self
    }

    /// Append a message to the session, creating it if needed.
    pub async fn add_message(&self, session_id: &str, role: Role, content: &str) {
        if let Err(e) = self.store.append(session_id, &Message::new(role, content)).await {
            error!(session_id, error = %e, "error adding message to memory");
        }
    }

    /// The session's messages, oldest first.
    pub async fn get_messages(&self, session_id: &str) -> Vec<Message> {
        self.store.messages(session_id).await.unwrap_or_else(|e| {
            error!(session_id, error = %e, "error getting messages");
            Vec::new()
        })
    }

    /// Drop the session's transcript. Clearing an unknown session is a no-op.
    pub async fn clear(&self, session_id: &str) {
        match self.store.clear(session_id).await {
            Ok(()) => debug!(session_id, "memory cleared"),
            Err(e) => error!(session_id, error = %e, "error clearing memory"),
        }
    }

    /// The transcript as `"{role}: {content}"` lines.
    pub async fn get_history_text(&self, session_id: &str) -> String {
        let messages = self.get_messages(session_id).await;
        let skip = self.max_messages.map_or(0, |n| messages.len().saturating_sub(n));
        messages[skip..]
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether the history backend answers.
    pub async fn is_connected(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::inmemory::InMemoryHistoryStore;

    fn memory() -> SessionMemory {
        SessionMemory::new(Arc::new(InMemoryHistoryStore::new(Duration::from_secs(1800))))
    }

    #[tokio::test]
    async fn history_text_is_chronological() {
        let memory = memory();
        memory.add_message("s1", Role::Human, "What is Redis?").await;
        memory.add_message("s1", Role::System, "An in-memory store.").await;

        assert_eq!(
            memory.get_history_text("s1").await,
            "human: What is Redis?\nsystem: An in-memory store."
        );
        assert_eq!(memory.get_history_text("other").await, "");
    }

    #[tokio::test]
    async fn max_messages_keeps_the_latest() {
        let memory = memory().with_max_messages(1);
        memory.add_message("s1", Role::Human, "first").await;
        memory.add_message("s1", Role::System, "second").await;

        assert_eq!(memory.get_history_text("s1").await, "system: second");
        assert_eq!(memory.get_messages("s1").await.len(), 2);
    }
}
