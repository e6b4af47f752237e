//! In-memory transcript store with per-session expiry.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::Result;
use crate::message::Message;
use crate::store::ChatHistoryStore;

#[derive(Debug)]
struct Transcript {
    messages: Vec<Message>,
    expires_at: Instant,
}

/// A [`ChatHistoryStore`] kept in process memory.
///
/// Each append pushes the session's expiry `ttl` into the future. Expired
/// sessions read as empty and are dropped on the next write.
#[derive(Debug)]
pub struct InMemoryHistoryStore {
    sessions: RwLock<HashMap<String, Transcript>>,
    ttl: Duration,
}

impl InMemoryHistoryStore {
    /// An empty store whose sessions expire `ttl` after their last append.
    pub fn new(ttl: Duration) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), ttl }
    }

    /// Number of sessions that have not expired.
    pub async fn session_count(&self) -> usize {
        let now = Instant::now();
        self.sessions.read().await.values().filter(|t| t.expires_at > now).count()
    }
}

#[async_trait]
impl ChatHistoryStore for InMemoryHistoryStore {
    async fn append(&self, session_id: &str, message: &Message) -> Result<()> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, t| t.expires_at > now);

        let transcript = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Transcript { messages: Vec::new(), expires_at: now });
        transcript.messages.push(message.clone());
        transcript.expires_at = now + self.ttl;
        Ok(())
    }

    async fn messages(&self, session_id: &str) -> Result<Vec<Message>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .filter(|t| t.expires_at > Instant::now())
            .map(|t| t.messages.clone())
            .unwrap_or_default())
    }

    async fn clear(&self, session_id: &str) -> Result<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sessions_expire_after_inactivity() {
        let store = InMemoryHistoryStore::new(Duration::from_secs(60));
        store.append("s1", &Message::human("hello")).await.unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        store.append("s1", &Message::system("hi there")).await.unwrap();

        tokio::time::advance(Duration::from_secs(45)).await;
        assert_eq!(store.messages("s1").await.unwrap().len(), 2);

        tokio::time::advance(Duration::from_secs(16)).await;
        assert!(store.messages("s1").await.unwrap().is_empty());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = InMemoryHistoryStore::new(Duration::from_secs(60));
        store.append("a", &Message::human("for a")).await.unwrap();
        store.append("b", &Message::human("for b")).await.unwrap();

        store.clear("a").await.unwrap();
        assert!(store.messages("a").await.unwrap().is_empty());
        assert_eq!(store.messages("b").await.unwrap()[0].content, "for b");
    }
}
