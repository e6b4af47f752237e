//! Redis list transcript store.
//!
//! Session `id` lives in the list `chat:{id}`, one JSON-encoded [`Message`]
//! per element. Every append refreshes the key's `EXPIRE`.

use std::time::Duration;

use async_trait::async_trait;
use redrag_core::RedisHandle;
use tracing::{debug, warn};

use crate::error::Result;
use crate::message::Message;
use crate::store::ChatHistoryStore;

const KEY_PREFIX: &str = "chat:";

/// A [`ChatHistoryStore`] backed by Redis lists.
#[derive(Debug, Clone)]
pub struct RedisHistoryStore {
    handle: RedisHandle,
    ttl: Duration,
}

impl RedisHistoryStore {
    pub fn new(handle: RedisHandle, ttl: Duration) -> Self {
        Self { handle, ttl }
    }
}

fn session_key(session_id: &str) -> String {
    format!("{KEY_PREFIX}{session_id}")
}

/// Decode stored elements, skipping any that are not valid messages.
fn decode_messages(session_id: &str, raw: Vec<String>) -> Vec<Message> {
    raw.into_iter()
        .filter_map(|item| match serde_json::from_str(&item) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!(session_id, error = %e, "skipping undecodable message");
                None
            }
        })
        .collect()
}

#[async_trait]
impl ChatHistoryStore for RedisHistoryStore {
    async fn append(&self, session_id: &str, message: &Message) -> Result<()> {
        let key = session_key(session_id);
        let encoded = serde_json::to_string(message)?;
        let ttl = self.ttl.as_secs().max(1);

        let mut conn = self.handle.connection().await?;
        let () = redis::pipe()
            .atomic()
            .cmd("RPUSH")
            .arg(&key)
            .arg(encoded)
            .ignore()
            .cmd("EXPIRE")
            .arg(&key)
            .arg(ttl)
            .ignore()
            .query_async(&mut conn)
            .await?;

        debug!(session_id, role = %message.role, "appended message");
        Ok(())
    }

    async fn messages(&self, session_id: &str) -> Result<Vec<Message>> {
        let mut conn = self.handle.connection().await?;
        let raw: Vec<String> = redis::cmd("LRANGE")
            .arg(session_key(session_id))
            .arg(0)
            .arg(-1)
            .query_async(&mut conn)
            .await?;
        Ok(decode_messages(session_id, raw))
    }

    async fn clear(&self, session_id: &str) -> Result<()> {
        let mut conn = self.handle.connection().await?;
        let _removed: i64 =
            redis::cmd("DEL").arg(session_key(session_id)).query_async(&mut conn).await?;
        debug!(session_id, "cleared session transcript");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(self.handle.ping().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(session_key("abc"), "chat:abc");
    }

    #[test]
    fn undecodable_entries_are_skipped() {
        let good = serde_json::to_string(&Message::human("kept")).unwrap();
        let messages = decode_messages("s", vec!["garbage".to_string(), good]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Human);
    }
}
