//! Lazily connected Redis handle shared by the Redis-backed stores.
//!
//! [`RedisHandle::open`] only parses the URL. The first command establishes an
//! auto-reconnecting [`ConnectionManager`]; later commands reuse it. A Redis
//! outage at startup therefore surfaces as per-operation errors rather than a
//! failed boot.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::Result;

struct Inner {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
}

/// A cloneable handle to a single Redis deployment.
#[derive(Clone)]
pub struct RedisHandle {
    inner: Arc<Inner>,
}

impl fmt::Debug for RedisHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisHandle")
            .field("connected", &self.inner.connection.initialized())
            .finish_non_exhaustive()
    }
}

impl RedisHandle {
    /// Create a handle for `url` (e.g. `redis://localhost:6379`).
    ///
    /// No connection is made until the first command runs.
    pub fn open(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self { inner: Arc::new(Inner { client, connection: OnceCell::new() }) })
    }

    /// Return a connection, establishing it on first use.
    pub async fn connection(&self) -> Result<ConnectionManager> {
        let connection = self
            .inner
            .connection
            .get_or_try_init(|| async {
                debug!("opening redis connection");
                ConnectionManager::new(self.inner.client.clone()).await.inspect_err(|e| {
                    warn!(error = %e, "redis connection failed");
                })
            })
            .await?;
        Ok(connection.clone())
    }

    /// Round-trip a `PING` to check the server is reachable.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Encode an embedding as the little-endian `FLOAT32` blob RediSearch expects.
pub fn vector_to_bytes(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// One document returned by `FT.SEARCH`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// The Redis key of the matching hash.
    pub key: String,
    /// The fields requested with `RETURN`.
    pub fields: HashMap<String, String>,
}

/// Parse a RESP2 `FT.SEARCH` reply: `[total, key, [field, value, ...], key, ...]`.
///
/// Only string fields are supported; request vector fields out of the reply
/// with `RETURN`.
pub fn parse_search_reply(reply: &[redis::Value]) -> Result<Vec<SearchHit>> {
    let mut hits = Vec::new();
    let mut rest = reply.iter().skip(1);
    while let Some(key) = rest.next() {
        let key: String = redis::from_redis_value(key)?;
        let pairs: Vec<String> = match rest.next() {
            Some(value) => redis::from_redis_value(value)?,
            None => Vec::new(),
        };
        let fields = pairs
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect();
        hits.push(SearchHit { key, fields });
    }
    Ok(hits)
}
