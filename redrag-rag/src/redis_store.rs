//! Redis (RediSearch) vector store backend.
//!
//! Each collection is a RediSearch index over hashes whose keys start with
//! `{collection}:`. A hash holds the chunk text, its metadata as JSON, and the
//! embedding as a `FLOAT32` blob. Queries use KNN with cosine distance, which
//! is converted to similarity (`1 - distance`) so scores compare the same way
//! as the in-memory backend.
//!
//! Requires Redis Stack (or a Redis build with the search module).

use async_trait::async_trait;
use redrag_core::{RedisHandle, SearchHit, parse_search_reply, vector_to_bytes};
use tracing::debug;

use crate::config::IndexAlgorithm;
use crate::document::{Chunk, Metadata, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const DISTANCE_FIELD: &str = "vector_distance";

/// A [`VectorStore`] backed by RediSearch vector indexes.
#[derive(Debug, Clone)]
pub struct RedisVectorStore {
    handle: RedisHandle,
    algorithm: IndexAlgorithm,
}

impl RedisVectorStore {
    /// Create a store over `handle` using the given index algorithm.
    pub fn new(handle: RedisHandle, algorithm: IndexAlgorithm) -> Self {
        Self { handle, algorithm }
    }

    fn map_err(e: redis::RedisError) -> RagError {
        RagError::VectorStoreError { backend: "redis".to_string(), message: e.to_string() }
    }
}

fn key_prefix(collection: &str) -> String {
    format!("{collection}:")
}

fn index_exists(e: &redis::RedisError) -> bool {
    e.to_string().to_ascii_lowercase().contains("index already exists")
}

fn unknown_index(e: &redis::RedisError) -> bool {
    let message = e.to_string().to_ascii_lowercase();
    message.contains("unknown index") || message.contains("no such index")
}

/// Convert one `FT.SEARCH` hit into a [`SearchResult`].
fn hit_to_result(prefix: &str, hit: SearchHit) -> SearchResult {
    let SearchHit { key, mut fields } = hit;
    let id = key.strip_prefix(prefix).unwrap_or(&key).to_string();
    let text = fields.remove("content").unwrap_or_default();
    let metadata: Metadata = fields
        .remove("metadata")
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default();
    let distance: f32 =
        fields.get(DISTANCE_FIELD).and_then(|d| d.parse().ok()).unwrap_or(1.0);

    SearchResult { chunk: Chunk { id, text, embedding: Vec::new(), metadata }, score: 1.0 - distance }
}

#[async_trait]
impl VectorStore for RedisVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut conn = self.handle.connection().await?;
        let created: redis::RedisResult<()> = redis::cmd("FT.CREATE")
            .arg(name)
            .arg("ON")
            .arg("HASH")
            .arg("PREFIX")
            .arg(1)
            .arg(key_prefix(name))
            .arg("SCHEMA")
            .arg("content")
            .arg("TEXT")
            .arg("metadata")
            .arg("TEXT")
            .arg("NOINDEX")
            .arg("embedding")
            .arg("VECTOR")
            .arg(self.algorithm.as_str())
            .arg(6)
            .arg("TYPE")
            .arg("FLOAT32")
            .arg("DIM")
            .arg(dimensions)
            .arg("DISTANCE_METRIC")
            .arg("COSINE")
            .query_async(&mut conn)
            .await;

        match created {
            Ok(()) => {
                debug!(index = name, dimensions, algorithm = %self.algorithm, "created redis index");
                Ok(())
            }
            Err(e) if index_exists(&e) => {
                debug!(index = name, "redis index already exists, skipping creation");
                Ok(())
            }
            Err(e) => Err(Self::map_err(e)),
        }
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut conn = self.handle.connection().await?;
        let dropped: redis::RedisResult<()> =
            redis::cmd("FT.DROPINDEX").arg(name).arg("DD").query_async(&mut conn).await;
        match dropped {
            Ok(()) => Ok(()),
            Err(e) if unknown_index(&e) => Ok(()),
            Err(e) => Err(Self::map_err(e)),
        }
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let prefix = key_prefix(collection);
        let mut pipe = redis::pipe();
        for chunk in chunks {
            let metadata = serde_json::to_string(&chunk.metadata).map_err(|e| {
                RagError::VectorStoreError { backend: "redis".to_string(), message: e.to_string() }
            })?;
            pipe.cmd("HSET")
                .arg(format!("{prefix}{}", chunk.id))
                .arg("content")
                .arg(&chunk.text)
                .arg("metadata")
                .arg(metadata)
                .arg("embedding")
                .arg(vector_to_bytes(&chunk.embedding))
                .ignore();
        }

        let mut conn = self.handle.connection().await?;
        let () = pipe.query_async(&mut conn).await.map_err(Self::map_err)?;

        debug!(collection, count = chunks.len(), "upserted chunks to redis");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.handle.connection().await?;
        let reply: Vec<redis::Value> = redis::cmd("FT.SEARCH")
            .arg(collection)
            .arg(format!("*=>[KNN {top_k} @embedding $vec AS {DISTANCE_FIELD}]"))
            .arg("PARAMS")
            .arg(2)
            .arg("vec")
            .arg(vector_to_bytes(embedding))
            .arg("SORTBY")
            .arg(DISTANCE_FIELD)
            .arg("ASC")
            .arg("RETURN")
            .arg(3)
            .arg("content")
            .arg("metadata")
            .arg(DISTANCE_FIELD)
            .arg("LIMIT")
            .arg(0)
            .arg(top_k)
            .arg("DIALECT")
            .arg(2)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        let prefix = key_prefix(collection);
        let results: Vec<SearchResult> = parse_search_reply(&reply)?
            .into_iter()
            .map(|hit| hit_to_result(&prefix, hit))
            .collect();

        debug!(collection, count = results.len(), "redis knn search");
        Ok(results)
    }

    async fn ping(&self) -> Result<()> {
        Ok(self.handle.ping().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn hits_convert_distance_to_similarity() {
        let hit = SearchHit {
            key: "documents:abc".to_string(),
            fields: HashMap::from([
                ("content".to_string(), "Redis is fast".to_string()),
                ("metadata".to_string(), r#"{"topic":"redis"}"#.to_string()),
                (DISTANCE_FIELD.to_string(), "0.25".to_string()),
            ]),
        };

        let result = hit_to_result("documents:", hit);
        assert_eq!(result.chunk.id, "abc");
        assert_eq!(result.chunk.text, "Redis is fast");
        assert_eq!(result.chunk.metadata["topic"], "redis");
        assert!((result.score - 0.75).abs() < 1e-6);
    }

    #[test]
    fn malformed_metadata_degrades_to_empty() {
        let hit = SearchHit {
            key: "other".to_string(),
            fields: HashMap::from([("metadata".to_string(), "not json".to_string())]),
        };

        let result = hit_to_result("documents:", hit);
        assert_eq!(result.chunk.id, "other");
        assert!(result.chunk.metadata.is_empty());
        assert_eq!(result.score, 0.0);
    }
}
