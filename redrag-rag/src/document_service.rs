//! Turns raw text into indexable [`Document`]s.

use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::{Chunker, FixedSizeChunker, RecursiveChunker};
use crate::config::{ChunkingStrategy, RagConfig};
use crate::document::{Document, Metadata};
use crate::error::{RagError, Result};

/// Splits raw texts into overlapping chunks and attaches chunk metadata.
///
/// Every produced [`Document`] carries the caller's metadata plus:
/// - `chunk_id` - `"{text_index}_{chunk_index}"`, unique within one source text
/// - `source` - the caller's value, or `"text_{text_index}"` if absent
#[derive(Clone)]
pub struct DocumentService {
    chunker: Arc<dyn Chunker>,
}

impl Default for DocumentService {
    fn default() -> Self {
        let config = RagConfig::default();
        Self::new(config.chunk_size, config.chunk_overlap)
    }
}

impl DocumentService {
    /// Create a service using a [`RecursiveChunker`] with the given sizes.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunker: Arc::new(RecursiveChunker::new(chunk_size, chunk_overlap)) }
    }

    /// Create a service splitting with the size, overlap and strategy in `config`.
    pub fn from_config(config: &RagConfig) -> Self {
        let chunker: Arc<dyn Chunker> = match config.chunking {
            ChunkingStrategy::Recursive => {
                Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap))
            }
            ChunkingStrategy::Fixed => {
                Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap))
            }
        };
        Self { chunker }
    }

    /// Create a service using a custom chunking strategy.
    pub fn with_chunker(chunker: Arc<dyn Chunker>) -> Self {
        Self { chunker }
    }

    /// Split `texts` into documents.
    ///
    /// `metadatas`, when given, must have one entry per text.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ChunkingError`] if the metadata count does not
    /// match the text count.
    pub fn create_documents(
        &self,
        texts: &[String],
        metadatas: Option<&[Metadata]>,
    ) -> Result<Vec<Document>> {
        if let Some(metadatas) = metadatas {
            if metadatas.len() != texts.len() {
                return Err(RagError::ChunkingError(format!(
                    "got {} metadata entries for {} texts",
                    metadatas.len(),
                    texts.len()
                )));
            }
        }

        let empty = Metadata::new();
        let mut documents = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            let base = metadatas.map(|m| &m[i]).unwrap_or(&empty);
            let source = base.get("source").cloned().unwrap_or_else(|| format!("text_{i}"));

            for (j, chunk) in self.chunker.split_text(text).into_iter().enumerate() {
                let mut metadata = base.clone();
                metadata.insert("chunk_id".to_string(), format!("{i}_{j}"));
                metadata.insert("source".to_string(), source.clone());
                documents.push(Document::new(chunk, metadata));
            }
        }

        info!(documents = documents.len(), texts = texts.len(), "created documents from texts");
        Ok(documents)
    }

    /// Fail-soft variant of [`create_documents`](Self::create_documents):
    /// logs the error and returns an empty `Vec`.
    pub fn split(&self, texts: &[String], metadatas: Option<&[Metadata]>) -> Vec<Document> {
        self.create_documents(texts, metadatas).unwrap_or_else(|e| {
            error!(error = %e, "error creating documents");
            Vec::new()
        })
    }

    /// The built-in corpus used to bootstrap an empty vector store.
    pub fn sample_documents(&self) -> Vec<Document> {
        let texts: Vec<String> = SAMPLE_CORPUS.iter().map(|s| s.text.to_string()).collect();
        let metadatas: Vec<Metadata> = SAMPLE_CORPUS
            .iter()
            .map(|s| {
                Metadata::from([
                    ("source".to_string(), s.source.to_string()),
                    ("category".to_string(), s.category.to_string()),
                    ("topic".to_string(), s.topic.to_string()),
                ])
            })
            .collect();
        self.split(&texts, Some(metadatas.as_slice()))
    }
}

struct SampleText {
    source: &'static str,
    category: &'static str,
    topic: &'static str,
    text: &'static str,
}

const SAMPLE_CORPUS: &[SampleText] = &[
    SampleText {
        source: "python_guide",
        category: "programming",
        topic: "python",
        text: "Python is a high-level programming language known for its simplicity and readability. It's widely used in web development, data science, artificial intelligence, and automation. Python's syntax is clean and easy to learn, making it popular among beginners and experienced developers alike.",
    },
    SampleText {
        source: "redis_docs",
        category: "database",
        topic: "redis",
        text: "Redis is an in-memory data structure store that can be used as a database, cache, and message broker. It supports various data structures like strings, hashes, lists, sets, and sorted sets. Redis is known for its high performance and is commonly used for caching, session storage, and real-time analytics.",
    },
    SampleText {
        source: "ml_tutorial",
        category: "ai",
        topic: "machine_learning",
        text: "Machine learning is a subset of artificial intelligence that enables computers to learn and make decisions from data without being explicitly programmed. It involves algorithms that can identify patterns in data and make predictions or classifications. Common applications include image recognition, natural language processing, and recommendation systems.",
    },
    SampleText {
        source: "fastapi_docs",
        category: "programming",
        topic: "fastapi",
        text: "FastAPI is a modern, fast web framework for building APIs with Python 3.7+. It's based on standard Python type hints and provides automatic API documentation, data validation, and serialization. FastAPI is known for its high performance, comparable to Node.js and Go, and is widely used for building microservices and web APIs.",
    },
    SampleText {
        source: "vector_db_guide",
        category: "database",
        topic: "vector_databases",
        text: "Vector databases are specialized databases designed to store and retrieve high-dimensional vectors efficiently. They're essential for semantic search, recommendation systems, and AI applications. Vector databases use similarity search algorithms to find the most relevant vectors based on distance metrics like cosine similarity or Euclidean distance.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attaches_chunk_id_and_default_source() {
        let service = DocumentService::with_chunker(Arc::new(FixedSizeChunker::new(4, 0)));
        let docs = service.create_documents(&["abcdefgh".to_string()], None).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].metadata["chunk_id"], "0_0");
        assert_eq!(docs[1].metadata["chunk_id"], "0_1");
        assert_eq!(docs[0].metadata["source"], "text_0");
    }

    #[test]
    fn from_config_uses_the_configured_strategy() {
        let fixed = RagConfig {
            chunk_size: 4,
            chunk_overlap: 0,
            chunking: ChunkingStrategy::Fixed,
            ..RagConfig::default()
        };
        let texts = vec!["ab cdefgh".to_string()];

        let docs = DocumentService::from_config(&fixed).create_documents(&texts, None).unwrap();
        let chunks: Vec<&str> = docs.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(chunks, ["ab c", "defg", "h"]);
    }

    #[test]
    fn keeps_caller_metadata_and_source() {
        let service = DocumentService::default();
        let metadata = Metadata::from([
            ("source".to_string(), "handbook".to_string()),
            ("team".to_string(), "infra".to_string()),
        ]);
        let texts = vec!["a".to_string(), "b".to_string()];
        let metadatas = vec![Metadata::new(), metadata];
        let docs = service.create_documents(&texts, Some(metadatas.as_slice())).unwrap();

        assert_eq!(docs[0].metadata["source"], "text_0");
        assert_eq!(docs[1].metadata["source"], "handbook");
        assert_eq!(docs[1].metadata["team"], "infra");
        assert_eq!(docs[1].metadata["chunk_id"], "1_0");
    }

    #[test]
    fn mismatched_metadata_is_an_error_and_split_swallows_it() {
        let service = DocumentService::default();
        let texts = vec!["a".to_string(), "b".to_string()];
        assert!(service.create_documents(&texts, Some(&[Metadata::new()][..])).is_err());
        assert!(service.split(&texts, Some(&[Metadata::new()][..])).is_empty());
    }

    #[test]
    fn sample_corpus_has_one_chunk_per_topic() {
        let docs = DocumentService::default().sample_documents();
        assert_eq!(docs.len(), 5);
        let topics: Vec<&str> = docs.iter().map(|d| d.metadata["topic"].as_str()).collect();
        assert_eq!(topics, ["python", "redis", "machine_learning", "fastapi", "vector_databases"]);
        assert!(docs.iter().all(|d| d.metadata["chunk_id"].ends_with("_0")));
    }
}
