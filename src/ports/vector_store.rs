//! Vector Search Store Port - Interface for embedding similarity search.
//!
//! The store persists typed knowledge snippets with their embeddings and
//! answers nearest-neighbor queries. Index structure is the adapter's
//! business; callers only see ranked results.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for the vector search store.
#[async_trait]
pub trait VectorSearchStore: Send + Sync {
    /// Similarity-search for entries scoring at least `threshold` against
    /// `query`, best first, at most `count` results.
    async fn search(
        &self,
        query: &[f32],
        threshold: f32,
        count: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError>;

    /// Insert or replace entries, keyed by (source_type, source_id).
    async fn upsert(&self, entries: Vec<KnowledgeEntry>) -> Result<(), VectorStoreError>;
}

/// Kind of knowledge base source a snippet came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Course,
    LearningPath,
    Article,
    Document,
}

impl SourceType {
    /// Stable label used in telemetry and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Course => "course",
            SourceType::LearningPath => "learning_path",
            SourceType::Article => "article",
            SourceType::Document => "document",
        }
    }
}

/// A ranked knowledge snippet returned from search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Kind of source this snippet came from.
    pub source_type: SourceType,
    /// Identifier of the source record.
    pub source_id: String,
    /// Human-readable title.
    pub title: String,
    /// Snippet text used for prompt grounding.
    pub content: String,
    /// Canonical URL of the source, when it has one.
    pub url: Option<String>,
    /// Cosine similarity against the query, in [0, 1].
    pub similarity: f32,
}

/// An entry to index: snippet plus its embedding.
#[derive(Debug, Clone)]
pub struct KnowledgeEntry {
    pub source_type: SourceType,
    pub source_id: String,
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub embedding: Vec<f32>,
}

impl KnowledgeEntry {
    /// Creates a new entry.
    pub fn new(
        source_type: SourceType,
        source_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            source_type,
            source_id: source_id.into(),
            title: title.into(),
            content: content.into(),
            url: None,
            embedding,
        }
    }

    /// Sets the canonical URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Vector store errors.
#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    /// Store is unavailable.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Query failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Embedding dimensionality does not match the index.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensions the index was built with.
        expected: usize,
        /// Dimensions of the offending vector.
        actual: usize,
    },
}

impl VectorStoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a query failed error.
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryFailed(message.into())
    }
}
