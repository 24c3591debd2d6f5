//! Knowledge base indexing.
//!
//! Turns course and article records into embedded entries in the vector
//! store. Unlike retrieval, indexing fails loudly: a half-indexed knowledge
//! base is an operator problem, not something to paper over at runtime.

use std::sync::Arc;

use thiserror::Error;

use crate::ports::{
    EmbeddingError, EmbeddingProvider, KnowledgeEntry, SourceType, VectorSearchStore,
    VectorStoreError,
};

/// A course offering to be indexed.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CourseRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub topics_covered: Vec<String>,
    #[serde(default)]
    pub price_info: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A knowledge article to be indexed.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ArticleRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Errors raised while indexing.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector store write failed: {0}")]
    Store(#[from] VectorStoreError),

    #[error("embedding batch returned {actual} vectors for {expected} inputs")]
    BatchMismatch { expected: usize, actual: usize },
}

/// Writes embedded knowledge entries into the vector store.
pub struct KnowledgeIndexer {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorSearchStore>,
}

impl KnowledgeIndexer {
    /// Creates an indexer over the given embedder and store.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorSearchStore>) -> Self {
        Self { embedder, store }
    }

    /// Indexes a single course.
    pub async fn index_course(&self, course: &CourseRecord) -> Result<(), IndexError> {
        let embedding = self.embedder.embed(&course_embedding_text(course)).await?;
        self.store.upsert(vec![course_entry(course, embedding)]).await?;
        tracing::debug!(course_id = %course.id, "indexed course");
        Ok(())
    }

    /// Indexes a batch of courses with a single embedding call.
    pub async fn index_courses(&self, courses: &[CourseRecord]) -> Result<usize, IndexError> {
        if courses.is_empty() {
            return Ok(0);
        }
        let texts: Vec<String> = courses.iter().map(course_embedding_text).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != courses.len() {
            return Err(IndexError::BatchMismatch {
                expected: courses.len(),
                actual: embeddings.len(),
            });
        }

        let entries = courses
            .iter()
            .zip(embeddings)
            .map(|(course, embedding)| course_entry(course, embedding))
            .collect::<Vec<_>>();
        let count = entries.len();
        self.store.upsert(entries).await?;
        tracing::debug!(count, "indexed course batch");
        Ok(count)
    }

    /// Indexes a single article.
    pub async fn index_article(&self, article: &ArticleRecord) -> Result<(), IndexError> {
        let text = format!("{}\n{}", article.title, article.content);
        let embedding = self.embedder.embed(&text).await?;

        let mut entry = KnowledgeEntry::new(
            SourceType::Article,
            &article.id,
            &article.title,
            &article.content,
            embedding,
        );
        if let Some(url) = &article.url {
            entry = entry.with_url(url);
        }
        self.store.upsert(vec![entry]).await?;
        tracing::debug!(article_id = %article.id, "indexed article");
        Ok(())
    }
}

/// Text embedded for a course: title, description, vendor and topics joined
/// into one passage so vendor and topic terms match queries directly.
fn course_embedding_text(course: &CourseRecord) -> String {
    let mut parts = vec![course.title.clone()];
    if let Some(description) = &course.description {
        parts.push(description.clone());
    }
    if let Some(vendor) = &course.vendor {
        parts.push(vendor.clone());
    }
    parts.extend(course.topics_covered.iter().cloned());
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

/// Snippet shown to the response model: `[Vendor] description`, with a
/// pricing line when the course carries one.
fn course_snippet(course: &CourseRecord) -> String {
    let mut content = String::new();
    if let Some(vendor) = &course.vendor {
        content.push_str(&format!("[{vendor}] "));
    }
    if let Some(description) = &course.description {
        content.push_str(description);
    }
    if let Some(price) = &course.price_info {
        content.push_str(&format!("\nPricing: {price}"));
    }
    content
}

fn course_entry(course: &CourseRecord, embedding: Vec<f32>) -> KnowledgeEntry {
    let mut entry = KnowledgeEntry::new(
        SourceType::Course,
        &course.id,
        &course.title,
        course_snippet(course),
        embedding,
    );
    if let Some(url) = &course.url {
        entry = entry.with_url(url);
    }
    entry
}
