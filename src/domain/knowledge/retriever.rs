//! Knowledge base retrieval.
//!
//! Embeds a query and similarity-searches the vector store. Retrieval is a
//! best-effort enrichment: every failure degrades to an empty result set so
//! a broken embedder or store never takes the conversation down with it.

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::ports::{EmbeddingProvider, SearchResult, SourceType, VectorSearchStore};

/// Tuning knobs for a knowledge search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Minimum similarity for a snippet to count as a match.
    pub match_threshold: f32,
    /// Maximum number of snippets returned.
    pub match_count: usize,
    /// Restrict results to these source kinds; `None` means all kinds.
    pub source_types: Option<Vec<SourceType>>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            match_threshold: 0.7,
            match_count: 10,
            source_types: None,
        }
    }
}

impl SearchOptions {
    /// Builds options from the retrieval configuration section.
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self {
            match_threshold: config.match_threshold,
            match_count: config.match_count,
            source_types: None,
        }
    }

    /// Sets the similarity threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.match_threshold = threshold;
        self
    }

    /// Sets the result cap.
    pub fn with_count(mut self, count: usize) -> Self {
        self.match_count = count;
        self
    }

    /// Restricts results to the given source kinds.
    pub fn with_source_types(mut self, types: Vec<SourceType>) -> Self {
        self.source_types = Some(types);
        self
    }
}

/// Searches the knowledge base for snippets relevant to a visitor message.
pub struct KnowledgeRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorSearchStore>,
}

impl KnowledgeRetriever {
    /// Creates a retriever over the given embedder and store.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorSearchStore>) -> Self {
        Self { embedder, store }
    }

    /// Finds knowledge snippets matching `query`.
    ///
    /// Never fails: embedding or store errors return an empty Vec, logged at
    /// warn level. The result is guaranteed sorted by descending similarity,
    /// thresholded, and capped at `match_count` regardless of what the store
    /// returned. The source-type filter applies after the store query, so a
    /// filtered search can return fewer than `match_count` entries.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        let embedding = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(err) => {
                tracing::warn!(error = %err, "query embedding failed, skipping knowledge retrieval");
                return Vec::new();
            }
        };

        let mut results = match self
            .store
            .search(&embedding, options.match_threshold, options.match_count)
            .await
        {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(error = %err, "knowledge search failed, skipping knowledge retrieval");
                return Vec::new();
            }
        };

        if let Some(types) = &options.source_types {
            results.retain(|r| types.contains(&r.source_type));
        }

        // Ordering, threshold, and cap are enforced here, not by the store.
        results.retain(|r| r.similarity >= options.match_threshold);
        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(options.match_count);

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::knowledge::{InMemoryVectorStore, MockEmbedder};
    use crate::ports::{KnowledgeEntry, VectorStoreError};
    use async_trait::async_trait;

    /// Store that always errors, for degradation tests.
    struct BrokenStore;

    #[async_trait]
    impl VectorSearchStore for BrokenStore {
        async fn search(
            &self,
            _query: &[f32],
            _threshold: f32,
            _count: usize,
        ) -> Result<Vec<SearchResult>, VectorStoreError> {
            Err(VectorStoreError::unavailable("connection refused"))
        }

        async fn upsert(&self, _entries: Vec<KnowledgeEntry>) -> Result<(), VectorStoreError> {
            Err(VectorStoreError::unavailable("connection refused"))
        }
    }

    /// Store that returns results out of order and below threshold, to prove
    /// the retriever re-asserts its guarantees.
    struct SloppyStore;

    fn raw_result(title: &str, source_type: SourceType, similarity: f32) -> SearchResult {
        SearchResult {
            source_type,
            source_id: title.to_lowercase(),
            title: title.to_string(),
            content: String::new(),
            url: None,
            similarity,
        }
    }

    #[async_trait]
    impl VectorSearchStore for SloppyStore {
        async fn search(
            &self,
            _query: &[f32],
            _threshold: f32,
            _count: usize,
        ) -> Result<Vec<SearchResult>, VectorStoreError> {
            Ok(vec![
                raw_result("Low", SourceType::Article, 0.4),
                raw_result("Best", SourceType::Course, 0.95),
                raw_result("Mid", SourceType::Document, 0.75),
                raw_result("Good", SourceType::Course, 0.85),
            ])
        }

        async fn upsert(&self, _entries: Vec<KnowledgeEntry>) -> Result<(), VectorStoreError> {
            Ok(())
        }
    }

    async fn seeded_store(embedder: &MockEmbedder) -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new(embedder.dimensions()));
        let entries = vec![
            KnowledgeEntry::new(
                SourceType::Course,
                "az-104",
                "AZ-104 Azure Administrator",
                "[Microsoft] Manage Azure identities and governance",
                embedder.embed("AZ-104 Azure Administrator").await.unwrap(),
            )
            .with_url("https://example.com/courses/az-104"),
            KnowledgeEntry::new(
                SourceType::Article,
                "cloud-paths",
                "Choosing a cloud career path",
                "A guide to cloud certifications",
                embedder.embed("Choosing a cloud career path").await.unwrap(),
            ),
        ];
        store.upsert(entries).await.unwrap();
        store
    }

    #[tokio::test]
    async fn finds_indexed_content() {
        let embedder = MockEmbedder::new();
        let store = seeded_store(&embedder).await;
        let retriever = KnowledgeRetriever::new(Arc::new(embedder), store);

        let results = retriever
            .search(
                "AZ-104 Azure Administrator",
                &SearchOptions::default().with_threshold(0.9),
            )
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_id, "az-104");
        assert!(results[0].similarity > 0.99);
    }

    #[tokio::test]
    async fn embedder_failure_degrades_to_empty() {
        let embedder = MockEmbedder::new().with_failures();
        let store = Arc::new(InMemoryVectorStore::new(embedder.dimensions()));
        let retriever = KnowledgeRetriever::new(Arc::new(embedder), store);

        let results = retriever.search("anything", &SearchOptions::default()).await;

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn store_failure_degrades_to_empty() {
        let retriever =
            KnowledgeRetriever::new(Arc::new(MockEmbedder::new()), Arc::new(BrokenStore));

        let results = retriever.search("anything", &SearchOptions::default()).await;

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn reasserts_ordering_threshold_and_cap_on_sloppy_stores() {
        let retriever =
            KnowledgeRetriever::new(Arc::new(MockEmbedder::new()), Arc::new(SloppyStore));

        let results = retriever
            .search(
                "query",
                &SearchOptions::default().with_threshold(0.7).with_count(2),
            )
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Best");
        assert_eq!(results[1].title, "Good");
        assert!(results.windows(2).all(|w| w[0].similarity >= w[1].similarity));
        assert!(results.iter().all(|r| r.similarity >= 0.7));
    }

    #[tokio::test]
    async fn source_type_filter_applies_after_the_query() {
        let retriever =
            KnowledgeRetriever::new(Arc::new(MockEmbedder::new()), Arc::new(SloppyStore));

        let results = retriever
            .search(
                "query",
                &SearchOptions::default()
                    .with_threshold(0.7)
                    .with_count(3)
                    .with_source_types(vec![SourceType::Document]),
            )
            .await;

        // Filtering can undershoot the cap; that matches the store-then-filter
        // contract.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Mid");
    }

    #[test]
    fn options_from_config_pick_up_tuning() {
        let config = RetrievalConfig {
            match_threshold: 0.8,
            match_count: 3,
            ..RetrievalConfig::default()
        };

        let options = SearchOptions::from_config(&config);

        assert_eq!(options.match_threshold, 0.8);
        assert_eq!(options.match_count, 3);
        assert!(options.source_types.is_none());
    }
}
