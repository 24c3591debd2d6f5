//! In-memory vector store implementation.
//!
//! Brute-force cosine search over entries held in process memory. Fine for
//! tests, local development, and small catalogs; production deployments
//! back the VectorSearchStore port with a real ANN index instead.
//!
//! # Panics
//!
//! Methods panic if internal locks are poisoned.
//!
//! # Example
//!
//! ```ignore
//! let store = InMemoryVectorStore::new(1536);
//! store.upsert(entries).await?;
//! let hits = store.search(&query_vector, 0.7, 10).await?;
//! ```

use async_trait::async_trait;
use std::sync::RwLock;

use crate::ports::{KnowledgeEntry, SearchResult, VectorSearchStore, VectorStoreError};

/// In-memory vector store with brute-force cosine search.
pub struct InMemoryVectorStore {
    dimensions: usize,
    entries: RwLock<Vec<KnowledgeEntry>>,
}

impl InMemoryVectorStore {
    /// Creates an empty store for vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Returns the number of stored entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn entry_count(&self) -> usize {
        self.entries
            .read()
            .expect("InMemoryVectorStore: entries lock poisoned")
            .len()
    }

    /// Removes all entries (for test isolation).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear(&self) {
        self.entries
            .write()
            .expect("InMemoryVectorStore: entries write lock poisoned")
            .clear();
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<(), VectorStoreError> {
        if vector.len() != self.dimensions {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorSearchStore for InMemoryVectorStore {
    async fn search(
        &self,
        query: &[f32],
        threshold: f32,
        count: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        self.check_dimensions(query)?;

        let entries = self
            .entries
            .read()
            .expect("InMemoryVectorStore: entries lock poisoned");

        let mut results: Vec<SearchResult> = entries
            .iter()
            .map(|entry| SearchResult {
                source_type: entry.source_type,
                source_id: entry.source_id.clone(),
                title: entry.title.clone(),
                content: entry.content.clone(),
                url: entry.url.clone(),
                similarity: cosine_similarity(query, &entry.embedding),
            })
            .filter(|result| result.similarity >= threshold)
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(count);

        Ok(results)
    }

    async fn upsert(&self, new_entries: Vec<KnowledgeEntry>) -> Result<(), VectorStoreError> {
        for entry in &new_entries {
            self.check_dimensions(&entry.embedding)?;
        }

        let mut entries = self
            .entries
            .write()
            .expect("InMemoryVectorStore: entries write lock poisoned");

        for entry in new_entries {
            match entries
                .iter_mut()
                .find(|e| e.source_type == entry.source_type && e.source_id == entry.source_id)
            {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }

        Ok(())
    }
}

/// Cosine similarity of two equal-length vectors; 0.0 when either is zero.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::SourceType;

    fn entry(id: &str, embedding: Vec<f32>) -> KnowledgeEntry {
        KnowledgeEntry::new(SourceType::Course, id, id.to_uppercase(), "snippet", embedding)
    }

    #[tokio::test]
    async fn search_ranks_by_cosine_similarity() {
        let store = InMemoryVectorStore::new(3);
        store
            .upsert(vec![
                entry("exact", vec![1.0, 0.0, 0.0]),
                entry("close", vec![0.8, 0.6, 0.0]),
                entry("orthogonal", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0, 0.0], 0.5, 10).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source_id, "exact");
        assert!((results[0].similarity - 1.0).abs() < 1e-6);
        assert_eq!(results[1].source_id, "close");
        assert!((results[1].similarity - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn search_caps_result_count() {
        let store = InMemoryVectorStore::new(3);
        store
            .upsert(vec![
                entry("a", vec![1.0, 0.0, 0.0]),
                entry("b", vec![0.9, 0.1, 0.0]),
                entry("c", vec![0.8, 0.2, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0, 0.0], 0.0, 1).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_id, "a");
    }

    #[tokio::test]
    async fn upsert_replaces_by_source_identity() {
        let store = InMemoryVectorStore::new(3);
        store
            .upsert(vec![entry("az-104", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap();

        let mut replacement = entry("az-104", vec![0.0, 1.0, 0.0]);
        replacement.content = "updated snippet".to_string();
        store.upsert(vec![replacement]).await.unwrap();

        assert_eq!(store.entry_count(), 1);
        let results = store.search(&[0.0, 1.0, 0.0], 0.9, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "updated snippet");
    }

    #[tokio::test]
    async fn entries_with_same_id_but_different_type_coexist() {
        let store = InMemoryVectorStore::new(3);
        let mut article = entry("az-104", vec![0.0, 1.0, 0.0]);
        article.source_type = SourceType::Article;

        store
            .upsert(vec![entry("az-104", vec![1.0, 0.0, 0.0]), article])
            .await
            .unwrap();

        assert_eq!(store.entry_count(), 2);
    }

    #[tokio::test]
    async fn search_rejects_wrong_query_dimensions() {
        let store = InMemoryVectorStore::new(3);

        let err = store.search(&[1.0, 0.0], 0.5, 10).await.unwrap_err();

        assert!(matches!(
            err,
            VectorStoreError::DimensionMismatch { expected: 3, actual: 2 }
        ));
    }

    #[tokio::test]
    async fn upsert_rejects_wrong_entry_dimensions() {
        let store = InMemoryVectorStore::new(3);

        let err = store
            .upsert(vec![entry("bad", vec![1.0, 0.0, 0.0, 0.0])])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            VectorStoreError::DimensionMismatch { expected: 3, actual: 4 }
        ));
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test]
    async fn clear_empties_the_store() {
        let store = InMemoryVectorStore::new(3);
        store
            .upsert(vec![entry("a", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap();

        store.clear();

        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn cosine_similarity_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
    }
}
