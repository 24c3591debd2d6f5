//! Mock embedding provider for testing.
//!
//! Produces deterministic pseudo-random unit vectors from a hash of the
//! input text: identical texts embed identically, distinct texts land
//! nearly orthogonal at this dimensionality. That makes exact-match
//! retrieval assertions reliable without a real embedding service.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::ports::{EmbeddingError, EmbeddingProvider};

/// Default vector width. Wide enough that unrelated texts stay far below
/// any realistic match threshold.
const DEFAULT_DIMENSIONS: usize = 128;

/// Mock embedding provider for testing.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimensions: usize,
    fail: bool,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbedder {
    /// Creates a mock embedder with the default dimensionality.
    pub fn new() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
            fail: false,
        }
    }

    /// Sets the vector width.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Makes every call fail, for degradation tests.
    pub fn with_failures(mut self) -> Self {
        self.fail = true;
        self
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector: Vec<f32> = (0..self.dimensions)
            .map(|i| {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                i.hash(&mut hasher);
                let h = hasher.finish();
                (h as f64 / u64::MAX as f64 * 2.0 - 1.0) as f32
            })
            .collect();

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.fail {
            return Err(EmbeddingError::unavailable("mock embedder set to fail"));
        }
        Ok(self.embed_sync(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if self.fail {
            return Err(EmbeddingError::unavailable("mock embedder set to fail"));
        }
        Ok(texts.iter().map(|t| self.embed_sync(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        "mock-embedding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn identical_texts_embed_identically() {
        let embedder = MockEmbedder::new();

        let a = embedder.embed("AZ-104 Azure Administrator").await.unwrap();
        let b = embedder.embed("AZ-104 Azure Administrator").await.unwrap();

        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn distinct_texts_are_nearly_orthogonal() {
        let embedder = MockEmbedder::new();

        let a = embedder.embed("AZ-104 Azure Administrator").await.unwrap();
        let b = embedder.embed("Refund policy").await.unwrap();

        assert!(cosine(&a, &b).abs() < 0.5);
    }

    #[tokio::test]
    async fn vectors_are_unit_length() {
        let embedder = MockEmbedder::new();

        let v = embedder.embed("anything").await.unwrap();

        assert_eq!(v.len(), embedder.dimensions());
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn dimensions_are_configurable() {
        let embedder = MockEmbedder::new().with_dimensions(16);

        let v = embedder.embed("hi").await.unwrap();

        assert_eq!(v.len(), 16);
        assert_eq!(embedder.dimensions(), 16);
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let embedder = MockEmbedder::new();
        let texts = vec!["one".to_string(), "two".to_string()];

        let batch = embedder.embed_batch(&texts).await.unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], embedder.embed("one").await.unwrap());
        assert_eq!(batch[1], embedder.embed("two").await.unwrap());
    }

    #[tokio::test]
    async fn failure_mode_errors_every_call() {
        let embedder = MockEmbedder::new().with_failures();

        assert!(embedder.embed("x").await.is_err());
        assert!(embedder.embed_batch(&["x".to_string()]).await.is_err());
    }
}
