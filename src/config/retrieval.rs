//! Knowledge retrieval configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Knowledge retrieval configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Minimum similarity score for a snippet to count as a match
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,

    /// Maximum number of snippets returned per search
    #[serde(default = "default_match_count")]
    pub match_count: usize,

    /// Embedding model identifier
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl RetrievalConfig {
    /// Validate retrieval configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(ValidationError::InvalidMatchThreshold);
        }
        if self.match_count == 0 {
            return Err(ValidationError::InvalidMatchCount);
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            match_threshold: default_match_threshold(),
            match_count: default_match_count(),
            embedding_model: default_embedding_model(),
        }
    }
}

fn default_match_threshold() -> f32 {
    0.7
}

fn default_match_count() -> usize {
    10
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.match_threshold, 0.7);
        assert_eq!(config.match_count, 10);
        assert_eq!(config.embedding_model, "text-embedding-3-small");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(RetrievalConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_out_of_range_threshold() {
        let config = RetrievalConfig {
            match_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidMatchThreshold)
        ));

        let config = RetrievalConfig {
            match_threshold: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_match_count() {
        let config = RetrievalConfig {
            match_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidMatchCount)
        ));
    }
}
