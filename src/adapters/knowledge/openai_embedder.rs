//! OpenAI embedding provider.
//!
//! Implements the EmbeddingProvider port against OpenAI's embeddings API.
//! Same retry-with-backoff treatment as the chat providers; errors that
//! survive the retries surface to the caller, which decides whether to
//! degrade (retrieval) or abort (indexing).
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIEmbedderConfig::new(api_key)
//!     .with_model("text-embedding-3-small");
//!
//! let embedder = OpenAIEmbedder::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{EmbeddingError, EmbeddingProvider};

/// Configuration for the OpenAI embedder.
#[derive(Debug, Clone)]
pub struct OpenAIEmbedderConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Embedding model (e.g., "text-embedding-3-small").
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl OpenAIEmbedderConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(12),
            max_retries: 2,
        }
    }

    /// Sets the embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI embeddings API adapter.
pub struct OpenAIEmbedder {
    config: OpenAIEmbedderConfig,
    client: Client,
}

impl OpenAIEmbedder {
    /// Creates a new embedder with the given configuration.
    pub fn new(config: OpenAIEmbedderConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the embeddings endpoint URL.
    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.config.base_url)
    }

    /// Sends one embeddings request and handles transport-level failures.
    async fn send_request(&self, texts: &[String]) -> Result<Response, EmbeddingError> {
        let request = EmbeddingRequest {
            model: self.config.model.clone(),
            input: texts.to_vec(),
        };

        self.client
            .post(self.embeddings_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    EmbeddingError::network(format!("Connection failed: {}", e))
                } else {
                    EmbeddingError::network(e.to_string())
                }
            })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, EmbeddingError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(EmbeddingError::AuthenticationFailed),
            429 => Err(EmbeddingError::RateLimited { retry_after_secs: 30 }),
            400 => Err(EmbeddingError::invalid_input(error_body)),
            500..=599 => Err(EmbeddingError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(EmbeddingError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses an embeddings response into vectors in input order.
    async fn parse_response(&self, response: Response) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let response = self.handle_response_status(response).await?;

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::parse(format!("Failed to parse response: {}", e)))?;

        // The index field is authoritative for ordering.
        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    /// One batch call with the standard retry loop.
    async fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut last_error = EmbeddingError::network("No attempts made");
        let mut retry_count = 0;

        while retry_count <= self.config.max_retries {
            match self.send_request(texts).await {
                Ok(response) => match self.parse_response(response).await {
                    Ok(vectors) => return Ok(vectors),
                    Err(err) => {
                        if !err.is_retryable() || retry_count >= self.config.max_retries {
                            return Err(err);
                        }
                        last_error = err;
                    }
                },
                Err(err) => {
                    if !err.is_retryable() || retry_count >= self.config.max_retries {
                        return Err(err);
                    }
                    last_error = err;
                }
            }

            // Exponential backoff: 1s, 2s, 4s, ...
            let delay = Duration::from_secs(1 << retry_count);
            tracing::debug!(
                provider = "openai-embeddings",
                retry = retry_count + 1,
                delay_secs = delay.as_secs(),
                error = %last_error,
                "retrying after transient failure"
            );
            sleep(delay).await;
            retry_count += 1;
        }

        Err(last_error)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let vectors = self.request_embeddings(&[text.to_string()]).await?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::parse("Response contained no embeddings"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request_embeddings(texts).await
    }

    fn dimensions(&self) -> usize {
        match self.config.model.as_str() {
            "text-embedding-3-large" => 3072,
            // text-embedding-3-small and ada-002 both produce 1536.
            _ => 1536,
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}
