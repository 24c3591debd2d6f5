//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## AI Ports
//!
//! - `ChatProvider` - LLM chat completions (primary and fallback generation,
//!   intent classification)
//! - `EmbeddingProvider` - Text to vector embedding
//!
//! ## Knowledge Ports
//!
//! - `VectorSearchStore` - Similarity search over indexed knowledge snippets

mod chat_provider;
mod embedding_provider;
mod vector_store;

pub use chat_provider::{
    ChatProvider, CompletionRequest, CompletionResponse, FinishReason, Message, MessageRole,
    ProviderError, ProviderInfo, TokenUsage,
};
pub use embedding_provider::{EmbeddingError, EmbeddingProvider};
pub use vector_store::{
    KnowledgeEntry, SearchResult, SourceType, VectorSearchStore, VectorStoreError,
};
