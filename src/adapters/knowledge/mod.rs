//! Knowledge base adapters.
//!
//! Embedding providers and vector stores behind the ports in
//! [`crate::ports`]. The in-memory store and mock embedder back the
//! test suites; the OpenAI embedder is the production path.

mod memory_store;
mod mock_embedder;
mod openai_embedder;

pub use memory_store::InMemoryVectorStore;
pub use mock_embedder::MockEmbedder;
pub use openai_embedder::{OpenAIEmbedder, OpenAIEmbedderConfig};
