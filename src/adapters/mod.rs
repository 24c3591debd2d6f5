//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Chat completion providers (Anthropic, OpenAI, mock)
//! - `knowledge` - Embedding providers and vector stores

pub mod ai;
pub mod knowledge;
