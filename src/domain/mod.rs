//! Domain layer containing the chat engine's business logic.
//!
//! # Module Organization
//!
//! - `chat` - Chat turn orchestration: intent, context, generation, post-processing
//! - `knowledge` - Knowledge base retrieval and indexing
//! - `leads` - Lead signal extraction from conversation history

pub mod chat;
pub mod knowledge;
pub mod leads;
