//! Chat domain module.
//!
//! Everything one chat turn is made of: message and context types, intent
//! classification, context assembly, response generation with failover,
//! output post-processing, and the orchestrator that ties them together.

mod context;
mod generator;
mod intent;
mod message;
mod orchestrator;
mod postprocess;
pub mod prompts;

pub use context::{assemble_context, KNOWLEDGE_SNIPPET_LIMIT};
pub use generator::{GeneratedResponse, GenerationError, ResponseGenerator};
pub use intent::{Intent, IntentClassifier, IntentResult, Urgency, CLASSIFICATION_MAX_TOKENS};
pub use message::{ChatMessage, ChatRole, CollectedInfo, ConversationContext, PageContext};
pub use orchestrator::{ChatOrchestrator, OrchestratorError, OrchestratorResponse};
pub use postprocess::post_process;
