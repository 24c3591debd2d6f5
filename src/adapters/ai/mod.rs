//! Chat provider adapters.
//!
//! Implementations of the ChatProvider port for the LLM backends the chat
//! engine can answer with.
//!
//! ## Available Adapters
//!
//! - `MockChatProvider` - Configurable mock for testing
//! - `OpenAIProvider` - OpenAI GPT models (GPT-4o, GPT-4)
//! - `AnthropicProvider` - Anthropic Claude models

mod anthropic_provider;
mod mock_provider;
mod openai_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use mock_provider::{MockChatProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
