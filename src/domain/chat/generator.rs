//! Response generation with provider failover.
//!
//! Builds the generation request (trimmed history window, intent-sized token
//! budget) and runs it against the primary provider. On any primary failure
//! the identical request is retried once against the fallback provider;
//! transient errors have already been retried inside the provider adapters,
//! so whatever surfaces here is worth a second opinion rather than a dead
//! turn. Only a dual failure escapes.
//!
//! # Example
//!
//! ```ignore
//! let generator = ResponseGenerator::new(anthropic)
//!     .with_fallback(openai);
//! ```

use std::sync::Arc;

use crate::domain::chat::intent::IntentResult;
use crate::domain::chat::message::ChatMessage;
use crate::ports::{
    ChatProvider, CompletionRequest, CompletionResponse, FinishReason, Message, ProviderError,
    TokenUsage,
};

/// Messages of history kept in the provider request, newest last. The
/// current visitor message rides on top of this window.
const HISTORY_WINDOW: usize = 10;

/// Temperature for visitor-facing generation. Classification runs at 0.
const GENERATION_TEMPERATURE: f32 = 0.7;

/// A generated answer, tagged with the provider that produced it.
#[derive(Debug, Clone)]
pub struct GeneratedResponse {
    /// Raw model output, pre post-processing.
    pub content: String,
    /// Provider-qualified model tag, e.g. "anthropic:claude-sonnet-4-20250514".
    pub model: String,
    /// Token usage reported by the answering provider.
    pub usage: TokenUsage,
    /// Why the model stopped generating.
    pub finish_reason: FinishReason,
}

/// Generation errors.
///
/// Either shape means the turn produced no answer; the calling layer shows
/// its canned connection-issue message.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The primary provider failed and no fallback is configured.
    #[error("primary provider failed with no fallback configured: {0}")]
    PrimaryFailed(#[source] ProviderError),

    /// Both providers failed on the same request.
    #[error("both providers failed: primary: {primary}; fallback: {fallback}")]
    BothProvidersFailed {
        primary: ProviderError,
        fallback: ProviderError,
    },
}

/// Generates visitor-facing answers with automatic provider failover.
pub struct ResponseGenerator {
    primary: Arc<dyn ChatProvider>,
    fallback: Option<Arc<dyn ChatProvider>>,
}

impl ResponseGenerator {
    /// Creates a generator with only a primary provider.
    pub fn new(primary: Arc<dyn ChatProvider>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// Adds a fallback provider.
    pub fn with_fallback(mut self, fallback: Arc<dyn ChatProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Generates an answer for the current visitor message.
    ///
    /// `history` is the prior transcript, oldest first, without the current
    /// message; only the most recent [`HISTORY_WINDOW`] entries are sent.
    pub async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        current_message: &str,
        intent: &IntentResult,
    ) -> Result<GeneratedResponse, GenerationError> {
        let request = CompletionRequest::new()
            .with_system_prompt(system_prompt)
            .with_messages(build_window(history, current_message))
            .with_max_tokens(intent.intent.max_response_tokens())
            .with_temperature(GENERATION_TEMPERATURE);

        let request_id = uuid::Uuid::new_v4().to_string();
        let primary_info = self.primary.provider_info();
        tracing::debug!(
            request_id = %request_id,
            provider = %primary_info.name,
            intent = intent.intent.as_str(),
            max_tokens = intent.intent.max_response_tokens(),
            "dispatching generation request"
        );

        let primary_err = match self.primary.complete(request.clone()).await {
            Ok(response) => return Ok(tag_response(&primary_info.name, response)),
            Err(err) => err,
        };

        let Some(fallback) = &self.fallback else {
            tracing::error!(
                request_id = %request_id,
                provider = %primary_info.name,
                error = %primary_err,
                "primary provider failed, no fallback configured"
            );
            return Err(GenerationError::PrimaryFailed(primary_err));
        };

        let fallback_info = fallback.provider_info();
        tracing::warn!(
            request_id = %request_id,
            primary = %primary_info.name,
            fallback = %fallback_info.name,
            error = %primary_err,
            "primary provider failed, falling back"
        );

        match fallback.complete(request).await {
            Ok(response) => Ok(tag_response(&fallback_info.name, response)),
            Err(fallback_err) => {
                tracing::error!(
                    request_id = %request_id,
                    primary_error = %primary_err,
                    fallback_error = %fallback_err,
                    "both providers failed"
                );
                Err(GenerationError::BothProvidersFailed {
                    primary: primary_err,
                    fallback: fallback_err,
                })
            }
        }
    }
}

/// Maps the trailing history window plus the current message into provider
/// messages. Visitor turns become "user", operator and assistant turns read
/// to the model as "assistant".
fn build_window(history: &[ChatMessage], current_message: &str) -> Vec<Message> {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let mut messages: Vec<Message> = history[start..]
        .iter()
        .map(|m| Message::new(m.role.provider_role(), m.content.clone()))
        .collect();
    messages.push(Message::user(current_message));
    messages
}

fn tag_response(provider_name: &str, response: CompletionResponse) -> GeneratedResponse {
    GeneratedResponse {
        model: format!("{}:{}", provider_name, response.model),
        content: response.content,
        usage: response.usage,
        finish_reason: response.finish_reason,
    }
}
