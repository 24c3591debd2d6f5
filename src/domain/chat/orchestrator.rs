//! Conversation orchestration.
//!
//! One call per chat turn: classify the message and search the knowledge
//! base concurrently, assemble the context fragment, generate with provider
//! failover, post-process, and return the answer with its telemetry. The
//! orchestrator holds no per-conversation state; everything it needs
//! arrives in the call and everything it learns leaves with the response.

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;

use crate::domain::chat::context::assemble_context;
use crate::domain::chat::generator::{GenerationError, ResponseGenerator};
use crate::domain::chat::intent::{Intent, IntentClassifier};
use crate::domain::chat::message::ConversationContext;
use crate::domain::chat::postprocess::post_process;
use crate::domain::chat::prompts::SYSTEM_PROMPT;
use crate::domain::knowledge::{KnowledgeRetriever, SearchOptions};
use crate::ports::SearchResult;

/// Snippets fetched from the knowledge base per turn. The assembler renders
/// the top three; the rest ride along in `sources` for the caller.
const TURN_MATCH_COUNT: usize = 5;

/// The outcome of one orchestrated chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorResponse {
    /// Post-processed answer text, ready to display.
    pub content: String,
    /// Provider-qualified model tag, e.g. "anthropic:claude-sonnet-4-20250514".
    pub model: String,
    /// Prompt tokens reported by the provider that answered.
    pub tokens_input: u32,
    /// Completion tokens reported by the provider that answered.
    pub tokens_output: u32,
    /// Knowledge snippets retrieved for this turn, best first.
    pub sources: Vec<SearchResult>,
    /// Classified intent for this turn.
    pub intent: Option<Intent>,
    /// Whether the classifier judged the visitor ready for lead capture.
    pub lead_ready: Option<bool>,
    /// Wall-clock duration of the whole turn, fallback included.
    pub response_time_ms: u64,
}

/// The only failure that escapes a turn.
///
/// Everything upstream of generation degrades to a default instead of
/// failing; see the per-component contracts. The calling layer is expected
/// to answer the visitor with [`CONNECTION_ISSUE_MESSAGE`] when it sees
/// this, while logging the real cause for operators.
///
/// [`CONNECTION_ISSUE_MESSAGE`]: crate::domain::chat::prompts::CONNECTION_ISSUE_MESSAGE
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("response generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// Runs complete chat turns against the configured providers.
pub struct ChatOrchestrator {
    classifier: IntentClassifier,
    retriever: KnowledgeRetriever,
    generator: ResponseGenerator,
    search_options: SearchOptions,
}

impl ChatOrchestrator {
    /// Creates an orchestrator over the given components.
    pub fn new(
        classifier: IntentClassifier,
        retriever: KnowledgeRetriever,
        generator: ResponseGenerator,
    ) -> Self {
        Self {
            classifier,
            retriever,
            generator,
            search_options: SearchOptions::default().with_count(TURN_MATCH_COUNT),
        }
    }

    /// Overrides the per-turn knowledge search tuning.
    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.search_options = options;
        self
    }

    /// Answers the current visitor message.
    ///
    /// `context` carries the prior transcript and whatever the caller knows
    /// about the visitor; it is read, never mutated. Classification and
    /// retrieval run concurrently and both degrade to defaults on failure,
    /// so the only error here is a dual provider failure during generation.
    pub async fn respond(
        &self,
        message: &str,
        context: &ConversationContext,
    ) -> Result<OrchestratorResponse, OrchestratorError> {
        let started = Instant::now();

        let (intent, sources) = tokio::join!(
            self.classifier.classify(message),
            self.retriever.search(message, &self.search_options),
        );
        tracing::debug!(
            intent = intent.intent.as_str(),
            sources = sources.len(),
            "classification and retrieval complete"
        );

        let fragment = assemble_context(context, &sources, &intent);
        let system_prompt = format!("{SYSTEM_PROMPT}\n\n{fragment}");

        let generated = self
            .generator
            .generate(&system_prompt, &context.messages, message, &intent)
            .await?;
        let content = post_process(&generated.content);

        let response_time_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(
            model = %generated.model,
            tokens_input = generated.usage.input_tokens,
            tokens_output = generated.usage.output_tokens,
            response_time_ms,
            "chat turn complete"
        );

        Ok(OrchestratorResponse {
            content,
            model: generated.model,
            tokens_input: generated.usage.input_tokens,
            tokens_output: generated.usage.output_tokens,
            sources,
            intent: Some(intent.intent),
            lead_ready: Some(intent.lead_ready),
            response_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapters::ai::{MockChatProvider, MockError};
    use crate::adapters::knowledge::{InMemoryVectorStore, MockEmbedder};
    use crate::domain::chat::message::{ChatMessage, PageContext};
    use crate::ports::{EmbeddingProvider, KnowledgeEntry, SourceType, VectorSearchStore};

    fn orchestrator(
        classifier: Arc<MockChatProvider>,
        generator: ResponseGenerator,
        embedder: Arc<MockEmbedder>,
        store: Arc<InMemoryVectorStore>,
    ) -> ChatOrchestrator {
        ChatOrchestrator::new(
            IntentClassifier::new(classifier),
            KnowledgeRetriever::new(embedder, store),
            generator,
        )
    }

    async fn store_with_course(
        embedder: &MockEmbedder,
        indexed_text: &str,
    ) -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new(embedder.dimensions()));
        store
            .upsert(vec![KnowledgeEntry::new(
                SourceType::Course,
                "az-104",
                "AZ-104: Microsoft Azure Administrator",
                "[Microsoft] Manage Azure identities\nPricing: From $1,995",
                embedder.embed(indexed_text).await.unwrap(),
            )
            .with_url("https://example.com/courses/az-104")])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn pricing_turn_grounds_the_prompt_and_sizes_the_budget() {
        let message = "What's the price of AZ-104?";
        let embedder = Arc::new(MockEmbedder::new());
        let store = store_with_course(&embedder, message).await;
        let classifier = Arc::new(MockChatProvider::new().with_response(
            r#"{"intent": "pricing", "vendor": "Microsoft", "course_name": "AZ-104", "urgency": "medium", "lead_ready": false}"#,
        ));
        let generation = Arc::new(
            MockChatProvider::new().with_response("AZ-104 runs $1,995. Details: https://example.com/courses/az-104."),
        );
        let orchestrator = orchestrator(
            classifier,
            ResponseGenerator::new(generation.clone()),
            embedder,
            store,
        );

        let response = orchestrator
            .respond(message, &ConversationContext::new(vec![]))
            .await
            .unwrap();

        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].source_id, "az-104");
        assert_eq!(response.intent, Some(Intent::Pricing));
        assert_eq!(response.lead_ready, Some(false));

        let request = &generation.get_calls()[0];
        assert_eq!(request.max_tokens, Some(200));
        let system_prompt = request.system_prompt.as_deref().unwrap();
        assert!(system_prompt.contains("## RELEVANT KNOWLEDGE BASE INFO"));
        assert!(system_prompt.contains("### AZ-104: Microsoft Azure Administrator"));
        assert!(system_prompt.contains("- Intent: pricing"));
    }

    #[tokio::test]
    async fn degraded_retrieval_and_classification_still_answer() {
        let embedder = Arc::new(MockEmbedder::new().with_failures());
        let store = Arc::new(InMemoryVectorStore::new(embedder.dimensions()));
        let classifier = Arc::new(MockChatProvider::new().with_error(MockError::Unavailable));
        let generation = Arc::new(MockChatProvider::new().with_response("Happy to help with courses."));
        let orchestrator = orchestrator(
            classifier,
            ResponseGenerator::new(generation.clone()),
            embedder,
            store,
        );

        let response = orchestrator
            .respond("do you run evening classes?", &ConversationContext::new(vec![]))
            .await
            .unwrap();

        assert!(!response.content.is_empty());
        assert!(response.sources.is_empty());
        assert_eq!(response.intent, Some(Intent::Unclear));

        let request = &generation.get_calls()[0];
        assert_eq!(request.max_tokens, Some(300));
        let system_prompt = request.system_prompt.as_deref().unwrap();
        assert!(system_prompt.contains("- Intent: unclear"));
        assert!(!system_prompt.contains("## RELEVANT KNOWLEDGE BASE INFO"));
    }

    #[tokio::test]
    async fn fallback_success_is_reported_in_the_model_tag() {
        let embedder = Arc::new(MockEmbedder::new());
        let store = Arc::new(InMemoryVectorStore::new(embedder.dimensions()));
        let classifier = Arc::new(MockChatProvider::new().with_response(r#"{"intent": "general"}"#));
        let primary = Arc::new(MockChatProvider::new().with_error(MockError::Unavailable));
        let fallback = Arc::new(
            MockChatProvider::new()
                .with_provider_info("openai", "gpt-4o", 128000)
                .with_response("Here to help."),
        );
        let orchestrator = orchestrator(
            classifier,
            ResponseGenerator::new(primary).with_fallback(fallback),
            embedder,
            store,
        );

        let response = orchestrator
            .respond("hello?", &ConversationContext::new(vec![]))
            .await
            .unwrap();

        assert_eq!(response.content, "Here to help.");
        assert_eq!(response.model, "openai:gpt-4o");
    }

    #[tokio::test]
    async fn dual_provider_failure_is_the_only_fatal_path() {
        let embedder = Arc::new(MockEmbedder::new());
        let store = Arc::new(InMemoryVectorStore::new(embedder.dimensions()));
        let classifier = Arc::new(MockChatProvider::new().with_response(r#"{"intent": "general"}"#));
        let primary = Arc::new(MockChatProvider::new().with_error(MockError::Unavailable));
        let fallback = Arc::new(MockChatProvider::new().with_error(MockError::AuthenticationFailed));
        let orchestrator = orchestrator(
            classifier,
            ResponseGenerator::new(primary).with_fallback(fallback),
            embedder,
            store,
        );

        let err = orchestrator
            .respond("hello?", &ConversationContext::new(vec![]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestratorError::Generation(GenerationError::BothProvidersFailed { .. })
        ));
    }

    #[tokio::test]
    async fn responses_are_post_processed() {
        let embedder = Arc::new(MockEmbedder::new());
        let store = Arc::new(InMemoryVectorStore::new(embedder.dimensions()));
        let classifier = Arc::new(MockChatProvider::new().with_response(r#"{"intent": "general"}"#));
        let generation = Arc::new(
            MockChatProvider::new()
                .with_response("As an AI assistant, I should mention this. Enrollment opens Monday.  "),
        );
        let orchestrator = orchestrator(
            classifier,
            ResponseGenerator::new(generation),
            embedder,
            store,
        );

        let response = orchestrator
            .respond("when can I enroll?", &ConversationContext::new(vec![]))
            .await
            .unwrap();

        assert_eq!(response.content, "Enrollment opens Monday.");
    }

    #[tokio::test]
    async fn history_and_page_context_reach_the_provider() {
        let embedder = Arc::new(MockEmbedder::new());
        let store = Arc::new(InMemoryVectorStore::new(embedder.dimensions()));
        let classifier = Arc::new(MockChatProvider::new().with_response(r#"{"intent": "course_inquiry"}"#));
        let generation = Arc::new(MockChatProvider::new().with_response("It covers identities."));
        let orchestrator = orchestrator(
            classifier,
            ResponseGenerator::new(generation.clone()),
            embedder,
            store,
        );

        let context = ConversationContext::new(vec![
            ChatMessage::visitor("hi"),
            ChatMessage::assistant("Welcome! How can I help?"),
        ])
        .with_page_context(PageContext::new(
            "https://example.com/courses/az-104",
            "AZ-104 Azure Administrator",
            "course",
        ));

        let response = orchestrator
            .respond("what does it cover?", &context)
            .await
            .unwrap();

        let request = &generation.get_calls()[0];
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2].content, "what does it cover?");
        let system_prompt = request.system_prompt.as_deref().unwrap();
        assert!(system_prompt.contains("## VISITOR CONTEXT"));
        assert!(system_prompt.contains("- Current Page: AZ-104 Azure Administrator"));

        assert_eq!(response.tokens_input, 10);
        assert_eq!(response.tokens_output, 20);
    }
}
