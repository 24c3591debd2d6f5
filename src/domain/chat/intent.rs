//! Intent classification for visitor messages.
//!
//! A single cheap LLM call labels each visitor message with an intent,
//! extracted entities, urgency, and a lead-readiness flag. Classification is
//! best-effort: any provider or parse failure degrades to
//! [`IntentResult::default`] so the pipeline never stalls on it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::chat::prompts::INTENT_CLASSIFICATION_PROMPT;
use crate::ports::{ChatProvider, CompletionRequest, MessageRole};

/// Token budget for the classification call. The JSON payload is tiny.
pub const CLASSIFICATION_MAX_TOKENS: u32 = 200;

/// What the visitor is trying to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CourseInquiry,
    Pricing,
    Schedule,
    Comparison,
    CareerAdvice,
    Technical,
    Enrollment,
    Support,
    General,
    Greeting,
    Farewell,
    /// Catch-all, also used when the model invents a label.
    #[default]
    #[serde(other)]
    Unclear,
}

impl Intent {
    /// Every intent the classifier can produce.
    pub const ALL: [Intent; 12] = [
        Intent::CourseInquiry,
        Intent::Pricing,
        Intent::Schedule,
        Intent::Comparison,
        Intent::CareerAdvice,
        Intent::Technical,
        Intent::Enrollment,
        Intent::Support,
        Intent::General,
        Intent::Greeting,
        Intent::Farewell,
        Intent::Unclear,
    ];

    /// Label as it appears in prompts and telemetry.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::CourseInquiry => "course_inquiry",
            Intent::Pricing => "pricing",
            Intent::Schedule => "schedule",
            Intent::Comparison => "comparison",
            Intent::CareerAdvice => "career_advice",
            Intent::Technical => "technical",
            Intent::Enrollment => "enrollment",
            Intent::Support => "support",
            Intent::General => "general",
            Intent::Greeting => "greeting",
            Intent::Farewell => "farewell",
            Intent::Unclear => "unclear",
        }
    }

    /// Output token budget for the generation call answering this intent.
    ///
    /// Short social turns get short answers; comparisons and career advice
    /// get room to lay out options.
    pub fn max_response_tokens(&self) -> u32 {
        match self {
            Intent::Greeting | Intent::Farewell => 100,
            Intent::Pricing | Intent::Schedule => 200,
            Intent::Comparison | Intent::CareerAdvice => 400,
            _ => 300,
        }
    }
}

/// How pressed for time the visitor sounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    #[default]
    Medium,
    Low,
}

/// Classification of a single visitor message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResult {
    /// Detected intent.
    #[serde(default)]
    pub intent: Intent,
    /// Vendor mentioned in the message, if any.
    #[serde(default)]
    pub vendor: Option<String>,
    /// Specific course mentioned, if any.
    #[serde(default)]
    pub course_name: Option<String>,
    /// Perceived urgency.
    #[serde(default)]
    pub urgency: Urgency,
    /// Whether the visitor seems ready to share contact details.
    #[serde(default)]
    pub lead_ready: bool,
}

impl Default for IntentResult {
    fn default() -> Self {
        Self {
            intent: Intent::Unclear,
            vendor: None,
            course_name: None,
            urgency: Urgency::Medium,
            lead_ready: false,
        }
    }
}

/// Classifies visitor messages with a single-shot provider call.
pub struct IntentClassifier {
    provider: Arc<dyn ChatProvider>,
    instructions: String,
}

impl IntentClassifier {
    /// Creates a classifier using the standard classification instructions.
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            provider,
            instructions: INTENT_CLASSIFICATION_PROMPT.to_string(),
        }
    }

    /// Overrides the classification instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Classifies one visitor message.
    ///
    /// Never fails: provider errors and unparsable output both degrade to
    /// the default result, logged at warn level.
    pub async fn classify(&self, message: &str) -> IntentResult {
        let request = CompletionRequest::new()
            .with_system_prompt(self.instructions.clone())
            .with_message(MessageRole::User, message)
            .with_max_tokens(CLASSIFICATION_MAX_TOKENS)
            .with_temperature(0.0);

        match self.provider.complete(request).await {
            Ok(response) => parse_intent_json(&response.content).unwrap_or_else(|| {
                tracing::warn!(
                    raw = %response.content,
                    "intent classification returned no parsable JSON, using default"
                );
                IntentResult::default()
            }),
            Err(err) => {
                tracing::warn!(error = %err, "intent classification failed, using default");
                IntentResult::default()
            }
        }
    }
}

/// Pulls the first-to-last brace span out of free text and parses it.
///
/// Models often wrap the JSON in prose or code fences; the widest brace span
/// tolerates both.
fn parse_intent_json(text: &str) -> Option<IntentResult> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockChatProvider, MockError};

    #[test]
    fn token_budgets_by_intent() {
        assert_eq!(Intent::Greeting.max_response_tokens(), 100);
        assert_eq!(Intent::Farewell.max_response_tokens(), 100);
        assert_eq!(Intent::Pricing.max_response_tokens(), 200);
        assert_eq!(Intent::Schedule.max_response_tokens(), 200);
        assert_eq!(Intent::Comparison.max_response_tokens(), 400);
        assert_eq!(Intent::CareerAdvice.max_response_tokens(), 400);
        assert_eq!(Intent::CourseInquiry.max_response_tokens(), 300);
        assert_eq!(Intent::Unclear.max_response_tokens(), 300);
    }

    #[test]
    fn intent_parses_snake_case_labels() {
        let intent: Intent = serde_json::from_str("\"course_inquiry\"").unwrap();
        assert_eq!(intent, Intent::CourseInquiry);

        let intent: Intent = serde_json::from_str("\"career_advice\"").unwrap();
        assert_eq!(intent, Intent::CareerAdvice);
    }

    #[test]
    fn unknown_intent_label_falls_back_to_unclear() {
        let intent: Intent = serde_json::from_str("\"buy_groceries\"").unwrap();
        assert_eq!(intent, Intent::Unclear);
    }

    #[test]
    fn every_intent_label_appears_in_the_classification_prompt() {
        for intent in Intent::ALL {
            assert!(
                INTENT_CLASSIFICATION_PROMPT.contains(intent.as_str()),
                "prompt is missing label {}",
                intent.as_str()
            );
        }
    }

    #[test]
    fn default_result_is_conservative() {
        let result = IntentResult::default();
        assert_eq!(result.intent, Intent::Unclear);
        assert_eq!(result.urgency, Urgency::Medium);
        assert!(!result.lead_ready);
        assert!(result.vendor.is_none());
    }

    #[test]
    fn parse_extracts_json_wrapped_in_prose() {
        let text = "Here is my classification:\n{\"intent\": \"pricing\", \"urgency\": \"high\", \"lead_ready\": true}\nHope that helps!";
        let result = parse_intent_json(text).unwrap();
        assert_eq!(result.intent, Intent::Pricing);
        assert_eq!(result.urgency, Urgency::High);
        assert!(result.lead_ready);
    }

    #[test]
    fn parse_tolerates_missing_fields() {
        let result = parse_intent_json("{\"intent\": \"greeting\"}").unwrap();
        assert_eq!(result.intent, Intent::Greeting);
        assert_eq!(result.urgency, Urgency::Medium);
        assert!(!result.lead_ready);
    }

    #[test]
    fn parse_rejects_braceless_text() {
        assert!(parse_intent_json("no json here").is_none());
        assert!(parse_intent_json("} backwards {").is_none());
    }

    #[tokio::test]
    async fn classify_parses_provider_output() {
        let provider = Arc::new(MockChatProvider::new().with_response(
            "{\"intent\": \"comparison\", \"vendor\": \"Microsoft\", \"urgency\": \"low\", \"lead_ready\": false}",
        ));
        let classifier = IntentClassifier::new(provider.clone());

        let result = classifier.classify("AZ-104 vs AZ-305?").await;

        assert_eq!(result.intent, Intent::Comparison);
        assert_eq!(result.vendor.as_deref(), Some("Microsoft"));
        assert_eq!(result.urgency, Urgency::Low);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn classify_sends_deterministic_small_request() {
        let provider = Arc::new(MockChatProvider::new().with_response("{\"intent\": \"greeting\"}"));
        let classifier = IntentClassifier::new(provider.clone());

        classifier.classify("hi").await;

        let calls = provider.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].temperature, Some(0.0));
        assert_eq!(calls[0].max_tokens, Some(CLASSIFICATION_MAX_TOKENS));
        assert_eq!(
            calls[0].system_prompt.as_deref(),
            Some(INTENT_CLASSIFICATION_PROMPT)
        );
        assert_eq!(calls[0].messages.len(), 1);
        assert_eq!(calls[0].messages[0].content, "hi");
    }

    #[tokio::test]
    async fn classify_defaults_on_provider_error() {
        let provider = Arc::new(MockChatProvider::new().with_error(MockError::Unavailable));
        let classifier = IntentClassifier::new(provider);

        let result = classifier.classify("anything").await;

        assert_eq!(result, IntentResult::default());
    }

    #[tokio::test]
    async fn classify_defaults_on_garbage_output() {
        let provider = Arc::new(MockChatProvider::new().with_response("I cannot classify this."));
        let classifier = IntentClassifier::new(provider);

        let result = classifier.classify("anything").await;

        assert_eq!(result, IntentResult::default());
    }

    #[tokio::test]
    async fn classify_honors_custom_instructions() {
        let provider = Arc::new(MockChatProvider::new().with_response("{\"intent\": \"general\"}"));
        let classifier =
            IntentClassifier::new(provider.clone()).with_instructions("Reply with JSON only.");

        classifier.classify("hello").await;

        let calls = provider.get_calls();
        assert_eq!(calls[0].system_prompt.as_deref(), Some("Reply with JSON only."));
    }
}
