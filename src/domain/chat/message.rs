//! Conversation data model for the chat pipeline.
//!
//! These types are transient: the orchestrator receives them fresh on every
//! turn and discards them once the response is built. Persisted copies live
//! with the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ports::MessageRole;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    /// Website visitor typing into the widget.
    Visitor,
    /// AI assistant.
    Assistant,
    /// Human operator who took over the conversation.
    Operator,
    /// System notices injected into the transcript.
    System,
}

impl ChatRole {
    /// Returns true for visitor-authored messages.
    pub fn is_visitor(&self) -> bool {
        matches!(self, ChatRole::Visitor)
    }

    /// Maps to the provider wire role: visitors speak as "user", everything
    /// else reads to the model as "assistant".
    pub fn provider_role(&self) -> MessageRole {
        match self {
            ChatRole::Visitor => MessageRole::User,
            _ => MessageRole::Assistant,
        }
    }
}

/// A single message in a conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who sent this message.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
    /// When the message was recorded.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a new message stamped with the current time.
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a visitor message.
    pub fn visitor(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Visitor, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    /// Creates an operator message.
    pub fn operator(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Operator, content)
    }
}

/// The page the visitor is on when they send a message.
///
/// Opaque to the pipeline beyond prompt interpolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    /// Page URL.
    pub url: String,
    /// Page title.
    pub title: String,
    /// Page kind as reported by the widget embed ("course", "pricing", ...).
    #[serde(rename = "type")]
    pub page_type: String,
    /// Course id when the page is a course detail page.
    pub course_id: Option<String>,
    /// Course name when the page is a course detail page.
    pub course_name: Option<String>,
}

impl PageContext {
    /// Creates page context for a non-course page.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        page_type: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            page_type: page_type.into(),
            course_id: None,
            course_name: None,
        }
    }

    /// Attaches the course the page is about.
    pub fn with_course(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.course_id = Some(id.into());
        self.course_name = Some(name.into());
        self
    }
}

/// Visitor details accumulated across a conversation.
///
/// Recomputed each turn from the full message history, so extraction stays
/// idempotent; the caller persists whichever copy it wants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    #[serde(default)]
    pub interested_courses: Vec<String>,
}

impl CollectedInfo {
    /// Records interest in a course, ignoring duplicates.
    pub fn add_interested_course(&mut self, course: impl Into<String>) {
        let course = course.into();
        if !self.interested_courses.contains(&course) {
            self.interested_courses.push(course);
        }
    }

    /// Returns true when nothing has been collected yet.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.interested_courses.is_empty()
    }
}

/// Everything the caller knows about the conversation so far.
///
/// Read-only input to the orchestrator; never mutated in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Prior messages, oldest first. The current visitor message is passed
    /// separately and must not appear here.
    pub messages: Vec<ChatMessage>,
    /// Page the visitor is chatting from, when the widget reports one.
    pub page_context: Option<PageContext>,
    /// Visitor info collected on earlier turns.
    #[serde(default)]
    pub collected_info: CollectedInfo,
}

impl ConversationContext {
    /// Creates context from prior messages.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            page_context: None,
            collected_info: CollectedInfo::default(),
        }
    }

    /// Sets the page context.
    pub fn with_page_context(mut self, page: PageContext) -> Self {
        self.page_context = Some(page);
        self
    }

    /// Sets previously collected visitor info.
    pub fn with_collected_info(mut self, info: CollectedInfo) -> Self {
        self.collected_info = info;
        self
    }
}
