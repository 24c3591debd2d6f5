//! Lead signal extraction.
//!
//! Scans visitor messages for contact details with plain pattern matching,
//! independent of any model call. Recomputed from the full history each
//! turn, so the result never depends on what earlier turns extracted.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::chat::{ChatMessage, CollectedInfo};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\w.-]+@[\w.-]+\.\w+").unwrap()
});

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});

/// Name heuristics, tried in order. A rule only wins with a capture longer
/// than two characters; shorter hits fall through to the next rule.
static NAME_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)my name is (\w+(?:\s+\w+)?)",
        r"(?i)i(?:'m| am) (\w+)",
        r"(?i)call me (\w+)",
        r"(?i)this is (\w+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Extracts contact details from the visitor side of a conversation.
///
/// Pure function over visitor-authored messages; assistant and operator
/// turns are never scanned. Fields that do not appear stay unset, and
/// `interested_courses` is left for the caller to accumulate.
pub fn extract_lead_info(messages: &[ChatMessage]) -> CollectedInfo {
    let visitor_text = messages
        .iter()
        .filter(|m| m.role.is_visitor())
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let name = NAME_RULES.iter().find_map(|rule| {
        rule.captures(&visitor_text)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
            .filter(|name| name.chars().count() > 2)
            .map(str::to_string)
    });

    CollectedInfo {
        name,
        email: EMAIL.find(&visitor_text).map(|m| m.as_str().to_string()),
        phone: PHONE.find(&visitor_text).map(|m| m.as_str().to_string()),
        ..CollectedInfo::default()
    }
}
