//! Context assembly for generation prompts.
//!
//! Merges page context, collected visitor info, the detected intent, and
//! retrieved knowledge snippets into a labeled prompt fragment. Pure string
//! building; the orchestrator appends the result to the persona prompt.

use crate::domain::chat::intent::IntentResult;
use crate::domain::chat::message::ConversationContext;
use crate::ports::SearchResult;

/// Knowledge snippets included in the prompt. Search may return more for
/// telemetry, but only the best few are worth the prompt space.
pub const KNOWLEDGE_SNIPPET_LIMIT: usize = 3;

/// Builds the per-turn context fragment.
///
/// Sections appear only when their inputs are present, with one exception:
/// the detected intent is always included since classification always yields
/// a result. Sections are joined by blank lines, with no placeholder text
/// for absent fields.
pub fn assemble_context(
    context: &ConversationContext,
    search_results: &[SearchResult],
    intent: &IntentResult,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(page) = &context.page_context {
        let mut lines = vec!["## VISITOR CONTEXT".to_string()];
        let page_label = if page.title.is_empty() {
            &page.url
        } else {
            &page.title
        };
        lines.push(format!("- Current Page: {page_label}"));
        let page_type = if page.page_type.is_empty() {
            "unknown"
        } else {
            &page.page_type
        };
        lines.push(format!("- Page Type: {page_type}"));
        if let Some(course) = &page.course_name {
            lines.push(format!("- Viewing Course: {course}"));
        }
        parts.push(lines.join("\n"));
    }

    let info = &context.collected_info;
    if !info.is_empty() {
        let mut lines = vec!["## VISITOR INFO (Already collected)".to_string()];
        if let Some(name) = &info.name {
            lines.push(format!("- Name: {name}"));
        }
        if let Some(email) = &info.email {
            lines.push(format!("- Email: {email}"));
        }
        if let Some(phone) = &info.phone {
            lines.push(format!("- Phone: {phone}"));
        }
        if let Some(company) = &info.company {
            lines.push(format!("- Company: {company}"));
        }
        if !info.interested_courses.is_empty() {
            lines.push(format!(
                "- Interested In: {}",
                info.interested_courses.join(", ")
            ));
        }
        parts.push(lines.join("\n"));
    }

    let mut lines = vec![
        "## DETECTED INTENT".to_string(),
        format!("- Intent: {}", intent.intent.as_str()),
    ];
    if let Some(vendor) = &intent.vendor {
        lines.push(format!("- Vendor Interest: {vendor}"));
    }
    if let Some(course) = &intent.course_name {
        lines.push(format!("- Course Mentioned: {course}"));
    }
    parts.push(lines.join("\n"));

    if !search_results.is_empty() {
        let snippets = search_results
            .iter()
            .take(KNOWLEDGE_SNIPPET_LIMIT)
            .map(|r| {
                let mut info = format!("### {}", r.title);
                if !r.content.is_empty() {
                    info.push('\n');
                    info.push_str(&r.content);
                }
                if let Some(url) = &r.url {
                    info.push_str("\nURL: ");
                    info.push_str(url);
                }
                info
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        parts.push(format!(
            "## RELEVANT KNOWLEDGE BASE INFO\nUse this information to answer accurately. Include URLs when mentioning courses.\n\n{snippets}"
        ));
    }

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::intent::Intent;
    use crate::domain::chat::message::{CollectedInfo, PageContext};
    use crate::ports::SourceType;

    fn result(title: &str, similarity: f32) -> SearchResult {
        SearchResult {
            source_type: SourceType::Course,
            source_id: title.to_lowercase(),
            title: title.to_string(),
            content: format!("{title} content"),
            url: Some(format!("https://example.com/{}", title.to_lowercase())),
            similarity,
        }
    }

    #[test]
    fn bare_context_yields_only_the_intent_section() {
        let fragment = assemble_context(
            &ConversationContext::default(),
            &[],
            &IntentResult::default(),
        );

        assert_eq!(fragment, "## DETECTED INTENT\n- Intent: unclear");
    }

    #[test]
    fn page_context_section_includes_course_line_when_present() {
        let ctx = ConversationContext::default().with_page_context(
            PageContext::new("https://example.com/az-104", "AZ-104 Course", "course")
                .with_course("az-104", "Azure Administrator"),
        );

        let fragment = assemble_context(&ctx, &[], &IntentResult::default());

        assert!(fragment.starts_with("## VISITOR CONTEXT\n"));
        assert!(fragment.contains("- Current Page: AZ-104 Course"));
        assert!(fragment.contains("- Page Type: course"));
        assert!(fragment.contains("- Viewing Course: Azure Administrator"));
    }

    #[test]
    fn page_context_falls_back_to_url_when_title_is_empty() {
        let ctx = ConversationContext::default()
            .with_page_context(PageContext::new("https://example.com/pricing", "", ""));

        let fragment = assemble_context(&ctx, &[], &IntentResult::default());

        assert!(fragment.contains("- Current Page: https://example.com/pricing"));
        assert!(fragment.contains("- Page Type: unknown"));
    }

    #[test]
    fn collected_info_lists_only_present_fields() {
        let mut info = CollectedInfo::default();
        info.email = Some("maria@acme.com".to_string());
        info.add_interested_course("AZ-104");
        let ctx = ConversationContext::default().with_collected_info(info);

        let fragment = assemble_context(&ctx, &[], &IntentResult::default());

        assert!(fragment.contains("## VISITOR INFO (Already collected)"));
        assert!(fragment.contains("- Email: maria@acme.com"));
        assert!(fragment.contains("- Interested In: AZ-104"));
        assert!(!fragment.contains("- Name:"));
        assert!(!fragment.contains("- Phone:"));
    }

    #[test]
    fn phone_only_info_still_gets_a_section() {
        let mut info = CollectedInfo::default();
        info.phone = Some("555-123-4567".to_string());
        let ctx = ConversationContext::default().with_collected_info(info);

        let fragment = assemble_context(&ctx, &[], &IntentResult::default());

        assert!(fragment.contains("- Phone: 555-123-4567"));
    }

    #[test]
    fn intent_section_carries_extracted_entities() {
        let intent = IntentResult {
            intent: Intent::Pricing,
            vendor: Some("Microsoft".to_string()),
            course_name: Some("AZ-104".to_string()),
            ..IntentResult::default()
        };

        let fragment = assemble_context(&ConversationContext::default(), &[], &intent);

        assert!(fragment.contains("- Intent: pricing"));
        assert!(fragment.contains("- Vendor Interest: Microsoft"));
        assert!(fragment.contains("- Course Mentioned: AZ-104"));
    }

    #[test]
    fn knowledge_section_caps_at_three_snippets() {
        let results = vec![
            result("First", 0.95),
            result("Second", 0.9),
            result("Third", 0.85),
            result("Fourth", 0.8),
        ];

        let fragment = assemble_context(
            &ConversationContext::default(),
            &results,
            &IntentResult::default(),
        );

        assert!(fragment.contains("## RELEVANT KNOWLEDGE BASE INFO"));
        assert!(fragment.contains("### First"));
        assert!(fragment.contains("### Third"));
        assert!(!fragment.contains("### Fourth"));
        assert!(fragment.contains("URL: https://example.com/first"));
    }

    #[test]
    fn snippet_without_url_omits_the_url_line() {
        let mut r = result("Untracked", 0.9);
        r.url = None;

        let fragment = assemble_context(
            &ConversationContext::default(),
            &[r],
            &IntentResult::default(),
        );

        assert!(fragment.contains("### Untracked"));
        assert!(!fragment.contains("URL:"));
    }

    #[test]
    fn sections_are_blank_line_separated() {
        let ctx = ConversationContext::default()
            .with_page_context(PageContext::new("https://example.com", "Home", "landing"));
        let fragment = assemble_context(&ctx, &[result("Doc", 0.9)], &IntentResult::default());

        let sections: Vec<&str> = fragment.split("\n\n").collect();
        assert!(sections[0].starts_with("## VISITOR CONTEXT"));
        assert!(sections.iter().any(|s| s.starts_with("## DETECTED INTENT")));
        assert!(sections
            .iter()
            .any(|s| s.starts_with("## RELEVANT KNOWLEDGE BASE INFO")));
    }
}
