//! Response post-processing.
//!
//! Cleans raw model output before it reaches the visitor: whitespace
//! normalization, AI self-disclosure removal, and truncation back to the
//! last complete sentence. Pure string work, no I/O.

use once_cell::sync::Lazy;
use regex::Regex;

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

// Models occasionally break persona with "As an AI..." framing. Both
// patterns consume up to the next period so the surrounding sentence reads
// cleanly after removal.
static AI_DISCLOSURE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)As an AI.*?\.").unwrap());
static AI_DISCLOSURE_FIRST_PERSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)I(?:'m| am) an AI.*?\.").unwrap());

/// Cleans a raw model response.
///
/// # Steps
/// 1. Strip AI self-disclosure phrases (repeated until none remain, since a
///    removal can splice the surrounding text into a fresh match)
/// 2. Collapse 3+ consecutive newlines to 2
/// 3. Trim surrounding whitespace
/// 4. If the text does not end in `.`, `?` or `!`, cut back to the last
///    sentence terminator, but only when that keeps more than half the text
///
/// Idempotent: applying it twice gives the same output as applying it once.
pub fn post_process(content: &str) -> String {
    let mut processed = strip_ai_disclosures(content);

    processed = EXCESS_NEWLINES.replace_all(&processed, "\n\n").into_owned();

    processed = processed.trim().to_string();

    if !ends_with_terminator(&processed) {
        if let Some(last_complete) = last_sentence_end(&processed) {
            if (last_complete as f64) > (processed.len() as f64) * 0.5 {
                processed.truncate(last_complete + 1);
            }
        }
    }

    processed
}

/// Removes disclosure phrases until a fixed point.
///
/// Each pass strictly shrinks the text when it changes anything, so the loop
/// terminates.
fn strip_ai_disclosures(content: &str) -> String {
    let mut current = content.to_string();
    loop {
        let next = AI_DISCLOSURE.replace_all(&current, "");
        let next = AI_DISCLOSURE_FIRST_PERSON.replace_all(&next, "");
        if next == current {
            return current;
        }
        current = next.into_owned();
    }
}

fn ends_with_terminator(s: &str) -> bool {
    s.ends_with('.') || s.ends_with('?') || s.ends_with('!')
}

/// Byte index of the last sentence terminator, if any.
///
/// Terminators are single-byte ASCII, so truncating at `index + 1` always
/// lands on a char boundary.
fn last_sentence_end(s: &str) -> Option<usize> {
    let last_period = s.rfind('.');
    let last_question = s.rfind('?');
    let last_exclamation = s.rfind('!');

    [last_period, last_question, last_exclamation]
        .into_iter()
        .flatten()
        .max()
}
