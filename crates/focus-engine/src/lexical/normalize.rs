use super::pattern::Pattern;
use serde::{Deserialize, Serialize};

static LIST_NUMBERING: Pattern = Pattern::new(r"^(?:\d+[.)]|[-*•])\s*");
static EMAIL: Pattern = Pattern::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}");
static PHONE: Pattern =
    Pattern::new(r"(?:\+?\d{1,2}[\s.-]?)?(?:\(\d{3}\)|\d{3})[\s.-]?\d{3}[\s.-]?\d{4}\b");
static STREET_ADDRESS: Pattern = Pattern::new(
    r"(?i)\b\d{1,5}\s+(?:[a-z0-9]+\s+){0,3}(?:street|st|avenue|ave|road|rd|boulevard|blvd|lane|ln|drive|dr|court|ct|way)\b\.?",
);

/// Lowercases, drops apostrophes, turns every other non-alphanumeric character into
/// a space and collapses whitespace.
pub fn normalize_text(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if is_apostrophe(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            cleaned.extend(ch.to_lowercase());
        } else {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn is_apostrophe(ch: char) -> bool {
    matches!(ch, '\'' | '\u{2019}' | '\u{2018}' | '`')
}

/// Splits a delimited multi-select or list answer into trimmed items.
///
/// Separators are `,` `;` `|` `•` newlines and a dash surrounded by spaces; hyphens
/// inside words ("post-viral") are kept. Leading list numbering ("1.", "2)") and
/// bullets are stripped.
pub fn split_by_delimiters(text: &str) -> Vec<String> {
    text.replace(" - ", ";")
        .split([',', ';', '|', '•', '\n'])
        .map(|item| LIST_NUMBERING.replace_all(item.trim(), ""))
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Yes/no answer with optional free-text follow-up ("Yes; kids are 3 and 5").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YesNoAnswer {
    pub choice: YesNoChoice,
    pub follow_up: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YesNoChoice {
    Yes,
    No,
    Other,
}

pub fn parse_yes_no_with_followup(text: &str) -> YesNoAnswer {
    let trimmed = text.trim();
    let (head, tail) = match trimmed.find([';', ',']) {
        Some(index) => (&trimmed[..index], Some(trimmed[index + 1..].trim())),
        None => (trimmed, None),
    };

    let choice = match head.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => YesNoChoice::Yes,
        "no" | "n" | "false" | "0" => YesNoChoice::No,
        _ => YesNoChoice::Other,
    };

    let follow_up = match choice {
        YesNoChoice::Other => Some(trimmed.to_string()).filter(|value| !value.is_empty()),
        _ => tail.filter(|value| !value.is_empty()).map(str::to_string),
    };

    YesNoAnswer { choice, follow_up }
}

/// Replaces emails, phone numbers and street addresses with placeholders.
pub fn scrub_pii(text: &str) -> String {
    let scrubbed = EMAIL.replace_all(text, "[email]");
    let scrubbed = PHONE.replace_all(&scrubbed, "[phone]");
    STREET_ADDRESS.replace_all(&scrubbed, "[address]")
}

/// Truncates to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_apostrophes() {
        assert_eq!(
            normalize_text("  Coffee DOESN'T bother me -- really!! "),
            "coffee doesnt bother me really"
        );
        assert_eq!(normalize_text("COVID-19"), "covid 19");
    }

    #[test]
    fn split_strips_numbering_and_keeps_hyphenated_words() {
        let items = split_by_delimiters("1. lose weight\n2) post-viral fatigue; - sleep better | ");
        assert_eq!(items, vec!["lose weight", "post-viral fatigue", "sleep better"]);
    }

    #[test]
    fn yes_no_followup_is_split_on_first_delimiter() {
        let answer = parse_yes_no_with_followup("Yes; kids are 3 and 5, busy");
        assert_eq!(answer.choice, YesNoChoice::Yes);
        assert_eq!(answer.follow_up.as_deref(), Some("kids are 3 and 5, busy"));

        let answer = parse_yes_no_with_followup("no");
        assert_eq!(answer.choice, YesNoChoice::No);
        assert!(answer.follow_up.is_none());

        let answer = parse_yes_no_with_followup("depends on the week");
        assert_eq!(answer.choice, YesNoChoice::Other);
        assert_eq!(answer.follow_up.as_deref(), Some("depends on the week"));
    }

    #[test]
    fn pii_is_replaced_with_placeholders() {
        let scrubbed =
            scrub_pii("Email jane.doe@example.com or call 555-123-4567, I live at 42 Oak Street.");
        assert!(scrubbed.contains("[email]"));
        assert!(scrubbed.contains("[phone]"));
        assert!(scrubbed.contains("[address]"));
        assert!(!scrubbed.contains("Oak"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
