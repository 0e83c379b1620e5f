use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Pluggable lemmatization backend.
///
/// Implementations must be deterministic: keyphrases and answers are folded by the
/// same backend and compared token by token.
pub trait Lemmatizer: Send + Sync + fmt::Debug {
    /// Identifies the backend in lexicon caches.
    fn backend_key(&self) -> &'static str;

    fn lemma(&self, token: &str) -> String;
}

/// Rule-based English inflection folding.
///
/// Produces lemma keys rather than dictionary lemmas: "losing", "lose" and "loses"
/// all fold to `los`. Both sides of a comparison go through the same rules, so the
/// keys only need to agree with each other.
#[derive(Debug, Default, Clone, Copy)]
pub struct SuffixLemmatizer;

impl SuffixLemmatizer {
    pub const BACKEND_KEY: &'static str = "suffix-rules/v1";
}

impl Lemmatizer for SuffixLemmatizer {
    fn backend_key(&self) -> &'static str {
        Self::BACKEND_KEY
    }

    fn lemma(&self, token: &str) -> String {
        fold_inflection(token)
    }
}

static IRREGULAR_FORMS: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

fn irregular_forms() -> &'static HashMap<&'static str, &'static str> {
    IRREGULAR_FORMS.get_or_init(|| {
        const FORMS: &[(&str, &str)] = &[
            ("felt", "feel"),
            ("lost", "lose"),
            ("took", "take"),
            ("taken", "take"),
            ("gave", "give"),
            ("given", "give"),
            ("ate", "eat"),
            ("eaten", "eat"),
            ("slept", "sleep"),
            ("began", "begin"),
            ("begun", "begin"),
            ("got", "get"),
            ("gotten", "get"),
            ("went", "go"),
            ("gone", "go"),
            ("drank", "drink"),
            ("drunk", "drink"),
            ("woke", "wake"),
            ("woken", "wake"),
            ("fell", "fall"),
            ("fallen", "fall"),
            ("caught", "catch"),
            ("children", "child"),
            ("women", "woman"),
            ("men", "man"),
            ("feet", "foot"),
            ("teeth", "tooth"),
            ("worse", "bad"),
            ("worst", "bad"),
        ];
        FORMS.iter().copied().collect()
    })
}

/// Words whose trailing letters look inflectional but are not.
const PROTECTED: &[&str] = &[
    "gas", "ibs", "sibo", "stress", "diabetes", "covid", "always", "less", "sometimes",
    "this", "was", "has", "his", "its", "yes", "process", "herpes", "series", "species",
];

pub(crate) fn fold_inflection(token: &str) -> String {
    let word = token.trim();
    if word.is_empty() || word.chars().any(|c| c.is_ascii_digit()) {
        return word.to_string();
    }
    if let Some(base) = irregular_forms().get(word) {
        return fold_trailing_e(base);
    }
    if PROTECTED.contains(&word) {
        return word.to_string();
    }

    let folded = strip_inflection(word);
    fold_trailing_e(&folded)
}

fn strip_inflection(word: &str) -> String {
    let len = word.len();

    if len > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..len - 3]);
    }
    if len > 4 && word.ends_with("ied") {
        return format!("{}y", &word[..len - 3]);
    }
    if len > 5 && word.ends_with("ing") {
        return undouble(&word[..len - 3]);
    }
    if len > 4 && word.ends_with("ed") && !word.ends_with("eed") {
        return undouble(&word[..len - 2]);
    }
    if len > 4 && word.ends_with("es") {
        let stem = &word[..len - 2];
        if stem.ends_with('s')
            || stem.ends_with('x')
            || stem.ends_with('z')
            || stem.ends_with("ch")
            || stem.ends_with("sh")
        {
            return stem.to_string();
        }
    }
    if len > 3
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return word[..len - 1].to_string();
    }

    word.to_string()
}

fn undouble(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n >= 3
        && bytes[n - 1].is_ascii_alphabetic()
        && bytes[n - 1] == bytes[n - 2]
        && !matches!(bytes[n - 1], b'l' | b's' | b'z')
    {
        let last = bytes[n - 1];
        if !matches!(last, b'a' | b'e' | b'i' | b'o' | b'u') {
            return stem[..n - 1].to_string();
        }
    }
    stem.to_string()
}

fn fold_trailing_e(word: &str) -> String {
    if word.len() > 3 && word.ends_with('e') && !word.ends_with("ee") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same_key(a: &str, b: &str) {
        assert_eq!(
            fold_inflection(a),
            fold_inflection(b),
            "expected '{a}' and '{b}' to share a lemma key"
        );
    }

    #[test]
    fn verb_inflections_share_a_key() {
        same_key("losing", "lose");
        same_key("lost", "lose");
        same_key("stressed", "stress");
        same_key("bloating", "bloat");
        same_key("bloated", "bloat");
        same_key("improving", "improve");
        same_key("felt", "feel");
        same_key("stopped", "stop");
    }

    #[test]
    fn plural_forms_share_a_key() {
        same_key("allergies", "allergy");
        same_key("headaches", "headache");
        same_key("rashes", "rash");
        same_key("cramps", "cramp");
        same_key("antibiotics", "antibiotic");
    }

    #[test]
    fn protected_words_are_left_alone() {
        assert_eq!(fold_inflection("gas"), "gas");
        assert_eq!(fold_inflection("stress"), "stress");
        assert_eq!(fold_inflection("diabetes"), "diabetes");
        assert_eq!(fold_inflection("covid19"), "covid19");
    }
}
