//! Radio selections with a trailing qualifier ("Morning; after breakfast") and the
//! keyword sets those qualifiers are read with.

use super::AnswerValue;
use crate::lexical::{AnalyzedText, LexicalEngine, Lexicon, LexiconHit, NegationRules};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioAnswer {
    /// Lowercased, trimmed selection.
    pub choice: String,
    pub text: Option<String>,
}

impl RadioAnswer {
    /// Splits at the first `;`, otherwise at the first `,`.
    pub fn parse(answer: &AnswerValue) -> Self {
        match answer {
            AnswerValue::List(items) => {
                let mut items = items.iter().map(|item| item.trim()).filter(|item| !item.is_empty());
                let choice = items.next().unwrap_or_default().to_lowercase();
                let rest = items.collect::<Vec<_>>().join(", ");
                Self {
                    choice,
                    text: Some(rest).filter(|text| !text.is_empty()),
                }
            }
            other => Self::parse_str(&other.as_text()),
        }
    }

    pub fn parse_str(raw: &str) -> Self {
        let raw = raw.trim();
        let (choice, text) = match raw.split_once(';').or_else(|| raw.split_once(',')) {
            Some((choice, text)) => (choice, Some(text.trim())),
            None => (raw, None),
        };
        Self {
            choice: choice.trim().to_lowercase(),
            text: text.filter(|text| !text.is_empty()).map(str::to_string),
        }
    }
}

/// Named keyword sets, matched with negation so "no mold" does not count.
#[derive(Debug)]
pub(crate) struct Qualifiers {
    engine: LexicalEngine,
    sets: BTreeMap<&'static str, Lexicon>,
}

impl Qualifiers {
    pub(crate) fn new(engine: &LexicalEngine, sets: &[(&'static str, &[&str])]) -> Self {
        Self {
            engine: engine.clone(),
            sets: sets
                .iter()
                .map(|(name, phrases)| (*name, engine.terms(name, phrases)))
                .collect(),
        }
    }

    pub(crate) fn analyze(&self, text: &str) -> AnalyzedText {
        self.engine.analyze(text)
    }

    /// First affirmed phrase of set `name`.
    pub(crate) fn find(&self, text: &AnalyzedText, name: &str) -> Option<String> {
        let lexicon = self.sets.get(name)?;
        match self
            .engine
            .scan_exact(text, lexicon, Some(&NegationRules::STANDARD))
        {
            LexiconHit::Affirmed(hit) => Some(hit.matched_text),
            LexiconHit::Negated(_) | LexiconHit::Absent => None,
        }
    }

    pub(crate) fn has(&self, text: &AnalyzedText, name: &str) -> bool {
        self.find(text, name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_semicolon_before_comma() {
        let radio = RadioAnswer::parse_str("Other; restaurants, travel");
        assert_eq!(radio.choice, "other");
        assert_eq!(radio.text.as_deref(), Some("restaurants, travel"));

        let radio = RadioAnswer::parse_str("Home, musty basement");
        assert_eq!(radio.text.as_deref(), Some("musty basement"));

        let radio = RadioAnswer::parse_str(" Morning ");
        assert_eq!(radio.choice, "morning");
        assert_eq!(radio.text, None);
    }

    #[test]
    fn list_answers_use_the_first_item_as_choice() {
        let answer = AnswerValue::List(vec!["Evening".into(), "big dinner".into()]);
        let radio = RadioAnswer::parse(&answer);
        assert_eq!(radio.choice, "evening");
        assert_eq!(radio.text.as_deref(), Some("big dinner"));
    }

    #[test]
    fn negated_qualifier_is_ignored() {
        let qualifiers = Qualifiers::new(&LexicalEngine::default(), &[("mold", &["mold", "damp"])]);
        let affirmed = qualifiers.analyze("visible mold in the bathroom");
        let negated = qualifiers.analyze("there is no mold");
        assert!(qualifiers.has(&affirmed, "mold"));
        assert!(!qualifiers.has(&negated, "mold"));
    }
}
