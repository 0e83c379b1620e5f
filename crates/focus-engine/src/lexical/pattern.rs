use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::warn;

/// Lazily compiled regular expression declared as a `static`.
///
/// A pattern that fails to compile is logged once and then behaves as "never
/// matches", keeping every scoring path total.
pub(crate) struct Pattern {
    source: &'static str,
    compiled: OnceLock<Option<Regex>>,
}

impl Pattern {
    pub(crate) const fn new(source: &'static str) -> Self {
        Self {
            source,
            compiled: OnceLock::new(),
        }
    }

    pub(crate) fn regex(&self) -> Option<&Regex> {
        self.compiled
            .get_or_init(|| match Regex::new(self.source) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    warn!(pattern = self.source, error = %err, "static pattern failed to compile");
                    None
                }
            })
            .as_ref()
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.regex().is_some_and(|regex| regex.is_match(text))
    }

    pub(crate) fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.regex().and_then(|regex| regex.captures(text))
    }

    pub(crate) fn replace_all(&self, text: &str, replacement: &str) -> String {
        match self.regex() {
            Some(regex) => regex.replace_all(text, replacement).into_owned(),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static YEAR: Pattern = Pattern::new(r"\b(19|20)\d{2}\b");
    static BROKEN: Pattern = Pattern::new(r"(unclosed");

    #[test]
    fn compiled_pattern_matches() {
        assert!(YEAR.is_match("since 2019"));
        let caps = YEAR.captures("back in 1998 or so").expect("year captured");
        assert_eq!(&caps[0], "1998");
    }

    #[test]
    fn broken_pattern_never_matches() {
        assert!(!BROKEN.is_match("(unclosed"));
        assert_eq!(BROKEN.replace_all("keep me", "x"), "keep me");
    }
}
