use super::lemma::Lemmatizer;
use super::normalize::is_apostrophe;
use std::ops::Range;

/// Words that open a new clause.
const COORDINATORS: &[&str] = &[
    "but", "and", "or", "however", "although", "though", "yet", "except", "whereas",
];

/// Subordinators open a new clause unless they directly follow a negation cue
/// ("not after antibiotics").
const SUBORDINATORS: &[&str] = &["since", "after", "because", "when", "until", "before"];

const NEGATION_HEADS: &[&str] = &["not", "no", "never"];

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub surface: String,
    pub lemma: String,
    pub clause: usize,
    pub sentence: usize,
    start: usize,
}

/// Tokenized answer with clause and sentence boundaries.
///
/// Modifier windows (negation, hedging, intensity) are measured in tokens and never
/// cross the boundary they are scoped to.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedText {
    raw: String,
    normalized: String,
    tokens: Vec<Token>,
}

impl AnalyzedText {
    pub(crate) fn new(raw: &str, lemmatizer: Option<&dyn Lemmatizer>) -> Self {
        let lowered = raw.to_lowercase();
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut clause = 0usize;
        let mut sentence = 0usize;
        let mut normalized_len = 0usize;

        let mut flush = |current: &mut String, clause: usize, sentence: usize, tokens: &mut Vec<Token>| {
            if current.is_empty() {
                return;
            }
            let surface = std::mem::take(current);
            let start = if normalized_len == 0 { 0 } else { normalized_len + 1 };
            normalized_len = start + surface.len();
            let lemma = match lemmatizer {
                Some(backend) => backend.lemma(&surface),
                None => surface.clone(),
            };
            tokens.push(Token {
                surface,
                lemma,
                clause,
                sentence,
                start,
            });
        };

        for ch in lowered.chars() {
            if is_apostrophe(ch) {
                continue;
            }
            if ch.is_alphanumeric() {
                current.push(ch);
                continue;
            }
            flush(&mut current, clause, sentence, &mut tokens);
            match ch {
                '.' | '!' | '?' | ';' | '\n' => {
                    clause += 1;
                    sentence += 1;
                }
                ',' | ':' | '|' | '•' | '(' | ')' => clause += 1,
                _ => {}
            }
        }
        flush(&mut current, clause, sentence, &mut tokens);

        renumber_clauses(&mut tokens);

        let normalized = tokens
            .iter()
            .map(|token| token.surface.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            raw: raw.to_string(),
            normalized,
            tokens,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Surface text covered by a token span.
    pub fn span_text(&self, span: &Range<usize>) -> String {
        self.tokens[span.clone()]
            .iter()
            .map(|token| token.surface.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Every start index where `needle` occurs contiguously.
    pub(crate) fn find_sequence(&self, needle: &[String], by_lemma: bool) -> Vec<usize> {
        if needle.is_empty() || needle.len() > self.tokens.len() {
            return Vec::new();
        }
        (0..=self.tokens.len() - needle.len())
            .filter(|&start| {
                needle.iter().enumerate().all(|(offset, word)| {
                    let token = &self.tokens[start + offset];
                    if by_lemma {
                        token.lemma == *word
                    } else {
                        token.surface == *word
                    }
                })
            })
            .collect()
    }

    /// Maps a byte range of [`normalized`](Self::normalized) to the tokens it touches.
    pub(crate) fn span_for_bytes(&self, bytes: Range<usize>) -> Option<Range<usize>> {
        let first = self
            .tokens
            .iter()
            .position(|token| bytes.start < token.start + token.surface.len())?;
        let last = self
            .tokens
            .iter()
            .rposition(|token| token.start < bytes.end)?;
        (first <= last).then(|| first..last + 1)
    }

    fn phrase_at(&self, index: usize, phrase: &[&str]) -> bool {
        phrase.iter().enumerate().all(|(offset, word)| {
            self.tokens
                .get(index + offset)
                .is_some_and(|token| token.surface == *word)
        })
    }

    fn same_clause(&self, a: usize, b: usize) -> bool {
        self.tokens[a].clause == self.tokens[b].clause
    }

    fn same_sentence(&self, a: usize, b: usize) -> bool {
        self.tokens[a].sentence == self.tokens[b].sentence
    }

    /// True when a negation cue governs the match at `span`.
    pub(crate) fn is_negated(&self, span: &Range<usize>, rules: &NegationRules) -> bool {
        if span.is_empty() || span.end > self.tokens.len() {
            return false;
        }
        let anchor = span.start;

        let window_start = anchor.saturating_sub(rules.window);
        for index in window_start..anchor {
            if !self.same_clause(index, anchor) {
                continue;
            }
            for cue in rules.cues {
                let cue_words: Vec<&str> = cue.split(' ').collect();
                let cue_end = index + cue_words.len();
                if cue_end > anchor || !self.phrase_at(index, &cue_words) {
                    continue;
                }
                let exempt = self
                    .tokens
                    .get(cue_end)
                    .is_some_and(|next| rules.exempt_followers.contains(&next.surface.as_str()));
                if !exempt {
                    return true;
                }
            }
        }

        let tail = span.end - 1;
        let trailing_end = (span.end + rules.trailing_window).min(self.tokens.len());
        for index in span.end..trailing_end {
            if !self.same_clause(index, tail) {
                break;
            }
            for phrase in rules.trailing {
                let words: Vec<&str> = phrase.split(' ').collect();
                if self.phrase_at(index, &words) {
                    return true;
                }
            }
        }

        false
    }

    /// Counts modifier phrases within `window` tokens of the span, same sentence,
    /// excluding tokens that belong to the match itself.
    pub(crate) fn count_nearby(&self, span: &Range<usize>, phrases: &[&str], window: usize) -> usize {
        if span.is_empty() || span.end > self.tokens.len() {
            return 0;
        }
        let anchor = span.start;
        let start = anchor.saturating_sub(window);
        let end = (span.end + window).min(self.tokens.len());
        let mut hits = 0;

        for index in start..end {
            if span.contains(&index) || !self.same_sentence(index, anchor) {
                continue;
            }
            for phrase in phrases {
                let words: Vec<&str> = phrase.split(' ').collect();
                let phrase_end = index + words.len();
                let overlaps = index < span.end && phrase_end > span.start;
                if !overlaps && phrase_end <= end && self.phrase_at(index, &words) {
                    hits += 1;
                }
            }
        }

        hits
    }

    /// True when any of `phrases` appears anywhere, compared on surface tokens.
    pub fn contains_any_surface(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|phrase| {
            let words: Vec<String> = phrase.split(' ').map(str::to_string).collect();
            !self.find_sequence(&words, false).is_empty()
        })
    }
}

fn renumber_clauses(tokens: &mut [Token]) {
    let mut clause = 0usize;
    let mut previous_raw_clause = None;

    for index in 0..tokens.len() {
        let raw_clause = tokens[index].clause;
        let punctuation_break = previous_raw_clause.is_some_and(|prev| prev != raw_clause);
        let word = tokens[index].surface.as_str();
        let follows_negation = index > 0
            && NEGATION_HEADS.contains(&tokens[index - 1].surface.as_str())
            && !punctuation_break;
        let word_break = index > 0
            && (COORDINATORS.contains(&word)
                || (SUBORDINATORS.contains(&word) && !follows_negation));

        if punctuation_break || word_break {
            clause += 1;
        }
        previous_raw_clause = Some(raw_clause);
        tokens[index].clause = clause;
    }
}

/// Negation cue tables, expressed in normalized (apostrophe-free) words.
#[derive(Debug, Clone, Copy)]
pub struct NegationRules {
    pub cues: &'static [&'static str],
    pub trailing: &'static [&'static str],
    pub exempt_followers: &'static [&'static str],
    pub window: usize,
    pub trailing_window: usize,
}

impl NegationRules {
    pub const STANDARD: NegationRules = NegationRules {
        cues: &[
            "not", "no", "never", "without", "doesnt", "dont", "isnt", "arent", "wont", "cant",
            "didnt", "wasnt", "werent", "ruled out", "excluded", "negative for", "free of",
        ],
        trailing: &[
            "doesnt bother",
            "dont bother",
            "does not bother",
            "do not bother",
            "doesnt affect",
            "dont affect",
            "not a problem",
            "no problem",
            "isnt a problem",
            "is fine",
            "has no effect",
            "makes no difference",
        ],
        exempt_followers: &["sure", "certain", "only"],
        window: 8,
        trailing_window: 4,
    };
}

impl Default for NegationRules {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::lemma::SuffixLemmatizer;

    fn analyze(text: &str) -> AnalyzedText {
        AnalyzedText::new(text, Some(&SuffixLemmatizer))
    }

    fn span_of(text: &AnalyzedText, word: &str) -> Range<usize> {
        let start = text
            .tokens()
            .iter()
            .position(|token| token.surface == word)
            .unwrap_or_else(|| panic!("expected token '{word}'"));
        start..start + 1
    }

    #[test]
    fn tokens_carry_clause_and_sentence_indices() {
        let text = analyze("Coffee is fine, but dairy hurts. Sleep helps");
        let clauses: Vec<usize> = text.tokens().iter().map(|t| t.clause).collect();
        let sentences: Vec<usize> = text.tokens().iter().map(|t| t.sentence).collect();

        assert_eq!(text.normalized(), "coffee is fine but dairy hurts sleep helps");
        assert_eq!(clauses, vec![0, 0, 0, 1, 1, 1, 2, 2]);
        assert_eq!(sentences, vec![0, 0, 0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn negation_is_scoped_to_the_clause() {
        let text = analyze("no coffee, but dairy every time");
        let rules = NegationRules::STANDARD;

        assert!(text.is_negated(&span_of(&text, "coffee"), &rules));
        assert!(!text.is_negated(&span_of(&text, "dairy"), &rules));
    }

    #[test]
    fn trailing_negation_phrase_discards_the_match() {
        let text = analyze("Dairy doesn't bother me");
        assert!(text.is_negated(&span_of(&text, "dairy"), &NegationRules::STANDARD));
    }

    #[test]
    fn subordinator_splits_clause_unless_negated() {
        let text = analyze("never felt well since covid");
        assert!(!text.is_negated(&span_of(&text, "covid"), &NegationRules::STANDARD));

        let text = analyze("not after antibiotics");
        assert!(text.is_negated(&span_of(&text, "antibiotics"), &NegationRules::STANDARD));
    }

    #[test]
    fn hedges_following_not_are_not_negations() {
        let text = analyze("not sure but maybe mold");
        assert!(!text.is_negated(&span_of(&text, "mold"), &NegationRules::STANDARD));
        let text = analyze("not sure it was mold");
        assert!(!text.is_negated(&span_of(&text, "mold"), &NegationRules::STANDARD));
    }

    #[test]
    fn nearby_modifiers_are_counted_within_the_sentence() {
        let text = analyze("I think it was mold. Extremely sure about coffee");
        let mold = span_of(&text, "mold");
        assert_eq!(text.count_nearby(&mold, &["i think", "maybe"], 8), 1);
        assert_eq!(text.count_nearby(&mold, &["extremely"], 8), 0);
    }

    #[test]
    fn byte_ranges_map_back_to_tokens() {
        let text = analyze("severe bloating after meals");
        let offset = text.normalized().find("bloating after").expect("substring present");
        let span = text
            .span_for_bytes(offset..offset + "bloating after".len())
            .expect("span maps");
        assert_eq!(span, 1..3);
        assert_eq!(text.span_text(&span), "bloating after");
    }
}
