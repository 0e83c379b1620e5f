//! Lexical matching: text normalization, lemma folding and the three-stage keyphrase
//! matcher shared by every ruleset.

mod lemma;
mod lexicon;
mod normalize;
pub(crate) mod pattern;
mod text;

pub use lemma::{Lemmatizer, SuffixLemmatizer};
pub use lexicon::{Keyphrase, Lexicon};
pub use normalize::{
    normalize_text, parse_yes_no_with_followup, scrub_pii, split_by_delimiters, truncate_chars,
    YesNoAnswer, YesNoChoice,
};
pub use text::{AnalyzedText, NegationRules, Token};

use crate::focus::FocusArea;
use lexicon::lemma_tokens;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 85.0;
pub const FUZZY_CONFIDENCE: f64 = 0.95;

/// Stage of the matcher that produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    Lemma,
    Fuzzy,
    Substring,
}

impl MatchStage {
    pub const fn confidence(self) -> f64 {
        match self {
            MatchStage::Lemma | MatchStage::Substring => 1.0,
            MatchStage::Fuzzy => FUZZY_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyphraseMatch {
    pub lexicon: String,
    pub keyphrase: String,
    pub matched_text: String,
    pub stage: MatchStage,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(skip)]
    pub span: Range<usize>,
}

/// Outcome of scanning one lexicon with negation awareness.
#[derive(Debug, Clone, PartialEq)]
pub enum LexiconHit {
    Affirmed(KeyphraseMatch),
    /// Every occurrence was negated; the first is kept for the audit trail.
    Negated(KeyphraseMatch),
    Absent,
}

/// Matching capabilities chosen at construction time.
#[derive(Clone)]
pub struct MatchStrategy {
    lemmatizer: Option<Arc<dyn Lemmatizer>>,
    fuzzy: bool,
}

impl MatchStrategy {
    /// Lemma match with fuzzy fallback.
    pub fn lemma() -> Self {
        Self::with_lemmatizer(Arc::new(SuffixLemmatizer))
    }

    pub fn with_lemmatizer(lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        Self {
            lemmatizer: Some(lemmatizer),
            fuzzy: true,
        }
    }

    /// No lemmatizer: substring containment backed by fuzzy matching.
    pub fn fuzzy() -> Self {
        Self {
            lemmatizer: None,
            fuzzy: true,
        }
    }

    /// Plain substring containment only.
    pub fn substring() -> Self {
        Self {
            lemmatizer: None,
            fuzzy: false,
        }
    }

    pub fn without_fuzzy(mut self) -> Self {
        self.fuzzy = false;
        self
    }

    pub fn has_lemmatizer(&self) -> bool {
        self.lemmatizer.is_some()
    }

    pub fn has_fuzzy(&self) -> bool {
        self.fuzzy
    }

    fn backend_key(&self) -> Option<&'static str> {
        self.lemmatizer.as_ref().map(|backend| backend.backend_key())
    }
}

impl fmt::Debug for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchStrategy")
            .field("lemmatizer", &self.backend_key())
            .field("fuzzy", &self.fuzzy)
            .finish()
    }
}

impl Default for MatchStrategy {
    fn default() -> Self {
        Self::lemma()
    }
}

/// Stateless keyphrase matcher; built once and shared read-only.
#[derive(Debug, Clone)]
pub struct LexicalEngine {
    strategy: MatchStrategy,
    default_threshold: f64,
}

impl LexicalEngine {
    pub fn new(strategy: MatchStrategy, default_threshold: f64) -> Self {
        let default_threshold = if default_threshold.is_finite() {
            default_threshold.clamp(0.0, 100.0)
        } else {
            DEFAULT_FUZZY_THRESHOLD
        };
        Self {
            strategy,
            default_threshold,
        }
    }

    pub fn strategy(&self) -> &MatchStrategy {
        &self.strategy
    }

    pub fn default_threshold(&self) -> f64 {
        self.default_threshold
    }

    fn lemmatizer(&self) -> Option<&dyn Lemmatizer> {
        self.strategy.lemmatizer.as_deref()
    }

    pub fn analyze(&self, raw: &str) -> AnalyzedText {
        AnalyzedText::new(raw, self.lemmatizer())
    }

    pub fn compile(&self, name: &str, phrases: &[&str], weights: &[(FocusArea, f64)]) -> Lexicon {
        Lexicon::compile(name, phrases, weights, self.lemmatizer())
    }

    /// Weightless lexicon used for qualifier and context terms.
    pub fn terms(&self, name: &str, phrases: &[&str]) -> Lexicon {
        self.compile(name, phrases, &[])
    }

    /// First keyphrase of `lexicon` found in `text`, ignoring negation.
    pub fn find(
        &self,
        text: &AnalyzedText,
        lexicon: &Lexicon,
        threshold: Option<f64>,
    ) -> Option<KeyphraseMatch> {
        match self.scan(text, lexicon, threshold, None) {
            LexiconHit::Affirmed(hit) | LexiconHit::Negated(hit) => Some(hit),
            LexiconHit::Absent => None,
        }
    }

    /// Runs the stages in order, discarding negated occurrences when `negation` is
    /// given. A negated exact hit is final: the fuzzy stage is not consulted.
    pub fn scan(
        &self,
        text: &AnalyzedText,
        lexicon: &Lexicon,
        threshold: Option<f64>,
        negation: Option<&NegationRules>,
    ) -> LexiconHit {
        if text.is_empty() || lexicon.is_empty() {
            return LexiconHit::Absent;
        }

        let exact = self.exact_occurrences(text, lexicon);
        if !exact.is_empty() {
            return settle(text, exact, negation);
        }

        if self.strategy.fuzzy {
            let threshold = threshold.unwrap_or(self.default_threshold);
            let fuzzy = fuzzy_occurrences(text, lexicon, threshold);
            if !fuzzy.is_empty() {
                debug!(
                    lexicon = lexicon.name(),
                    keyphrase = %fuzzy[0].keyphrase,
                    similarity = fuzzy[0].similarity.unwrap_or_default(),
                    "fuzzy keyphrase match"
                );
                return settle(text, fuzzy, negation);
            }
        }

        LexiconHit::Absent
    }

    /// Exact stages only (lemma or substring); the fuzzy stage is never consulted.
    pub fn scan_exact(
        &self,
        text: &AnalyzedText,
        lexicon: &Lexicon,
        negation: Option<&NegationRules>,
    ) -> LexiconHit {
        if text.is_empty() || lexicon.is_empty() {
            return LexiconHit::Absent;
        }
        settle(text, self.exact_occurrences(text, lexicon), negation)
    }

    /// First exact occurrence, ignoring negation.
    pub fn find_exact(&self, text: &AnalyzedText, lexicon: &Lexicon) -> Option<KeyphraseMatch> {
        match self.scan_exact(text, lexicon, None) {
            LexiconHit::Affirmed(hit) | LexiconHit::Negated(hit) => Some(hit),
            LexiconHit::Absent => None,
        }
    }

    /// True when any term appears through an exact stage; negation is ignored.
    pub fn mentions(&self, text: &AnalyzedText, lexicon: &Lexicon) -> bool {
        !text.is_empty() && !self.exact_occurrences(text, lexicon).is_empty()
    }

    fn exact_occurrences(&self, text: &AnalyzedText, lexicon: &Lexicon) -> Vec<KeyphraseMatch> {
        let mut hits = Vec::new();

        match self.lemmatizer() {
            Some(backend) => {
                let cached = lexicon.backend() == Some(backend.backend_key());
                for phrase in lexicon.phrases() {
                    let lemmas = if cached {
                        phrase.lemma_tokens.clone()
                    } else {
                        lemma_tokens(&phrase.surface_tokens, Some(backend))
                    };
                    for start in text.find_sequence(&lemmas, true) {
                        let span = start..start + lemmas.len();
                        hits.push(build_match(text, lexicon, phrase, span, MatchStage::Lemma, None));
                    }
                }
            }
            None => {
                for phrase in lexicon.phrases() {
                    for (offset, _) in text.normalized().match_indices(phrase.normalized.as_str()) {
                        if let Some(span) = text.span_for_bytes(offset..offset + phrase.normalized.len()) {
                            hits.push(build_match(
                                text,
                                lexicon,
                                phrase,
                                span,
                                MatchStage::Substring,
                                None,
                            ));
                        }
                    }
                }
            }
        }

        hits
    }
}

impl Default for LexicalEngine {
    fn default() -> Self {
        Self::new(MatchStrategy::default(), DEFAULT_FUZZY_THRESHOLD)
    }
}

fn fuzzy_occurrences(text: &AnalyzedText, lexicon: &Lexicon, threshold: f64) -> Vec<KeyphraseMatch> {
    let tokens = text.tokens();
    let mut hits = Vec::new();

    for phrase in lexicon.phrases() {
        let width = phrase.word_count();
        if width == 0 || width > tokens.len() {
            continue;
        }
        for start in 0..=tokens.len() - width {
            let span = start..start + width;
            let window = text.span_text(&span);
            let similarity = strsim::normalized_levenshtein(&phrase.normalized, &window) * 100.0;
            if similarity >= threshold {
                hits.push(build_match(
                    text,
                    lexicon,
                    phrase,
                    span,
                    MatchStage::Fuzzy,
                    Some(similarity),
                ));
            }
        }
    }

    hits.sort_by(|a, b| {
        b.similarity
            .unwrap_or_default()
            .total_cmp(&a.similarity.unwrap_or_default())
    });
    hits
}

fn build_match(
    text: &AnalyzedText,
    lexicon: &Lexicon,
    phrase: &Keyphrase,
    span: Range<usize>,
    stage: MatchStage,
    similarity: Option<f64>,
) -> KeyphraseMatch {
    KeyphraseMatch {
        lexicon: lexicon.name().to_string(),
        keyphrase: phrase.raw.clone(),
        matched_text: text.span_text(&span),
        stage,
        confidence: stage.confidence(),
        similarity,
        span,
    }
}

fn settle(
    text: &AnalyzedText,
    occurrences: Vec<KeyphraseMatch>,
    negation: Option<&NegationRules>,
) -> LexiconHit {
    let Some(rules) = negation else {
        return occurrences
            .into_iter()
            .next()
            .map_or(LexiconHit::Absent, LexiconHit::Affirmed);
    };

    let mut first_negated = None;
    for hit in occurrences {
        if text.is_negated(&hit.span, rules) {
            if first_negated.is_none() {
                first_negated = Some(hit);
            }
        } else {
            return LexiconHit::Affirmed(hit);
        }
    }

    first_negated.map_or(LexiconHit::Absent, LexiconHit::Negated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::codes::*;

    fn gut_lexicon(engine: &LexicalEngine) -> Lexicon {
        engine.compile("gut", &["bloating", "abdominal pain", "diarrhea"], &[(GA, 0.25)])
    }

    #[test]
    fn lemma_stage_matches_inflected_forms() {
        let engine = LexicalEngine::default();
        let lexicon = gut_lexicon(&engine);
        let text = engine.analyze("I get so bloated after dinner");

        let hit = engine.find(&text, &lexicon, None).expect("lemma match");

        assert_eq!(hit.stage, MatchStage::Lemma);
        assert_eq!(hit.keyphrase, "bloating");
        assert_eq!(hit.matched_text, "bloated");
        assert_eq!(hit.confidence, 1.0);
    }

    #[test]
    fn fuzzy_stage_recovers_misspellings_with_discount() {
        let engine = LexicalEngine::default();
        let lexicon = gut_lexicon(&engine);
        let text = engine.analyze("constant diarhea lately");

        let hit = engine.find(&text, &lexicon, None).expect("fuzzy match");

        assert_eq!(hit.stage, MatchStage::Fuzzy);
        assert_eq!(hit.confidence, FUZZY_CONFIDENCE);
        assert!(hit.similarity.unwrap_or_default() >= DEFAULT_FUZZY_THRESHOLD);
    }

    #[test]
    fn substring_strategy_matches_word_fragments() {
        let engine = LexicalEngine::new(MatchStrategy::substring(), DEFAULT_FUZZY_THRESHOLD);
        let lexicon = engine.terms("bloat", &["bloat"]);
        let text = engine.analyze("Bloating every evening");

        let hit = engine.find(&text, &lexicon, None).expect("substring match");
        assert_eq!(hit.stage, MatchStage::Substring);
        assert_eq!(hit.matched_text, "bloating");

        let misspelled = engine.analyze("diarhea");
        assert!(engine.find(&misspelled, &gut_lexicon(&engine), None).is_none());
    }

    #[test]
    fn negated_occurrence_is_skipped_for_a_later_affirmed_one() {
        let engine = LexicalEngine::default();
        let lexicon = gut_lexicon(&engine);
        let rules = NegationRules::STANDARD;

        let text = engine.analyze("no bloating, but diarrhea daily");
        match engine.scan(&text, &lexicon, None, Some(&rules)) {
            LexiconHit::Affirmed(hit) => assert_eq!(hit.keyphrase, "diarrhea"),
            other => panic!("expected affirmed diarrhea, got {other:?}"),
        }

        let text = engine.analyze("never any bloating");
        match engine.scan(&text, &lexicon, None, Some(&rules)) {
            LexiconHit::Negated(hit) => assert_eq!(hit.keyphrase, "bloating"),
            other => panic!("expected negated match, got {other:?}"),
        }
    }

    #[test]
    fn no_match_is_absent_not_an_error() {
        let engine = LexicalEngine::default();
        let text = engine.analyze("I sleep fine and feel great");
        assert_eq!(
            engine.scan(&text, &gut_lexicon(&engine), None, None),
            LexiconHit::Absent
        );
    }
}
