use super::lemma::Lemmatizer;
use super::normalize::normalize_text;
use crate::focus::{FocusArea, FocusVector};

/// One keyphrase with its normalized and lemma-folded forms.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyphrase {
    pub raw: String,
    pub normalized: String,
    pub surface_tokens: Vec<String>,
    pub lemma_tokens: Vec<String>,
}

impl Keyphrase {
    pub(crate) fn compile(raw: &str, lemmatizer: Option<&dyn Lemmatizer>) -> Self {
        let normalized = normalize_text(raw);
        let surface_tokens: Vec<String> = normalized.split(' ').map(str::to_string).collect();
        let lemma_tokens = lemma_tokens(&surface_tokens, lemmatizer);
        Self {
            raw: raw.to_string(),
            normalized,
            surface_tokens,
            lemma_tokens,
        }
    }

    pub fn word_count(&self) -> usize {
        self.surface_tokens.len()
    }
}

pub(crate) fn lemma_tokens(surface: &[String], lemmatizer: Option<&dyn Lemmatizer>) -> Vec<String> {
    match lemmatizer {
        Some(backend) => surface.iter().map(|word| backend.lemma(word)).collect(),
        None => surface.to_vec(),
    }
}

/// Named topic group: ordered keyphrases plus the base weights a hit contributes.
///
/// Lemma forms are cached for the backend that compiled the lexicon; matching with a
/// different backend re-folds on the fly.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexicon {
    name: String,
    phrases: Vec<Keyphrase>,
    weights: FocusVector,
    backend: Option<&'static str>,
}

impl Lexicon {
    pub(crate) fn compile(
        name: &str,
        phrases: &[&str],
        weights: &[(FocusArea, f64)],
        lemmatizer: Option<&dyn Lemmatizer>,
    ) -> Self {
        let phrases = phrases
            .iter()
            .map(|phrase| Keyphrase::compile(phrase, lemmatizer))
            .filter(|phrase| !phrase.normalized.is_empty())
            .collect();

        Self {
            name: name.to_string(),
            phrases,
            weights: FocusVector::from_weights(weights),
            backend: lemmatizer.map(|backend| backend.backend_key()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phrases(&self) -> &[Keyphrase] {
        &self.phrases
    }

    pub fn weights(&self) -> &FocusVector {
        &self.weights
    }

    pub fn backend(&self) -> Option<&'static str> {
        self.backend
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
