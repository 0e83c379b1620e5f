//! "Which foods do you crave?" Multi-select chips with an optional "Other" text.

use super::{
    AnswerValue, DetailKind, IntakeField, Modifier, ParseFlag, Ruleset, RulesetResult,
    ScoreDetail, ScoringContext,
};
use crate::demographics::Sex;
use crate::focus::codes::*;
use crate::focus::{DomainCaps, FocusArea, FocusVector};
use crate::lexical::{normalize_text, LexicalEngine, Lexicon, LexiconHit, NegationRules};
use tracing::warn;

pub const FIELD_CAP: f64 = 1.5;

const HIGH_FREQUENCY: &[&str] = &["daily", "every day", "everyday", ">5/wk", "5+/wk"];
const MODERATE_FREQUENCY: &[&str] = &[
    "2-5/wk", "3-5/wk", "few times a week", "several times",
];
const NONE_WORDS: &[&str] = &["none", "no", "na", "n a", "nothing"];

const CRASH_TERMS: &[&str] = &["crash", "sleepy after eating", "tired after meal", "energy dip"];
const MENSTRUAL_TERMS: &[&str] = &["pms", "pre-menstrual", "premenstrual", "luteal", "before period"];
const HEAVY_CAFFEINE_TERMS: &[&str] = &[">3 cups", "3+ cups", "to function", "to get going"];
const DIZZINESS_TERMS: &[&str] = &["dizzy", "dizziness", "lightheaded", "standing up"];
const LOW_BP_TERMS: &[&str] = &["low blood pressure", "low bp", "hypotension"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Craving {
    Sweets,
    BreadPasta,
    Chocolate,
    Caffeine,
    Salty,
}

impl Craving {
    pub const fn label(self) -> &'static str {
        match self {
            Craving::Sweets => "sweets",
            Craving::BreadPasta => "bread_pasta",
            Craving::Chocolate => "chocolate",
            Craving::Caffeine => "caffeine",
            Craving::Salty => "salty",
        }
    }

    /// Salty is neutral unless an amplifier fires.
    pub const fn weights(self) -> &'static [(FocusArea, f64)] {
        match self {
            Craving::Sweets => &[(CM, 0.60), (MITO, 0.25), (IMM, 0.15), (GA, 0.30), (STR, 0.10)],
            Craving::BreadPasta => &[(CM, 0.50), (GA, 0.30), (MITO, 0.20)],
            Craving::Chocolate => &[(STR, 0.15), (COG, 0.10), (GA, 0.10)],
            Craving::Caffeine => &[(STR, 0.40), (COG, 0.20), (GA, 0.10)],
            Craving::Salty => &[],
        }
    }

    fn from_words(words: &[&str]) -> Option<Self> {
        words.iter().find_map(|word| match *word {
            "sweet" | "sweets" | "sugar" => Some(Craving::Sweets),
            "bread" | "pasta" => Some(Craving::BreadPasta),
            "chocolate" => Some(Craving::Chocolate),
            "caffeine" | "coffee" => Some(Craving::Caffeine),
            "salty" | "salt" => Some(Craving::Salty),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    Chip(Craving),
    Nothing,
    Other(String),
}

fn classify_item(item: &str) -> Selection {
    let normalized = normalize_text(item);
    let words: Vec<&str> = normalized.split(' ').collect();

    if words.first() == Some(&"other") {
        let rest = item
            .trim()
            .get("other".len()..)
            .unwrap_or_default()
            .trim_start_matches(|c: char| c == ':' || c == '-' || c == '(' || c.is_whitespace())
            .trim_end_matches(')');
        return Selection::Other(rest.to_string());
    }
    if let Some(craving) = Craving::from_words(&words) {
        return Selection::Chip(craving);
    }
    if NONE_WORDS.contains(&normalized.as_str()) {
        return Selection::Nothing;
    }
    Selection::Other(item.trim().to_string())
}

/// Frequency scaling read from the whole answer.
pub fn frequency_multiplier(text: &str) -> f64 {
    let text = text.to_lowercase();
    if HIGH_FREQUENCY.iter().any(|term| text.contains(term)) {
        1.5
    } else if MODERATE_FREQUENCY.iter().any(|term| text.contains(term)) {
        1.25
    } else {
        1.0
    }
}

static OTHER_LEXICON: [(&str, &[&str], &[(FocusArea, f64)]); 5] = [
    (
        "alcohol",
        &["alcohol", "beer", "wine", "liquor", "drinking", "drinks"],
        &[(DTX, 0.40), (CM, 0.20), (GA, 0.20)],
    ),
    (
        "energy_drink",
        &["energy drink", "red bull", "monster", "rockstar"],
        &[(STR, 0.30), (COG, 0.15), (GA, 0.10)],
    ),
    (
        "fast_food",
        &["fast food", "fastfood", "junk food", "takeout", "take-out"],
        &[(CM, 0.40), (IMM, 0.20), (GA, 0.25)],
    ),
    (
        "ultra_processed",
        &["ultra-processed", "ultra processed", "processed food", "upf"],
        &[(CM, 0.40), (IMM, 0.20), (GA, 0.25)],
    ),
    (
        "late_night",
        &["late-night", "late night", "midnight snack", "before bed"],
        &[(STR, 0.20), (CM, 0.15), (GA, 0.15)],
    ),
];

fn is_frequency_note(text: &str) -> bool {
    mentions_any(Some(text), HIGH_FREQUENCY)
        || mentions_any(Some(text), MODERATE_FREQUENCY)
        || mentions_any(Some(text), &["rare", "occasional", "sometimes"])
}

fn mentions_any(text: Option<&str>, terms: &[&str]) -> bool {
    text.map(str::to_lowercase)
        .is_some_and(|text| terms.iter().any(|term| text.contains(term)))
}

#[derive(Debug)]
pub struct FoodCravingsRuleset {
    engine: LexicalEngine,
    other: Vec<Lexicon>,
}

impl FoodCravingsRuleset {
    pub fn new(engine: &LexicalEngine) -> Self {
        let other = OTHER_LEXICON
            .iter()
            .map(|(name, phrases, weights)| engine.compile(name, phrases, weights))
            .collect();
        Self {
            engine: engine.clone(),
            other,
        }
    }

    fn score_other(&self, text: &str, multiplier: f64) -> Vec<ScoreDetail> {
        let analyzed = self.engine.analyze(text);
        self.other
            .iter()
            .filter_map(|lexicon| {
                match self.engine.scan_exact(&analyzed, lexicon, Some(&NegationRules::STANDARD)) {
                    LexiconHit::Affirmed(hit) => Some(
                        frequency_scaled(
                            ScoreDetail::new(DetailKind::Match, lexicon.name(), *lexicon.weights()),
                            multiplier,
                        )
                        .matched(hit.matched_text),
                    ),
                    _ => None,
                }
            })
            .collect()
    }

    fn amplifier(&self, craving: Craving, raw: &str, ctx: &ScoringContext) -> Option<ScoreDetail> {
        let cross = &ctx.cross;
        let symptoms = cross.other_symptoms.as_deref();
        let (label, area, weight) = match craving {
            Craving::Sweets if cross.short_or_irregular_sleep() => ("short_sleep", STR, 0.10),
            Craving::BreadPasta if mentions_any(symptoms, CRASH_TERMS) => ("post_meal_crash", CM, 0.10),
            Craving::Chocolate
                if ctx.demographics.sex == Some(Sex::Female)
                    && mentions_any(cross.menstrual_pattern.as_deref(), MENSTRUAL_TERMS) =>
            {
                ("cyclical_pattern", HRM, 0.20)
            }
            Craving::Caffeine if mentions_any(Some(raw), HEAVY_CAFFEINE_TERMS) => {
                ("caffeine_dependence", STR, 0.10)
            }
            Craving::Salty
                if mentions_any(symptoms, DIZZINESS_TERMS) || mentions_any(symptoms, LOW_BP_TERMS) =>
            {
                ("orthostatic_signs", HRM, 0.30)
            }
            _ => return None,
        };
        Some(ScoreDetail::weighted(DetailKind::CrossField, label, &[(area, weight)]))
    }
}

fn frequency_scaled(mut detail: ScoreDetail, multiplier: f64) -> ScoreDetail {
    if multiplier != 1.0 {
        detail.scale(multiplier, Modifier::Frequency { multiplier });
    }
    detail
}

impl Ruleset for FoodCravingsRuleset {
    fn field(&self) -> IntakeField {
        IntakeField::FoodCravings
    }

    fn caps(&self) -> DomainCaps {
        DomainCaps::uniform(FIELD_CAP)
    }

    fn score_answer(&self, answer: &AnswerValue, ctx: &ScoringContext) -> RulesetResult {
        let raw = answer.as_text();
        let multiplier = frequency_multiplier(&raw);

        let mut chips: Vec<Craving> = Vec::new();
        let mut other_texts: Vec<String> = Vec::new();
        for item in answer.as_items() {
            match classify_item(&item) {
                Selection::Chip(craving) if !chips.contains(&craving) => chips.push(craving),
                Selection::Chip(_) | Selection::Nothing => {}
                Selection::Other(text) if !text.is_empty() => other_texts.push(text),
                Selection::Other(_) => {}
            }
        }

        let mut details = Vec::new();
        let mut unrecognized = false;
        for craving in &chips {
            let scores = FocusVector::from_weights(craving.weights());
            details.push(frequency_scaled(
                ScoreDetail::new(DetailKind::Selection, craving.label(), scores),
                multiplier,
            ));
            details.extend(self.amplifier(*craving, &raw, ctx));
        }
        for text in &other_texts {
            let matched = self.score_other(text, multiplier);
            if matched.is_empty() && !is_frequency_note(text) {
                warn!(field = self.field().label(), item = %text, "unrecognized craving");
                unrecognized = true;
            }
            details.extend(matched);
        }

        let caps = self.caps();
        let result = RulesetResult::from_details(self.field(), details, &caps);
        if unrecognized {
            result.with_parse_flag(ParseFlag::UnrecognizedSelection)
        } else {
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographics::Demographics;
    use crate::rulesets::CrossFieldContext;

    fn ruleset() -> FoodCravingsRuleset {
        FoodCravingsRuleset::new(&LexicalEngine::default())
    }

    fn adult() -> ScoringContext {
        ScoringContext::new(Demographics::new(Some(35), Some(Sex::Female)))
    }

    #[test]
    fn none_alone_scores_nothing() {
        let result = ruleset().score(&AnswerValue::from("None"), &adult());
        assert!(result.scores.is_zero());
        assert!(result.details.is_empty());
    }

    #[test]
    fn none_is_dropped_next_to_real_chips() {
        let result = ruleset().score(&AnswerValue::from("None, Chocolate"), &adult());
        assert!((result.scores[STR] - 0.15).abs() < 1e-9);
        assert!((result.scores[COG] - 0.10).abs() < 1e-9);
    }

    #[test]
    fn daily_frequency_scales_selections() {
        let result = ruleset().score(&AnswerValue::from("Sweets; daily"), &adult());
        assert!((result.scores[CM] - 0.90).abs() < 1e-9);
        assert!((result.scores[GA] - 0.45).abs() < 1e-9);
        assert!(result.parse_flags.is_empty());
    }

    #[test]
    fn salty_is_neutral_until_dizziness_is_reported() {
        let plain = ruleset().score(&AnswerValue::from("Salty"), &adult());
        assert!(plain.scores.is_zero());

        let ctx = adult().with_cross(CrossFieldContext {
            other_symptoms: Some("Dizzy when standing up".into()),
            ..CrossFieldContext::default()
        });
        let amplified = ruleset().score(&AnswerValue::from("Salty"), &ctx);
        assert!((amplified.scores[HRM] - 0.30).abs() < 1e-9);
    }

    #[test]
    fn other_text_uses_its_own_lexicon() {
        let result = ruleset().score(&AnswerValue::from("Other: energy drinks"), &adult());
        assert!((result.scores[STR] - 0.30).abs() < 1e-9);

        let unknown = ruleset().score(&AnswerValue::from("Other: pickles"), &adult());
        assert!(unknown.parse_flags.contains(&ParseFlag::UnrecognizedSelection));
        assert!(unknown.scores.is_zero());
    }
}
