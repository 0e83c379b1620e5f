//! Per-question scoring rulesets.
//!
//! Every intake field has one [`Ruleset`]. A ruleset turns the field's raw answer,
//! plus demographics and a few cross-field signals, into a capped partial
//! [`FocusVector`] and an ordered detail trail. The scores are always computed
//! from the trail (sum, then cap), so replaying the details reproduces the result.

mod current_stress;
mod engine;
mod food_cravings;
mod health_goals;
mod last_felt_well;
mod lifestyle_willingness;
mod part_of_day;
mod radio;
mod patient_reasoning;
mod sunlight_exposure;
mod symptom_aggravators;
pub mod temporal;
mod trigger_event;
mod where_symptoms_worse;

#[cfg(test)]
mod tests;

pub use current_stress::CurrentStressRuleset;
pub use engine::{
    ContextBoost, Crowding, Dampener, GroupSpec, Hedges, Intensity, LexiconRuleset,
    LexiconRulesetSpec, ModifierScope, Preprocess, SafetyLexicon, Segmentation, Synergy,
    TermBonus,
};
pub use food_cravings::FoodCravingsRuleset;
pub use last_felt_well::LastFeltWellRuleset;
pub use lifestyle_willingness::LifestyleWillingnessRuleset;
pub use part_of_day::{DayPart, PartOfDayRuleset};
pub use radio::RadioAnswer;
pub use sunlight_exposure::{SunlightExposureRuleset, SunlightPattern, SunlightRanking};
pub use where_symptoms_worse::{Location, WhereSymptomsWorseRuleset};

use crate::demographics::Demographics;
use crate::focus::{DomainCaps, FocusArea, FocusVector};
use crate::lexical::{normalize_text, parse_yes_no_with_followup, split_by_delimiters, YesNoChoice};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// Intake question a ruleset scores. Serialized with the questionnaire's field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum IntakeField {
    TopHealthGoals,
    PatientReasoning,
    TriggerEvent,
    LastFeltWell,
    SymptomAggravators,
    FoodCravings,
    PartOfDay,
    WhereSymptomsWorse,
    SunlightExposure,
    LifestyleWillingness,
    CurrentStress,
}

impl IntakeField {
    pub const ALL: [IntakeField; 11] = [
        IntakeField::TopHealthGoals,
        IntakeField::PatientReasoning,
        IntakeField::TriggerEvent,
        IntakeField::LastFeltWell,
        IntakeField::SymptomAggravators,
        IntakeField::FoodCravings,
        IntakeField::PartOfDay,
        IntakeField::WhereSymptomsWorse,
        IntakeField::SunlightExposure,
        IntakeField::LifestyleWillingness,
        IntakeField::CurrentStress,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            IntakeField::TopHealthGoals => "TopHealthGoals",
            IntakeField::PatientReasoning => "PatientReasoning",
            IntakeField::TriggerEvent => "TriggerEvent",
            IntakeField::LastFeltWell => "LastFeltWell",
            IntakeField::SymptomAggravators => "SymptomAggravators",
            IntakeField::FoodCravings => "FoodCravings",
            IntakeField::PartOfDay => "PartOfDay",
            IntakeField::WhereSymptomsWorse => "WhereSymptomsWorse",
            IntakeField::SunlightExposure => "SunlightExposure",
            IntakeField::LifestyleWillingness => "LifestyleWillingness",
            IntakeField::CurrentStress => "CurrentStress",
        }
    }

    /// Accepts the canonical label in any case or separator style
    /// (`top_health_goals`, `Top Health Goals`).
    pub fn from_label(value: &str) -> Option<Self> {
        let wanted: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|field| field.label().to_ascii_lowercase() == wanted)
    }
}

impl fmt::Display for IntakeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for IntakeField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        IntakeField::from_label(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown intake field '{raw}'")))
    }
}

/// Raw answer as it arrives from the questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    List(Vec<String>),
    Number(f64),
    Bool(bool),
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        AnswerValue::Text(value.into())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::List(items) => items.iter().all(|item| item.trim().is_empty()),
            AnswerValue::Number(value) => !value.is_finite(),
            AnswerValue::Bool(_) => false,
        }
    }

    /// Single string view; lists are joined with `", "`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            AnswerValue::Text(text) => Cow::Borrowed(text.as_str()),
            AnswerValue::List(items) => Cow::Owned(items.join(", ")),
            AnswerValue::Number(value) => Cow::Owned(value.to_string()),
            AnswerValue::Bool(true) => Cow::Borrowed("yes"),
            AnswerValue::Bool(false) => Cow::Borrowed("no"),
        }
    }

    /// List view; free text is split on the usual delimiters.
    pub fn as_items(&self) -> Vec<String> {
        match self {
            AnswerValue::List(items) => items
                .iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            other => split_by_delimiters(&other.as_text()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(value) => Some(*value).filter(|value| value.is_finite()),
            AnswerValue::Text(text) => crate::biomarkers::extract_numeric(text),
            AnswerValue::List(_) | AnswerValue::Bool(_) => None,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        AnswerValue::Number(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyFlag {
    Crisis,
    UrgentCare,
    RedFlag,
}

impl SafetyFlag {
    pub const fn label(self) -> &'static str {
        match self {
            SafetyFlag::Crisis => "crisis",
            SafetyFlag::UrgentCare => "urgent_care",
            SafetyFlag::RedFlag => "red_flag",
        }
    }
}

/// Conservative fallback taken while parsing an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFlag {
    TemporalUncertain,
    UnrecognizedSelection,
    IncompleteRanking,
    ClampedValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailKind {
    Match,
    Synergy,
    Bonus,
    Chronicity,
    Selection,
    Qualifier,
    CrossField,
    Pattern,
    Scale,
    Safety,
    /// Flagged blood marker folded in by the aggregator.
    Biomarker,
}

/// Adjustment applied to a detail's base weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Modifier {
    Fuzzy { similarity: f64, confidence: f64 },
    Rank { rank: usize, weight: f64 },
    Boost { label: String, area: FocusArea, weight: f64 },
    Uncertainty { factor: f64 },
    Intensity { bonus: f64 },
    Dampened { factor: f64 },
    Crowding { factor: f64 },
    Recency { multiplier: f64 },
    Frequency { multiplier: f64 },
}

/// One auditable contribution to a ruleset result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDetail {
    pub kind: DetailKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_text: Option<String>,
    pub domains: Vec<FocusArea>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    pub scores: FocusVector,
}

impl ScoreDetail {
    pub fn new(kind: DetailKind, label: impl Into<String>, scores: FocusVector) -> Self {
        Self {
            kind,
            label: label.into(),
            matched_text: None,
            domains: scores.domains(),
            modifiers: Vec::new(),
            scores,
        }
    }

    pub fn weighted(kind: DetailKind, label: impl Into<String>, weights: &[(FocusArea, f64)]) -> Self {
        Self::new(kind, label, FocusVector::from_weights(weights))
    }

    pub fn matched(mut self, text: impl Into<String>) -> Self {
        self.matched_text = Some(text.into());
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Multiplies every score and records why.
    pub fn scale(&mut self, factor: f64, modifier: Modifier) {
        self.scores = self.scores.scaled(factor);
        self.modifiers.push(modifier);
    }

    pub(crate) fn replace_scores(&mut self, scores: FocusVector) {
        self.domains = scores.domains();
        self.scores = scores;
    }
}

/// Output of one ruleset invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesetResult {
    pub field: IntakeField,
    pub scores: FocusVector,
    #[serde(default)]
    pub safety_flags: BTreeSet<SafetyFlag>,
    #[serde(default)]
    pub parse_flags: BTreeSet<ParseFlag>,
    #[serde(default)]
    pub details: Vec<ScoreDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adherence_multiplier: Option<f64>,
}

impl RulesetResult {
    pub fn empty(field: IntakeField) -> Self {
        Self {
            field,
            scores: FocusVector::zero(),
            safety_flags: BTreeSet::new(),
            parse_flags: BTreeSet::new(),
            details: Vec::new(),
            adherence_multiplier: None,
        }
    }

    /// Sums the trail and clips it with `caps`.
    pub fn from_details(field: IntakeField, details: Vec<ScoreDetail>, caps: &DomainCaps) -> Self {
        let mut result = Self::empty(field);
        result.details = details;
        result.scores = caps.apply(&result.detail_sum());
        result
    }

    /// Intercepted answer: flags set, every score zero, only the safety detail kept.
    pub fn intercepted(field: IntakeField, flags: BTreeSet<SafetyFlag>, detail: ScoreDetail) -> Self {
        debug!(field = field.label(), flags = ?flags, "safety interception");
        let mut result = Self::empty(field);
        result.safety_flags = flags;
        result.details.push(detail);
        result
    }

    pub fn with_parse_flag(mut self, flag: ParseFlag) -> Self {
        self.parse_flags.insert(flag);
        self
    }

    pub fn detail_sum(&self) -> FocusVector {
        let mut sum = FocusVector::zero();
        for detail in &self.details {
            sum.add_vector(&detail.scores);
        }
        sum
    }

    pub fn has_safety_flag(&self, flag: SafetyFlag) -> bool {
        self.safety_flags.contains(&flag)
    }

    pub fn is_intercepted(&self) -> bool {
        !self.safety_flags.is_empty()
    }
}

/// Signals drawn from other intake fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossFieldContext {
    pub job_title: Option<String>,
    /// Self-reported work stress on a 1–10 scale.
    pub work_stress_level: Option<u8>,
    /// Raw top-goals answer, used to count stated goals.
    pub top_goals: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub shift_work: Option<bool>,
    #[serde(deserialize_with = "lenient_flag")]
    pub mold_exposure: Option<bool>,
    pub sleep_hours: Option<f64>,
    #[serde(deserialize_with = "lenient_bool")]
    pub sleep_irregular: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub bright_light_at_night: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub daylight_sufficient: bool,
    pub menstrual_pattern: Option<String>,
    pub other_symptoms: Option<String>,
    /// Home and workplace exposure notes from the environment questions.
    pub environment_notes: Option<String>,
    /// Free text from neighbouring questions, read for meal-timing qualifiers.
    pub other_free_text: Option<String>,
}

const SHIFT_TITLE_WORDS: &[&str] = &["shift", "night", "nights", "rotating", "overnight"];

impl CrossFieldContext {
    pub const HIGH_WORK_STRESS: u8 = 8;
    pub const SHORT_SLEEP_HOURS: f64 = 6.0;

    pub fn is_shift_worker(&self) -> bool {
        if let Some(explicit) = self.shift_work {
            return explicit;
        }
        self.job_title.as_deref().is_some_and(|title| {
            normalize_text(title)
                .split(' ')
                .any(|word| SHIFT_TITLE_WORDS.contains(&word))
        })
    }

    pub fn high_work_stress(&self) -> bool {
        self.work_stress_level
            .is_some_and(|level| level >= Self::HIGH_WORK_STRESS)
    }

    pub fn short_or_irregular_sleep(&self) -> bool {
        self.sleep_irregular
            || self
                .sleep_hours
                .is_some_and(|hours| hours < Self::SHORT_SLEEP_HOURS)
    }

    pub fn stated_goal_count(&self) -> usize {
        self.top_goals
            .as_deref()
            .map_or(0, |goals| split_by_delimiters(goals).len())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagInput {
    Bool(bool),
    Number(f64),
    Text(String),
}

fn flag_from(input: FlagInput) -> Option<bool> {
    match input {
        FlagInput::Bool(value) => Some(value),
        FlagInput::Number(value) => Some(value != 0.0),
        FlagInput::Text(text) => match parse_yes_no_with_followup(&text).choice {
            YesNoChoice::Yes => Some(true),
            YesNoChoice::No => Some(false),
            YesNoChoice::Other => None,
        },
    }
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<FlagInput>::deserialize(deserializer)?;
    Ok(raw.and_then(flag_from))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_flag(deserializer)?.unwrap_or(false))
}

/// Everything a ruleset may consult besides its own answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringContext {
    pub demographics: Demographics,
    pub cross: CrossFieldContext,
    /// "Today" for temporal parsing.
    pub reference_date: NaiveDate,
}

impl ScoringContext {
    pub fn new(demographics: Demographics) -> Self {
        Self {
            demographics,
            cross: CrossFieldContext::default(),
            reference_date: Local::now().date_naive(),
        }
    }

    pub fn with_cross(mut self, cross: CrossFieldContext) -> Self {
        self.cross = cross;
        self
    }

    pub fn on(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = reference_date;
        self
    }
}

impl Default for ScoringContext {
    fn default() -> Self {
        Self::new(Demographics::default())
    }
}

/// One intake question's scorer.
///
/// Implementations provide [`score_answer`](Ruleset::score_answer); callers use
/// [`score`](Ruleset::score), which applies the shared gating: respondents under
/// 18 and blank answers yield an empty result.
pub trait Ruleset: Send + Sync + fmt::Debug {
    fn field(&self) -> IntakeField;

    fn caps(&self) -> DomainCaps;

    fn score_answer(&self, answer: &AnswerValue, ctx: &ScoringContext) -> RulesetResult;

    fn score(&self, answer: &AnswerValue, ctx: &ScoringContext) -> RulesetResult {
        if ctx.demographics.is_minor() || answer.is_blank() {
            return RulesetResult::empty(self.field());
        }
        self.score_answer(answer, ctx)
    }
}

/// Every ruleset keyed by the field it scores. Built once, shared read-only.
#[derive(Debug)]
pub struct RulesetRegistry {
    rulesets: BTreeMap<IntakeField, Box<dyn Ruleset>>,
}

impl RulesetRegistry {
    pub fn empty() -> Self {
        Self {
            rulesets: BTreeMap::new(),
        }
    }

    pub fn standard(engine: &crate::lexical::LexicalEngine) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(health_goals::ruleset(engine)));
        registry.register(Box::new(patient_reasoning::ruleset(engine)));
        registry.register(Box::new(trigger_event::ruleset(engine)));
        registry.register(Box::new(LastFeltWellRuleset::new(engine)));
        registry.register(Box::new(symptom_aggravators::ruleset(engine)));
        registry.register(Box::new(FoodCravingsRuleset::new(engine)));
        registry.register(Box::new(PartOfDayRuleset::new(engine)));
        registry.register(Box::new(WhereSymptomsWorseRuleset::new(engine)));
        registry.register(Box::new(SunlightExposureRuleset::new()));
        registry.register(Box::new(LifestyleWillingnessRuleset::new()));
        registry.register(Box::new(CurrentStressRuleset::new()));
        registry
    }

    /// Replaces any ruleset already registered for the same field.
    pub fn register(&mut self, ruleset: Box<dyn Ruleset>) {
        self.rulesets.insert(ruleset.field(), ruleset);
    }

    pub fn get(&self, field: IntakeField) -> Option<&dyn Ruleset> {
        self.rulesets.get(&field).map(|ruleset| ruleset.as_ref())
    }

    pub fn fields(&self) -> impl Iterator<Item = IntakeField> + '_ {
        self.rulesets.keys().copied()
    }

    pub fn score(
        &self,
        field: IntakeField,
        answer: &AnswerValue,
        ctx: &ScoringContext,
    ) -> Option<RulesetResult> {
        self.get(field).map(|ruleset| ruleset.score(answer, ctx))
    }

    /// Scores every answered field that has a ruleset, in field order.
    pub fn score_all(
        &self,
        answers: &BTreeMap<IntakeField, AnswerValue>,
        ctx: &ScoringContext,
    ) -> Vec<RulesetResult> {
        answers
            .iter()
            .filter_map(|(field, answer)| self.score(*field, answer, ctx))
            .collect()
    }
}
