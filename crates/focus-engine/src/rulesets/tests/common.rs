use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::demographics::{Demographics, Sex};
use crate::lexical::LexicalEngine;
use crate::rulesets::{
    AnswerValue, CrossFieldContext, IntakeField, RulesetRegistry, RulesetResult, ScoringContext,
};

pub(super) fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
}

pub(super) fn registry() -> RulesetRegistry {
    RulesetRegistry::standard(&LexicalEngine::default())
}

pub(super) fn adult() -> ScoringContext {
    ScoringContext::new(Demographics::new(Some(35), Some(Sex::Female))).on(reference_date())
}

pub(super) fn minor() -> ScoringContext {
    ScoringContext::new(Demographics::new(Some(16), Some(Sex::Female))).on(reference_date())
}

pub(super) fn score(field: IntakeField, answer: impl Into<AnswerValue>) -> RulesetResult {
    score_with(field, answer, &adult())
}

pub(super) fn score_with(
    field: IntakeField,
    answer: impl Into<AnswerValue>,
    ctx: &ScoringContext,
) -> RulesetResult {
    registry()
        .score(field, &answer.into(), ctx)
        .expect("ruleset registered")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// One goal-bearing answer per field.
pub(super) fn sample_answers() -> BTreeMap<IntakeField, AnswerValue> {
    BTreeMap::from([
        (
            IntakeField::TopHealthGoals,
            AnswerValue::from("lose weight, reduce stress, improve energy"),
        ),
        (
            IntakeField::PatientReasoning,
            AnswerValue::from("Work stress and mold in my apartment"),
        ),
        (
            IntakeField::TriggerEvent,
            AnswerValue::from("Food poisoning in Mexico two years ago"),
        ),
        (
            IntakeField::LastFeltWell,
            AnswerValue::from("About 3 years ago, before covid"),
        ),
        (
            IntakeField::SymptomAggravators,
            AnswerValue::from("Dairy and big meals"),
        ),
        (
            IntakeField::FoodCravings,
            AnswerValue::List(vec!["Sweets".into(), "Salty foods".into(), "Daily".into()]),
        ),
        (
            IntakeField::PartOfDay,
            AnswerValue::from("Evening; after a big dinner"),
        ),
        (
            IntakeField::WhereSymptomsWorse,
            AnswerValue::from("Other; restaurants and travel"),
        ),
        (
            IntakeField::SunlightExposure,
            AnswerValue::from("Sat, Sun, Fri, Thu, Wed, Tue, Mon"),
        ),
        (IntakeField::LifestyleWillingness, AnswerValue::from("Yes")),
        (IntakeField::CurrentStress, AnswerValue::from(8.0)),
    ])
}

pub(super) fn cross_context() -> CrossFieldContext {
    CrossFieldContext {
        job_title: Some("ICU nurse, rotating nights".into()),
        work_stress_level: Some(8),
        top_goals: Some("lose weight, reduce stress".into()),
        sleep_hours: Some(5.5),
        ..CrossFieldContext::default()
    }
}
