//! A whole intake submission: demographics, cross-field signals, per-field answers
//! and an optional blood report, scored end to end.

use crate::aggregate::{Aggregator, CompiledFocusAreas};
use crate::biomarkers::{BiomarkerEvaluation, BiomarkerEvaluator, BloodReport, BloodReportError};
use crate::demographics::Demographics;
use crate::rulesets::{
    AnswerValue, CrossFieldContext, IntakeField, RulesetRegistry, RulesetResult, ScoringContext,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("intake json is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown intake field '{0}'")]
    UnknownField(String),
    #[error("intake contains no answers")]
    NoAnswers,
    #[error(transparent)]
    BloodReport(#[from] BloodReportError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeSubmission {
    #[serde(default)]
    pub demographics: Demographics,
    /// Answers keyed by field label in any casing (`top_health_goals`, `TopHealthGoals`).
    #[serde(default)]
    pub answers: BTreeMap<String, AnswerValue>,
    #[serde(default, alias = "crossField")]
    pub context: CrossFieldContext,
    #[serde(default, alias = "blood_report")]
    pub blood_report: Option<Value>,
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

impl IntakeSubmission {
    pub fn from_json_str(input: &str) -> Result<Self, IntakeError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Answers keyed by field; unknown labels are rejected.
    pub fn answers(&self) -> Result<BTreeMap<IntakeField, AnswerValue>, IntakeError> {
        if self.answers.is_empty() {
            return Err(IntakeError::NoAnswers);
        }
        self.answers
            .iter()
            .map(|(label, answer)| {
                IntakeField::from_label(label)
                    .map(|field| (field, answer.clone()))
                    .ok_or_else(|| IntakeError::UnknownField(label.clone()))
            })
            .collect()
    }

    pub fn blood_report(&self) -> Result<Option<BloodReport>, IntakeError> {
        self.blood_report
            .as_ref()
            .map(BloodReport::from_json_value)
            .transpose()
            .map_err(IntakeError::from)
    }

    /// Scoring context; `reference_date` falls back to `default_date` and then today.
    pub fn context(&self, default_date: Option<NaiveDate>) -> ScoringContext {
        let ctx = ScoringContext::new(self.demographics).with_cross(self.context.clone());
        match self.reference_date.or(default_date) {
            Some(date) => ctx.on(date),
            None => ctx,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biomarkers: Option<BiomarkerEvaluation>,
    pub fields: Vec<RulesetResult>,
    pub focus_areas: CompiledFocusAreas,
}

/// Registry, classifier and aggregator wired together.
#[derive(Debug)]
pub struct IntakeScorer {
    registry: RulesetRegistry,
    evaluator: BiomarkerEvaluator,
    aggregator: Aggregator,
    default_date: Option<NaiveDate>,
}

impl IntakeScorer {
    pub fn new(registry: RulesetRegistry, aggregator: Aggregator) -> Self {
        Self {
            registry,
            evaluator: BiomarkerEvaluator::new(),
            aggregator,
            default_date: None,
        }
    }

    pub fn with_reference_date(mut self, date: Option<NaiveDate>) -> Self {
        self.default_date = date;
        self
    }

    pub fn registry(&self) -> &RulesetRegistry {
        &self.registry
    }

    pub fn score(&self, submission: &IntakeSubmission) -> Result<IntakeReport, IntakeError> {
        let answers = submission.answers()?;
        let ctx = submission.context(self.default_date);

        let biomarkers = submission
            .blood_report()?
            .map(|report| self.evaluator.evaluate(&report, &submission.demographics));
        let fields = self.registry.score_all(&answers, &ctx);
        let focus_areas = self.aggregator.compile(biomarkers.as_ref(), &fields);

        info!(
            fields = fields.len(),
            intercepted = focus_areas.safety_flags.len(),
            "intake scored"
        );
        Ok(IntakeReport {
            biomarkers,
            fields,
            focus_areas,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::codes::*;
    use crate::lexical::LexicalEngine;

    fn scorer() -> IntakeScorer {
        IntakeScorer::new(
            RulesetRegistry::standard(&LexicalEngine::default()),
            Aggregator::new(),
        )
        .with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 15))
    }

    #[test]
    fn parses_answers_and_context() {
        let submission = IntakeSubmission::from_json_str(
            r#"{
                "demographics": {"age": 30, "sex": "female"},
                "answers": {
                    "top_health_goals": "lose weight, reduce stress",
                    "CurrentStress": 6
                },
                "context": {"shift_work": "yes", "sleep_hours": 5}
            }"#,
        )
        .expect("valid intake");

        let answers = submission.answers().expect("known fields");
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[&IntakeField::CurrentStress], AnswerValue::Number(6.0));
        assert_eq!(submission.context.shift_work, Some(true));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let submission =
            IntakeSubmission::from_json_str(r#"{"answers": {"favourite_colour": "blue"}}"#)
                .expect("valid json");

        match scorer().score(&submission) {
            Err(IntakeError::UnknownField(label)) => assert_eq!(label, "favourite_colour"),
            other => panic!("expected unknown field error, got {other:?}"),
        }
    }

    #[test]
    fn empty_answers_are_rejected() {
        let submission = IntakeSubmission::default();
        assert!(matches!(scorer().score(&submission), Err(IntakeError::NoAnswers)));
    }

    #[test]
    fn scores_fields_and_blood_report_together() {
        let submission = IntakeSubmission::from_json_str(
            r#"{
                "demographics": {"age": 30, "sex": "female"},
                "answers": {"SunlightExposure": "Sat, Sun, Fri, Thu, Wed, Tue, Mon"},
                "bloodReport": {"HbA1c": "5.3", "HDL Cholesterol": 45}
            }"#,
        )
        .expect("valid intake");

        let report = scorer().score(&submission).expect("scored");
        let biomarkers = report.biomarkers.expect("blood report evaluated");
        assert_eq!(biomarkers.summary.total_evaluated, 2);
        assert_eq!(biomarkers.summary.total_flagged, 1);
        assert!((report.focus_areas.scores[STR] - 0.35).abs() < 1e-9);
    }
}
