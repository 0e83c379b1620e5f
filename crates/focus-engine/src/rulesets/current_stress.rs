//! "On a scale of 1-10, how high is your current stress?"

use super::{
    AnswerValue, DetailKind, IntakeField, ParseFlag, Ruleset, RulesetResult, ScoreDetail,
    ScoringContext,
};
use crate::focus::codes::*;
use crate::focus::{DomainCaps, FocusVector};
use tracing::warn;

pub const FIELD_CAP: f64 = 1.0;

const MIN_LEVEL: i64 = 1;
const MAX_LEVEL: i64 = 10;

/// Stress level from the answer, truncated to a whole number and clamped to 1-10.
/// The flag reports whether clamping happened.
fn stress_level(answer: &AnswerValue) -> Option<(u8, bool)> {
    let raw = answer.as_number()?.trunc() as i64;
    let level = raw.clamp(MIN_LEVEL, MAX_LEVEL);
    u8::try_from(level).ok().map(|level| (level, i64::from(level) != raw))
}

/// Linear STR weight: 0.08 per point above 1.
fn primary(level: u8) -> FocusVector {
    FocusVector::from_weights(&[(STR, 0.08 * f64::from(level - 1))])
}

/// Spillover into neighbouring areas from 4 upward; IMM and HRM join at 7, and
/// 8 or more adds a flat high-stress boost.
fn spillover(level: u8) -> Option<(&'static str, FocusVector)> {
    if level < 4 {
        return None;
    }
    let above = f64::from(level - 4);
    let mut scores = FocusVector::from_weights(&[
        (COG, 0.03 * above),
        (CM, 0.025 * above),
        (GA, 0.02 * above),
        (MITO, 0.015 * above),
    ]);
    if level >= 7 {
        let past = f64::from(level - 6);
        scores.add(IMM, 0.02 * past);
        scores.add(HRM, 0.02 * past);
    }
    if level >= 8 {
        scores.add_vector(&FocusVector::from_weights(&[
            (COG, 0.10),
            (CM, 0.10),
            (GA, 0.15),
            (IMM, 0.10),
            (HRM, 0.10),
        ]));
        return Some(("high_stress_spillover", scores));
    }
    Some(("moderate_stress_spillover", scores))
}

#[derive(Debug, Default)]
pub struct CurrentStressRuleset;

impl CurrentStressRuleset {
    pub fn new() -> Self {
        Self
    }
}

impl Ruleset for CurrentStressRuleset {
    fn field(&self) -> IntakeField {
        IntakeField::CurrentStress
    }

    fn caps(&self) -> DomainCaps {
        DomainCaps::uniform(FIELD_CAP)
    }

    fn score_answer(&self, answer: &AnswerValue, ctx: &ScoringContext) -> RulesetResult {
        let Some((level, clamped)) = stress_level(answer) else {
            warn!(field = self.field().label(), answer = %answer.as_text(), "stress level is not numeric");
            return RulesetResult::empty(self.field()).with_parse_flag(ParseFlag::UnrecognizedSelection);
        };

        let mut details = vec![ScoreDetail::new(DetailKind::Scale, "stress_level", primary(level))
            .matched(level.to_string())];
        if let Some((label, scores)) = spillover(level) {
            details.push(ScoreDetail::new(DetailKind::Scale, label, scores));
        }
        if level >= 7 && ctx.cross.short_or_irregular_sleep() {
            details.push(ScoreDetail::weighted(
                DetailKind::CrossField,
                "stress_with_poor_sleep",
                &[(STR, 0.10), (COG, 0.10)],
            ));
        }
        if ctx.cross.is_shift_worker() || ctx.cross.high_work_stress() {
            details.push(ScoreDetail::weighted(
                DetailKind::CrossField,
                "shift_work_or_high_work_stress",
                &[(GA, 0.10)],
            ));
        }

        let result = RulesetResult::from_details(self.field(), details, &self.caps());
        if clamped {
            result.with_parse_flag(ParseFlag::ClampedValue)
        } else {
            result
        }
    }
}
