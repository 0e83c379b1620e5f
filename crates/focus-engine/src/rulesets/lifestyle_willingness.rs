//! "Are you willing to make lifestyle changes?"
//!
//! Produces no focus-area scores. The answer becomes an adherence multiplier that
//! downstream planning applies on its own.

use super::{
    AnswerValue, DetailKind, IntakeField, ParseFlag, Ruleset, RulesetResult, ScoreDetail,
    ScoringContext,
};
use crate::focus::{DomainCaps, FocusVector};
use crate::lexical::{parse_yes_no_with_followup, YesNoChoice};
use tracing::debug;

pub const MIN_MULTIPLIER: f64 = 0.60;
pub const MAX_MULTIPLIER: f64 = 1.10;

const GOALS_BONUS: f64 = 0.05;
const WORK_STRESS_BONUS: f64 = 0.05;

fn base_multiplier(choice: YesNoChoice) -> f64 {
    match choice {
        YesNoChoice::Yes => 1.00,
        YesNoChoice::No => 0.75,
        YesNoChoice::Other => 0.875,
    }
}

#[derive(Debug, Default)]
pub struct LifestyleWillingnessRuleset;

impl LifestyleWillingnessRuleset {
    pub fn new() -> Self {
        Self
    }
}

impl Ruleset for LifestyleWillingnessRuleset {
    fn field(&self) -> IntakeField {
        IntakeField::LifestyleWillingness
    }

    fn caps(&self) -> DomainCaps {
        DomainCaps::uniform(0.0)
    }

    fn score_answer(&self, answer: &AnswerValue, ctx: &ScoringContext) -> RulesetResult {
        let parsed = parse_yes_no_with_followup(&answer.as_text());
        let mut multiplier = base_multiplier(parsed.choice);

        let mut detail = ScoreDetail::new(DetailKind::Scale, "adherence_multiplier", FocusVector::zero());
        if let Some(follow_up) = &parsed.follow_up {
            detail = detail.matched(follow_up.clone());
        }

        if ctx.cross.stated_goal_count() >= 2 {
            multiplier += GOALS_BONUS;
        }
        if ctx.cross.high_work_stress() {
            multiplier += WORK_STRESS_BONUS;
        }

        let clamped = multiplier.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER);
        debug!(choice = ?parsed.choice, multiplier = clamped, "adherence multiplier");

        let mut result = RulesetResult::from_details(self.field(), vec![detail], &self.caps());
        result.adherence_multiplier = Some(clamped);
        if clamped != multiplier {
            result.with_parse_flag(ParseFlag::ClampedValue)
        } else {
            result
        }
    }
}
