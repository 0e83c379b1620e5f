use super::common::*;
use crate::focus::codes::*;
use crate::rulesets::{AnswerValue, IntakeField};

#[test]
fn negated_mentions_contribute_nothing() {
    let affirmed = score(IntakeField::PatientReasoning, "There is mold in my house");
    let negated = score(IntakeField::PatientReasoning, "There is no mold in my house");

    assert!(affirmed.scores[DTX] > 0.0);
    assert!(negated.scores.is_zero());

    let negated = score(IntakeField::SymptomAggravators, "dairy doesn't bother me");
    assert_close(negated.scores[GA], 0.0);
}

#[test]
fn repetitive_input_never_exceeds_caps() {
    let result = score(
        IntakeField::SymptomAggravators,
        "dairy milk cheese, gluten bread pizza, fried greasy food, big meal after eating, dairy dairy",
    );

    assert_close(result.scores[GA], 0.45);
    let caps = registry()
        .get(IntakeField::SymptomAggravators)
        .expect("registered")
        .caps();
    for (area, value) in result.scores.iter() {
        assert!(value <= caps.cap(area) + 1e-9, "{area:?} over cap");
    }
}

#[test]
fn scoring_is_idempotent() {
    let registry = registry();
    let ctx = adult();
    for (field, answer) in sample_answers() {
        let first = registry.score(field, &answer, &ctx).expect("registered");
        let second = registry.score(field, &answer, &ctx).expect("registered");
        assert_eq!(first, second, "{field} differs between runs");
    }
}

#[test]
fn details_reproduce_scores() {
    let registry = registry();
    let ctx = adult().with_cross(cross_context());
    for (field, answer) in sample_answers() {
        let ruleset = registry.get(field).expect("registered");
        let result = ruleset.score(&answer, &ctx);
        assert_eq!(
            result.scores,
            ruleset.caps().apply(&result.detail_sum()),
            "{field} trail does not reproduce its scores"
        );
    }
}

#[test]
fn minors_are_never_scored() {
    let registry = registry();
    let ctx = minor();
    for (field, answer) in sample_answers() {
        let result = registry.score(field, &answer, &ctx).expect("registered");
        assert!(result.scores.is_zero(), "{field} scored a minor");
        assert!(result.details.is_empty());
    }
}

#[test]
fn blank_answers_are_empty() {
    let result = score_with(IntakeField::TopHealthGoals, AnswerValue::from("   "), &adult());
    assert!(result.scores.is_zero());
    assert!(result.parse_flags.is_empty());
}

#[test]
fn sample_answers_all_score() {
    let registry = registry();
    let ctx = adult();
    for (field, answer) in sample_answers() {
        let result = registry.score(field, &answer, &ctx).expect("registered");
        if field == IntakeField::LifestyleWillingness {
            assert_eq!(result.adherence_multiplier, Some(1.0));
        } else {
            assert!(!result.scores.is_zero(), "{field} produced no scores");
        }
    }
}
