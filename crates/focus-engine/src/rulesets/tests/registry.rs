use std::collections::BTreeMap;

use super::common::*;
use crate::focus::codes::*;
use crate::rulesets::{
    AnswerValue, IntakeField, Ruleset, RulesetRegistry, RulesetResult, ScoringContext,
};
use crate::focus::DomainCaps;

#[test]
fn standard_registry_covers_every_field() {
    let fields: Vec<IntakeField> = registry().fields().collect();
    assert_eq!(fields, IntakeField::ALL.to_vec());
}

#[test]
fn score_all_skips_fields_without_answers() {
    let answers = BTreeMap::from([
        (IntakeField::CurrentStress, AnswerValue::from(5.0)),
        (IntakeField::LifestyleWillingness, AnswerValue::from("no")),
    ]);
    let results = registry().score_all(&answers, &adult());

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].field, IntakeField::LifestyleWillingness);
    assert_eq!(results[1].field, IntakeField::CurrentStress);
}

#[derive(Debug)]
struct FixedStress;

impl Ruleset for FixedStress {
    fn field(&self) -> IntakeField {
        IntakeField::CurrentStress
    }

    fn caps(&self) -> DomainCaps {
        DomainCaps::uniform(1.0)
    }

    fn score_answer(&self, _answer: &AnswerValue, _ctx: &ScoringContext) -> RulesetResult {
        let mut result = RulesetResult::empty(self.field());
        result.scores.set(STR, 0.9);
        result
    }
}

#[test]
fn registering_replaces_the_existing_ruleset() {
    let mut registry = RulesetRegistry::empty();
    registry.register(Box::new(FixedStress));

    let result = registry
        .score(IntakeField::CurrentStress, &AnswerValue::from(2.0), &adult())
        .expect("registered");
    assert_close(result.scores[STR], 0.9);
    assert!(registry
        .score(IntakeField::PartOfDay, &AnswerValue::from("Morning"), &adult())
        .is_none());
}

#[test]
fn field_labels_parse_in_any_style() {
    assert_eq!(
        IntakeField::from_label("top_health_goals"),
        Some(IntakeField::TopHealthGoals)
    );
    assert_eq!(
        IntakeField::from_label("Where Symptoms Worse"),
        Some(IntakeField::WhereSymptomsWorse)
    );
    assert_eq!(IntakeField::from_label("favourite colour"), None);
}
