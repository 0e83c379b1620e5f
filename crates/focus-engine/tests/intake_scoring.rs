use chrono::NaiveDate;
use focus_engine::config::{MatcherKind, ScoringConfig};
use focus_engine::focus::{FocusArea, FocusVector};
use focus_engine::intake::{IntakeError, IntakeSubmission};
use focus_engine::rulesets::{IntakeField, SafetyFlag};
use focus_engine::scorer_from_config;

fn scoring(fold_biomarkers: bool) -> ScoringConfig {
    ScoringConfig {
        matcher: MatcherKind::Lemma,
        fuzzy: true,
        fuzzy_threshold: 85.0,
        reference_date: NaiveDate::from_ymd_opt(2024, 6, 15),
        fold_biomarkers,
    }
}

fn submission(age: u32, extra_answers: &str) -> IntakeSubmission {
    let input = format!(
        r#"{{
            "demographics": {{"age": {age}, "sex": "female"}},
            "context": {{"work_stress_level": 8, "top_goals": "lose weight, reduce stress"}},
            "answers": {{
                "top_health_goals": "lose weight, reduce stress, improve energy",
                "SunlightExposure": "Sat, Sun, Fri, Thu, Wed, Tue, Mon",
                "LifestyleWillingness": "Yes",
                "CurrentStress": 7{extra_answers}
            }},
            "bloodReport": {{"HbA1c": "6.0", "HDL Cholesterol": "30"}}
        }}"#
    );
    IntakeSubmission::from_json_str(&input).expect("valid intake json")
}

#[test]
fn totals_are_the_sum_of_field_results() {
    let report = scorer_from_config(&scoring(false))
        .score(&submission(35, ""))
        .expect("intake scores");

    assert_eq!(report.fields.len(), 4);
    let mut expected = FocusVector::zero();
    for result in &report.fields {
        expected.add_vector(&result.scores);
    }
    for area in FocusArea::ALL {
        assert!(
            (report.focus_areas.scores.get(area) - expected.get(area)).abs() < 1e-9,
            "{area} total differs from the field sum"
        );
    }

    // Willingness bonuses for two stated goals and high work stress.
    assert!((report.focus_areas.adherence_multiplier - 1.10).abs() < 1e-9);
    assert!(report.focus_areas.scores.get(FocusArea::Stress) > 0.0);
    assert!(report.focus_areas.contributors.contains_key(&FocusArea::Stress));
}

#[test]
fn biomarker_fold_only_changes_cardiometabolic_totals() {
    let plain = scorer_from_config(&scoring(false))
        .score(&submission(35, ""))
        .expect("intake scores");
    let folded = scorer_from_config(&scoring(true))
        .score(&submission(35, ""))
        .expect("intake scores");

    let delta = folded.focus_areas.scores.get(FocusArea::Cardiometabolic)
        - plain.focus_areas.scores.get(FocusArea::Cardiometabolic);
    assert!((delta - 0.15).abs() < 1e-9, "unexpected fold delta {delta}");
    assert_eq!(
        folded.focus_areas.scores.get(FocusArea::Stress),
        plain.focus_areas.scores.get(FocusArea::Stress)
    );
    assert_eq!(
        plain.focus_areas.biomarker_summary.map(|summary| summary.total_flagged),
        Some(2)
    );
}

#[test]
fn minors_get_biomarkers_but_no_focus_scores() {
    let report = scorer_from_config(&scoring(false))
        .score(&submission(16, ""))
        .expect("intake scores");

    assert!(report.focus_areas.scores.is_zero());
    assert!(report.focus_areas.contributors.is_empty());
    assert_eq!(report.focus_areas.adherence_multiplier, 1.0);
    assert!(report.biomarkers.is_some());
}

#[test]
fn safety_intercepts_are_reported_per_field() {
    let report = scorer_from_config(&scoring(false))
        .score(&submission(
            35,
            r#", "PatientReasoning": "Some days I think I should kill myself""#,
        ))
        .expect("intake scores");

    let intercepted = report
        .fields
        .iter()
        .find(|result| result.field == IntakeField::PatientReasoning)
        .expect("patient reasoning scored");
    assert!(intercepted.scores.is_zero());
    assert!(report.focus_areas.has_safety_flags());
    assert!(report.focus_areas.safety_flags[&IntakeField::PatientReasoning]
        .contains(&SafetyFlag::RedFlag));
}

#[test]
fn report_serializes_with_focus_codes() {
    let report = scorer_from_config(&scoring(false))
        .score(&submission(35, ""))
        .expect("intake scores");

    let value = serde_json::to_value(&report).expect("report serializes");
    let scores = &value["focusAreas"]["scores"];
    assert!(scores.get("STR").is_some(), "scores keyed by code: {scores}");
    assert!(value["biomarkers"]["flaggedBiomarkers"].is_array());
}

#[test]
fn unknown_labels_fail_the_whole_submission() {
    let submission = IntakeSubmission::from_json_str(
        r#"{"answers": {"CurrentStress": 5, "ShoeSize": 42}}"#,
    )
    .expect("valid json");

    match scorer_from_config(&scoring(false)).score(&submission) {
        Err(IntakeError::UnknownField(label)) => assert_eq!(label, "ShoeSize"),
        other => panic!("expected unknown field, got {other:?}"),
    }
}
