use focus_engine::biomarkers::{BiomarkerEvaluator, BloodReport, BloodReportError, Direction};
use focus_engine::demographics::{Demographics, Sex};
use serde_json::json;

const PANEL_CSV: &str = "\
Biomarker,Value
Gender,Male
HbA1c,6.0 %
HDL Cholesterol,30 mg/dL
TSH,
Total Cholesterol,185
Unobtainium,3
";

#[test]
fn csv_panel_uses_declared_gender_when_demographics_omit_sex() {
    let report = BloodReport::from_csv_reader(PANEL_CSV.as_bytes()).expect("csv parses");
    assert_eq!(report.declared_sex(), Some(Sex::Male));

    let evaluation =
        BiomarkerEvaluator::new().evaluate(&report, &Demographics::new(Some(50), None));

    assert_eq!(evaluation.summary.total_evaluated, 4);
    assert_eq!(evaluation.summary.total_flagged, 2);
    let hdl = evaluation
        .flagged_biomarkers
        .iter()
        .find(|marker| marker.name == "HDL Cholesterol")
        .expect("hdl flagged");
    assert_eq!(hdl.category, "very_low");
    assert_eq!(hdl.direction, Direction::Low);
    assert!(evaluation
        .warnings
        .iter()
        .any(|warning| warning.contains("Unobtainium")));
}

#[test]
fn json_panel_and_request_entry_point_agree() {
    let panel = json!({"HbA1c": "7.1", "HDL Cholesterol": 45});
    let demographics = Demographics::new(Some(52), Some(Sex::Female));

    let report = BloodReport::from_json_value(&panel).expect("object panel");
    let direct = BiomarkerEvaluator::new().evaluate(&report, &demographics);
    let via_request = BiomarkerEvaluator::new().evaluate_request(&json!({
        "demographics": {"age": 52, "sex": "Female"},
        "bloodReport": panel,
    }));

    assert_eq!(direct, via_request);
    assert_eq!(direct.summary.total_flagged, 2);
    assert_eq!(direct.summary.high_priority_count, 1);
}

#[test]
fn malformed_inputs_surface_as_errors() {
    match BloodReport::from_json_str("[1, 2, 3]") {
        Err(BloodReportError::NotAnObject(_)) => {}
        other => panic!("expected shape error, got {other:?}"),
    }
    assert!(matches!(
        BloodReport::from_json_str("{not json"),
        Err(BloodReportError::Json(_))
    ));

    let failed = BiomarkerEvaluator::new().evaluate_request(&json!("HbA1c=6"));
    assert!(failed.is_error());
    assert!(failed.flagged_biomarkers.is_empty());
}
