//! Blood-panel classification against demographic reference ranges.

mod ranges;
mod report;
mod severity;

pub use ranges::{all_specs, spec_for, AgeBracket, BiomarkerSpec, RangeBand, RangeSlice, RangeSpec};
pub use report::{canonical_name, extract_numeric, BloodReport, BloodReportError, Reading};
pub use severity::{
    severity_of, Direction, FALLBACK_SEVERITY, FLAG_THRESHOLD, HIGH_PRIORITY_THRESHOLD,
    NO_REFERENCE_DATA, UNCLASSIFIED,
};

use crate::demographics::{Demographics, Sex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Bounds of the band that matched; both `None` when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeBounds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub category: String,
    pub severity: u8,
    pub direction: Direction,
    pub bounds: RangeBounds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_bracket: Option<&'static str>,
}

impl Classification {
    fn fallback(category: &str) -> Self {
        Self {
            category: category.to_string(),
            severity: FALLBACK_SEVERITY,
            direction: Direction::Healthy,
            bounds: RangeBounds::default(),
            age_bracket: None,
        }
    }

    pub fn flagged(&self) -> bool {
        self.severity >= FLAG_THRESHOLD
    }

    pub fn high_priority(&self) -> bool {
        self.severity >= HIGH_PRIORITY_THRESHOLD
    }
}

/// Classifies one value against the reference table for `name`.
///
/// Total for any input: unknown markers, missing demographic slices and values
/// outside every band fall back to severity 1.
pub fn classify(name: &str, value: f64, sex: Option<Sex>, age: Option<u32>) -> Classification {
    let Some(spec) = spec_for(name) else {
        return Classification::fallback(NO_REFERENCE_DATA);
    };
    if !value.is_finite() {
        return Classification::fallback(UNCLASSIFIED);
    }

    let Some((bands, age_bracket)) = spec
        .ranges
        .slice_for(sex)
        .and_then(|slice| slice.bands_for(age))
    else {
        debug!(biomarker = name, "no demographic slice for biomarker");
        return Classification::fallback(UNCLASSIFIED);
    };

    let Some(band) = bands.iter().find(|band| band.contains(value)) else {
        return Classification::fallback(UNCLASSIFIED);
    };

    let Some(severity) = severity_of(band.category) else {
        warn!(
            biomarker = name,
            category = band.category,
            "category missing from severity order"
        );
        return Classification::fallback(UNCLASSIFIED);
    };

    let direction = if severity <= FALLBACK_SEVERITY {
        Direction::Healthy
    } else {
        band.direction
    };

    Classification {
        category: band.category.to_string(),
        severity,
        direction,
        bounds: RangeBounds {
            lower: band.lower,
            upper: band.upper,
        },
        age_bracket,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedBiomarker {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub category: String,
    pub severity: u8,
    pub direction: Direction,
    pub range_used: RangeBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategorySummary {
    pub healthy: usize,
    pub low: usize,
    pub high: usize,
}

impl CategorySummary {
    fn record(&mut self, direction: Direction) {
        match direction {
            Direction::Healthy => self.healthy += 1,
            Direction::Low => self.low += 1,
            Direction::High => self.high += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiomarkerSummary {
    pub total_evaluated: usize,
    pub total_flagged: usize,
    pub high_priority_count: usize,
    pub category_summary: CategorySummary,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiomarkerEvaluation {
    pub flagged_biomarkers: Vec<FlaggedBiomarker>,
    pub summary: BiomarkerSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BiomarkerEvaluation {
    /// Empty outputs carrying an input-shape error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Evaluates whole blood reports; stateless and shareable.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiomarkerEvaluator;

impl BiomarkerEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, report: &BloodReport, demographics: &Demographics) -> BiomarkerEvaluation {
        let sex = demographics.sex.or(report.declared_sex());
        let mut evaluation = BiomarkerEvaluation::default();

        for reading in report.readings() {
            let Some(value) = extract_numeric(&reading.raw_value) else {
                warn!(
                    biomarker = %reading.source_name,
                    value = %reading.raw_value,
                    "skipping biomarker without a numeric value"
                );
                evaluation.warnings.push(format!(
                    "could not parse a numeric value for {}: {:?}",
                    reading.source_name, reading.raw_value
                ));
                continue;
            };

            let classification = classify(&reading.name, value, sex, demographics.age);
            if classification.category == NO_REFERENCE_DATA {
                evaluation
                    .warnings
                    .push(format!("no reference data for {}", reading.source_name));
            }

            let summary = &mut evaluation.summary;
            summary.total_evaluated += 1;
            summary.category_summary.record(classification.direction);
            if classification.high_priority() {
                summary.high_priority_count += 1;
            }

            if classification.flagged() {
                summary.total_flagged += 1;
                evaluation.flagged_biomarkers.push(FlaggedBiomarker {
                    name: reading.name.clone(),
                    value,
                    unit: spec_for(&reading.name)
                        .map_or("unknown", |spec| spec.unit)
                        .to_string(),
                    category: classification.category,
                    severity: classification.severity,
                    direction: classification.direction,
                    range_used: classification.bounds,
                });
            }
        }

        debug!(
            evaluated = evaluation.summary.total_evaluated,
            flagged = evaluation.summary.total_flagged,
            "biomarker evaluation complete"
        );
        evaluation
    }

    /// Untyped entry point: `{ "demographics": {..}, "bloodReport": {..} }`.
    ///
    /// Shape errors come back as an evaluation with empty outputs and `error` set.
    pub fn evaluate_request(&self, request: &Value) -> BiomarkerEvaluation {
        let Some(object) = request.as_object() else {
            return BiomarkerEvaluation::failed("request must be a JSON object");
        };

        let demographics = match object.get("demographics") {
            None | Some(Value::Null) => Demographics::default(),
            Some(value) => match Demographics::deserialize(value) {
                Ok(demographics) => demographics,
                Err(err) => {
                    return BiomarkerEvaluation::failed(format!("invalid demographics: {err}"))
                }
            },
        };

        let report_value = ["bloodReport", "blood_report", "biomarkers"]
            .iter()
            .find_map(|key| object.get(*key));
        let Some(report_value) = report_value else {
            return BiomarkerEvaluation::failed("request is missing a bloodReport object");
        };

        match BloodReport::from_json_value(report_value) {
            Ok(report) => self.evaluate(&report, &demographics),
            Err(err) => BiomarkerEvaluation::failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hba1c_in_normal_band_is_not_flagged() {
        let result = classify("HbA1c", 5.3, None, None);
        assert_eq!(result.category, "normal");
        assert_eq!(result.severity, 1);
        assert_eq!(result.direction, Direction::Healthy);
        assert!(!result.flagged());

        let diabetic = classify("HbA1c", 7.1, Some(Sex::Female), Some(52));
        assert_eq!(diabetic.category, "diabetes");
        assert_eq!(diabetic.direction, Direction::High);
        assert!(diabetic.high_priority());
    }

    #[test]
    fn bounds_are_inclusive_and_first_band_wins() {
        let male = Some(Sex::Male);
        assert_eq!(classify("HDL Cholesterol", 41.0, male, None).category, "excellent");
        assert_eq!(classify("HDL Cholesterol", 40.0, male, None).category, "low");
        assert_eq!(classify("HDL Cholesterol", 30.0, male, None).category, "very_low");

        let female = Some(Sex::Female);
        let hdl = classify("HDL Cholesterol", 45.0, female, None);
        assert_eq!(hdl.category, "low");
        assert_eq!(hdl.direction, Direction::Low);
        assert_eq!(hdl.bounds, RangeBounds { lower: None, upper: Some(50.0) });
    }

    #[test]
    fn testosterone_uses_age_brackets() {
        let male = Some(Sex::Male);
        let young = classify("Testosterone, Total (Males)", 9.5, male, Some(40));
        assert_eq!(young.category, "optimal");
        assert_eq!(young.age_bracket, Some("under_50"));

        let middle = classify("Testosterone, Total (Males)", 9.5, male, Some(55));
        assert_eq!(middle.category, "high");
        assert_eq!(middle.age_bracket, Some("50_to_59"));

        let older = classify("Testosterone, Total (Males)", 7.2, male, Some(67));
        assert_eq!(older.category, "optimal");

        assert_eq!(
            classify("Testosterone, Total (Males)", 2.5, male, Some(30)).category,
            "low"
        );
    }

    #[test]
    fn explicit_direction_beats_label_keywords() {
        let sodium = classify("Sodium", 120.0, None, None);
        assert_eq!(sodium.category, "critical");
        assert_eq!(sodium.direction, Direction::Low);
        assert_eq!(Direction::infer("critical", 4), Direction::High);
    }

    #[test]
    fn gaps_fail_closed_to_severity_one() {
        let unknown = classify("Unobtainium", 3.0, None, None);
        assert_eq!(unknown.category, NO_REFERENCE_DATA);
        assert_eq!(unknown.severity, 1);

        let missing_sex = classify("Ferritin", 20.0, None, None);
        assert_eq!(missing_sex.category, UNCLASSIFIED);
        assert!(!missing_sex.flagged());
    }

    #[test]
    fn every_table_category_has_a_severity_and_obeys_the_flag_rule() {
        for spec in all_specs() {
            let slices: Vec<&RangeSlice> = match &spec.ranges {
                RangeSpec::Universal(slice) => vec![slice],
                RangeSpec::BySex { male, female } => vec![male, female],
            };
            let band_sets: Vec<&[RangeBand]> = slices
                .iter()
                .flat_map(|slice| match slice {
                    RangeSlice::Bands(bands) => vec![*bands],
                    RangeSlice::ByAge(brackets) => brackets.iter().map(|b| b.bands).collect(),
                })
                .collect();

            for bands in band_sets {
                for band in bands {
                    let severity = severity_of(band.category).unwrap_or_else(|| {
                        panic!("{} uses unordered category {}", spec.name, band.category)
                    });
                    let classification = Classification {
                        category: band.category.to_string(),
                        severity,
                        direction: band.direction,
                        bounds: RangeBounds::default(),
                        age_bracket: None,
                    };
                    assert_eq!(classification.flagged(), severity >= 2, "{}", spec.name);
                }
            }
        }
    }

    #[test]
    fn evaluation_summarizes_and_warns() {
        let report = BloodReport::from_pairs([
            ("% Hemoglobin A1C", "6.0 %"),
            ("HDL Cholesterol", "38 mg/dL"),
            ("25-(OH) Vitamin D", "15"),
            ("Mystery Marker", "4"),
            ("TSH", "pending"),
        ]);
        let demographics = Demographics::new(Some(42), Some(Sex::Male));

        let evaluation = BiomarkerEvaluator::new().evaluate(&report, &demographics);
        let summary = evaluation.summary;

        assert_eq!(summary.total_evaluated, 4);
        assert_eq!(summary.total_flagged, 3);
        assert_eq!(summary.high_priority_count, 1);
        assert_eq!(summary.category_summary.high, 1);
        assert_eq!(summary.category_summary.low, 2);
        assert_eq!(summary.category_summary.healthy, 1);
        assert_eq!(evaluation.warnings.len(), 2);

        let vitamin_d = evaluation
            .flagged_biomarkers
            .iter()
            .find(|marker| marker.name == "25-(OH) Vitamin D")
            .expect("vitamin d flagged");
        assert_eq!(vitamin_d.category, "deficiency");
        assert_eq!(vitamin_d.unit, "ng/mL");
    }

    #[test]
    fn request_shape_errors_return_empty_outputs() {
        let evaluator = BiomarkerEvaluator::new();

        let failed = evaluator.evaluate_request(&json!({"demographics": {"age": 40}}));
        assert!(failed.is_error());
        assert!(failed.flagged_biomarkers.is_empty());
        assert_eq!(failed.summary, BiomarkerSummary::default());

        let ok = evaluator.evaluate_request(&json!({
            "demographics": {"age": 40, "sex": "female"},
            "bloodReport": {"HDL Cholesterol": "41"}
        }));
        assert!(!ok.is_error());
        assert_eq!(ok.flagged_biomarkers[0].category, "low");

        let wire = serde_json::to_value(&ok).expect("evaluation serializes");
        assert_eq!(wire["summary"]["totalFlagged"], 1);
        assert_eq!(wire["flaggedBiomarkers"][0]["rangeUsed"]["upper"], 50.0);
    }
}
