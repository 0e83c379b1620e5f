//! Folds per-field ruleset results (and optionally flagged blood markers) into one
//! focus-area vector.
//!
//! Field results are already capped, so compiling is a plain key-wise sum. Inputs
//! are put in field order before summing, which makes the output independent of
//! the order results arrive in.

use crate::biomarkers::{spec_for, BiomarkerEvaluation, BiomarkerSummary};
use crate::focus::{FocusArea, FocusVector};
use crate::rulesets::{
    DetailKind, IntakeField, ParseFlag, RulesetResult, SafetyFlag, ScoreDetail,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Weight per severity tier above "normal" when blood markers are folded in.
pub const BIOMARKER_FOLD_STEP: f64 = 0.05;

/// Contributors kept per focus area; ties with the last one are kept too.
pub const TOP_CONTRIBUTORS: usize = 3;

const BIOMARKER_SOURCE: &str = "Biomarkers";

/// A ruleset detail tagged with the field (or "Biomarkers") it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcedDetail {
    pub source: String,
    #[serde(flatten)]
    pub detail: ScoreDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledFocusAreas {
    pub scores: FocusVector,
    pub details: Vec<SourcedDetail>,
    /// Fields that were intercepted, with the flags they raised.
    pub safety_flags: BTreeMap<IntakeField, BTreeSet<SafetyFlag>>,
    pub parse_flags: BTreeMap<IntakeField, BTreeSet<ParseFlag>>,
    /// 1.0 unless a lifestyle-willingness answer set one.
    pub adherence_multiplier: f64,
    /// `"<source>:<value>"` reasons per focus area, strongest first.
    pub contributors: BTreeMap<FocusArea, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biomarker_summary: Option<BiomarkerSummary>,
}

impl CompiledFocusAreas {
    pub fn has_safety_flags(&self) -> bool {
        !self.safety_flags.is_empty()
    }

    /// Focus areas ordered by score, highest first; zero areas are left out.
    pub fn ranked(&self) -> Vec<(FocusArea, f64)> {
        let mut ranked: Vec<(FocusArea, f64)> = self.scores.nonzero().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    fold_biomarkers: bool,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `0.05 × (severity − 1)` per flagged marker to the marker's domains.
    pub fn with_biomarker_fold(mut self, enabled: bool) -> Self {
        self.fold_biomarkers = enabled;
        self
    }

    pub fn folds_biomarkers(&self) -> bool {
        self.fold_biomarkers
    }

    pub fn compile(
        &self,
        biomarkers: Option<&BiomarkerEvaluation>,
        results: &[RulesetResult],
    ) -> CompiledFocusAreas {
        let mut ordered: Vec<&RulesetResult> = results.iter().collect();
        ordered.sort_by_key(|result| result.field);

        let mut sources: Vec<(String, FocusVector)> = Vec::new();
        let mut compiled = CompiledFocusAreas {
            scores: FocusVector::zero(),
            details: Vec::new(),
            safety_flags: BTreeMap::new(),
            parse_flags: BTreeMap::new(),
            adherence_multiplier: 1.0,
            contributors: BTreeMap::new(),
            biomarker_summary: biomarkers.map(|evaluation| evaluation.summary),
        };

        for result in ordered {
            let source = result.field.label();
            compiled.scores.add_vector(&result.scores);
            sources.push((source.to_string(), result.scores));
            compiled.details.extend(result.details.iter().map(|detail| SourcedDetail {
                source: source.to_string(),
                detail: detail.clone(),
            }));
            if !result.safety_flags.is_empty() {
                compiled
                    .safety_flags
                    .entry(result.field)
                    .or_default()
                    .extend(result.safety_flags.iter().copied());
            }
            if !result.parse_flags.is_empty() {
                compiled
                    .parse_flags
                    .entry(result.field)
                    .or_default()
                    .extend(result.parse_flags.iter().copied());
            }
            if let Some(multiplier) = result.adherence_multiplier {
                compiled.adherence_multiplier = multiplier;
            }
        }

        if self.fold_biomarkers {
            if let Some(evaluation) = biomarkers {
                let folded = biomarker_details(evaluation);
                let mut total = FocusVector::zero();
                for detail in &folded {
                    total.add_vector(&detail.scores);
                }
                if !total.is_zero() {
                    compiled.scores.add_vector(&total);
                    sources.push((BIOMARKER_SOURCE.to_string(), total));
                }
                compiled
                    .details
                    .extend(folded.into_iter().map(|detail| SourcedDetail {
                        source: BIOMARKER_SOURCE.to_string(),
                        detail,
                    }));
            }
        }

        compiled.contributors = top_contributors(&sources);
        debug!(
            fields = results.len(),
            intercepted = compiled.safety_flags.len(),
            "focus areas compiled"
        );
        compiled
    }
}

fn biomarker_details(evaluation: &BiomarkerEvaluation) -> Vec<ScoreDetail> {
    evaluation
        .flagged_biomarkers
        .iter()
        .filter_map(|marker| {
            let spec = spec_for(&marker.name)?;
            let weight = BIOMARKER_FOLD_STEP * f64::from(marker.severity.saturating_sub(1));
            if weight == 0.0 || spec.domains.is_empty() {
                return None;
            }
            let weights: Vec<(FocusArea, f64)> =
                spec.domains.iter().map(|area| (*area, weight)).collect();
            Some(
                ScoreDetail::weighted(DetailKind::Biomarker, marker.name.clone(), &weights)
                    .matched(format!("{} ({})", marker.value, marker.category)),
            )
        })
        .collect()
}

fn top_contributors(sources: &[(String, FocusVector)]) -> BTreeMap<FocusArea, Vec<String>> {
    let mut contributors = BTreeMap::new();
    for area in FocusArea::ALL {
        let mut ranked: Vec<(&str, f64)> = sources
            .iter()
            .map(|(source, scores)| (source.as_str(), scores.get(area)))
            .filter(|(_, value)| *value != 0.0)
            .collect();
        if ranked.is_empty() {
            continue;
        }
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

        let cutoff = ranked
            .get(TOP_CONTRIBUTORS - 1)
            .map_or(0.0, |(_, value)| value.abs());
        let reasons = ranked
            .iter()
            .enumerate()
            .take_while(|(index, (_, value))| *index < TOP_CONTRIBUTORS || value.abs() == cutoff)
            .map(|(_, (source, value))| format!("{source}:{value:.2}"))
            .collect();
        contributors.insert(area, reasons);
    }
    contributors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biomarkers::BiomarkerEvaluator;
    use crate::biomarkers::BloodReport;
    use crate::demographics::{Demographics, Sex};
    use crate::focus::codes::*;

    fn result(field: IntakeField, weights: &[(FocusArea, f64)]) -> RulesetResult {
        let detail = ScoreDetail::weighted(DetailKind::Match, "fixture", weights);
        RulesetResult::from_details(field, vec![detail], &crate::focus::DomainCaps::uniform(1.0))
    }

    fn fixtures() -> Vec<RulesetResult> {
        vec![
            result(IntakeField::TopHealthGoals, &[(CM, 0.35), (STR, 0.30)]),
            result(IntakeField::CurrentStress, &[(STR, 0.56), (GA, 0.23)]),
            result(IntakeField::PartOfDay, &[(GA, 0.30), (STR, 0.30)]),
            result(IntakeField::SymptomAggravators, &[(GA, 0.30)]),
        ]
    }

    #[test]
    fn sums_key_wise_without_recapping() {
        let compiled = Aggregator::new().compile(None, &fixtures());

        assert!((compiled.scores[STR] - 1.16).abs() < 1e-9);
        assert!((compiled.scores[GA] - 0.83).abs() < 1e-9);
        assert!((compiled.scores[CM] - 0.35).abs() < 1e-9);
        assert_eq!(compiled.adherence_multiplier, 1.0);
        assert_eq!(compiled.details.len(), 4);
        assert_eq!(compiled.details[0].source, "TopHealthGoals");
    }

    #[test]
    fn input_order_does_not_matter() {
        let forward = Aggregator::new().compile(None, &fixtures());
        let mut reversed = fixtures();
        reversed.reverse();
        let backward = Aggregator::new().compile(None, &reversed);

        assert_eq!(forward, backward);
    }

    #[test]
    fn contributors_keep_ties_at_the_cutoff() {
        let mut results = fixtures();
        results.push(result(IntakeField::TriggerEvent, &[(STR, 0.30)]));
        let compiled = Aggregator::new().compile(None, &results);

        let stress = compiled.contributors.get(&STR).expect("stress contributors");
        assert_eq!(stress[0], "CurrentStress:0.56");
        assert_eq!(stress.len(), 4);

        let gut = compiled.contributors.get(&GA).expect("gut contributors");
        assert_eq!(gut.len(), 3);
        assert!(!compiled.contributors.contains_key(&SKN));
    }

    #[test]
    fn flags_and_multiplier_are_carried_per_field() {
        let mut intercepted = RulesetResult::empty(IntakeField::TopHealthGoals);
        intercepted.safety_flags.insert(SafetyFlag::UrgentCare);
        let mut willingness = RulesetResult::empty(IntakeField::LifestyleWillingness);
        willingness.adherence_multiplier = Some(0.8);
        let flagged = RulesetResult::empty(IntakeField::SunlightExposure)
            .with_parse_flag(ParseFlag::IncompleteRanking);

        let compiled = Aggregator::new().compile(None, &[intercepted, willingness, flagged]);

        assert!(compiled.has_safety_flags());
        assert!(compiled.safety_flags[&IntakeField::TopHealthGoals].contains(&SafetyFlag::UrgentCare));
        assert!(compiled.parse_flags[&IntakeField::SunlightExposure]
            .contains(&ParseFlag::IncompleteRanking));
        assert_eq!(compiled.adherence_multiplier, 0.8);
    }

    #[test]
    fn biomarker_fold_is_opt_in() {
        let report = BloodReport::from_pairs([("HbA1c", "6.0"), ("HDL Cholesterol", "30")]);
        let evaluation = BiomarkerEvaluator::new()
            .evaluate(&report, &Demographics::new(Some(50), Some(Sex::Male)));

        let plain = Aggregator::new().compile(Some(&evaluation), &[]);
        assert!(plain.scores.is_zero());
        assert_eq!(plain.biomarker_summary.map(|summary| summary.total_flagged), Some(2));

        let folded = Aggregator::new()
            .with_biomarker_fold(true)
            .compile(Some(&evaluation), &[]);
        // prediabetes (tier 2) and very_low HDL (tier 3) both map to CM.
        assert!((folded.scores[CM] - 0.15).abs() < 1e-9);
        assert_eq!(
            folded.contributors.get(&CM).map(Vec::as_slice),
            Some(["Biomarkers:0.15".to_string()].as_slice())
        );
        assert!(folded
            .details
            .iter()
            .all(|detail| detail.detail.kind == DetailKind::Biomarker));
    }
}
