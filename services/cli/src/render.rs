use focus_engine::biomarkers::BiomarkerEvaluation;
use focus_engine::intake::IntakeReport;
use std::fmt::{self, Write};

pub fn biomarker_evaluation(evaluation: &BiomarkerEvaluation) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_biomarkers(&mut out, evaluation);
    out
}

pub fn intake_report(report: &IntakeReport) -> String {
    let mut out = String::new();
    let _ = write_intake(&mut out, report);
    out
}

fn write_biomarkers(out: &mut String, evaluation: &BiomarkerEvaluation) -> fmt::Result {
    let summary = &evaluation.summary;
    writeln!(out, "Blood report")?;
    writeln!(
        out,
        "Evaluated {} markers: {} flagged, {} high priority",
        summary.total_evaluated, summary.total_flagged, summary.high_priority_count
    )?;
    writeln!(
        out,
        "Healthy {} | Low {} | High {}",
        summary.category_summary.healthy,
        summary.category_summary.low,
        summary.category_summary.high
    )?;

    if evaluation.flagged_biomarkers.is_empty() {
        writeln!(out, "\nFlagged markers: none")?;
    } else {
        writeln!(out, "\nFlagged markers")?;
        for marker in &evaluation.flagged_biomarkers {
            writeln!(
                out,
                "- {}: {} {} ({}, severity {})",
                marker.name, marker.value, marker.unit, marker.category, marker.severity
            )?;
        }
    }
    for warning in &evaluation.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    if let Some(error) = &evaluation.error {
        writeln!(out, "error: {error}")?;
    }
    Ok(())
}

fn write_intake(out: &mut String, report: &IntakeReport) -> fmt::Result {
    if let Some(evaluation) = &report.biomarkers {
        write_biomarkers(out, evaluation)?;
        out.push('\n');
    }

    let compiled = &report.focus_areas;
    if compiled.has_safety_flags() {
        writeln!(out, "Safety review required")?;
        for (field, flags) in &compiled.safety_flags {
            let labels: Vec<&str> = flags.iter().map(|flag| flag.label()).collect();
            writeln!(out, "- {field}: {}", labels.join(", "))?;
        }
        out.push('\n');
    }

    writeln!(out, "Focus areas")?;
    let ranked = compiled.ranked();
    if ranked.is_empty() {
        writeln!(out, "- none scored")?;
    }
    for (area, score) in ranked {
        let reasons = compiled
            .contributors
            .get(&area)
            .map(|reasons| reasons.join(", "))
            .unwrap_or_default();
        writeln!(out, "- {:<4} {:>6.2}  {}  [{}]", area.code(), score, area.label(), reasons)?;
    }
    writeln!(out, "\nAdherence multiplier: {:.2}", compiled.adherence_multiplier)?;

    if !compiled.parse_flags.is_empty() {
        writeln!(out, "\nParse notes")?;
        for (field, flags) in &compiled.parse_flags {
            let labels: Vec<String> = flags.iter().map(|flag| format!("{flag:?}")).collect();
            writeln!(out, "- {field}: {}", labels.join(", "))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_engine::biomarkers::{BiomarkerEvaluator, BloodReport};
    use focus_engine::demographics::{Demographics, Sex};

    #[test]
    fn lists_flagged_markers_and_warnings() {
        let report = BloodReport::from_pairs([("HbA1c", "6.0"), ("Mystery Marker", "n/a")]);
        let evaluation = BiomarkerEvaluator::new()
            .evaluate(&report, &Demographics::new(Some(50), Some(Sex::Male)));

        let text = biomarker_evaluation(&evaluation);
        assert!(text.contains("Evaluated 1 markers: 1 flagged"));
        assert!(text.contains("- HbA1c: 6"));
        assert!(text.contains("warning: could not parse a numeric value for Mystery Marker"));
    }
}
