//! "When did you last feel well?"
//!
//! Two independent signals: how long ago (a chronicity overlay on STR, COG and
//! MITO) and what happened then (trigger groups matched like any lexicon field).

use super::engine::{
    ContextBoost, GroupSpec, LexiconRuleset, LexiconRulesetSpec, Outcome, Synergy,
};
use super::temporal::{self, TemporalEstimate};
use super::{
    AnswerValue, DetailKind, IntakeField, ParseFlag, Ruleset, RulesetResult, ScoreDetail,
    ScoringContext,
};
use crate::focus::codes::*;
use crate::focus::{DomainCaps, FocusArea};
use crate::lexical::LexicalEngine;
use tracing::debug;

pub const FIELD_CAP: f64 = 0.45;

static GROUPS: [GroupSpec; 6] = [
    GroupSpec::new(
        "gi_infection",
        &[
            "gastroenteritis", "food poisoning", "traveler's diarrhea", "travelers diarrhea",
            "montezuma's revenge", "montezumas revenge", "stomach bug", "stomach flu",
            "gi infection", "intestinal infection", "bad food", "food illness", "diarrhea",
            "dysentery", "giardia", "parasites", "parasite", "trip to mexico", "trip to india",
            "travel", "international travel", "bali belly", "delhi belly", "turista",
        ],
        &[(GA, 0.25)],
    ),
    GroupSpec::new(
        "antibiotics",
        &[
            "antibiotics", "antibiotic", "abx", "amoxicillin", "cipro", "ciprofloxacin",
            "azithromycin", "z-pack", "zpack", "doxycycline", "flagyl", "metronidazole",
        ],
        &[(GA, 0.25)],
    ),
    GroupSpec::new(
        "post_viral",
        &[
            "covid", "covid-19", "coronavirus", "long covid", "long-covid", "mono",
            "mononucleosis", "epstein-barr", "ebv", "glandular fever", "flu", "influenza",
            "viral infection", "virus", "viral illness", "post-viral", "postviral",
            "after being sick", "after illness",
        ],
        &[(MITO, 0.15), (COG, 0.10), (IMM, 0.10)],
    ),
    GroupSpec::new(
        "mold",
        &[
            "mold", "mould", "water damage", "water-damage", "water damaged", "damp", "dampness",
            "musty", "leak", "leaks", "flooding", "flooded", "black mold", "toxic mold",
            "mycotoxin", "mycotoxins",
        ],
        &[(DTX, 0.20), (IMM, 0.15), (MITO, 0.05)],
    ),
    GroupSpec::new(
        "life_stressor",
        &[
            "job change", "new job", "lost job", "laid off", "fired", "unemployment", "divorce",
            "breakup", "break up", "separation", "relationship ended", "bereavement", "death",
            "died", "passed away", "loss", "caregiving", "caregiver", "caring for",
            "taking care of", "moved", "moving", "relocation", "new city", "new house",
            "financial stress", "money problems", "debt", "bankruptcy",
        ],
        &[(STR, 0.20), (COG, 0.05), (CM, 0.05)],
    ),
    GroupSpec::new(
        "hormonal",
        &[
            "pregnancy", "pregnant", "postpartum", "post-partum", "after baby", "after birth",
            "childbirth", "gave birth", "menopause", "menopausal", "perimenopause",
            "peri-menopause", "hrt", "hormone replacement", "started hrt", "stopped hrt",
            "birth control", "started pill", "stopped pill", "iud",
        ],
        &[(HRM, 0.20), (STR, 0.05), (IMM, 0.05)],
    ),
];

static TRIGGERS: LexiconRulesetSpec = LexiconRulesetSpec {
    boosts: &[ContextBoost {
        label: "post_viral_gi",
        groups: &["post_viral"],
        when: &[
            "bloat", "gas", "diarrhea", "constipation", "stomach", "gut", "digestive", "ibs",
        ],
        area: GA,
        weight: 0.05,
    }],
    synergies: &[Synergy::Pair {
        name: "gi_infection_antibiotics",
        first: "gi_infection",
        second: "antibiotics",
        area: GA,
        bonus: 0.10,
        suppress_second: true,
    }],
    ..LexiconRulesetSpec::new(IntakeField::LastFeltWell, &GROUPS, &[], FIELD_CAP)
};

/// Chronicity band of the months since the respondent last felt well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chronicity {
    /// Twelve months or less.
    Recent,
    /// Thirteen to thirty-six months.
    SubChronic,
    Chronic,
}

impl Chronicity {
    pub fn from_months(months: u32) -> Self {
        match months {
            0..=12 => Chronicity::Recent,
            13..=36 => Chronicity::SubChronic,
            _ => Chronicity::Chronic,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Chronicity::Recent => "recent",
            Chronicity::SubChronic => "sub_chronic",
            Chronicity::Chronic => "chronic",
        }
    }

    pub const fn overlay(self) -> &'static [(FocusArea, f64)] {
        match self {
            Chronicity::Recent => &[],
            Chronicity::SubChronic => &[(STR, 0.15), (COG, 0.10), (MITO, 0.05)],
            Chronicity::Chronic => &[(STR, 0.25), (COG, 0.20), (MITO, 0.10)],
        }
    }
}

#[derive(Debug)]
pub struct LastFeltWellRuleset {
    triggers: LexiconRuleset,
    caps: DomainCaps,
}

impl LastFeltWellRuleset {
    pub fn new(engine: &LexicalEngine) -> Self {
        Self {
            triggers: LexiconRuleset::new(engine, &TRIGGERS),
            caps: DomainCaps::uniform(FIELD_CAP),
        }
    }

    fn chronicity_detail(estimate: &TemporalEstimate) -> Option<ScoreDetail> {
        let months = estimate.months?;
        let band = Chronicity::from_months(months);
        Some(
            ScoreDetail::weighted(DetailKind::Chronicity, band.label(), band.overlay())
                .matched(format!("{months} months")),
        )
    }
}

impl Ruleset for LastFeltWellRuleset {
    fn field(&self) -> IntakeField {
        IntakeField::LastFeltWell
    }

    fn caps(&self) -> DomainCaps {
        self.caps
    }

    fn score_answer(&self, answer: &AnswerValue, ctx: &ScoringContext) -> RulesetResult {
        let text = answer.as_text();
        let estimate = temporal::months_since(&text, ctx.reference_date);
        debug!(months = ?estimate.months, uncertain = estimate.uncertain, "last felt well parsed");

        let mut details: Vec<ScoreDetail> = Self::chronicity_detail(&estimate).into_iter().collect();
        match self.triggers.evaluate(&text, ctx) {
            Outcome::Intercepted { flags, detail } => {
                return RulesetResult::intercepted(self.field(), flags, detail);
            }
            Outcome::Scored(triggers) => details.extend(triggers),
        }

        let result = RulesetResult::from_details(self.field(), details, &self.caps);
        if estimate.uncertain {
            result.with_parse_flag(ParseFlag::TemporalUncertain)
        } else {
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographics::Demographics;
    use chrono::NaiveDate;

    fn ctx() -> ScoringContext {
        ScoringContext::new(Demographics::new(Some(42), None))
            .on(NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date"))
    }

    fn score(text: &str) -> RulesetResult {
        LastFeltWellRuleset::new(&LexicalEngine::default()).score(&AnswerValue::from(text), &ctx())
    }

    #[test]
    fn bands_follow_month_boundaries() {
        assert_eq!(Chronicity::from_months(12), Chronicity::Recent);
        assert_eq!(Chronicity::from_months(13), Chronicity::SubChronic);
        assert_eq!(Chronicity::from_months(36), Chronicity::SubChronic);
        assert_eq!(Chronicity::from_months(37), Chronicity::Chronic);
    }

    #[test]
    fn never_felt_well_is_chronic() {
        let result = score("Honestly I've never felt well");

        assert!((result.scores[STR] - 0.25).abs() < 1e-9);
        assert!((result.scores[COG] - 0.20).abs() < 1e-9);
        assert!((result.scores[MITO] - 0.10).abs() < 1e-9);
        assert!(result.parse_flags.is_empty());
    }

    #[test]
    fn gi_infection_with_antibiotics_escalates_and_suppresses() {
        let result = score("About 6 months ago, after food poisoning and a round of cipro");

        assert!((result.scores[GA] - 0.35).abs() < 1e-9);
        assert!(result.details.iter().all(|detail| detail.label != "antibiotics"));
        assert!(result
            .details
            .iter()
            .any(|detail| detail.label == "gi_infection_antibiotics"));
    }

    #[test]
    fn unparsed_timing_is_flagged_without_overlay() {
        let result = score("not sure, things just slowly got worse");

        assert!(result.parse_flags.contains(&ParseFlag::TemporalUncertain));
        assert!(result
            .details
            .iter()
            .all(|detail| detail.kind != DetailKind::Chronicity));
    }
}
