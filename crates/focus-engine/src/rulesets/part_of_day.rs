//! "What part of the day are your symptoms worst?"

use super::radio::{Qualifiers, RadioAnswer};
use super::{
    AnswerValue, DetailKind, IntakeField, ParseFlag, Ruleset, RulesetResult, ScoreDetail,
    ScoringContext,
};
use crate::focus::codes::*;
use crate::focus::{DomainCaps, FocusArea};
use crate::lexical::{AnalyzedText, LexicalEngine};
use tracing::warn;

const CAPS: &[(FocusArea, f64)] = &[
    (GA, 0.80),
    (STR, 0.60),
    (CM, 0.50),
    (COG, 0.40),
    (MITO, 0.40),
    (IMM, 0.30),
    (DTX, 0.20),
    (SKN, 0.20),
    (HRM, 0.10),
];

const AFTER_BREAKFAST: &str = "after_breakfast";
const AFTER_LUNCH: &str = "after_lunch";
const LARGE_DINNER: &str = "large_dinner";
const LATE_MEAL: &str = "late_meal";
const NOCTURNAL: &str = "nocturnal";
const HISTAMINE: &str = "histamine";
const HEARTBURN: &str = "heartburn";

const QUALIFIERS: &[(&str, &[&str])] = &[
    (
        AFTER_BREAKFAST,
        &[
            "after breakfast", "first meal", "fatty breakfast", "post breakfast", "morning meal",
            "breakfast",
        ],
    ),
    (
        AFTER_LUNCH,
        &[
            "after lunch", "2-4 h after eating", "2-4 hours after eating", "gas builds later",
            "post lunch", "afternoon meal",
        ],
    ),
    (
        LARGE_DINNER,
        &[
            "large dinner", "big dinner", "heavy dinner", "eat within 2-3 h of bed",
            "eat within 2-3 hours of bed", "close to bedtime", "before bed",
        ],
    ),
    (
        LATE_MEAL,
        &["within 2-3", "within 2-3h", "within 2-3 hours", "close to bed", "before bed"],
    ),
    (
        NOCTURNAL,
        &[
            "at night", "nighttime", "night time", "bedtime", "during sleep", "wakes from sleep",
            "nocturnal", "while sleeping",
        ],
    ),
    (
        HISTAMINE,
        &["itch", "hives", "sneezing", "wheezing", "histamine", "allergic reaction"],
    ),
    (
        HEARTBURN,
        &["heartburn", "throat burn", "acid taste", "acid reflux", "gerd"],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DayPart {
    pub fn parse(choice: &str) -> Option<Self> {
        match choice {
            "morning" | "am" => Some(DayPart::Morning),
            "afternoon" | "midday" => Some(DayPart::Afternoon),
            "evening" | "pm" => Some(DayPart::Evening),
            "night" | "nighttime" | "overnight" => Some(DayPart::Night),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DayPart::Morning => "morning",
            DayPart::Afternoon => "afternoon",
            DayPart::Evening => "evening",
            DayPart::Night => "night",
        }
    }

    /// Night has no base branch; it only triggers the nocturnal overlay.
    pub const fn base(self) -> &'static [(FocusArea, f64)] {
        match self {
            DayPart::Morning => &[(STR, 0.40), (COG, 0.20)],
            DayPart::Afternoon => &[(CM, 0.40), (COG, 0.20), (STR, 0.20)],
            DayPart::Evening => &[(GA, 0.30), (STR, 0.30), (MITO, 0.30), (CM, 0.20)],
            DayPart::Night => &[],
        }
    }
}

#[derive(Debug)]
pub struct PartOfDayRuleset {
    qualifiers: Qualifiers,
    caps: DomainCaps,
}

impl PartOfDayRuleset {
    pub fn new(engine: &LexicalEngine) -> Self {
        Self {
            qualifiers: Qualifiers::new(engine, QUALIFIERS),
            caps: DomainCaps::new(CAPS, 0.0),
        }
    }

    fn qualifier(
        &self,
        text: &AnalyzedText,
        set: &str,
        label: &str,
        weights: &[(FocusArea, f64)],
    ) -> Option<ScoreDetail> {
        let matched = self.qualifiers.find(text, set)?;
        Some(ScoreDetail::weighted(DetailKind::Qualifier, label, weights).matched(matched))
    }
}

impl Ruleset for PartOfDayRuleset {
    fn field(&self) -> IntakeField {
        IntakeField::PartOfDay
    }

    fn caps(&self) -> DomainCaps {
        self.caps
    }

    fn score_answer(&self, answer: &AnswerValue, ctx: &ScoringContext) -> RulesetResult {
        let radio = RadioAnswer::parse(answer);
        let part = DayPart::parse(&radio.choice);

        let qualifier_text = [radio.text.as_deref(), ctx.cross.other_free_text.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(". ");
        let text = self.qualifiers.analyze(&qualifier_text);

        let mut details = Vec::new();
        if let Some(part) = part {
            if !part.base().is_empty() {
                details.push(ScoreDetail::weighted(DetailKind::Selection, part.label(), part.base()));
            }
        }

        match part {
            Some(DayPart::Morning) => {
                details.extend(self.qualifier(
                    &text,
                    AFTER_BREAKFAST,
                    "after_breakfast",
                    &[(GA, 0.20), (DTX, 0.10)],
                ));
                details.extend(self.qualifier(&text, HEARTBURN, "heartburn", &[(GA, 0.20)]));
            }
            Some(DayPart::Afternoon) => {
                details.extend(self.qualifier(&text, AFTER_LUNCH, "after_lunch", &[(GA, 0.30)]));
            }
            Some(DayPart::Evening) => {
                let late = self
                    .qualifiers
                    .find(&text, LARGE_DINNER)
                    .or_else(|| self.qualifiers.find(&text, LATE_MEAL));
                if let Some(matched) = late {
                    details.push(
                        ScoreDetail::weighted(DetailKind::Qualifier, "large_dinner", &[(GA, 0.10)])
                            .matched(matched),
                    );
                }
            }
            Some(DayPart::Night) | None => {}
        }

        let nocturnal = self.qualifiers.find(&text, NOCTURNAL).or_else(|| {
            (part == Some(DayPart::Night)).then(|| radio.choice.clone())
        });
        if let Some(matched) = nocturnal {
            details.push(
                ScoreDetail::weighted(DetailKind::Pattern, "nocturnal", &[(GA, 0.40), (STR, 0.20)])
                    .matched(matched),
            );
            details.extend(self.qualifier(
                &text,
                HISTAMINE,
                "nocturnal_histamine",
                &[(IMM, 0.20), (SKN, 0.10)],
            ));
        }

        if ctx.cross.is_shift_worker() || ctx.cross.high_work_stress() {
            details.push(ScoreDetail::weighted(
                DetailKind::CrossField,
                "shift_work_or_high_stress",
                &[(STR, 0.20), (CM, 0.10), (GA, 0.20)],
            ));
        }
        details.extend(self.qualifier(&text, LATE_MEAL, "late_meal", &[(GA, 0.20)]));

        let result = RulesetResult::from_details(self.field(), details, &self.caps);
        if part.is_none() {
            warn!(field = self.field().label(), choice = %radio.choice, "unrecognized part of day");
            result.with_parse_flag(ParseFlag::UnrecognizedSelection)
        } else {
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographics::Demographics;
    use crate::rulesets::CrossFieldContext;

    fn score(answer: &str, cross: CrossFieldContext) -> RulesetResult {
        let ctx = ScoringContext::new(Demographics::new(Some(30), None)).with_cross(cross);
        PartOfDayRuleset::new(&LexicalEngine::default()).score(&AnswerValue::from(answer), &ctx)
    }

    #[test]
    fn morning_branch_with_breakfast_qualifier() {
        let result = score("Morning; worse after breakfast", CrossFieldContext::default());

        assert!((result.scores[STR] - 0.40).abs() < 1e-9);
        assert!((result.scores[COG] - 0.20).abs() < 1e-9);
        assert!((result.scores[GA] - 0.20).abs() < 1e-9);
        assert!((result.scores[DTX] - 0.10).abs() < 1e-9);
    }

    #[test]
    fn shift_worker_adds_cross_field_bonus() {
        let cross = CrossFieldContext {
            job_title: Some("Night shift nurse".into()),
            ..CrossFieldContext::default()
        };
        let result = score("Afternoon", cross);

        assert!((result.scores[CM] - 0.50).abs() < 1e-9);
        assert!((result.scores[STR] - 0.40).abs() < 1e-9);
        assert!((result.scores[GA] - 0.20).abs() < 1e-9);
    }

    #[test]
    fn nocturnal_overlay_comes_from_free_text() {
        let cross = CrossFieldContext {
            other_free_text: Some("I wake up itchy with hives at night".into()),
            ..CrossFieldContext::default()
        };
        let result = score("Evening", cross);

        assert!((result.scores[GA] - 0.70).abs() < 1e-9);
        assert!((result.scores[IMM] - 0.20).abs() < 1e-9);
        assert!((result.scores[SKN] - 0.10).abs() < 1e-9);
        assert!((result.scores[STR] - 0.50).abs() < 1e-9);
    }

    #[test]
    fn unknown_selection_is_flagged() {
        let result = score("Whenever", CrossFieldContext::default());
        assert!(result.scores.is_zero());
        assert!(result.parse_flags.contains(&ParseFlag::UnrecognizedSelection));
    }
}
