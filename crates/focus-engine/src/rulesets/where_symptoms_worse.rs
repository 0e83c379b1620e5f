//! "Where are your symptoms worse?" Home, Work or Other.
//!
//! Only an "Other" answer carries its own description. Home and Work are qualified
//! by the environment notes gathered elsewhere in the intake (and the job title
//! for Work).

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
    (IMM, 0.70),
    (DTX, 0.60),
    (GA, 0.50),
    (SKN, 0.30),
    (STR, 0.30),
    (COG, 0.20),
    (CM, 0.10),
    (MITO, 0.10),
    (HRM, 0.10),
];

const DAMP_MOLD: &str = "damp_mold";
const GAS_STOVE: &str = "gas_stove";
const RENOVATION: &str = "renovation";
const CHEMICAL_SOLVENT: &str = "chemical_solvent";
const HEALTHCARE: &str = "healthcare";
const DENTAL: &str = "dental";
const SALON: &str = "salon";
const PESTICIDE: &str = "pesticide";
const RESTAURANT_TRAVEL: &str = "restaurant_travel";
const POOL: &str = "pool";
const NEURO: &str = "neuro";
const AIRWAY: &str = "airway";
const HOBBY: &str = "hobby";
const HOME_WORD: &str = "home_word";

const QUALIFIERS: &[(&str, &[&str])] = &[
    (
        DAMP_MOLD,
        &[
            "mold", "mould", "damp", "musty", "water leak", "basement leak", "visible mold",
            "water-damaged", "water damage", "moisture",
        ],
    ),
    (
        GAS_STOVE,
        &[
            "gas stove", "propane stove", "range without hood", "rarely uses hood",
            "no ventilation", "poor ventilation", "cooking fumes",
        ],
    ),
    (
        RENOVATION,
        &[
            "renovation", "paint", "varnish", "new flooring", "glue", "adhesive", "strong scents",
            "cleaners", "vocs", "volatile organic compounds", "new carpet", "new furniture",
        ],
    ),
    (
        CHEMICAL_SOLVENT,
        &[
            "solvents", "adhesives", "resins", "voc", "fumes", "printing", "coatings", "factory",
            "lab", "chemical", "industrial",
        ],
    ),
    (
        HEALTHCARE,
        &[
            "hospital", "clinic", "lab", "healthcare", "medical facility", "nursing home",
            "patient care",
        ],
    ),
    (
        DENTAL,
        &[
            "dentist", "dental assistant", "dental hygienist", "amalgam", "mercury",
            "dental x-ray", "dental office",
        ],
    ),
    (
        SALON,
        &[
            "keratin", "brazilian blowout", "formaldehyde", "salon", "beauty work",
            "hair treatment",
        ],
    ),
    (
        PESTICIDE,
        &[
            "pesticides", "herbicides", "glyphosate", "spraying", "turf", "groundskeeper",
            "landscaping", "agriculture", "golf course",
        ],
    ),
    (
        RESTAURANT_TRAVEL,
        &[
            "restaurant", "restaurants", "street food", "travel", "traveler's diarrhea",
            "new country", "traveling", "dining out",
        ],
    ),
    (
        POOL,
        &[
            "chlorine smell", "chloramines", "cough at pool", "lifeguard", "gym pool",
            "indoor pool", "hot tub", "natatorium", "swimming pool",
        ],
    ),
    (NEURO, &["headache", "brain fog", "foggy", "cognitive"]),
    (AIRWAY, &["sleep", "airway", "breathing", "cough"]),
    (HOBBY, &["golfing", "lawn care", "gardening", "hobby"]),
    (HOME_WORD, &["home"]),
];

/// One qualifier rule of a branch: keyword set, weights, and an optional extra
/// weight when a second set is also present.
struct Rule {
    set: &'static str,
    weights: &'static [(FocusArea, f64)],
    extra: Option<(&'static str, FocusArea, f64)>,
    /// Rule fires only if this set is present as well.
    requires: Option<&'static str>,
}

impl Rule {
    const fn new(set: &'static str, weights: &'static [(FocusArea, f64)]) -> Self {
        Self {
            set,
            weights,
            extra: None,
            requires: None,
        }
    }

    const fn with_extra(self, set: &'static str, area: FocusArea, weight: f64) -> Self {
        Self {
            extra: Some((set, area, weight)),
            ..self
        }
    }

    const fn requires(self, set: &'static str) -> Self {
        Self {
            requires: Some(set),
            ..self
        }
    }
}

static HOME_RULES: [Rule; 4] = [
    Rule::new(DAMP_MOLD, &[(IMM, 0.50), (DTX, 0.30), (SKN, 0.20), (GA, 0.20)]),
    Rule::new(GAS_STOVE, &[(GA, 0.10), (IMM, 0.15)]),
    Rule::new(RENOVATION, &[(DTX, 0.40), (IMM, 0.20)]).with_extra(NEURO, COG, 0.10),
    Rule::new(RESTAURANT_TRAVEL, &[(GA, 0.15)]).requires(HOME_WORD),
];

static WORK_RULES: [Rule; 6] = [
    Rule::new(DAMP_MOLD, &[(IMM, 0.50), (DTX, 0.30), (SKN, 0.20)]),
    Rule::new(CHEMICAL_SOLVENT, &[(DTX, 0.40), (IMM, 0.20)]).with_extra(NEURO, COG, 0.10),
    Rule::new(HEALTHCARE, &[(IMM, 0.40), (STR, 0.20)]),
    Rule::new(DENTAL, &[(DTX, 0.30), (IMM, 0.10)]),
    Rule::new(SALON, &[(DTX, 0.40), (IMM, 0.20), (SKN, 0.10)]),
    Rule::new(PESTICIDE, &[(DTX, 0.30), (IMM, 0.20)]),
];

static OTHER_RULES: [Rule; 4] = [
    Rule::new(RESTAURANT_TRAVEL, &[(GA, 0.25)]),
    Rule::new(POOL, &[(IMM, 0.30), (SKN, 0.20)]).with_extra(AIRWAY, COG, 0.10),
    Rule::new(GAS_STOVE, &[(GA, 0.10), (IMM, 0.15)]),
    Rule::new(PESTICIDE, &[(DTX, 0.20), (IMM, 0.10)]).requires(HOBBY),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Home,
    Work,
    Other,
}

impl Location {
    pub fn parse(choice: &str) -> Option<Self> {
        match choice {
            "home" | "at home" => Some(Location::Home),
            "work" | "at work" | "workplace" | "office" => Some(Location::Work),
            "other" => Some(Location::Other),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Location::Home => "home",
            Location::Work => "work",
            Location::Other => "other",
        }
    }

    fn rules(self) -> &'static [Rule] {
        match self {
            Location::Home => &HOME_RULES,
            Location::Work => &WORK_RULES,
            Location::Other => &OTHER_RULES,
        }
    }
}

#[derive(Debug)]
pub struct WhereSymptomsWorseRuleset {
    qualifiers: Qualifiers,
    caps: DomainCaps,
}

impl WhereSymptomsWorseRuleset {
    pub fn new(engine: &LexicalEngine) -> Self {
        Self {
            qualifiers: Qualifiers::new(engine, QUALIFIERS),
            caps: DomainCaps::new(CAPS, 0.0),
        }
    }

    fn qualifier_text(location: Location, radio: &RadioAnswer, ctx: &ScoringContext) -> String {
        let cross = &ctx.cross;
        let parts: Vec<Option<&str>> = match location {
            Location::Other => vec![radio.text.as_deref()],
            Location::Home => vec![cross.environment_notes.as_deref()],
            Location::Work => vec![cross.environment_notes.as_deref(), cross.job_title.as_deref()],
        };
        parts.into_iter().flatten().collect::<Vec<_>>().join(". ")
    }

    fn apply_rules(&self, location: Location, text: &AnalyzedText) -> Vec<ScoreDetail> {
        let mut details = Vec::new();
        for rule in location.rules() {
            let Some(matched) = self.qualifiers.find(text, rule.set) else {
                continue;
            };
            if rule.requires.is_some_and(|set| !self.qualifiers.has(text, set)) {
                continue;
            }
            let mut detail =
                ScoreDetail::weighted(DetailKind::Qualifier, rule.set, rule.weights).matched(matched);
            if let Some((set, area, weight)) = rule.extra {
                if self.qualifiers.has(text, set) {
                    let mut scores = detail.scores;
                    scores.add(area, weight);
                    detail.replace_scores(scores);
                }
            }
            details.push(detail);
        }
        details
    }
}

impl Ruleset for WhereSymptomsWorseRuleset {
    fn field(&self) -> IntakeField {
        IntakeField::WhereSymptomsWorse
    }

    fn caps(&self) -> DomainCaps {
        self.caps
    }

    fn score_answer(&self, answer: &AnswerValue, ctx: &ScoringContext) -> RulesetResult {
        let radio = RadioAnswer::parse(answer);
        let location = Location::parse(&radio.choice);

        let mut details = match location {
            Some(location) => {
                let text = self
                    .qualifiers
                    .analyze(&Self::qualifier_text(location, &radio, ctx));
                self.apply_rules(location, &text)
            }
            None => Vec::new(),
        };

        if ctx.cross.mold_exposure == Some(true) {
            details.push(ScoreDetail::weighted(
                DetailKind::CrossField,
                "mold_exposure",
                &[(IMM, 0.10), (DTX, 0.10)],
            ));
        }

        let result = RulesetResult::from_details(self.field(), details, &self.caps);
        match location {
            Some(_) => result,
            None => {
                warn!(field = self.field().label(), choice = %radio.choice, "unrecognized location");
                result.with_parse_flag(ParseFlag::UnrecognizedSelection)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographics::Demographics;
    use crate::rulesets::CrossFieldContext;

    fn score(answer: &str, cross: CrossFieldContext) -> RulesetResult {
        let ctx = ScoringContext::new(Demographics::new(Some(50), None)).with_cross(cross);
        WhereSymptomsWorseRuleset::new(&LexicalEngine::default())
            .score(&AnswerValue::from(answer), &ctx)
    }

    #[test]
    fn other_reads_its_inline_text() {
        let result = score("Other; indoor pool, I cough at night", CrossFieldContext::default());

        assert!((result.scores[IMM] - 0.30).abs() < 1e-9);
        assert!((result.scores[SKN] - 0.20).abs() < 1e-9);
        assert!((result.scores[COG] - 0.10).abs() < 1e-9);
    }

    #[test]
    fn home_ignores_inline_text_and_reads_environment_notes() {
        let inline_only = score("Home, musty basement", CrossFieldContext::default());
        assert!(inline_only.scores.is_zero());

        let cross = CrossFieldContext {
            environment_notes: Some("Musty basement after a water leak".into()),
            ..CrossFieldContext::default()
        };
        let result = score("Home", cross);
        assert!((result.scores[IMM] - 0.50).abs() < 1e-9);
        assert!((result.scores[DTX] - 0.30).abs() < 1e-9);
        assert!((result.scores[GA] - 0.20).abs() < 1e-9);
    }

    #[test]
    fn work_uses_job_title_and_mold_flag() {
        let cross = CrossFieldContext {
            job_title: Some("Hair salon stylist".into()),
            mold_exposure: Some(true),
            ..CrossFieldContext::default()
        };
        let result = score("Work", cross);

        assert!((result.scores[DTX] - 0.50).abs() < 1e-9);
        assert!((result.scores[IMM] - 0.30).abs() < 1e-9);
        assert!((result.scores[SKN] - 0.10).abs() < 1e-9);
    }
}
