//! "Rank the days of the week by how much sunlight you get."
//!
//! The ranking is read as rank positions (1 = most light). Two features drive the
//! overlays: the weekend dominance index (weekday mean rank minus weekend mean
//! rank) and the oscillation count (direction changes walking Monday to Sunday).
//! Regular patterns are protective and contribute negative weights, so the caps
//! are signed.

use super::{
    AnswerValue, DetailKind, IntakeField, ParseFlag, Ruleset, RulesetResult, ScoreDetail,
    ScoringContext,
};
use crate::focus::codes::*;
use crate::focus::{DomainCaps, FocusArea};
use chrono::Weekday;
use tracing::{debug, warn};

const CAPS: &[(FocusArea, f64)] = &[
    (STR, 0.50),
    (GA, 0.40),
    (CM, 0.20),
    (COG, 0.20),
    (IMM, 0.30),
];
const DEFAULT_CAP: f64 = 0.20;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const ERRATIC_OSCILLATIONS: usize = 4;
const REGULAR_OSCILLATIONS: usize = 2;

fn parse_day(token: &str) -> Option<Weekday> {
    let token = token
        .trim_matches(|c: char| !c.is_alphabetic())
        .to_lowercase();
    match token.as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// A complete most-to-least ranking of the seven days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunlightRanking {
    /// Rank position per day, indexed Monday first.
    ranks: [u8; 7],
}

impl SunlightRanking {
    /// Text answers split on commas, then semicolons, then whitespace. Unknown
    /// tokens are skipped and repeated days keep their first position. `None`
    /// unless all seven days are present.
    pub fn parse(answer: &AnswerValue) -> Option<Self> {
        let tokens: Vec<String> = match answer {
            AnswerValue::List(items) => items.clone(),
            other => {
                let text = other.as_text();
                let text = text.trim();
                if text.contains(',') {
                    text.split(',').map(str::to_string).collect()
                } else if text.contains(';') {
                    text.split(';').map(str::to_string).collect()
                } else {
                    text.split_whitespace().map(str::to_string).collect()
                }
            }
        };

        let mut ranks = [0u8; 7];
        let mut next = 1u8;
        for day in tokens.iter().filter_map(|token| parse_day(token)) {
            let slot = &mut ranks[day.num_days_from_monday() as usize];
            if *slot == 0 {
                *slot = next;
                next += 1;
            }
        }
        (next == 8).then_some(Self { ranks })
    }

    pub fn rank(&self, day: Weekday) -> u8 {
        self.ranks[day.num_days_from_monday() as usize]
    }

    fn mean_rank(&self, weekend: bool) -> f64 {
        let ranks: Vec<f64> = WEEK
            .iter()
            .filter(|day| is_weekend(**day) == weekend)
            .map(|day| f64::from(self.rank(*day)))
            .collect();
        ranks.iter().sum::<f64>() / ranks.len() as f64
    }

    /// Weekday mean rank minus weekend mean rank. Positive means the weekend gets
    /// more light.
    pub fn weekend_dominance(&self) -> f64 {
        self.mean_rank(false) - self.mean_rank(true)
    }

    /// Strict sign changes between consecutive day-to-day rank differences.
    pub fn oscillations(&self) -> usize {
        self.ranks
            .windows(3)
            .filter(|window| {
                let before = i16::from(window[1]) - i16::from(window[0]);
                let after = i16::from(window[2]) - i16::from(window[1]);
                (before > 0 && after < 0) || (before < 0 && after > 0)
            })
            .count()
    }

    /// Both weekend days in the top two and at least four weekdays ranked third
    /// or lower.
    pub fn is_weekend_only(&self) -> bool {
        let weekend_on_top = self.rank(Weekday::Sat) <= 2 && self.rank(Weekday::Sun) <= 2;
        let low_weekdays = WEEK
            .iter()
            .filter(|day| !is_weekend(**day) && self.rank(**day) >= 3)
            .count();
        weekend_on_top && low_weekdays >= 4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunlightPattern {
    WeekendOnly,
    StrongWeekendBias,
    ModerateWeekendBias,
    Erratic,
    WeekdayRegular,
    Balanced,
}

impl SunlightPattern {
    pub const fn label(self) -> &'static str {
        match self {
            SunlightPattern::WeekendOnly => "weekend_only",
            SunlightPattern::StrongWeekendBias => "strong_weekend_bias",
            SunlightPattern::ModerateWeekendBias => "moderate_weekend_bias",
            SunlightPattern::Erratic => "erratic_week",
            SunlightPattern::WeekdayRegular => "weekday_regular",
            SunlightPattern::Balanced => "balanced",
        }
    }

    pub const fn weights(self) -> &'static [(FocusArea, f64)] {
        match self {
            SunlightPattern::WeekendOnly => &[(STR, 0.35), (GA, 0.15), (CM, 0.10), (COG, 0.05)],
            SunlightPattern::StrongWeekendBias => &[(STR, 0.25), (GA, 0.10), (CM, 0.05)],
            SunlightPattern::ModerateWeekendBias => &[(STR, 0.15), (GA, 0.05)],
            SunlightPattern::Erratic => &[(STR, 0.20), (GA, 0.10)],
            SunlightPattern::WeekdayRegular => &[(STR, -0.20), (GA, -0.05)],
            SunlightPattern::Balanced => &[(STR, -0.15), (GA, -0.05)],
        }
    }

    /// At most one misalignment pattern, an optional erratic overlay, and at most
    /// one protective pattern, in that order.
    pub fn classify(ranking: &SunlightRanking) -> Vec<SunlightPattern> {
        let wdi = ranking.weekend_dominance();
        let oscillations = ranking.oscillations();
        let mut patterns = Vec::new();

        if ranking.is_weekend_only() {
            patterns.push(SunlightPattern::WeekendOnly);
        } else if wdi >= 2.0 {
            patterns.push(SunlightPattern::StrongWeekendBias);
        } else if wdi >= 1.0 {
            patterns.push(SunlightPattern::ModerateWeekendBias);
        }
        if oscillations >= ERRATIC_OSCILLATIONS {
            patterns.push(SunlightPattern::Erratic);
        }

        if oscillations <= REGULAR_OSCILLATIONS {
            if wdi <= -1.0 {
                patterns.push(SunlightPattern::WeekdayRegular);
            } else if wdi.abs() < 1.0 {
                patterns.push(SunlightPattern::Balanced);
            }
        }
        patterns
    }
}

#[derive(Debug)]
pub struct SunlightExposureRuleset {
    caps: DomainCaps,
}

impl SunlightExposureRuleset {
    pub fn new() -> Self {
        Self {
            caps: DomainCaps::new(CAPS, DEFAULT_CAP).signed(),
        }
    }
}

impl Default for SunlightExposureRuleset {
    fn default() -> Self {
        Self::new()
    }
}

impl Ruleset for SunlightExposureRuleset {
    fn field(&self) -> IntakeField {
        IntakeField::SunlightExposure
    }

    fn caps(&self) -> DomainCaps {
        self.caps
    }

    fn score_answer(&self, answer: &AnswerValue, ctx: &ScoringContext) -> RulesetResult {
        let Some(ranking) = SunlightRanking::parse(answer) else {
            warn!(field = self.field().label(), "sunlight ranking is missing days");
            return RulesetResult::empty(self.field()).with_parse_flag(ParseFlag::IncompleteRanking);
        };
        let wdi = ranking.weekend_dominance();
        debug!(wdi, oscillations = ranking.oscillations(), "sunlight ranking parsed");

        let mut details: Vec<ScoreDetail> = SunlightPattern::classify(&ranking)
            .into_iter()
            .map(|pattern| {
                ScoreDetail::weighted(DetailKind::Pattern, pattern.label(), pattern.weights())
                    .matched(format!("wdi {wdi:.1}"))
            })
            .collect();

        if ctx.cross.bright_light_at_night {
            details.push(ScoreDetail::weighted(
                DetailKind::CrossField,
                "bright_light_at_night",
                &[(STR, 0.10)],
            ));
        }
        if ctx.cross.daylight_sufficient && wdi < 1.0 {
            details.push(ScoreDetail::weighted(
                DetailKind::CrossField,
                "daylight_sufficient",
                &[(IMM, -0.05)],
            ));
        }

        RulesetResult::from_details(self.field(), details, &self.caps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographics::Demographics;
    use crate::rulesets::CrossFieldContext;

    fn score(answer: &str, cross: CrossFieldContext) -> RulesetResult {
        let ctx = ScoringContext::new(Demographics::new(Some(30), None)).with_cross(cross);
        SunlightExposureRuleset::new().score(&AnswerValue::from(answer), &ctx)
    }

    fn ranking(answer: &str) -> SunlightRanking {
        SunlightRanking::parse(&AnswerValue::from(answer)).expect("complete ranking")
    }

    #[test]
    fn features_of_a_weekend_first_ranking() {
        let ranking = ranking("Sat, Sun, Fri, Thu, Wed, Tue, Mon");

        assert_eq!(ranking.rank(Weekday::Mon), 7);
        assert_eq!(ranking.rank(Weekday::Sat), 1);
        assert!((ranking.weekend_dominance() - 3.5).abs() < 1e-9);
        assert_eq!(ranking.oscillations(), 1);
        assert!(ranking.is_weekend_only());
    }

    #[test]
    fn day_names_parse_in_any_spelling_and_separator() {
        let spelled = ranking("saturday; sunday; friday; thurs; wednesday; tues; monday");
        let spaced = ranking("sat sun fri thu wed tue mon");
        assert_eq!(spelled, spaced);
    }

    #[test]
    fn weekend_only_overlay() {
        let result = score("Sat, Sun, Fri, Thu, Wed, Tue, Mon", CrossFieldContext::default());

        assert!((result.scores[STR] - 0.35).abs() < 1e-9);
        assert!((result.scores[GA] - 0.15).abs() < 1e-9);
        assert!((result.scores[CM] - 0.10).abs() < 1e-9);
        assert!((result.scores[COG] - 0.05).abs() < 1e-9);
        assert_eq!(result.details.len(), 1);
    }

    #[test]
    fn weekday_regular_ranking_is_protective() {
        let result = score("Mon, Tue, Wed, Thu, Fri, Sat, Sun", CrossFieldContext::default());

        assert!((result.scores[STR] + 0.20).abs() < 1e-9);
        assert!((result.scores[GA] + 0.05).abs() < 1e-9);
    }

    #[test]
    fn balanced_week_with_sufficient_daylight_relieves_immune_load() {
        let cross = CrossFieldContext {
            daylight_sufficient: true,
            ..CrossFieldContext::default()
        };
        let result = score("Mon, Sat, Tue, Wed, Sun, Thu, Fri", cross);

        assert!((result.scores[STR] + 0.15).abs() < 1e-9);
        assert!((result.scores[GA] + 0.05).abs() < 1e-9);
        assert!((result.scores[IMM] + 0.05).abs() < 1e-9);
    }

    #[test]
    fn zig_zag_week_is_erratic_without_protection() {
        let result = score("Mon, Wed, Fri, Sun, Sat, Thu, Tue", CrossFieldContext::default());

        assert!((result.scores[STR] - 0.20).abs() < 1e-9);
        assert!((result.scores[GA] - 0.10).abs() < 1e-9);
    }

    #[test]
    fn bright_light_at_night_adds_stress() {
        let cross = CrossFieldContext {
            bright_light_at_night: true,
            ..CrossFieldContext::default()
        };
        let result = score("Sat, Sun, Fri, Thu, Wed, Tue, Mon", cross);
        assert!((result.scores[STR] - 0.45).abs() < 1e-9);
    }

    #[test]
    fn incomplete_ranking_scores_nothing() {
        let result = score("Sat, Sun, Mon", CrossFieldContext::default());

        assert!(result.scores.is_zero());
        assert!(result.parse_flags.contains(&ParseFlag::IncompleteRanking));
    }
}
