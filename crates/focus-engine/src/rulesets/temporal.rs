//! Time expressions in free text: "2 years ago", "summer 2021", "never felt well".

use crate::lexical::pattern::Pattern;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stand-in for "never felt well" and "can't remember".
pub const NEVER_WELL_MONTHS: u32 = 120;
/// Conservative estimate for anchors without a date ("since covid").
pub const NARRATIVE_MONTHS: u32 = 24;

static NEVER_WELL: [Pattern; 4] = [
    Pattern::new(r"\bnever\b.*\bwell\b"),
    Pattern::new(r"\bnever\b.*\bfelt\b.*\bgood\b"),
    Pattern::new(r"\bcan'?t\s+remember\b"),
    Pattern::new(r"\bdon'?t\s+remember\b"),
];
static RELATIVE: Pattern = Pattern::new(
    r"\b(\d+|an?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|couple of|few)\s*(years?|yrs?|months?|mos?|weeks?|wks?)\s+ago\b",
);
static YEAR: Pattern = Pattern::new(r"\b(?:19|20)\d{2}\b");
static SEASON: Pattern = Pattern::new(r"\b(spring|summer|fall|autumn|winter)\b");
static NARRATIVE: Pattern = Pattern::new(r"\b(before|after|since|when|during|around)\b");

const RECENT_PHRASES: [&str; 5] = ["recently", "lately", "last week", "last month", "just started"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalSource {
    Never,
    Relative,
    Absolute,
    Narrative,
    Unparsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalEstimate {
    pub months: Option<u32>,
    pub uncertain: bool,
    pub source: TemporalSource,
}

impl TemporalEstimate {
    const fn certain(months: u32, source: TemporalSource) -> Self {
        Self {
            months: Some(months),
            uncertain: false,
            source,
        }
    }
}

/// Months between the event described in `text` and `reference`.
///
/// Resolution order: "never" phrasing, relative offsets, a four-digit year
/// (anchored on a named season, else June 15), then narrative anchors. Narrative
/// anchors return [`NARRATIVE_MONTHS`] flagged uncertain; anything else is
/// unparsed and uncertain.
pub fn months_since(text: &str, reference: NaiveDate) -> TemporalEstimate {
    let text = fold(text);

    if NEVER_WELL.iter().any(|pattern| pattern.is_match(&text)) {
        return TemporalEstimate::certain(NEVER_WELL_MONTHS, TemporalSource::Never);
    }
    if let Some(estimate) = explicit_months(&text, reference) {
        return estimate;
    }
    if NARRATIVE.is_match(&text) {
        return TemporalEstimate {
            months: Some(NARRATIVE_MONTHS),
            uncertain: true,
            source: TemporalSource::Narrative,
        };
    }
    TemporalEstimate {
        months: None,
        uncertain: true,
        source: TemporalSource::Unparsed,
    }
}

/// How long ago a trigger happened, as used to scale its weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyClass {
    /// Under six months.
    VeryRecent,
    /// Six to twenty-four months.
    Recent,
    /// Over twenty-four months.
    Remote,
    Unknown,
}

impl RecencyClass {
    pub fn from_months(months: u32) -> Self {
        match months {
            0..=5 => RecencyClass::VeryRecent,
            6..=24 => RecencyClass::Recent,
            _ => RecencyClass::Remote,
        }
    }

    pub const fn multiplier(self) -> f64 {
        match self {
            RecencyClass::VeryRecent => 1.2,
            RecencyClass::Recent | RecencyClass::Unknown => 1.0,
            RecencyClass::Remote => 0.7,
        }
    }
}

/// Recency of the event in `text`; explicit offsets and years win over
/// "recently" style phrasing.
pub fn recency(text: &str, reference: NaiveDate) -> RecencyClass {
    let text = fold(text);
    if let Some(months) = explicit_months(&text, reference).and_then(|estimate| estimate.months) {
        return RecencyClass::from_months(months);
    }
    if RECENT_PHRASES.iter().any(|phrase| text.contains(phrase)) {
        return RecencyClass::VeryRecent;
    }
    RecencyClass::Unknown
}

fn fold(text: &str) -> String {
    text.to_lowercase().replace(['\u{2018}', '\u{2019}'], "'")
}

fn explicit_months(text: &str, reference: NaiveDate) -> Option<TemporalEstimate> {
    if let Some(caps) = RELATIVE.captures(text) {
        if let Some(count) = count_word(&caps[1]) {
            let months = match caps[2].chars().next() {
                Some('y') => count.saturating_mul(12),
                Some('w') => count / 4,
                _ => count,
            };
            return Some(TemporalEstimate::certain(months, TemporalSource::Relative));
        }
    }

    let year: i32 = YEAR.captures(text)?.get(0)?.as_str().parse().ok()?;
    let (month, day) = match SEASON.captures(text).as_ref().map(|caps| &caps[1]) {
        Some("spring") => (3, 15),
        Some("fall" | "autumn") => (9, 15),
        Some("winter") => (12, 15),
        _ => (6, 15),
    };
    let anchor = NaiveDate::from_ymd_opt(year, month, day)?;
    let days = (reference - anchor).num_days().max(0);
    let months = u32::try_from(days / 30).unwrap_or(u32::MAX);
    Some(TemporalEstimate::certain(months, TemporalSource::Absolute))
}

fn count_word(word: &str) -> Option<u32> {
    let value = match word {
        "a" | "an" | "one" => 1,
        "two" | "couple of" => 2,
        "three" | "few" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        // Counts too large for u32 saturate; the band is remote either way.
        digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            return Some(digits.parse().unwrap_or(u32::MAX))
        }
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
    }

    #[test]
    fn relative_offsets_convert_to_months() {
        assert_eq!(months_since("About 2 years ago", reference()).months, Some(24));
        assert_eq!(months_since("six months ago", reference()).months, Some(6));
        assert_eq!(months_since("a year ago, maybe", reference()).months, Some(12));
        assert_eq!(months_since("8 weeks ago", reference()).months, Some(2));
    }

    #[test]
    fn relative_offset_wins_over_year() {
        let estimate = months_since("3 months ago, back in 2019", reference());
        assert_eq!(estimate.months, Some(3));
        assert_eq!(estimate.source, TemporalSource::Relative);
    }

    #[test]
    fn year_uses_season_anchor_or_midyear() {
        let summer = months_since("Summer 2022", reference());
        assert_eq!(summer.months, Some(24));
        assert!(!summer.uncertain);

        let spring = months_since("spring 2024", reference());
        assert_eq!(spring.months, Some(3));

        let future = months_since("2030", reference());
        assert_eq!(future.months, Some(0));
    }

    #[test]
    fn never_well_maps_to_ten_years() {
        let estimate = months_since("I have never really felt well", reference());
        assert_eq!(estimate.months, Some(NEVER_WELL_MONTHS));
        assert!(!estimate.uncertain);
        assert_eq!(months_since("Can’t remember", reference()).source, TemporalSource::Never);
    }

    #[test]
    fn narrative_anchor_is_conservative_and_uncertain() {
        let estimate = months_since("since covid", reference());
        assert_eq!(estimate.months, Some(NARRATIVE_MONTHS));
        assert!(estimate.uncertain);

        let unparsed = months_since("no idea honestly", reference());
        assert_eq!(unparsed.months, None);
        assert!(unparsed.uncertain);
    }

    #[test]
    fn recency_classes() {
        assert_eq!(recency("3 weeks ago", reference()), RecencyClass::VeryRecent);
        assert_eq!(recency("about a year ago", reference()), RecencyClass::Recent);
        assert_eq!(recency("in 2015", reference()), RecencyClass::Remote);
        assert_eq!(recency("got sick recently", reference()), RecencyClass::VeryRecent);
        assert_eq!(recency("after the flu", reference()), RecencyClass::Unknown);
        assert_eq!(RecencyClass::Remote.multiplier(), 0.7);
    }

    #[test]
    fn oversized_counts_saturate() {
        let years = months_since("400000000 years ago", reference());
        assert_eq!(years.months, Some(u32::MAX));
        assert_eq!(years.source, TemporalSource::Relative);

        let months = months_since("99999999999 months ago", reference());
        assert_eq!(months.months, Some(u32::MAX));
        assert!(!months.uncertain);

        assert_eq!(months_since("0 weeks ago", reference()).months, Some(0));
    }

    #[test]
    fn oversized_counts_read_as_remote() {
        assert_eq!(recency("covid 400000000 years ago", reference()), RecencyClass::Remote);
        assert_eq!(recency("99999999999 months ago", reference()), RecencyClass::Remote);
        assert_eq!(recency("0 weeks ago", reference()), RecencyClass::VeryRecent);
    }
}
