//! Declarative lexicon ruleset: one evaluator driven by static tables.
//!
//! A [`LexiconRulesetSpec`] names the topic groups, their base weights, the safety
//! lexicons, the modifier tables and the synergy rules of one intake field.
//! [`LexiconRuleset`] compiles the lexicons once and evaluates answers in a fixed
//! order:
//!
//! 1. safety lexicons (exact stages, negation ignored) short-circuit everything;
//! 2. groups are matched per segment, negated matches are dropped;
//! 3. context boosts, hedges, intensity and dampeners adjust each match;
//! 4. crowding, synergies and the whole-answer scale (recency, global hedges);
//! 5. the trail is summed and capped.

use super::temporal;
use super::{
    AnswerValue, DetailKind, IntakeField, Modifier, Ruleset, RulesetResult, SafetyFlag,
    ScoreDetail, ScoringContext,
};
use crate::focus::{DomainCaps, FocusArea, FocusVector};
use crate::lexical::{
    scrub_pii, split_by_delimiters, truncate_chars, AnalyzedText, KeyphraseMatch, LexicalEngine,
    Lexicon, LexiconHit, MatchStage, NegationRules,
};
use std::collections::BTreeSet;
use std::ops::Range;
use tracing::debug;

/// Named topic group with the weights one affirmed match contributes.
#[derive(Debug, Clone, Copy)]
pub struct GroupSpec {
    pub name: &'static str,
    pub category: Option<&'static str>,
    pub phrases: &'static [&'static str],
    pub weights: &'static [(FocusArea, f64)],
}

impl GroupSpec {
    pub const fn new(
        name: &'static str,
        phrases: &'static [&'static str],
        weights: &'static [(FocusArea, f64)],
    ) -> Self {
        Self {
            name,
            category: None,
            phrases,
            weights,
        }
    }

    pub const fn in_category(self, category: &'static str) -> Self {
        Self {
            category: Some(category),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Segmentation {
    /// Every group is matched once against the whole answer.
    WholeText,
    /// Delimited list; item `i` is weighted by `weights[i]`, later items are ignored.
    /// Within an item each focus area counts once, at its strongest match.
    RankedItems { weights: &'static [f64] },
}

/// Where a modifier looks for its cue words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierScope {
    /// Tokens either side of the match, same sentence.
    Window(usize),
    /// Anywhere in the segment being scored.
    WholeText,
}

impl ModifierScope {
    fn count(self, text: &AnalyzedText, span: &Range<usize>, phrases: &[&str]) -> usize {
        match self {
            ModifierScope::Window(window) => text.count_nearby(span, phrases, window),
            ModifierScope::WholeText => phrases
                .iter()
                .filter(|&&phrase| text.contains_any_surface(&[phrase]))
                .count(),
        }
    }
}

/// Uncertainty cues that scale a match down.
#[derive(Debug, Clone, Copy)]
pub struct Hedges {
    pub phrases: &'static [&'static str],
    pub factor: f64,
    pub scope: ModifierScope,
}

/// Intensifiers: `step` per cue added to each contributing area, at most `max`.
#[derive(Debug, Clone, Copy)]
pub struct Intensity {
    pub phrases: &'static [&'static str],
    pub step: f64,
    pub max: f64,
    pub scope: ModifierScope,
}

/// Low-frequency cues; consulted only when no intensifier fired.
#[derive(Debug, Clone, Copy)]
pub struct Dampener {
    pub phrases: &'static [&'static str],
    pub factor: f64,
    pub scope: ModifierScope,
}

/// Adds `weight` on `area` to `group`'s match when any `when` term is mentioned.
#[derive(Debug, Clone, Copy)]
pub struct ContextBoost {
    pub label: &'static str,
    pub groups: &'static [&'static str],
    pub when: &'static [&'static str],
    pub area: FocusArea,
    pub weight: f64,
}

/// Extra weights for a ranked item that matched and mentions one of `terms`.
#[derive(Debug, Clone, Copy)]
pub struct TermBonus {
    pub name: &'static str,
    pub terms: &'static [&'static str],
    pub weights: &'static [(FocusArea, f64)],
}

#[derive(Debug, Clone, Copy)]
pub enum Synergy {
    /// Both groups matched. With `suppress_second` the second group's own match is
    /// dropped so it is not counted twice.
    Pair {
        name: &'static str,
        first: &'static str,
        second: &'static str,
        area: FocusArea,
        bonus: f64,
        suppress_second: bool,
    },
    /// At least `min` matched groups, optionally restricted to some categories.
    Count {
        name: &'static str,
        categories: Option<&'static [&'static str]>,
        min: usize,
        area: FocusArea,
        bonus: f64,
    },
}

/// Scales every match when more than `more_than` groups matched.
#[derive(Debug, Clone, Copy)]
pub struct Crowding {
    pub more_than: usize,
    pub factor: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SafetyLexicon {
    pub flag: SafetyFlag,
    pub phrases: &'static [&'static str],
}

/// Text clean-up applied before analysis.
#[derive(Debug, Clone, Copy)]
pub struct Preprocess {
    pub max_chars: Option<usize>,
    pub scrub_pii: bool,
    /// Lowercase spelling and synonym folds, applied in order.
    pub replacements: &'static [(&'static str, &'static str)],
}

impl Preprocess {
    pub const NONE: Preprocess = Preprocess {
        max_chars: None,
        scrub_pii: false,
        replacements: &[],
    };
}

/// Static description of a lexicon-driven field.
#[derive(Debug, Clone, Copy)]
pub struct LexiconRulesetSpec {
    pub field: IntakeField,
    pub segmentation: Segmentation,
    pub groups: &'static [GroupSpec],
    pub caps: &'static [(FocusArea, f64)],
    pub default_cap: f64,
    pub safety: &'static [SafetyLexicon],
    pub hedges: Option<Hedges>,
    pub intensity: Option<Intensity>,
    pub dampener: Option<Dampener>,
    pub boosts: &'static [ContextBoost],
    pub bonuses: &'static [TermBonus],
    pub synergies: &'static [Synergy],
    pub crowding: Option<Crowding>,
    pub preprocess: Preprocess,
    /// Fuzzy similarity floor (0–100); `None` uses the engine default.
    pub fuzzy_threshold: Option<f64>,
    /// Scale the whole answer by its stated recency.
    pub recency: bool,
}

impl LexiconRulesetSpec {
    pub const fn new(
        field: IntakeField,
        groups: &'static [GroupSpec],
        caps: &'static [(FocusArea, f64)],
        default_cap: f64,
    ) -> Self {
        Self {
            field,
            segmentation: Segmentation::WholeText,
            groups,
            caps,
            default_cap,
            safety: &[],
            hedges: None,
            intensity: None,
            dampener: None,
            boosts: &[],
            bonuses: &[],
            synergies: &[],
            crowding: None,
            preprocess: Preprocess::NONE,
            fuzzy_threshold: None,
            recency: false,
        }
    }

    pub fn domain_caps(&self) -> DomainCaps {
        DomainCaps::new(self.caps, self.default_cap)
    }
}

#[derive(Debug)]
struct CompiledGroup {
    spec: &'static GroupSpec,
    lexicon: Lexicon,
}

#[derive(Debug)]
struct CompiledTerms<T: 'static> {
    spec: &'static T,
    terms: Lexicon,
}

/// Evaluation before capping; wrappers that add their own details use this.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    Intercepted {
        flags: BTreeSet<SafetyFlag>,
        detail: ScoreDetail,
    },
    Scored(Vec<ScoreDetail>),
}

/// A compiled [`LexiconRulesetSpec`]; `Send + Sync` and immutable after `new`.
#[derive(Debug)]
pub struct LexiconRuleset {
    spec: &'static LexiconRulesetSpec,
    engine: LexicalEngine,
    caps: DomainCaps,
    groups: Vec<CompiledGroup>,
    safety: Vec<(SafetyFlag, Lexicon)>,
    boosts: Vec<CompiledTerms<ContextBoost>>,
    bonuses: Vec<CompiledTerms<TermBonus>>,
}

impl LexiconRuleset {
    pub fn new(engine: &LexicalEngine, spec: &'static LexiconRulesetSpec) -> Self {
        let groups = spec
            .groups
            .iter()
            .map(|group| CompiledGroup {
                spec: group,
                lexicon: engine.compile(group.name, group.phrases, group.weights),
            })
            .collect();
        let safety = spec
            .safety
            .iter()
            .map(|safety| (safety.flag, engine.terms(safety.flag.label(), safety.phrases)))
            .collect();
        let boosts = spec
            .boosts
            .iter()
            .map(|boost| CompiledTerms {
                spec: boost,
                terms: engine.terms(boost.label, boost.when),
            })
            .collect();
        let bonuses = spec
            .bonuses
            .iter()
            .map(|bonus| CompiledTerms {
                spec: bonus,
                terms: engine.terms(bonus.name, bonus.terms),
            })
            .collect();

        Self {
            spec,
            engine: engine.clone(),
            caps: spec.domain_caps(),
            groups,
            safety,
            boosts,
            bonuses,
        }
    }

    pub fn spec(&self) -> &'static LexiconRulesetSpec {
        self.spec
    }

    /// Scores free text: evaluation followed by sum-then-cap.
    pub fn score_text(&self, raw: &str, ctx: &ScoringContext) -> RulesetResult {
        match self.evaluate(raw, ctx) {
            Outcome::Intercepted { flags, detail } => {
                RulesetResult::intercepted(self.spec.field, flags, detail)
            }
            Outcome::Scored(details) => RulesetResult::from_details(self.spec.field, details, &self.caps),
        }
    }

    pub(crate) fn prepare(&self, raw: &str) -> String {
        let preprocess = &self.spec.preprocess;
        let mut text = if preprocess.scrub_pii {
            scrub_pii(raw)
        } else {
            raw.to_string()
        };
        if let Some(max_chars) = preprocess.max_chars {
            text = truncate_chars(&text, max_chars).to_string();
        }
        let mut text = text.to_lowercase();
        for (from, to) in preprocess.replacements {
            if text.contains(from) {
                text = text.replace(from, to);
            }
        }
        text
    }

    pub(crate) fn evaluate(&self, raw: &str, ctx: &ScoringContext) -> Outcome {
        let prepared = self.prepare(raw);
        let text = self.engine.analyze(&prepared);

        if let Some((flags, detail)) = self.intercept(&text) {
            return Outcome::Intercepted { flags, detail };
        }

        let mut details = Vec::new();
        let mut matched: Vec<&'static GroupSpec> = Vec::new();

        match self.spec.segmentation {
            Segmentation::WholeText => self.score_groups(&text, &mut details, &mut matched),
            Segmentation::RankedItems { weights } => {
                for (index, item) in split_by_delimiters(&prepared)
                    .iter()
                    .take(weights.len())
                    .enumerate()
                {
                    let item_text = self.engine.analyze(item);
                    if let Some(detail) = self.score_item(&item_text, index, weights[index], &mut matched)
                    {
                        details.push(detail);
                    }
                }
            }
        }

        if let Some(crowding) = self.spec.crowding {
            if matched.len() > crowding.more_than {
                for detail in details.iter_mut().filter(|d| d.kind == DetailKind::Match) {
                    detail.scale(crowding.factor, Modifier::Crowding { factor: crowding.factor });
                }
            }
        }

        self.apply_synergies(&mut details, &matched);
        self.apply_global_scale(&prepared, &text, ctx, &mut details);

        Outcome::Scored(details)
    }

    fn intercept(&self, text: &AnalyzedText) -> Option<(BTreeSet<SafetyFlag>, ScoreDetail)> {
        let mut flags = BTreeSet::new();
        let mut first: Option<(SafetyFlag, KeyphraseMatch)> = None;

        for (flag, lexicon) in &self.safety {
            if let Some(hit) = self.engine.find_exact(text, lexicon) {
                flags.insert(*flag);
                if first.is_none() {
                    first = Some((*flag, hit));
                }
            }
        }

        let (flag, hit) = first?;
        let detail = ScoreDetail::new(DetailKind::Safety, flag.label(), FocusVector::zero())
            .matched(hit.matched_text);
        Some((flags, detail))
    }

    fn score_groups(
        &self,
        text: &AnalyzedText,
        details: &mut Vec<ScoreDetail>,
        matched: &mut Vec<&'static GroupSpec>,
    ) {
        let negation = NegationRules::STANDARD;

        for group in &self.groups {
            let hit = match self.engine.scan(
                text,
                &group.lexicon,
                self.spec.fuzzy_threshold,
                Some(&negation),
            ) {
                LexiconHit::Affirmed(hit) => hit,
                LexiconHit::Negated(hit) => {
                    debug!(group = group.spec.name, keyphrase = %hit.keyphrase, "negated match dropped");
                    continue;
                }
                LexiconHit::Absent => continue,
            };

            let mut scores = group.lexicon.weights().scaled(hit.confidence);
            let mut modifiers = Vec::new();
            if let Some(modifier) = fuzzy_modifier(&hit) {
                modifiers.push(modifier);
            }

            for boost in self
                .boosts
                .iter()
                .filter(|boost| boost.spec.groups.contains(&group.spec.name))
            {
                if self.engine.mentions(text, &boost.terms) {
                    scores.add(boost.spec.area, boost.spec.weight);
                    modifiers.push(Modifier::Boost {
                        label: boost.spec.label.to_string(),
                        area: boost.spec.area,
                        weight: boost.spec.weight,
                    });
                }
            }

            let mut detail = ScoreDetail::new(DetailKind::Match, group.spec.name, scores)
                .matched(hit.matched_text.clone());
            detail.modifiers = modifiers;

            if let Some(hedges) = self.spec.hedges {
                if hedges.scope != ModifierScope::WholeText
                    && hedges.scope.count(text, &hit.span, hedges.phrases) > 0
                {
                    detail.scale(hedges.factor, Modifier::Uncertainty { factor: hedges.factor });
                }
            }
            self.apply_intensity(text, &hit.span, &mut detail);

            matched.push(group.spec);
            details.push(detail);
        }
    }

    fn score_item(
        &self,
        item: &AnalyzedText,
        index: usize,
        rank_weight: f64,
        matched: &mut Vec<&'static GroupSpec>,
    ) -> Option<ScoreDetail> {
        let negation = NegationRules::STANDARD;

        let mut hits: Vec<(&CompiledGroup, KeyphraseMatch)> = self
            .groups
            .iter()
            .filter_map(|group| match self.engine.scan_exact(item, &group.lexicon, Some(&negation)) {
                LexiconHit::Affirmed(hit) => Some((group, hit)),
                _ => None,
            })
            .collect();

        if hits.is_empty() && self.engine.strategy().has_fuzzy() {
            hits = self
                .groups
                .iter()
                .filter_map(|group| {
                    match self.engine.scan(item, &group.lexicon, self.spec.fuzzy_threshold, Some(&negation)) {
                        LexiconHit::Affirmed(hit) => Some((group, hit)),
                        _ => None,
                    }
                })
                .collect();
        }
        if hits.is_empty() {
            return None;
        }

        let mut fractions = FocusVector::zero();
        for (group, hit) in &hits {
            for (area, weight) in group.lexicon.weights().nonzero() {
                fractions.floor_at(area, weight * hit.confidence);
            }
        }

        let mut scores = fractions.scaled(rank_weight);
        let mut modifiers = vec![Modifier::Rank {
            rank: index + 1,
            weight: rank_weight,
        }];
        if let Some(modifier) = hits.iter().find_map(|(_, hit)| fuzzy_modifier(hit)) {
            modifiers.push(modifier);
        }

        let whole_item = 0..item.tokens().len();
        let intensity_bonus = self.intensity_bonus(item, &whole_item);
        if intensity_bonus > 0.0 {
            scores.bump_nonzero(intensity_bonus);
            modifiers.push(Modifier::Intensity {
                bonus: intensity_bonus,
            });
        }

        for bonus in &self.bonuses {
            if self.engine.mentions(item, &bonus.terms) {
                for (area, weight) in bonus.spec.weights {
                    scores.add(*area, *weight);
                    modifiers.push(Modifier::Boost {
                        label: bonus.spec.name.to_string(),
                        area: *area,
                        weight: *weight,
                    });
                }
            }
        }

        let matched_text = hits
            .iter()
            .map(|(_, hit)| hit.matched_text.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        for (group, _) in &hits {
            if !matched.iter().any(|spec| spec.name == group.spec.name) {
                matched.push(group.spec);
            }
        }

        let mut detail = ScoreDetail::new(DetailKind::Match, item.raw(), scores).matched(matched_text);
        detail.modifiers = modifiers;
        Some(detail)
    }

    fn intensity_bonus(&self, text: &AnalyzedText, span: &Range<usize>) -> f64 {
        let Some(intensity) = self.spec.intensity else {
            return 0.0;
        };
        let hits = intensity.scope.count(text, span, intensity.phrases);
        (intensity.step * hits as f64).min(intensity.max)
    }

    fn apply_intensity(&self, text: &AnalyzedText, span: &Range<usize>, detail: &mut ScoreDetail) {
        let bonus = self.intensity_bonus(text, span);
        if bonus > 0.0 {
            detail.scores.bump_nonzero(bonus);
            detail.modifiers.push(Modifier::Intensity { bonus });
            return;
        }

        if let Some(dampener) = self.spec.dampener {
            if dampener.scope.count(text, span, dampener.phrases) > 0 {
                detail.scale(dampener.factor, Modifier::Dampened { factor: dampener.factor });
            }
        }
    }

    fn apply_synergies(&self, details: &mut Vec<ScoreDetail>, matched: &[&'static GroupSpec]) {
        let has = |name: &str| matched.iter().any(|group| group.name == name);

        for synergy in self.spec.synergies {
            match *synergy {
                Synergy::Pair {
                    name,
                    first,
                    second,
                    area,
                    bonus,
                    suppress_second,
                } => {
                    if !(has(first) && has(second)) {
                        continue;
                    }
                    if suppress_second {
                        details.retain(|detail| {
                            !(detail.kind == DetailKind::Match && detail.label == second)
                        });
                    }
                    details.push(ScoreDetail::weighted(DetailKind::Synergy, name, &[(area, bonus)]));
                }
                Synergy::Count {
                    name,
                    categories,
                    min,
                    area,
                    bonus,
                } => {
                    let count = matched
                        .iter()
                        .filter(|group| match (categories, group.category) {
                            (None, _) => true,
                            (Some(wanted), Some(category)) => wanted.contains(&category),
                            (Some(_), None) => false,
                        })
                        .count();
                    if count >= min {
                        details.push(
                            ScoreDetail::weighted(DetailKind::Synergy, name, &[(area, bonus)])
                                .matched(format!("{count} groups")),
                        );
                    }
                }
            }
        }
    }

    fn apply_global_scale(
        &self,
        prepared: &str,
        text: &AnalyzedText,
        ctx: &ScoringContext,
        details: &mut [ScoreDetail],
    ) {
        if details.is_empty() {
            return;
        }

        if self.spec.recency {
            let multiplier = temporal::recency(prepared, ctx.reference_date).multiplier();
            if multiplier != 1.0 {
                for detail in details.iter_mut() {
                    detail.scale(multiplier, Modifier::Recency { multiplier });
                }
            }
        }

        if let Some(hedges) = self.spec.hedges {
            if hedges.scope == ModifierScope::WholeText && text.contains_any_surface(hedges.phrases) {
                for detail in details.iter_mut() {
                    detail.scale(hedges.factor, Modifier::Uncertainty { factor: hedges.factor });
                }
            }
        }
    }
}

fn fuzzy_modifier(hit: &KeyphraseMatch) -> Option<Modifier> {
    (hit.stage == MatchStage::Fuzzy).then(|| Modifier::Fuzzy {
        similarity: hit.similarity.unwrap_or_default(),
        confidence: hit.confidence,
    })
}

impl Ruleset for LexiconRuleset {
    fn field(&self) -> IntakeField {
        self.spec.field
    }

    fn caps(&self) -> DomainCaps {
        self.caps
    }

    fn score_answer(&self, answer: &AnswerValue, ctx: &ScoringContext) -> RulesetResult {
        self.score_text(&answer.as_text(), ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demographics::Demographics;
    use crate::focus::codes::*;

    static GROUPS: [GroupSpec; 3] = [
        GroupSpec::new("dairy", &["dairy", "milk"], &[(GA, 0.25), (SKN, 0.05)]).in_category("food"),
        GroupSpec::new("gluten", &["gluten", "bread"], &[(GA, 0.20)]).in_category("food"),
        GroupSpec::new("stress", &["stress"], &[(STR, 0.20), (GA, 0.10)]),
    ];

    static SPEC: LexiconRulesetSpec = LexiconRulesetSpec {
        safety: &[SafetyLexicon {
            flag: SafetyFlag::RedFlag,
            phrases: &["blood in stool"],
        }],
        hedges: Some(Hedges {
            phrases: &["maybe"],
            factor: 0.5,
            scope: ModifierScope::Window(8),
        }),
        synergies: &[Synergy::Count {
            name: "two_foods",
            categories: Some(&["food"]),
            min: 2,
            area: GA,
            bonus: 0.1,
        }],
        ..LexiconRulesetSpec::new(IntakeField::SymptomAggravators, &GROUPS, &[(GA, 0.5)], 0.3)
    };

    fn ruleset() -> LexiconRuleset {
        LexiconRuleset::new(&LexicalEngine::default(), &SPEC)
    }

    fn ctx() -> ScoringContext {
        ScoringContext::new(Demographics::new(Some(40), None))
    }

    #[test]
    fn matches_sum_then_cap_and_trail_reproduces_scores() {
        let result = ruleset().score_text("Milk and bread, plus stress", &ctx());

        assert_eq!(result.details.len(), 4);
        assert!((result.scores[GA] - 0.5).abs() < 1e-9);
        assert!((result.scores[STR] - 0.2).abs() < 1e-9);
        assert_eq!(result.scores, SPEC.domain_caps().apply(&result.detail_sum()));
    }

    #[test]
    fn windowed_hedge_scales_only_the_nearby_match() {
        let result = ruleset().score_text("maybe dairy. Stress for sure", &ctx());

        let dairy = result
            .details
            .iter()
            .find(|detail| detail.label == "dairy")
            .expect("dairy detail");
        assert!((dairy.scores[GA] - 0.125).abs() < 1e-9);
        assert!((result.scores[STR] - 0.2).abs() < 1e-9);
    }

    #[test]
    fn safety_hit_short_circuits_even_when_negated() {
        let result = ruleset().score_text("no blood in stool but dairy hurts", &ctx());

        assert!(result.has_safety_flag(SafetyFlag::RedFlag));
        assert!(result.scores.is_zero());
        assert_eq!(result.details.len(), 1);
        assert_eq!(result.details[0].kind, DetailKind::Safety);
    }
}
