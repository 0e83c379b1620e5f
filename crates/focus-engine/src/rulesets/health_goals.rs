//! "What are your top health goals?": a ranked free-text list.

use super::engine::{
    GroupSpec, Intensity, LexiconRuleset, LexiconRulesetSpec, ModifierScope, Preprocess,
    SafetyLexicon, Segmentation, TermBonus,
};
use super::{IntakeField, SafetyFlag};
use crate::focus::codes::*;
use crate::lexical::LexicalEngine;

/// Base weight for the first, second and third stated goal.
pub const RANK_WEIGHTS: [f64; 3] = [0.35, 0.30, 0.25];

static GROUPS: [GroupSpec; 12] = [
    GroupSpec::new(
        "gut",
        &[
            "bloat", "bloating", "gas", "burp", "belch", "reflux", "heartburn", "gerd",
            "constipation", "diarrhea", "loose stools", "ibs", "sibo", "celiac", "coeliac",
            "leaky gut", "abdominal pain", "cramps", "nausea", "stool issues", "fodmap",
            "low-fodmap", "histamine after foods", "indigestion",
        ],
        &[(GA, 1.0)],
    ),
    GroupSpec::new(
        "cardiometabolic",
        &[
            "lose weight", "weight loss", "metabolic health", "reverse prediabetes", "lower a1c",
            "lower blood sugar", "improve cholesterol", "heart health", "blood pressure",
            "cardiovascular", "metabolic",
        ],
        &[(CM, 1.0)],
    ),
    GroupSpec::new(
        "cognitive",
        &[
            "brain fog", "focus", "concentrate", "memory", "mental clarity", "productivity",
            "cognitive", "mental sharpness",
        ],
        &[(COG, 1.0)],
    ),
    GroupSpec::new(
        "energy",
        &[
            "fatigue", "low energy", "stamina", "burnout", "exhaustion", "vitality",
            "increase energy", "energy levels", "energy", "improve energy",
        ],
        &[(MITO, 1.0)],
    ),
    GroupSpec::new(
        "stress",
        &[
            "reduce stress", "anxiety", "anxious", "calm", "resilience", "burnout",
            "improve sleep", "sleep better", "insomnia", "circadian rhythm", "stress management",
            "stressed",
        ],
        &[(STR, 1.0)],
    ),
    GroupSpec::new(
        "hormonal",
        &[
            "balance hormones", "thyroid", "pcos", "pcos symptoms", "menopause", "perimenopause",
            "hot flashes", "cycles", "pms", "low testosterone", "libido",
        ],
        &[(HRM, 1.0)],
    ),
    GroupSpec::new(
        "detox",
        &[
            "detox", "cleanse", "reduce toxins", "mold detox", "chemical sensitivity",
            "reduce exposure", "heavy metals", "detoxification",
        ],
        &[(DTX, 1.0)],
    ),
    GroupSpec::new(
        "immune",
        &[
            "lower inflammation", "autoimmune remission", "allergies", "histamine intolerance",
            "reduce flares", "inflammatory", "immune", "inflammation", "reduce inflammation",
        ],
        &[(IMM, 1.0)],
    ),
    GroupSpec::new(
        "skin",
        &[
            "clear skin", "acne", "eczema", "psoriasis", "rashes", "dermatitis", "skin issues",
            "skin", "clear my skin",
        ],
        &[(SKN, 1.0)],
    ),
    GroupSpec::new(
        "pain",
        &[
            "reduce pain", "joint pain", "stiffness", "back pain", "migraines", "headaches",
            "chronic pain", "muscle pain",
        ],
        &[(STR, 1.0), (IMM, 1.0), (MITO, 1.0)],
    ),
    GroupSpec::new(
        "longevity",
        &[
            "longevity", "age well", "prevention", "healthy aging", "anti-aging", "aging well",
            "live longer",
        ],
        &[(CM, 1.0), (MITO, 1.0), (IMM, 1.0)],
    ),
    GroupSpec::new(
        "sleep",
        &["improve sleep", "sleep better", "sleep quality", "better sleep"],
        &[(COG, 1.0)],
    ),
];

static BONUSES: [TermBonus; 4] = [
    TermBonus {
        name: "fodmap",
        terms: &["fodmap", "low-fodmap"],
        weights: &[(IMM, 0.05)],
    },
    TermBonus {
        name: "histamine",
        terms: &["histamine"],
        weights: &[(IMM, 0.05)],
    },
    TermBonus {
        name: "skin_barrier",
        terms: &["acne", "eczema", "psoriasis", "rashes", "dermatitis", "clear skin"],
        weights: &[(IMM, 0.05), (GA, 0.05)],
    },
    TermBonus {
        name: "toxic_load",
        terms: &["detox", "cleanse", "reduce toxins", "chemical"],
        weights: &[(IMM, 0.05)],
    },
];

pub static SPEC: LexiconRulesetSpec = LexiconRulesetSpec {
    segmentation: Segmentation::RankedItems {
        weights: &RANK_WEIGHTS,
    },
    safety: &[
        SafetyLexicon {
            flag: SafetyFlag::Crisis,
            phrases: &["suicidal", "self-harm", "self harm", "kill myself", "end my life"],
        },
        SafetyLexicon {
            flag: SafetyFlag::UrgentCare,
            phrases: &["chest pain", "worst headache", "blood in stool", "severe chest pain"],
        },
    ],
    intensity: Some(Intensity {
        phrases: &["severe", "debilitating", "urgent", "constant", "chronic", "extreme", "intense"],
        step: 0.05,
        max: 0.05,
        scope: ModifierScope::WholeText,
    }),
    bonuses: &BONUSES,
    preprocess: Preprocess {
        max_chars: None,
        scrub_pii: false,
        replacements: &[
            ("diarrhoea", "diarrhea"),
            ("stomach acid", "heartburn"),
            ("stomachache", "abdominal pain"),
            ("tummy", "abdominal"),
            ("poop", "stool"),
        ],
    },
    ..LexiconRulesetSpec::new(
        IntakeField::TopHealthGoals,
        &GROUPS,
        &[
            (CM, 0.60),
            (COG, 0.60),
            (MITO, 0.60),
            (GA, 0.60),
            (STR, 0.50),
            (IMM, 0.40),
            (DTX, 0.35),
            (HRM, 0.35),
            (SKN, 0.30),
        ],
        0.0,
    )
};

pub(crate) fn ruleset(engine: &LexicalEngine) -> LexiconRuleset {
    LexiconRuleset::new(engine, &SPEC)
}
