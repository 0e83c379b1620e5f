//! "What do you think is behind your symptoms?"

use super::engine::{
    ContextBoost, Crowding, GroupSpec, Hedges, Intensity, LexiconRuleset, LexiconRulesetSpec,
    ModifierScope, Preprocess, SafetyLexicon,
};
use super::{IntakeField, SafetyFlag};
use crate::focus::codes::*;
use crate::lexical::LexicalEngine;

const GI_TERMS: &[&str] = &[
    "bloat", "gas", "reflux", "constipation", "diarrhea", "ibs", "stomach", "gut", "digestive",
];
const FATIGUE_TERMS: &[&str] = &["fatigue", "tired", "exhausted", "brain fog", "foggy", "low energy"];

static GROUPS: [GroupSpec; 18] = [
    GroupSpec::new(
        "work_stress",
        &[
            "work stress", "burnout", "deadlines", "anxiety from job", "shift work",
            "caregiving stress", "job stress", "workplace stress", "occupational stress",
        ],
        &[(STR, 0.30), (COG, 0.10), (CM, 0.10)],
    ),
    GroupSpec::new(
        "mold",
        &[
            "mold", "mould", "damp building", "water-damaged", "musty apartment", "water damage",
            "black mold", "toxic mold",
        ],
        &[(DTX, 0.30), (IMM, 0.25)],
    ),
    GroupSpec::new(
        "antibiotics",
        &[
            "antibiotics", "post-antibiotics", "microbiome disrupted", "after antibiotics",
            "antibiotic use", "took antibiotics",
        ],
        &[(GA, 0.25), (IMM, 0.10)],
    ),
    GroupSpec::new(
        "food_poisoning",
        &[
            "food poisoning", "traveler's diarrhea", "stomach bug", "gi infection",
            "post-infectious", "traveler diarrhea", "gastroenteritis",
        ],
        &[(GA, 0.25), (IMM, 0.05)],
    ),
    GroupSpec::new(
        "h_pylori",
        &["h pylori", "helicobacter", "gastric infection", "h. pylori", "hpylori"],
        &[(GA, 0.25), (IMM, 0.05)],
    ),
    GroupSpec::new(
        "sibo",
        &["sibo", "bacterial overgrowth", "small intestinal bacterial overgrowth"],
        &[(GA, 0.25), (MITO, 0.05)],
    ),
    GroupSpec::new(
        "candida",
        &["candida", "yeast overgrowth", "sifo", "small intestinal fungal overgrowth"],
        &[(GA, 0.10), (IMM, 0.05)],
    ),
    GroupSpec::new(
        "bile_gallbladder",
        &[
            "bile", "gallbladder problems", "gallbladder removed", "bile acid diarrhea",
            "cholecystectomy", "gallbladder surgery", "bam", "bile acid malabsorption",
        ],
        &[(GA, 0.20), (DTX, 0.05)],
    ),
    GroupSpec::new(
        "low_stomach_acid",
        &[
            "low acid", "hypochlorhydria", "on ppi", "antacid", "proton pump inhibitor",
            "ppi use", "low stomach acid", "ppi", "ppis", "taking ppi", "took ppi",
        ],
        &[(GA, 0.15), (IMM, 0.05)],
    ),
    GroupSpec::new(
        "leaky_gut",
        &[
            "leaky gut", "increased permeability", "zonulin", "intestinal permeability",
            "gut permeability",
        ],
        &[(GA, 0.15), (IMM, 0.05)],
    ),
    GroupSpec::new(
        "histamine",
        &["histamine intolerance", "histamine", "high histamine"],
        &[(GA, 0.15), (IMM, 0.05)],
    ),
    GroupSpec::new(
        "fodmap",
        &["fodmap", "fodmaps", "fermentable", "low fodmap"],
        &[(GA, 0.15)],
    ),
    GroupSpec::new(
        "poor_diet",
        &[
            "poor diet", "junk food", "upfs", "ultra-processed", "too much sugar", "high sugar",
            "seed oils", "processed food", "bad diet", "overeating", "over eating",
            "eating too much", "binge eating",
        ],
        &[(CM, 0.25), (IMM, 0.10), (GA, 0.10)],
    ),
    GroupSpec::new(
        "toxins",
        &[
            "lead", "mercury", "pesticides", "solvents", "heavy metals", "toxins",
            "chemical exposure", "toxic exposure",
        ],
        &[(DTX, 0.20), (IMM, 0.10), (COG, 0.05)],
    ),
    GroupSpec::new(
        "sleep_deprivation",
        &[
            "not sleeping", "shift work", "night shifts", "sleep deprivation",
            "circadian disruption", "insomnia", "poor sleep",
        ],
        &[(STR, 0.20), (COG, 0.10), (CM, 0.05)],
    ),
    GroupSpec::new(
        "hormonal",
        &[
            "thyroid", "menopause", "low t", "hormones off", "hormonal imbalance", "testosterone",
            "estrogen", "pcos", "hypothyroidism",
        ],
        &[(HRM, 0.25), (CM, 0.05)],
    ),
    GroupSpec::new(
        "nutrient_deficiency",
        &[
            "low iron", "low b12", "vitamin d deficiency", "iron deficiency", "b12 deficiency",
            "vitamin deficiency", "nutrient deficiency",
        ],
        &[(MITO, 0.15), (COG, 0.10)],
    ),
    GroupSpec::new(
        "fatigue",
        &[
            "fatigue", "fatige", "tired", "exhausted", "exhaustion", "low energy", "no energy",
            "chronic fatigue", "always tired",
        ],
        &[(MITO, 0.20), (STR, 0.10)],
    ),
];

static BOOSTS: [ContextBoost; 2] = [
    ContextBoost {
        label: "gi_symptoms",
        groups: &["work_stress"],
        when: GI_TERMS,
        area: GA,
        weight: 0.10,
    },
    ContextBoost {
        label: "fatigue_symptoms",
        groups: &["mold"],
        when: FATIGUE_TERMS,
        area: MITO,
        weight: 0.10,
    },
];

pub static SPEC: LexiconRulesetSpec = LexiconRulesetSpec {
    safety: &[SafetyLexicon {
        flag: SafetyFlag::RedFlag,
        phrases: &[
            "suicide", "self-harm", "self harm", "harm someone", "kill myself", "chest pain now",
            "stroke", "can't breathe", "cannot breathe", "anaphylaxis", "can't swallow",
            "cannot swallow",
        ],
    }],
    hedges: Some(Hedges {
        phrases: &[
            "maybe", "might", "could be", "possibly", "perhaps", "i guess", "i think", "unsure",
        ],
        factor: 0.7,
        scope: ModifierScope::Window(8),
    }),
    intensity: Some(Intensity {
        phrases: &[
            "definitely", "severe", "major trigger", "very", "extremely", "completely", "totally",
        ],
        step: 0.05,
        max: 0.10,
        scope: ModifierScope::Window(8),
    }),
    boosts: &BOOSTS,
    crowding: Some(Crowding {
        more_than: 3,
        factor: 0.5,
    }),
    preprocess: Preprocess {
        max_chars: Some(1000),
        scrub_pii: true,
        replacements: &[],
    },
    ..LexiconRulesetSpec::new(
        IntakeField::PatientReasoning,
        &GROUPS,
        &[
            (STR, 0.50),
            (GA, 0.50),
            (DTX, 0.40),
            (IMM, 0.40),
            (CM, 0.35),
            (COG, 0.30),
            (HRM, 0.30),
            (MITO, 0.25),
            (SKN, 0.20),
        ],
        0.0,
    )
};

pub(crate) fn ruleset(engine: &LexicalEngine) -> LexiconRuleset {
    LexiconRuleset::new(engine, &SPEC)
}
