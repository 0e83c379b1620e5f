//! "What makes your symptoms worse?"

use super::engine::{
    Dampener, GroupSpec, Intensity, LexiconRuleset, LexiconRulesetSpec, ModifierScope,
    SafetyLexicon, Synergy,
};
use super::{IntakeField, SafetyFlag};
use crate::focus::codes::*;
use crate::lexical::LexicalEngine;

const MEAL: &str = "meal_pattern";
const FOOD: &str = "food";
const LIFESTYLE: &str = "lifestyle";

static GROUPS: [GroupSpec; 20] = [
    GroupSpec::new(
        "after_meals",
        &["after meal", "post meal", "postmeal", "after eating", "post prandial", "postprandial"],
        &[(GA, 0.25), (CM, 0.10)],
    )
    .in_category(MEAL),
    GroupSpec::new(
        "large_meals",
        &[
            "large meal", "big meal", "heavy meal", "overeating", "too much food", "big dinner",
            "large dinner", "big lunch", "large lunch",
        ],
        &[(GA, 0.25), (CM, 0.10)],
    )
    .in_category(MEAL),
    GroupSpec::new(
        "late_night_meals",
        &[
            "late night", "late meal", "nighttime eating", "eating before bed", "late dinner",
            "eat late", "eating late",
        ],
        &[(GA, 0.20), (CM, 0.10)],
    )
    .in_category(MEAL),
    GroupSpec::new(
        "high_fat_meals",
        &["high fat", "fatty", "fried", "greasy", "oily food"],
        &[(GA, 0.20)],
    )
    .in_category(MEAL),
    GroupSpec::new(
        "bloating_immediate",
        &["bloating right after", "bloat immediately", "bloat after eating"],
        &[(GA, 0.20)],
    )
    .in_category(MEAL),
    GroupSpec::new(
        "bloating_delayed",
        &["bloating 2 hours", "bloat hours later", "delayed bloating"],
        &[(GA, 0.20)],
    )
    .in_category(MEAL),
    GroupSpec::new(
        "dairy",
        &[
            "dairy", "milk", "lactose", "ice cream", "whey", "cheese", "cream", "latte", "casein",
            "yogurt",
        ],
        &[(GA, 0.25), (IMM, 0.05), (SKN, 0.05)],
    )
    .in_category(FOOD),
    GroupSpec::new(
        "gluten",
        &["gluten", "wheat", "bread", "pasta", "pizza", "barley", "rye", "seitan"],
        &[(GA, 0.20)],
    )
    .in_category(FOOD),
    GroupSpec::new(
        "fodmap_onions_garlic",
        &["onion", "garlic", "leek", "shallot", "fructan"],
        &[(GA, 0.25)],
    )
    .in_category(FOOD),
    GroupSpec::new(
        "fodmap_beans",
        &["bean", "legume", "lentil", "chickpea", "pea"],
        &[(GA, 0.20)],
    )
    .in_category(FOOD),
    GroupSpec::new(
        "spicy",
        &["spicy", "hot sauce", "chili", "pepper", "capsaicin"],
        &[(GA, 0.15)],
    )
    .in_category(FOOD),
    GroupSpec::new(
        "coffee_caffeine",
        &["coffee", "caffeine", "espresso", "energy drink"],
        &[(GA, 0.15), (STR, 0.05)],
    )
    .in_category(FOOD),
    GroupSpec::new(
        "alcohol",
        &["alcohol", "wine", "beer", "liquor", "drinking"],
        &[(GA, 0.20), (DTX, 0.10)],
    )
    .in_category(FOOD),
    GroupSpec::new(
        "artificial_sweeteners",
        &[
            "artificial sweetener", "sorbitol", "mannitol", "xylitol", "sucralose", "aspartame",
            "neotame", "sugar alcohol",
        ],
        &[(GA, 0.15), (IMM, 0.05)],
    )
    .in_category(FOOD),
    GroupSpec::new(
        "carbonated",
        &["carbonated", "fizzy", "soda", "sparkling", "pop", "cola"],
        &[(GA, 0.10)],
    )
    .in_category(FOOD),
    GroupSpec::new(
        "stress",
        &["stress", "anxiety", "anxious", "worried", "nervous", "tense"],
        &[(STR, 0.20), (GA, 0.10)],
    )
    .in_category(LIFESTYLE),
    GroupSpec::new(
        "lack_of_sleep",
        &[
            "lack of sleep", "poor sleep", "insomnia", "sleep deprivation", "not sleeping",
            "can't sleep",
        ],
        &[(STR, 0.20), (GA, 0.05), (COG, 0.10)],
    )
    .in_category(LIFESTYLE),
    GroupSpec::new(
        "morning_flares",
        &["morning", "wake up", "first thing", "early morning"],
        &[(STR, 0.15), (GA, 0.05), (HRM, 0.05)],
    )
    .in_category(LIFESTYLE),
    GroupSpec::new(
        "heat",
        &["heat", "hot weather", "temperature", "hot shower", "sauna", "warm"],
        &[(IMM, 0.15), (GA, 0.05), (SKN, 0.10)],
    )
    .in_category(LIFESTYLE),
    GroupSpec::new(
        "intense_exercise",
        &["intense exercise", "hard workout", "vigorous", "heavy exercise", "strenuous"],
        &[(STR, 0.15), (GA, 0.05)],
    )
    .in_category(LIFESTYLE),
];

pub static SPEC: LexiconRulesetSpec = LexiconRulesetSpec {
    safety: &[SafetyLexicon {
        flag: SafetyFlag::RedFlag,
        phrases: &[
            "anaphylaxis", "throat closing", "throat swelling", "can't breathe", "bloody stool",
            "blood in stool", "black tarry stool", "melena", "unintentional weight loss",
            "unexplained weight loss", "fever with severe pain", "high fever",
            "severe abdominal pain",
        ],
    }],
    intensity: Some(Intensity {
        phrases: &["always", "every time", "severe", "extremely", "constantly"],
        step: 0.05,
        max: 0.05,
        scope: ModifierScope::Window(8),
    }),
    dampener: Some(Dampener {
        phrases: &["sometimes", "occasionally", "maybe", "unsure", "might"],
        factor: 0.5,
        scope: ModifierScope::Window(8),
    }),
    synergies: &[Synergy::Count {
        name: "multiple_gi_triggers",
        categories: Some(&[FOOD, MEAL]),
        min: 3,
        area: GA,
        bonus: 0.10,
    }],
    fuzzy_threshold: Some(90.0),
    ..LexiconRulesetSpec::new(
        IntakeField::SymptomAggravators,
        &GROUPS,
        &[
            (GA, 0.45),
            (STR, 0.35),
            (IMM, 0.30),
            (DTX, 0.25),
            (CM, 0.20),
            (SKN, 0.20),
            (COG, 0.15),
            (HRM, 0.10),
            (MITO, 0.10),
        ],
        0.0,
    )
};

pub(crate) fn ruleset(engine: &LexicalEngine) -> LexiconRuleset {
    LexiconRuleset::new(engine, &SPEC)
}
