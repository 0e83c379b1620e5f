//! "Did anything trigger your symptoms?" Trigger groups scaled by how long ago it happened.

use super::engine::{
    ContextBoost, GroupSpec, Hedges, LexiconRuleset, LexiconRulesetSpec, ModifierScope, Synergy,
};
use super::IntakeField;
use crate::focus::codes::*;
use crate::lexical::LexicalEngine;

const BRAIN_FOG_TERMS: &[&str] = &[
    "brain fog", "brainfog", "memory", "concentration", "focus", "cognitive", "mental clarity",
    "confusion", "forgetful",
];
const GI_TERMS: &[&str] = &[
    "constipation", "reflux", "heartburn", "gerd", "ibs", "bloating", "diarrhea", "gas", "nausea",
];

static GROUPS: [GroupSpec; 15] = [
    GroupSpec::new(
        "post_viral",
        &[
            "covid", "covid-19", "coronavirus", "sars-cov-2", "flu", "influenza", "mono",
            "mononucleosis", "ebv", "epstein-barr", "viral infection", "virus", "viral illness",
        ],
        &[(IMM, 0.25), (MITO, 0.15)],
    ),
    GroupSpec::new(
        "gastroenteritis",
        &[
            "food poisoning", "gastroenteritis", "stomach bug", "norovirus", "campylobacter",
            "salmonella", "traveler's diarrhea", "traveller's diarrhea", "delhi belly", "montezuma",
            "travelers diarrhea", "travellers diarrhea", "acute diarrhea", "gi infection",
        ],
        &[(GA, 0.30), (IMM, 0.10), (DTX, 0.05)],
    ),
    GroupSpec::new(
        "surgery",
        &[
            "surgery", "operation", "surgical", "anesthesia", "anaesthesia", "accident", "trauma",
            "injury", "cholecystectomy", "appendectomy", "c-section", "cesarean", "caesarean",
            "laparoscopic", "laparotomy",
        ],
        &[(STR, 0.20), (MITO, 0.05), (IMM, 0.05)],
    ),
    GroupSpec::new(
        "antibiotics",
        &[
            "antibiotic", "antibiotics", "amoxicillin", "azithromycin", "ciprofloxacin", "cipro",
            "doxycycline", "metronidazole", "flagyl", "clindamycin", "cephalexin", "keflex",
            "augmentin", "z-pack", "zpack",
        ],
        &[(GA, 0.20), (IMM, 0.10), (DTX, 0.05)],
    ),
    GroupSpec::new(
        "ppi",
        &[
            "ppi", "proton pump inhibitor", "omeprazole", "prilosec", "esomeprazole", "nexium",
            "pantoprazole", "protonix", "lansoprazole", "prevacid", "rabeprazole", "aciphex",
        ],
        &[(GA, 0.25), (DTX, 0.10), (IMM, 0.05)],
    ),
    GroupSpec::new(
        "nsaids",
        &[
            "nsaid", "nsaids", "ibuprofen", "advil", "motrin", "naproxen", "aleve", "diclofenac",
            "voltaren", "indomethacin", "indocin", "celecoxib", "celebrex",
        ],
        &[(GA, 0.15), (DTX, 0.10)],
    ),
    GroupSpec::new(
        "metformin",
        &["metformin", "glucophage", "metformin xr", "metformin er"],
        &[(GA, 0.20)],
    ),
    GroupSpec::new(
        "opioids",
        &[
            "opioid", "opioids", "codeine", "hydrocodone", "vicodin", "oxycodone", "oxycontin",
            "percocet", "morphine", "tramadol", "fentanyl", "narcotic", "narcotics",
        ],
        &[(GA, 0.25), (STR, 0.10)],
    ),
    GroupSpec::new(
        "postpartum",
        &[
            "postpartum", "post-partum", "after delivery", "after birth", "after baby",
            "after pregnancy", "childbirth", "gave birth", "baby was born", "baby born",
            "had baby", "new baby",
        ],
        &[(HRM, 0.25), (STR, 0.05)],
    ),
    GroupSpec::new(
        "perimenopause",
        &[
            "perimenopause", "peri-menopause", "menopause transition", "menopause", "menopausal",
            "hot flashes", "hot flushes",
        ],
        &[(HRM, 0.25), (STR, 0.05)],
    ),
    GroupSpec::new(
        "mold",
        &[
            "mold", "mould", "mildew", "water damage", "water-damaged", "damp", "mycotoxin",
            "mycotoxins", "moldy", "mouldy",
        ],
        &[(IMM, 0.20), (DTX, 0.20), (GA, 0.10), (COG, 0.05)],
    ),
    GroupSpec::new(
        "chemicals",
        &[
            "chemical", "chemicals", "solvent", "solvents", "pesticide", "pesticides",
            "herbicide", "herbicides", "mercury", "lead", "cadmium", "heavy metal",
            "heavy metals", "toxin", "toxins", "xenobiotic",
        ],
        &[(DTX, 0.20), (IMM, 0.10), (MITO, 0.10), (GA, 0.10), (COG, 0.05)],
    ),
    GroupSpec::new(
        "psychosocial_stress",
        &[
            "shift work", "shift-work", "job loss", "lost job", "fired", "caregiving", "caregiver",
            "bereavement", "grief", "death", "divorce", "separation", "major stress",
            "high stress", "work stress", "financial stress", "moved", "relocation",
        ],
        &[(STR, 0.25), (COG, 0.10), (CM, 0.05)],
    ),
    GroupSpec::new(
        "low_fiber_diet",
        &[
            "keto", "ketogenic", "carnivore", "carnivore diet", "low fiber", "low-fiber",
            "eliminated fiber", "no fiber",
        ],
        &[(GA, 0.10)],
    ),
    GroupSpec::new(
        "high_fodmap_diet",
        &["high fodmap", "ultra-processed", "processed food", "junk food", "fast food"],
        &[(GA, 0.10), (IMM, 0.05)],
    ),
];

static BOOSTS: [ContextBoost; 4] = [
    ContextBoost {
        label: "post_viral_brain_fog",
        groups: &["post_viral"],
        when: BRAIN_FOG_TERMS,
        area: COG,
        weight: 0.10,
    },
    ContextBoost {
        label: "hormonal_brain_fog",
        groups: &["postpartum", "perimenopause"],
        when: BRAIN_FOG_TERMS,
        area: COG,
        weight: 0.05,
    },
    ContextBoost {
        label: "postpartum_gi",
        groups: &["postpartum"],
        when: GI_TERMS,
        area: GA,
        weight: 0.15,
    },
    ContextBoost {
        label: "stress_gi",
        groups: &["psychosocial_stress"],
        when: GI_TERMS,
        area: GA,
        weight: 0.10,
    },
];

pub static SPEC: LexiconRulesetSpec = LexiconRulesetSpec {
    hedges: Some(Hedges {
        phrases: &[
            "maybe", "might", "possibly", "perhaps", "could be", "not sure", "uncertain", "think",
            "guess",
        ],
        factor: 0.7,
        scope: ModifierScope::WholeText,
    }),
    boosts: &BOOSTS,
    synergies: &[
        Synergy::Pair {
            name: "gastroenteritis_antibiotics",
            first: "gastroenteritis",
            second: "antibiotics",
            area: GA,
            bonus: 0.10,
            suppress_second: false,
        },
        Synergy::Pair {
            name: "antibiotics_ppi",
            first: "antibiotics",
            second: "ppi",
            area: GA,
            bonus: 0.05,
            suppress_second: false,
        },
        Synergy::Count {
            name: "multiple_triggers",
            categories: None,
            min: 3,
            area: STR,
            bonus: 0.05,
        },
    ],
    recency: true,
    ..LexiconRulesetSpec::new(
        IntakeField::TriggerEvent,
        &GROUPS,
        &[
            (GA, 0.40),
            (IMM, 0.35),
            (STR, 0.30),
            (HRM, 0.30),
            (CM, 0.30),
            (MITO, 0.25),
            (DTX, 0.25),
            (COG, 0.20),
            (SKN, 0.10),
        ],
        0.0,
    )
};

pub(crate) fn ruleset(engine: &LexicalEngine) -> LexiconRuleset {
    LexiconRuleset::new(engine, &SPEC)
}
