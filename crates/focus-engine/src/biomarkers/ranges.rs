//! Reference-range tables.
//!
//! Bands are scanned in declared order and the first band containing the value wins,
//! so a boundary shared by two adjacent bands belongs to whichever is listed first.

use super::severity::Direction;
use crate::demographics::Sex;
use crate::focus::codes::*;
use crate::focus::FocusArea;
use std::collections::HashMap;
use std::sync::OnceLock;

use super::severity::Direction::{Healthy as OK, High as HI, Low as LO};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBand {
    pub category: &'static str,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub direction: Direction,
}

impl RangeBand {
    /// Inclusive on both ends when a bound is present.
    pub fn contains(&self, value: f64) -> bool {
        self.lower.map_or(true, |lower| value >= lower)
            && self.upper.map_or(true, |upper| value <= upper)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AgeBracket {
    pub min_age: u32,
    pub max_age: Option<u32>,
    pub label: &'static str,
    pub bands: &'static [RangeBand],
}

impl AgeBracket {
    fn contains(&self, age: u32) -> bool {
        age >= self.min_age && self.max_age.map_or(true, |max| age <= max)
    }
}

/// One demographic slice: plain bands or a further split by age.
#[derive(Debug, Clone, Copy)]
pub enum RangeSlice {
    Bands(&'static [RangeBand]),
    ByAge(&'static [AgeBracket]),
}

impl RangeSlice {
    pub fn bands_for(&self, age: Option<u32>) -> Option<(&'static [RangeBand], Option<&'static str>)> {
        match *self {
            RangeSlice::Bands(bands) => Some((bands, None)),
            RangeSlice::ByAge(brackets) => {
                let bracket = match age {
                    Some(age) => brackets.iter().find(|bracket| bracket.contains(age)),
                    None => brackets.first(),
                }?;
                Some((bracket.bands, Some(bracket.label)))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RangeSpec {
    Universal(RangeSlice),
    BySex { male: RangeSlice, female: RangeSlice },
}

impl RangeSpec {
    pub fn slice_for(&self, sex: Option<Sex>) -> Option<&RangeSlice> {
        match self {
            RangeSpec::Universal(slice) => Some(slice),
            RangeSpec::BySex { male, female } => match sex? {
                Sex::Male => Some(male),
                Sex::Female => Some(female),
            },
        }
    }

    pub fn is_sex_partitioned(&self) -> bool {
        matches!(self, RangeSpec::BySex { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BiomarkerSpec {
    pub name: &'static str,
    pub unit: &'static str,
    pub ranges: RangeSpec,
    /// Focus areas a flagged value of this marker speaks to.
    pub domains: &'static [FocusArea],
}

const fn below(category: &'static str, upper: f64, direction: Direction) -> RangeBand {
    RangeBand {
        category,
        lower: None,
        upper: Some(upper),
        direction,
    }
}

const fn between(category: &'static str, lower: f64, upper: f64, direction: Direction) -> RangeBand {
    RangeBand {
        category,
        lower: Some(lower),
        upper: Some(upper),
        direction,
    }
}

const fn above(category: &'static str, lower: f64, direction: Direction) -> RangeBand {
    RangeBand {
        category,
        lower: Some(lower),
        upper: None,
        direction,
    }
}

const fn universal(bands: &'static [RangeBand]) -> RangeSpec {
    RangeSpec::Universal(RangeSlice::Bands(bands))
}

const fn by_sex(male: &'static [RangeBand], female: &'static [RangeBand]) -> RangeSpec {
    RangeSpec::BySex {
        male: RangeSlice::Bands(male),
        female: RangeSlice::Bands(female),
    }
}

const fn marker(
    name: &'static str,
    unit: &'static str,
    ranges: RangeSpec,
    domains: &'static [FocusArea],
) -> BiomarkerSpec {
    BiomarkerSpec {
        name,
        unit,
        ranges,
        domains,
    }
}

const MALE_TESTOSTERONE_BRACKETS: &[AgeBracket] = &[
    AgeBracket {
        min_age: 0,
        max_age: Some(49),
        label: "under_50",
        bands: &[
            between("optimal", 3.0, 10.8, OK),
            below("very_low", 2.0, LO),
            below("low", 3.0, LO),
            above("high", 10.8, HI),
        ],
    },
    AgeBracket {
        min_age: 50,
        max_age: Some(59),
        label: "50_to_59",
        bands: &[
            between("optimal", 3.0, 8.9, OK),
            below("very_low", 2.0, LO),
            below("low", 3.0, LO),
            above("high", 8.9, HI),
        ],
    },
    AgeBracket {
        min_age: 60,
        max_age: None,
        label: "60_plus",
        bands: &[
            between("optimal", 3.0, 7.2, OK),
            below("very_low", 2.0, LO),
            below("low", 3.0, LO),
            above("high", 7.2, HI),
        ],
    },
];

const BIOMARKERS: &[BiomarkerSpec] = &[
    // Glycemic control
    marker(
        "HbA1c",
        "%",
        universal(&[
            between("optimal", 4.0, 5.0, OK),
            between("normal", 5.1, 5.6, OK),
            between("prediabetes", 5.7, 6.4, HI),
            above("diabetes", 6.5, HI),
            below("low", 4.0, LO),
        ]),
        &[CM],
    ),
    marker(
        "Fasting Glucose",
        "mg/dL",
        universal(&[
            below("very_low", 54.0, LO),
            below("low", 70.0, LO),
            between("optimal", 70.0, 90.0, OK),
            between("normal", 90.0, 99.0, OK),
            between("prediabetes", 99.0, 125.0, HI),
            above("diabetes", 125.0, HI),
        ]),
        &[CM],
    ),
    marker(
        "Fasting Insulin",
        "uIU/mL",
        universal(&[
            below("low", 1.9, LO),
            between("optimal", 1.9, 8.0, OK),
            between("high", 8.0, 15.0, HI),
            above("very_high", 15.0, HI),
        ]),
        &[CM],
    ),
    marker(
        "HOMA-IR",
        "index",
        universal(&[
            below("insulin_sensitive", 1.0, OK),
            between("normal", 1.0, 1.9, OK),
            between("insulin_resistant", 1.9, 2.9, HI),
            above("very_high", 2.9, HI),
        ]),
        &[CM],
    ),
    marker(
        "C-peptide",
        "ng/mL",
        universal(&[
            below("low", 1.1, LO),
            between("optimal", 1.1, 4.4, OK),
            above("high", 4.4, HI),
        ]),
        &[CM],
    ),
    marker(
        "EAG (Calc.)",
        "mg/dL",
        universal(&[
            below("low", 70.0, LO),
            between("optimal", 70.0, 107.0, OK),
            between("high", 107.0, 137.0, HI),
            above("very_high", 137.0, HI),
        ]),
        &[CM],
    ),
    // Lipids
    marker(
        "HDL Cholesterol",
        "mg/dL",
        by_sex(
            &[
                below("very_low", 30.0, LO),
                below("low", 40.0, LO),
                above("excellent", 40.0, OK),
            ],
            &[
                below("very_low", 35.0, LO),
                below("low", 50.0, LO),
                above("excellent", 50.0, OK),
            ],
        ),
        &[CM],
    ),
    marker(
        "LDL Cholesterol",
        "mg/dL",
        universal(&[
            below("optimal", 100.0, OK),
            between("borderline", 100.0, 130.0, HI),
            between("high", 130.0, 160.0, HI),
            above("very_high", 160.0, HI),
        ]),
        &[CM],
    ),
    marker(
        "Calculated Total Cholesterol",
        "mg/dL",
        universal(&[
            below("low", 120.0, LO),
            between("desirable", 120.0, 200.0, OK),
            between("borderline", 200.0, 240.0, HI),
            above("high", 240.0, HI),
        ]),
        &[CM],
    ),
    marker(
        "Triglycerides",
        "mg/dL",
        universal(&[
            below("optimal", 100.0, OK),
            between("normal", 100.0, 150.0, OK),
            between("high", 150.0, 200.0, HI),
            above("very_high", 200.0, HI),
        ]),
        &[CM],
    ),
    marker(
        "Triglyceride:HDL Ratio",
        "ratio",
        universal(&[
            below("optimal", 1.0, OK),
            between("normal", 1.0, 2.0, OK),
            between("high", 2.0, 3.5, HI),
            above("very_high", 3.5, HI),
        ]),
        &[CM],
    ),
    marker(
        "LDL:HDL Ratio (Calc.)",
        "ratio",
        universal(&[
            below("optimal", 2.0, OK),
            between("borderline", 2.0, 3.0, HI),
            above("high", 3.0, HI),
        ]),
        &[CM],
    ),
    marker(
        "Total Cholesterol:HDL Ratio",
        "ratio",
        universal(&[
            below("optimal", 3.5, OK),
            between("borderline", 3.5, 5.0, HI),
            above("high", 5.0, HI),
        ]),
        &[CM],
    ),
    marker(
        "Lp(a)",
        "mg/dL",
        universal(&[
            below("optimal", 14.0, OK),
            between("borderline", 14.0, 30.0, HI),
            between("high", 30.0, 50.0, HI),
            above("very_high", 50.0, HI),
        ]),
        &[CM],
    ),
    marker(
        "Apolipoprotein B (APOB)",
        "mg/dL",
        universal(&[
            below("optimal", 80.0, OK),
            between("borderline", 80.0, 100.0, HI),
            between("high", 100.0, 130.0, HI),
            above("very_high", 130.0, HI),
        ]),
        &[CM],
    ),
    marker(
        "Apolipoprotein A1 (APOA1)",
        "mg/dL",
        by_sex(
            &[below("low", 115.0, LO), above("optimal", 115.0, OK)],
            &[below("low", 125.0, LO), above("optimal", 125.0, OK)],
        ),
        &[CM],
    ),
    marker(
        "ApoB:ApoA1 Ratio",
        "ratio",
        by_sex(
            &[
                below("optimal", 0.70, OK),
                between("high", 0.70, 0.90, HI),
                above("very_high", 0.90, HI),
            ],
            &[
                below("optimal", 0.60, OK),
                between("high", 0.60, 0.80, HI),
                above("very_high", 0.80, HI),
            ],
        ),
        &[CM],
    ),
    marker(
        "VLDL (Calculated)",
        "mg/dL",
        universal(&[
            below("optimal", 15.0, OK),
            between("normal", 15.0, 30.0, OK),
            above("high", 30.0, HI),
        ]),
        &[CM],
    ),
    // Inflammation
    marker(
        "High-Sensitivity CRP",
        "mg/L",
        universal(&[
            below("optimal", 1.0, OK),
            between("borderline", 1.0, 3.0, HI),
            between("elevated", 3.0, 10.0, HI),
            above("very_high", 10.0, HI),
        ]),
        &[IMM, CM],
    ),
    marker(
        "Homocysteine",
        "umol/L",
        universal(&[
            below("low_normal", 4.0, LO),
            between("optimal", 4.0, 9.0, OK),
            between("elevated", 9.0, 15.0, HI),
            above("very_high", 15.0, HI),
        ]),
        &[CM, COG],
    ),
    // Thyroid and sex hormones
    marker(
        "TSH",
        "uIU/mL",
        universal(&[
            below("very_low", 0.1, LO),
            below("low", 1.0, LO),
            between("optimal", 1.0, 2.5, OK),
            between("borderline", 2.5, 4.5, HI),
            between("high", 4.5, 10.0, HI),
            above("very_high", 10.0, HI),
        ]),
        &[HRM, MITO],
    ),
    marker(
        "Testosterone, Total (Males)",
        "ng/mL",
        RangeSpec::Universal(RangeSlice::ByAge(MALE_TESTOSTERONE_BRACKETS)),
        &[HRM],
    ),
    marker(
        "Testosterone, Total (Females)",
        "ng/dL",
        universal(&[
            below("low", 15.0, LO),
            between("normal", 15.0, 35.0, OK),
            between("optimal", 35.0, 45.0, OK),
            between("high", 45.0, 70.0, HI),
            above("very_high", 70.0, HI),
        ]),
        &[HRM],
    ),
    marker(
        "Free Testosterone",
        "ng/mL",
        by_sex(
            &[
                below("low", 0.047, LO),
                between("optimal", 0.047, 0.244, OK),
                above("high", 0.244, HI),
            ],
            &[below("optimal", 0.0085, OK), above("high", 0.0085, HI)],
        ),
        &[HRM],
    ),
    marker(
        "SBHG",
        "nmol/L",
        by_sex(
            &[
                below("low", 20.0, LO),
                between("optimal", 20.0, 50.0, OK),
                above("high", 50.0, HI),
            ],
            &[
                below("low", 40.0, LO),
                between("optimal", 40.0, 90.0, OK),
                above("high", 90.0, HI),
            ],
        ),
        &[HRM],
    ),
    marker(
        "Estradiol",
        "pg/mL",
        by_sex(
            &[
                below("low", 20.0, LO),
                between("optimal", 20.0, 40.0, OK),
                above("high", 40.0, HI),
            ],
            &[
                below("low", 10.0, LO),
                between("optimal", 10.0, 400.0, OK),
                above("high", 400.0, HI),
            ],
        ),
        &[HRM],
    ),
    marker(
        "FSH",
        "mIU/mL",
        by_sex(
            &[
                below("low", 1.0, LO),
                between("optimal", 1.0, 7.0, OK),
                above("high", 7.0, HI),
            ],
            &[
                below("low", 2.0, LO),
                between("optimal", 2.0, 22.0, OK),
                above("high", 22.0, HI),
            ],
        ),
        &[HRM],
    ),
    marker(
        "LH",
        "mIU/mL",
        by_sex(
            &[
                below("low", 1.7, LO),
                between("optimal", 1.7, 8.6, OK),
                above("high", 8.6, HI),
            ],
            &[
                below("low", 1.0, LO),
                between("optimal", 1.0, 11.4, OK),
                above("high", 11.4, HI),
            ],
        ),
        &[HRM],
    ),
    marker(
        "Dehydroepiandrosterone Sulfate (DHEA-S)",
        "mcg/dL",
        by_sex(
            &[
                below("low", 150.0, LO),
                between("optimal", 150.0, 250.0, OK),
                above("high", 250.0, HI),
            ],
            &[
                below("low", 150.0, LO),
                between("optimal", 150.0, 200.0, OK),
                above("high", 200.0, HI),
            ],
        ),
        &[STR, HRM],
    ),
    marker(
        "Cortisol",
        "mcg/dL",
        universal(&[
            below("very_low", 5.0, LO),
            below("low", 10.0, LO),
            between("optimal", 10.0, 18.0, OK),
            between("high", 18.0, 25.0, HI),
            above("very_high", 25.0, HI),
        ]),
        &[STR],
    ),
    marker(
        "Testosterone:Cortisol Ratio",
        "ratio",
        by_sex(
            &[below("low", 0.05, LO), above("optimal", 0.05, OK)],
            &[
                below("low", 0.015, LO),
                between("optimal", 0.015, 0.03, OK),
                above("high", 0.03, HI),
            ],
        ),
        &[STR, HRM],
    ),
    // Iron and micronutrients
    marker(
        "Ferritin",
        "ng/mL",
        by_sex(
            &[
                below("deficiency", 12.0, LO),
                below("low", 30.0, LO),
                between("optimal", 30.0, 300.0, OK),
                between("high", 300.0, 500.0, HI),
                above("very_high", 500.0, HI),
            ],
            &[
                below("deficiency", 12.0, LO),
                below("low", 30.0, LO),
                between("optimal", 30.0, 150.0, OK),
                between("high", 150.0, 300.0, HI),
                above("very_high", 300.0, HI),
            ],
        ),
        &[MITO, IMM],
    ),
    marker(
        "Iron",
        "mcg/dL",
        by_sex(
            &[
                below("low", 60.0, LO),
                between("optimal", 60.0, 120.0, OK),
                above("high", 120.0, HI),
            ],
            &[
                below("low", 45.0, LO),
                between("optimal", 45.0, 80.0, OK),
                above("high", 80.0, HI),
            ],
        ),
        &[MITO],
    ),
    marker(
        "Iron Saturation",
        "%",
        universal(&[
            below("deficiency", 15.0, LO),
            below("low", 22.0, LO),
            between("optimal", 22.0, 56.0, OK),
            above("high", 56.0, HI),
        ]),
        &[MITO],
    ),
    marker(
        "Unsaturated Iron Binding Capacity (UIBC)",
        "mcg/dL",
        universal(&[
            below("low", 100.0, LO),
            between("optimal", 100.0, 300.0, OK),
            above("high", 300.0, HI),
        ]),
        &[MITO],
    ),
    marker(
        "25-(OH) Vitamin D",
        "ng/mL",
        universal(&[
            below("deficiency", 20.0, LO),
            below("insufficient", 30.0, LO),
            between("sufficient", 30.0, 50.0, OK),
            between("optimal", 50.0, 80.0, OK),
            between("high", 80.0, 100.0, HI),
            above("excess", 100.0, HI),
        ]),
        &[IMM, HRM],
    ),
    marker(
        "Vitamin B12",
        "pg/mL",
        universal(&[
            below("deficiency", 200.0, LO),
            below("low", 400.0, LO),
            between("optimal", 400.0, 1000.0, OK),
            above("high", 1000.0, HI),
        ]),
        &[MITO, COG],
    ),
    marker(
        "Folate",
        "ng/mL",
        universal(&[
            below("deficiency", 3.0, LO),
            below("low", 10.0, LO),
            between("optimal", 10.0, 20.0, OK),
            above("high", 20.0, HI),
        ]),
        &[MITO, COG],
    ),
    marker(
        "Magnesium RBC",
        "mg/dL",
        universal(&[
            below("deficiency", 4.2, LO),
            below("low", 5.5, LO),
            between("optimal", 5.5, 6.6, OK),
            above("high", 6.6, HI),
        ]),
        &[STR, MITO],
    ),
    // Metabolic panel
    marker(
        "Albumin",
        "g/dL",
        universal(&[
            below("very_low", 3.0, LO),
            below("low", 3.9, LO),
            between("optimal", 3.9, 5.0, OK),
            above("high", 5.0, HI),
        ]),
        &[GA],
    ),
    marker(
        "Total Protein",
        "g/dL",
        universal(&[
            below("low", 6.0, LO),
            between("normal", 6.0, 6.9, OK),
            between("optimal", 6.9, 7.4, OK),
            between("high_normal", 7.4, 8.3, HI),
            above("high", 8.3, HI),
        ]),
        &[GA],
    ),
    marker(
        "Blood Urea Nitrogen",
        "mg/dL",
        universal(&[
            below("low", 8.0, LO),
            between("optimal", 8.0, 21.0, OK),
            between("high", 21.0, 40.0, HI),
            above("very_high", 40.0, HI),
        ]),
        &[DTX],
    ),
    marker(
        "Creatinine",
        "mg/dL",
        by_sex(
            &[
                below("low", 0.70, LO),
                between("optimal", 0.70, 1.30, OK),
                between("high", 1.30, 2.0, HI),
                above("very_high", 2.0, HI),
            ],
            &[
                below("low", 0.50, LO),
                between("optimal", 0.50, 1.10, OK),
                between("high", 1.10, 1.8, HI),
                above("very_high", 1.8, HI),
            ],
        ),
        &[DTX],
    ),
    marker(
        "eGFR",
        "mL/min/1.73m²",
        universal(&[
            below("critical", 15.0, LO),
            below("very_low", 45.0, LO),
            below("low", 60.0, LO),
            between("normal", 60.0, 90.0, OK),
            above("optimal", 90.0, OK),
        ]),
        &[DTX],
    ),
    marker(
        "BUN:Creatinine Ratio",
        "ratio",
        universal(&[
            below("low", 10.0, LO),
            between("optimal", 10.0, 20.0, OK),
            above("high", 20.0, HI),
        ]),
        &[DTX],
    ),
    marker(
        "Sodium",
        "mmol/L",
        universal(&[
            below("critical", 125.0, LO),
            below("low", 135.0, LO),
            between("normal", 135.0, 140.0, OK),
            between("optimal", 140.0, 146.0, OK),
            between("high", 146.0, 155.0, HI),
            above("critical", 155.0, HI),
        ]),
        &[STR],
    ),
    marker(
        "Potassium",
        "mmol/L",
        universal(&[
            below("critical", 2.5, LO),
            below("low", 4.0, LO),
            between("optimal", 4.0, 5.1, OK),
            between("high", 5.1, 6.0, HI),
            above("critical", 6.0, HI),
        ]),
        &[STR],
    ),
    marker(
        "CO2",
        "mmol/L",
        universal(&[
            below("low", 22.0, LO),
            between("normal", 22.0, 25.0, OK),
            between("optimal", 25.0, 29.0, OK),
            above("high", 29.0, HI),
        ]),
        &[MITO],
    ),
    marker(
        "Calcium",
        "mg/dL",
        universal(&[
            below("very_low", 7.5, LO),
            below("low", 8.8, LO),
            between("optimal", 8.8, 9.6, OK),
            between("high_normal", 9.6, 10.3, HI),
            between("high", 10.3, 12.0, HI),
            above("critical", 12.0, HI),
        ]),
        &[HRM],
    ),
    // Liver
    marker(
        "Alanine Aminotransferase",
        "U/L",
        universal(&[
            below("optimal", 25.0, OK),
            between("normal", 25.0, 40.0, OK),
            between("elevated", 40.0, 120.0, HI),
            above("very_high", 120.0, HI),
        ]),
        &[DTX],
    ),
    marker(
        "Aspartate Aminotransferase",
        "U/L",
        universal(&[
            below("optimal", 25.0, OK),
            between("normal", 25.0, 40.0, OK),
            between("elevated", 40.0, 120.0, HI),
            above("very_high", 120.0, HI),
        ]),
        &[DTX],
    ),
    marker(
        "AST:ALT Ratio",
        "ratio",
        universal(&[
            below("low", 1.0, LO),
            between("optimal", 1.0, 2.0, OK),
            above("high", 2.0, HI),
        ]),
        &[DTX],
    ),
    marker(
        "GGT",
        "U/L",
        universal(&[
            below("optimal", 15.0, OK),
            between("normal", 15.0, 40.0, OK),
            between("elevated", 40.0, 100.0, HI),
            above("very_high", 100.0, HI),
        ]),
        &[DTX],
    ),
    marker(
        "Alkaline Phosphatase (ALP)",
        "IU/L",
        by_sex(
            &[
                below("low", 40.0, LO),
                between("optimal", 40.0, 116.0, OK),
                above("high", 116.0, HI),
            ],
            &[
                below("low", 35.0, LO),
                between("optimal", 35.0, 104.0, OK),
                above("high", 104.0, HI),
            ],
        ),
        &[DTX],
    ),
    marker(
        "Bilirubin",
        "mg/dL",
        universal(&[
            below("low_normal", 0.3, LO),
            between("optimal", 0.3, 1.2, OK),
            between("borderline", 1.2, 2.5, HI),
            above("high", 2.5, HI),
        ]),
        &[DTX],
    ),
    // Complete blood count
    marker(
        "WBC",
        "K/uL",
        universal(&[
            below("very_low", 3.0, LO),
            below("low", 4.0, LO),
            between("normal", 4.0, 5.0, OK),
            between("optimal", 5.0, 7.1, OK),
            between("normal", 7.1, 10.5, OK),
            between("high", 10.5, 15.0, HI),
            above("very_high", 15.0, HI),
        ]),
        &[IMM],
    ),
    marker(
        "RBC",
        "M/uL",
        universal(&[
            below("low", 4.0, LO),
            between("optimal", 4.0, 5.5, OK),
            above("high", 5.5, HI),
        ]),
        &[MITO],
    ),
    marker(
        "Hemoglobin",
        "g/dL",
        by_sex(
            &[
                below("very_low", 10.0, LO),
                below("low", 13.5, LO),
                between("optimal", 13.5, 17.0, OK),
                above("high", 17.0, HI),
            ],
            &[
                below("very_low", 9.0, LO),
                below("low", 12.0, LO),
                between("optimal", 12.0, 15.5, OK),
                above("high", 15.5, HI),
            ],
        ),
        &[MITO],
    ),
    marker(
        "Hematocrit",
        "%",
        by_sex(
            &[
                below("low", 40.0, LO),
                between("optimal", 40.0, 50.0, OK),
                above("high", 50.0, HI),
            ],
            &[
                below("low", 36.0, LO),
                between("optimal", 36.0, 46.0, OK),
                above("high", 46.0, HI),
            ],
        ),
        &[MITO],
    ),
    marker(
        "MCV",
        "fL",
        universal(&[
            below("low", 80.0, LO),
            between("optimal", 80.0, 96.0, OK),
            between("high", 96.0, 100.0, HI),
            above("very_high", 100.0, HI),
        ]),
        &[MITO],
    ),
    marker(
        "MCH",
        "pg",
        universal(&[
            below("low", 27.0, LO),
            between("optimal", 27.0, 33.0, OK),
            above("high", 33.0, HI),
        ]),
        &[MITO],
    ),
    marker(
        "MCHC",
        "g/dL",
        universal(&[
            below("low", 32.0, LO),
            between("optimal", 32.0, 36.0, OK),
            above("high", 36.0, HI),
        ]),
        &[MITO],
    ),
    marker(
        "RDW",
        "%",
        universal(&[
            below("optimal", 13.0, OK),
            between("normal", 13.0, 14.6, OK),
            above("high", 14.6, HI),
        ]),
        &[MITO],
    ),
    marker(
        "Platelets",
        "K/uL",
        universal(&[
            below("critical", 50.0, LO),
            below("low", 150.0, LO),
            between("optimal", 150.0, 400.0, OK),
            between("high", 400.0, 600.0, HI),
            above("very_high", 600.0, HI),
        ]),
        &[IMM],
    ),
    marker(
        "Neutro:Lymph Ratio",
        "ratio",
        universal(&[
            below("optimal", 2.0, OK),
            between("normal", 2.0, 3.0, OK),
            between("high", 3.0, 6.0, HI),
            above("very_high", 6.0, HI),
        ]),
        &[IMM, STR],
    ),
    marker(
        "Monocytes %",
        "%",
        universal(&[below("optimal", 7.0, OK), above("high", 7.0, HI)]),
        &[IMM],
    ),
    marker(
        "Eosinophils %",
        "%",
        universal(&[
            below("optimal", 3.0, OK),
            between("elevated", 3.0, 8.0, HI),
            above("very_high", 8.0, HI),
        ]),
        &[IMM, GA],
    ),
    marker(
        "Basophils %",
        "%",
        universal(&[below("optimal", 1.0, OK), above("high", 1.0, HI)]),
        &[IMM],
    ),
];

static SPEC_INDEX: OnceLock<HashMap<&'static str, &'static BiomarkerSpec>> = OnceLock::new();

/// Reference spec for a canonical biomarker name.
pub fn spec_for(name: &str) -> Option<&'static BiomarkerSpec> {
    SPEC_INDEX
        .get_or_init(|| BIOMARKERS.iter().map(|spec| (spec.name, spec)).collect())
        .get(name)
        .copied()
}

pub fn all_specs() -> &'static [BiomarkerSpec] {
    BIOMARKERS
}
