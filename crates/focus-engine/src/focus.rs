//! The nine focus areas and the fixed-width score vector keyed by them.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Physiological domain targeted by the scoring rulesets.
///
/// The set is closed: the two-to-four letter codes are a wire contract consumed by
/// every downstream collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FocusArea {
    #[serde(rename = "CM")]
    Cardiometabolic,
    #[serde(rename = "STR")]
    Stress,
    #[serde(rename = "HRM")]
    Hormonal,
    #[serde(rename = "IMM")]
    Immune,
    #[serde(rename = "SKN")]
    Skin,
    #[serde(rename = "COG")]
    Cognitive,
    #[serde(rename = "MITO")]
    Mitochondrial,
    #[serde(rename = "DTX")]
    Detox,
    #[serde(rename = "GA")]
    Gut,
}

impl FocusArea {
    pub const COUNT: usize = 9;

    pub const ALL: [FocusArea; Self::COUNT] = [
        FocusArea::Cardiometabolic,
        FocusArea::Stress,
        FocusArea::Hormonal,
        FocusArea::Immune,
        FocusArea::Skin,
        FocusArea::Cognitive,
        FocusArea::Mitochondrial,
        FocusArea::Detox,
        FocusArea::Gut,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            FocusArea::Cardiometabolic => "CM",
            FocusArea::Stress => "STR",
            FocusArea::Hormonal => "HRM",
            FocusArea::Immune => "IMM",
            FocusArea::Skin => "SKN",
            FocusArea::Cognitive => "COG",
            FocusArea::Mitochondrial => "MITO",
            FocusArea::Detox => "DTX",
            FocusArea::Gut => "GA",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FocusArea::Cardiometabolic => "Cardiometabolic & Metabolic Health",
            FocusArea::Stress => "Stress-Axis & Nervous System Resilience",
            FocusArea::Hormonal => "Hormonal Health (Transport)",
            FocusArea::Immune => "Immune Function & Inflammation",
            FocusArea::Skin => "Skin & Barrier Function",
            FocusArea::Cognitive => "Cognitive & Mental Health",
            FocusArea::Mitochondrial => "Mitochondrial & Energy Metabolism",
            FocusArea::Detox => "Detoxification & Biotransformation",
            FocusArea::Gut => "Gut Health and Assimilation",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|area| area.code().eq_ignore_ascii_case(code))
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FocusArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Short aliases used by the static weight tables.
pub mod codes {
    pub use super::FocusArea::{
        Cardiometabolic as CM, Cognitive as COG, Detox as DTX, Gut as GA, Hormonal as HRM,
        Immune as IMM, Mitochondrial as MITO, Skin as SKN, Stress as STR,
    };
}

/// Total map from [`FocusArea`] to a score; absent areas read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FocusVector([f64; FocusArea::COUNT]);

impl FocusVector {
    pub const fn zero() -> Self {
        Self([0.0; FocusArea::COUNT])
    }

    pub fn from_weights(weights: &[(FocusArea, f64)]) -> Self {
        let mut vector = Self::zero();
        for (area, weight) in weights {
            vector.add(*area, *weight);
        }
        vector
    }

    pub fn get(&self, area: FocusArea) -> f64 {
        self.0[area.index()]
    }

    pub fn set(&mut self, area: FocusArea, value: f64) {
        self.0[area.index()] = value;
    }

    pub fn add(&mut self, area: FocusArea, value: f64) {
        self.0[area.index()] += value;
    }

    /// Raises `area` to at least `value`.
    pub fn floor_at(&mut self, area: FocusArea, value: f64) {
        let slot = &mut self.0[area.index()];
        if *slot < value {
            *slot = value;
        }
    }

    pub fn add_vector(&mut self, other: &FocusVector) {
        for (slot, value) in self.0.iter_mut().zip(other.0.iter()) {
            *slot += value;
        }
    }

    pub fn scaled(&self, factor: f64) -> FocusVector {
        let mut out = *self;
        for slot in &mut out.0 {
            *slot *= factor;
        }
        out
    }

    /// Adds `bonus` to every area that is currently non-zero.
    pub fn bump_nonzero(&mut self, bonus: f64) {
        for slot in &mut self.0 {
            if *slot != 0.0 {
                *slot += bonus;
            }
        }
    }

    pub fn remove(&mut self, area: FocusArea) {
        self.0[area.index()] = 0.0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (FocusArea, f64)> + '_ {
        FocusArea::ALL.into_iter().map(|area| (area, self.get(area)))
    }

    pub fn nonzero(&self) -> impl Iterator<Item = (FocusArea, f64)> + '_ {
        self.iter().filter(|(_, value)| *value != 0.0)
    }

    pub fn domains(&self) -> Vec<FocusArea> {
        self.nonzero().map(|(area, _)| area).collect()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|value| *value == 0.0)
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl Index<FocusArea> for FocusVector {
    type Output = f64;

    fn index(&self, area: FocusArea) -> &f64 {
        &self.0[area.index()]
    }
}

impl Serialize for FocusVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FocusArea::COUNT))?;
        for (area, value) in self.iter() {
            map.serialize_entry(area.code(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FocusVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VectorVisitor;

        impl<'de> Visitor<'de> for VectorVisitor {
            type Value = FocusVector;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of focus-area codes to scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FocusVector, A::Error> {
                let mut vector = FocusVector::zero();
                while let Some((area, value)) = access.next_entry::<FocusArea, f64>()? {
                    vector.set(area, value);
                }
                Ok(vector)
            }
        }

        deserializer.deserialize_map(VectorVisitor)
    }
}

/// Per-area ceiling bounding one ruleset's influence on the aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainCaps {
    caps: FocusVector,
    signed: bool,
}

impl DomainCaps {
    /// Caps listed areas explicitly; everything else falls back to `default`.
    pub fn new(caps: &[(FocusArea, f64)], default: f64) -> Self {
        let mut vector = FocusVector([default; FocusArea::COUNT]);
        for (area, cap) in caps {
            vector.set(*area, *cap);
        }
        Self {
            caps: vector,
            signed: false,
        }
    }

    pub fn uniform(cap: f64) -> Self {
        Self::new(&[], cap)
    }

    /// Allows negative (relieving) scores, bounded at `-cap`.
    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    pub fn cap(&self, area: FocusArea) -> f64 {
        self.caps.get(area)
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    pub fn apply(&self, scores: &FocusVector) -> FocusVector {
        let mut clipped = FocusVector::zero();
        for (area, value) in scores.iter() {
            let cap = self.cap(area);
            let floor = if self.signed { -cap } else { 0.0 };
            clipped.set(area, value.clamp(floor, cap));
        }
        clipped
    }
}

#[cfg(test)]
mod tests {
    use super::codes::*;
    use super::*;

    #[test]
    fn codes_round_trip_through_lookup() {
        for area in FocusArea::ALL {
            assert_eq!(FocusArea::from_code(area.code()), Some(area));
        }
        assert_eq!(FocusArea::from_code("mito"), Some(MITO));
        assert_eq!(FocusArea::from_code("XYZ"), None);
    }

    #[test]
    fn caps_clip_positive_rulesets_at_zero() {
        let caps = DomainCaps::new(&[(GA, 0.45)], 0.2);
        let mut raw = FocusVector::from_weights(&[(GA, 0.9), (STR, -0.3), (CM, 0.1)]);
        raw.add(CM, 0.05);

        let clipped = caps.apply(&raw);

        assert_eq!(clipped[GA], 0.45);
        assert_eq!(clipped[STR], 0.0);
        assert!((clipped[CM] - 0.15).abs() < 1e-12);
    }

    #[test]
    fn signed_caps_bound_relief_symmetrically() {
        let caps = DomainCaps::new(&[(STR, 0.5)], 0.2).signed();
        let raw = FocusVector::from_weights(&[(STR, -0.9), (IMM, -0.05)]);

        let clipped = caps.apply(&raw);

        assert_eq!(clipped[STR], -0.5);
        assert_eq!(clipped[IMM], -0.05);
    }

    #[test]
    fn vector_serializes_every_code() {
        let vector = FocusVector::from_weights(&[(HRM, 0.25)]);
        let json = serde_json::to_value(vector).expect("vector serializes");

        assert_eq!(json["HRM"], 0.25);
        assert_eq!(json["GA"], 0.0);
        assert_eq!(json.as_object().map(|map| map.len()), Some(FocusArea::COUNT));

        let back: FocusVector = serde_json::from_value(json).expect("vector deserializes");
        assert_eq!(back, vector);
    }
}
