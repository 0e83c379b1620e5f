use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

pub const NO_REFERENCE_DATA: &str = "no_reference_data";
pub const UNCLASSIFIED: &str = "unclassified";

/// Tier assigned to labels that have no entry in the severity order.
pub const FALLBACK_SEVERITY: u8 = 1;

/// Markers at or above this tier are flagged.
pub const FLAG_THRESHOLD: u8 = 2;

/// Markers at or above this tier count as high priority.
pub const HIGH_PRIORITY_THRESHOLD: u8 = 3;

/// Which side of the healthy range a value falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Healthy,
    Low,
    High,
}

impl Direction {
    /// Keyword heuristic for labels that arrive without an explicit direction.
    pub fn infer(category: &str, severity: u8) -> Self {
        if severity <= FALLBACK_SEVERITY {
            return Direction::Healthy;
        }

        let label = category.trim().to_ascii_lowercase();
        match label.as_str() {
            "prediabetes" | "diabetes" | "insulin_resistant" => return Direction::High,
            "insulin_sensitive" => return Direction::Healthy,
            _ => {}
        }

        const LOW: &[&str] = &["low", "severe", "deficiency", "insufficient"];
        const HIGH: &[&str] = &["high", "critical", "excess", "elevated"];

        if LOW.iter().any(|keyword| label.contains(keyword)) {
            Direction::Low
        } else if HIGH.iter().any(|keyword| label.contains(keyword)) {
            Direction::High
        } else {
            Direction::Healthy
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Direction::Healthy => "healthy",
            Direction::Low => "low",
            Direction::High => "high",
        }
    }
}

static SEVERITY_ORDER: OnceLock<HashMap<&'static str, u8>> = OnceLock::new();

fn severity_order() -> &'static HashMap<&'static str, u8> {
    SEVERITY_ORDER.get_or_init(|| {
        const ORDER: &[(&str, u8)] = &[
            ("optimal", 0),
            ("excellent", 0),
            ("desirable", 0),
            ("healthy", 0),
            ("insulin_sensitive", 0),
            ("normal", 1),
            ("borderline", 1),
            ("sufficient", 1),
            ("low_normal", 1),
            ("high_normal", 1),
            ("low", 2),
            ("high", 2),
            ("elevated", 2),
            ("insufficient", 2),
            ("prediabetes", 2),
            ("insulin_resistant", 2),
            ("very_low", 3),
            ("very_high", 3),
            ("deficiency", 3),
            ("diabetes", 3),
            ("excess", 3),
            ("critical", 4),
            ("severe", 4),
        ];
        ORDER.iter().copied().collect()
    })
}

/// Tier for a category label, or `None` when the label is not in the order.
pub fn severity_of(category: &str) -> Option<u8> {
    severity_order().get(category).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_order_spans_zero_to_four() {
        assert_eq!(severity_of("optimal"), Some(0));
        assert_eq!(severity_of("normal"), Some(1));
        assert_eq!(severity_of("prediabetes"), Some(2));
        assert_eq!(severity_of("very_low"), Some(3));
        assert_eq!(severity_of("critical"), Some(4));
        assert_eq!(severity_of("hrt_optimal"), None);
    }

    #[test]
    fn inferred_direction_uses_overrides_before_keywords() {
        assert_eq!(Direction::infer("insulin_resistant", 2), Direction::High);
        assert_eq!(Direction::infer("very_low", 3), Direction::Low);
        assert_eq!(Direction::infer("elevated", 2), Direction::High);
        assert_eq!(Direction::infer("low", 1), Direction::Healthy);
        assert_eq!(Direction::infer("mystery", 2), Direction::Healthy);
    }
}
