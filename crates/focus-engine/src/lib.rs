//! Rule-based health intake scoring.
//!
//! Two independent pipelines share this crate:
//!
//! * [`biomarkers`] classifies blood-panel readings against sex- and age-specific
//!   reference ranges and reports flagged markers with a severity tier.
//! * [`rulesets`] score free-text and structured intake answers into partial
//!   [`FocusVector`]s over nine clinical focus areas, which [`aggregate`] folds
//!   into one profile.
//!
//! [`intake::IntakeScorer`] wires both together for a whole submission.

pub mod aggregate;
pub mod biomarkers;
pub mod config;
pub mod demographics;
pub mod error;
pub mod focus;
pub mod intake;
pub mod lexical;
pub mod rulesets;
pub mod telemetry;

pub use aggregate::{Aggregator, CompiledFocusAreas};
pub use biomarkers::{BiomarkerEvaluation, BiomarkerEvaluator, BloodReport};
pub use demographics::{Demographics, Sex};
pub use error::AppError;
pub use focus::{FocusArea, FocusVector};
pub use intake::{IntakeReport, IntakeScorer, IntakeSubmission};
pub use rulesets::{IntakeField, RulesetRegistry, RulesetResult};

use config::ScoringConfig;

/// Builds the standard scorer from scoring configuration.
pub fn scorer_from_config(config: &ScoringConfig) -> IntakeScorer {
    let registry = RulesetRegistry::standard(&config.lexical_engine());
    let aggregator = Aggregator::new().with_biomarker_fold(config.fold_biomarkers);
    IntakeScorer::new(registry, aggregator).with_reference_date(config.reference_date)
}
