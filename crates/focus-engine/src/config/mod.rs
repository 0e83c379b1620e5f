use crate::lexical::{LexicalEngine, MatchStrategy};
use chrono::NaiveDate;
use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub scoring: ScoringConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let matcher = MatcherKind::parse(
            &env::var("SCORING_MATCHER").unwrap_or_else(|_| "lemma".to_string()),
        )?;
        let fuzzy = parse_bool("SCORING_FUZZY", true)?;
        let fuzzy_threshold = env::var("SCORING_FUZZY_THRESHOLD")
            .unwrap_or_else(|_| "85".to_string())
            .parse::<f64>()
            .ok()
            .filter(|value| (0.0..=100.0).contains(value))
            .ok_or(ConfigError::InvalidFuzzyThreshold)?;
        let reference_date = match env::var("SCORING_REFERENCE_DATE") {
            Ok(value) if !value.trim().is_empty() => Some(
                NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                    .map_err(|source| ConfigError::InvalidReferenceDate { value, source })?,
            ),
            _ => None,
        };
        let fold_biomarkers = parse_bool("SCORING_BIOMARKER_FOLD", false)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            scoring: ScoringConfig {
                matcher,
                fuzzy,
                fuzzy_threshold,
                reference_date,
                fold_biomarkers,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_bool(variable: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Ok(value) = env::var(variable) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { variable }),
    }
}

/// Keyphrase matching backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherKind {
    /// Lemma folding with fuzzy fallback.
    Lemma,
    /// Substring containment with fuzzy fallback.
    Fuzzy,
    /// Substring containment only.
    Substring,
}

impl MatcherKind {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lemma" | "lemmatizer" => Ok(Self::Lemma),
            "fuzzy" => Ok(Self::Fuzzy),
            "substring" | "plain" => Ok(Self::Substring),
            _ => Err(ConfigError::InvalidMatcher {
                value: value.to_string(),
            }),
        }
    }
}

/// Matcher and scoring controls.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub matcher: MatcherKind,
    pub fuzzy: bool,
    pub fuzzy_threshold: f64,
    /// "Today" for temporal parsing; `None` uses the local date.
    pub reference_date: Option<NaiveDate>,
    pub fold_biomarkers: bool,
}

impl ScoringConfig {
    pub fn lexical_engine(&self) -> LexicalEngine {
        let strategy = match self.matcher {
            MatcherKind::Lemma => MatchStrategy::lemma(),
            MatcherKind::Fuzzy => MatchStrategy::fuzzy(),
            MatcherKind::Substring => MatchStrategy::substring(),
        };
        let strategy = if self.fuzzy {
            strategy
        } else {
            strategy.without_fuzzy()
        };
        LexicalEngine::new(strategy, self.fuzzy_threshold)
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidMatcher { value: String },
    InvalidFlag { variable: &'static str },
    InvalidFuzzyThreshold,
    InvalidReferenceDate {
        value: String,
        source: chrono::ParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidMatcher { value } => write!(
                f,
                "SCORING_MATCHER must be lemma, fuzzy or substring, got '{value}'"
            ),
            ConfigError::InvalidFlag { variable } => {
                write!(f, "{variable} must be true or false")
            }
            ConfigError::InvalidFuzzyThreshold => {
                write!(f, "SCORING_FUZZY_THRESHOLD must be a number between 0 and 100")
            }
            ConfigError::InvalidReferenceDate { value, .. } => {
                write!(f, "SCORING_REFERENCE_DATE must be YYYY-MM-DD, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidReferenceDate { source, .. } => Some(source),
            ConfigError::InvalidMatcher { .. }
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidFuzzyThreshold => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for variable in [
            "APP_ENV",
            "APP_LOG_LEVEL",
            "SCORING_MATCHER",
            "SCORING_FUZZY",
            "SCORING_FUZZY_THRESHOLD",
            "SCORING_REFERENCE_DATE",
            "SCORING_BIOMARKER_FOLD",
        ] {
            env::remove_var(variable);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.scoring.matcher, MatcherKind::Lemma);
        assert!(config.scoring.fuzzy);
        assert_eq!(config.scoring.fuzzy_threshold, 85.0);
        assert_eq!(config.scoring.reference_date, None);
        assert!(!config.scoring.fold_biomarkers);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn reads_scoring_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_MATCHER", "substring");
        env::set_var("SCORING_FUZZY", "off");
        env::set_var("SCORING_REFERENCE_DATE", "2024-06-15");
        env::set_var("SCORING_BIOMARKER_FOLD", "yes");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.scoring.matcher, MatcherKind::Substring);
        assert_eq!(
            config.scoring.reference_date,
            NaiveDate::from_ymd_opt(2024, 6, 15)
        );
        assert!(config.scoring.fold_biomarkers);
        let engine = config.scoring.lexical_engine();
        assert!(!engine.strategy().has_fuzzy());
        assert!(!engine.strategy().has_lemmatizer());
    }

    #[test]
    fn rejects_invalid_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_MATCHER", "neural");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidMatcher { .. })
        ));

        reset_env();
        env::set_var("SCORING_FUZZY_THRESHOLD", "140");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidFuzzyThreshold)
        ));

        reset_env();
        env::set_var("SCORING_REFERENCE_DATE", "15/06/2024");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidReferenceDate { .. })
        ));
        reset_env();
    }
}
