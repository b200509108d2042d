//! Configuration loading for the analyzer.
//!
//! All policy constants live here as named, overridable fields loaded from
//! a TOML file. Validation runs once at startup and is fatal: a weight
//! table that does not sum to one silently corrupts every downstream
//! score, so it is rejected before anything is scored.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::composite::{CompositeWeights, WEIGHT_TOLERANCE};

/// Complete analyzer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Composite weight table
    pub weights: CompositeWeights,
    /// Speech-act bucket severities
    pub speech_acts: SpeechActWeights,
    /// Scoring thresholds and windows
    pub thresholds: ScoringThresholds,
    /// Report shaping limits
    pub limits: ReportLimits,
}

impl AnalyzerConfig {
    /// Loads configuration from a TOML file and validates it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string and validates it.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, TomlSerializeError> {
        toml::to_string_pretty(self).map_err(TomlSerializeError)
    }

    /// Checks every startup invariant. Violations are fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE || !self.weights.is_convex() {
            return Err(ConfigError::WeightSum { sum });
        }
        let sa = &self.speech_acts;
        if !(sa.accusation > sa.challenge
            && sa.challenge > sa.directive
            && sa.directive > sa.expressive
            && sa.expressive > 0.0)
        {
            return Err(ConfigError::Invalid(
                "speech_acts severities must be ordered accusation > challenge > directive > expressive > 0",
            ));
        }
        for (name, value) in [
            ("thresholds.fallacy_floor", self.thresholds.fallacy_floor),
            ("thresholds.threat_override", self.thresholds.threat_override),
            ("thresholds.alert_cutoff", self.thresholds.alert_cutoff),
        ] {
            if !(0.0..=10.0).contains(&value) {
                return Err(ConfigError::OutOfScale { name, value });
            }
        }
        if self.thresholds.min_tokens == 0 {
            return Err(ConfigError::Invalid("thresholds.min_tokens must be at least 1"));
        }
        if self.thresholds.pile_on_min_authors < 2 {
            return Err(ConfigError::Invalid(
                "thresholds.pile_on_min_authors must be at least 2",
            ));
        }
        if self.thresholds.pile_on_window_secs <= 0 {
            return Err(ConfigError::Invalid(
                "thresholds.pile_on_window_secs must be positive",
            ));
        }
        if self.thresholds.stonewall_min_replies < 2 {
            return Err(ConfigError::Invalid(
                "thresholds.stonewall_min_replies must be at least 2",
            ));
        }
        let peak = self.thresholds.thread_peak_weight;
        if !(0.0..=1.0).contains(&peak) {
            return Err(ConfigError::Invalid(
                "thresholds.thread_peak_weight must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Severity assigned to each speech-act bucket, on the 0–10 scale.
///
/// The ordering accusation > challenge > directive > expressive is a
/// validated invariant, not a convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechActWeights {
    pub accusation: f64,
    pub challenge: f64,
    pub directive: f64,
    pub expressive: f64,
}

impl Default for SpeechActWeights {
    fn default() -> Self {
        Self {
            accusation: 9.0,
            challenge: 7.0,
            directive: 5.0,
            expressive: 3.5,
        }
    }
}

/// Scoring thresholds and detection windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringThresholds {
    /// Messages with fewer tokens skip density-normalized scorers
    pub min_tokens: usize,
    /// Minimum fallacy score once any ad-hominem marker matches
    pub fallacy_floor: f64,
    /// Special-pattern score assigned when a threat marker matches
    pub threat_override: f64,
    /// Distinct negative authors needed for a pile-on
    pub pile_on_min_authors: usize,
    /// Window in which pile-on replies must cluster
    pub pile_on_window_secs: i64,
    /// Negativity probe cutoff for counting a reply as negative
    pub pile_on_negativity_cutoff: f64,
    /// Short dismissive replies from one author needed for stonewalling
    pub stonewall_min_replies: usize,
    /// Maximum token count for a reply to count as stonewalling
    pub stonewall_max_tokens: usize,
    /// Weight on the peak message when scoring a thread (rest on mean)
    pub thread_peak_weight: f64,
    /// Drama alert fires when the 7-day moving average reaches this
    pub alert_cutoff: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            min_tokens: 5,
            fallacy_floor: 6.0,
            threat_override: 9.0,
            pile_on_min_authors: 3,
            pile_on_window_secs: 1800,
            pile_on_negativity_cutoff: 5.0,
            stonewall_min_replies: 2,
            stonewall_max_tokens: 8,
            thread_peak_weight: 0.6,
            alert_cutoff: 8.0,
        }
    }
}

/// Report shaping limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLimits {
    /// Minimum thread drama score for the top-threads report
    pub top_thread_min_score: f64,
    /// Maximum threads in the top-threads report
    pub top_thread_limit: usize,
    /// Maximum evidence excerpts kept per thread record
    pub top_evidence_limit: usize,
    /// Maximum topics in the hot-topics report
    pub hot_topic_limit: usize,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self {
            top_thread_min_score: 4.0,
            top_thread_limit: 10,
            top_evidence_limit: 5,
            hot_topic_limit: 10,
        }
    }
}

/// Errors that can occur during configuration loading or validation.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    Io(std::io::Error),
    /// Error parsing TOML config
    Toml(toml::de::Error),
    /// Composite weights do not sum to 1.0
    WeightSum { sum: f64 },
    /// A 0–10 scale parameter is outside the scale
    OutOfScale { name: &'static str, value: f64 },
    /// A required pattern category has no entries
    MissingCategory(String),
    /// Any other invalid parameter combination
    Invalid(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Toml(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::WeightSum { sum } => write!(
                f,
                "composite weights must sum to 1.0 (within {:e}), got {}",
                WEIGHT_TOLERANCE, sum
            ),
            ConfigError::OutOfScale { name, value } => {
                write!(f, "{} must be on the 0-10 scale, got {}", name, value)
            }
            ConfigError::MissingCategory(category) => {
                write!(f, "pattern catalog has no entries for category `{}`", category)
            }
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Toml(e) => Some(e),
            _ => None,
        }
    }
}

/// Error that can occur during TOML serialization.
#[derive(Debug)]
pub struct TomlSerializeError(pub toml::ser::Error);

impl std::fmt::Display for TomlSerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TOML serialize error: {}", self.0)
    }
}

impl std::error::Error for TomlSerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Drama Analyzer Configuration

[weights]
version = "1.0.0"
sentiment = 0.20
face_threat = 0.20
subjectivity = 0.10
speech_act = 0.15
argument_quality = 0.10   # inverse dimension: high quality lowers drama
fallacy = 0.15
special_pattern = 0.10

[speech_acts]
accusation = 9.0
challenge = 7.0
directive = 5.0
expressive = 3.5

[thresholds]
min_tokens = 5
fallacy_floor = 6.0
threat_override = 9.0
pile_on_min_authors = 3
pile_on_window_secs = 1800
pile_on_negativity_cutoff = 5.0
stonewall_min_replies = 2
stonewall_max_tokens = 8
thread_peak_weight = 0.6
alert_cutoff = 8.0

[limits]
top_thread_min_score = 4.0
top_thread_limit = 10
top_evidence_limit = 5
hot_topic_limit = 10
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.thresholds.min_tokens, 5);
        assert_eq!(config.thresholds.fallacy_floor, 6.0);
        assert_eq!(config.thresholds.threat_override, 9.0);
        assert_eq!(config.limits.top_thread_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config_from_toml() {
        let toml = r#"
            [thresholds]
            min_tokens = 3
            fallacy_floor = 7.0

            [limits]
            top_thread_limit = 5
        "#;

        let config = AnalyzerConfig::from_str(toml).unwrap();

        assert_eq!(config.thresholds.min_tokens, 3);
        assert_eq!(config.thresholds.fallacy_floor, 7.0);
        assert_eq!(config.limits.top_thread_limit, 5);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [thresholds]
            pile_on_min_authors = 4
        "#;

        let config = AnalyzerConfig::from_str(toml).unwrap();

        // Specified value
        assert_eq!(config.thresholds.pile_on_min_authors, 4);
        // Default values
        assert_eq!(config.thresholds.min_tokens, 5);
        assert_eq!(config.weights.sentiment, 0.20);
    }

    #[test]
    fn test_bad_weight_sum_is_fatal() {
        let toml = r#"
            [weights]
            sentiment = 0.50
        "#;

        match AnalyzerConfig::from_str(toml) {
            Err(ConfigError::WeightSum { sum }) => {
                assert!((sum - 1.30).abs() < 1e-9);
            }
            other => panic!("expected WeightSum error, got {:?}", other),
        }
    }

    #[test]
    fn test_speech_act_ordering_is_enforced() {
        let toml = r#"
            [speech_acts]
            challenge = 9.5
        "#;

        assert!(matches!(
            AnalyzerConfig::from_str(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_out_of_scale_threshold_rejected() {
        let toml = r#"
            [thresholds]
            threat_override = 12.0
        "#;

        assert!(matches!(
            AnalyzerConfig::from_str(toml),
            Err(ConfigError::OutOfScale { name: "thresholds.threat_override", .. })
        ));
    }

    #[test]
    fn test_default_config_toml_parses() {
        let toml = default_config_toml();
        let config = AnalyzerConfig::from_str(&toml).unwrap();

        assert_eq!(config.thresholds.min_tokens, 5);
        assert_eq!(config.weights.special_pattern, 0.10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_to_toml_round_trips() {
        let config = AnalyzerConfig::default();
        let toml = config.to_toml().unwrap();
        let parsed = AnalyzerConfig::from_str(&toml).unwrap();
        assert_eq!(parsed.thresholds, config.thresholds);
        assert_eq!(parsed.weights, config.weights);
    }
}
