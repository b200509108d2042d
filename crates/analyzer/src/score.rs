//! Score Types
//!
//! Per-message scoring records produced by the dimension scorers and the
//! composite aggregator. All of these are created once and never mutated;
//! a rerun over the same inputs rebuilds them from scratch.

use chrono::{DateTime, Utc};
use comm_events::Source;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The seven linguistic dimensions combined into a composite.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Sentiment,
    Subjectivity,
    FaceThreat,
    SpeechAct,
    ArgumentQuality,
    Fallacy,
    SpecialPattern,
}

impl Dimension {
    /// Returns all dimension variants.
    pub fn all() -> &'static [Dimension] {
        &[
            Dimension::Sentiment,
            Dimension::Subjectivity,
            Dimension::FaceThreat,
            Dimension::SpeechAct,
            Dimension::ArgumentQuality,
            Dimension::Fallacy,
            Dimension::SpecialPattern,
        ]
    }

    /// Returns the snake_case identifier used in persisted records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Sentiment => "sentiment",
            Dimension::Subjectivity => "subjectivity",
            Dimension::FaceThreat => "face_threat",
            Dimension::SpeechAct => "speech_act",
            Dimension::ArgumentQuality => "argument_quality",
            Dimension::Fallacy => "fallacy",
            Dimension::SpecialPattern => "special_pattern",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of supporting evidence behind a dimension value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// What matched (e.g. "ad_hominem/person_attack") or what adjustment
    /// was applied (e.g. "escalation_floor")
    pub label: String,
    /// The matched text or a description of the adjustment
    pub excerpt: String,
}

impl Evidence {
    pub fn new(label: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            excerpt: excerpt.into(),
        }
    }
}

/// Score for one (message, dimension) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    /// Value in [0, 10]
    pub value: f64,
    /// Matched spans and applied adjustments, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Evidence>,
}

impl DimensionScore {
    pub fn new(dimension: Dimension, value: f64, evidence: Vec<Evidence>) -> Self {
        Self {
            dimension,
            value,
            evidence,
        }
    }

    /// A zero score carrying a single explanatory evidence entry.
    pub fn zero(dimension: Dimension, reason: &str) -> Self {
        Self {
            dimension,
            value: 0.0,
            evidence: vec![Evidence::new(reason, "")],
        }
    }
}

/// Clamps a raw value to the 0–10 scale, flagging in evidence when the
/// clamp actually changed it. A silent clamp would hide how far out of
/// range the raw arithmetic landed.
pub fn clamp_to_scale(raw: f64, evidence: &mut Vec<Evidence>) -> f64 {
    let clamped = raw.clamp(0.0, 10.0);
    if (clamped - raw).abs() > f64::EPSILON {
        evidence.push(Evidence::new("clamped", format!("raw value {:.2}", raw)));
    }
    clamped
}

/// Communication-health reading derived from drama and neutrality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Health {
    Toxic,
    HeatedButFair,
    Productive,
    Dismissive,
    Mixed,
}

impl Health {
    /// Buckets a (drama, neutrality) pair.
    pub fn assess(drama: f64, neutrality: f64) -> Self {
        if drama >= 6.0 && neutrality < 5.0 {
            Health::Toxic
        } else if drama >= 5.0 && neutrality >= 5.0 {
            Health::HeatedButFair
        } else if drama < 4.0 && neutrality >= 6.0 {
            Health::Productive
        } else if drama < 4.0 && neutrality < 5.0 {
            Health::Dismissive
        } else {
            Health::Mixed
        }
    }
}

/// Complete scoring record for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageScore {
    pub message_id: String,
    pub thread_id: String,
    pub author: String,
    pub source: Source,
    pub timestamp: DateTime<Utc>,
    /// One entry per dimension, keyed for stable serialization order
    pub dimensions: BTreeMap<Dimension, DimensionScore>,
    /// Weighted composite in [0, 10]
    pub composite: f64,
    /// Inverse-ish companion score in [0, 10]: objectivity + quality
    pub neutrality: f64,
    pub health: Health,
}

impl MessageScore {
    /// Returns the value for a dimension (0 when absent, which only
    /// happens for records from older catalog versions).
    pub fn dimension_value(&self, dimension: Dimension) -> f64 {
        self.dimensions.get(&dimension).map_or(0.0, |d| d.value)
    }

    /// Evidence entries for a dimension.
    pub fn evidence(&self, dimension: Dimension) -> &[Evidence] {
        self.dimensions
            .get(&dimension)
            .map_or(&[], |d| d.evidence.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Dimension::ArgumentQuality).unwrap(),
            r#""argument_quality""#
        );
        assert_eq!(
            serde_json::to_string(&Dimension::SpecialPattern).unwrap(),
            r#""special_pattern""#
        );
    }

    #[test]
    fn health_buckets_match_contract() {
        assert_eq!(Health::assess(7.0, 3.0), Health::Toxic);
        assert_eq!(Health::assess(5.5, 6.0), Health::HeatedButFair);
        assert_eq!(Health::assess(2.0, 7.0), Health::Productive);
        assert_eq!(Health::assess(3.0, 4.0), Health::Dismissive);
        assert_eq!(Health::assess(4.5, 5.5), Health::Mixed);
    }

    #[test]
    fn health_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Health::HeatedButFair).unwrap(),
            r#""heated-but-fair""#
        );
    }

    #[test]
    fn clamp_flags_only_when_changing_value() {
        let mut evidence = Vec::new();
        assert_eq!(clamp_to_scale(4.2, &mut evidence), 4.2);
        assert!(evidence.is_empty());

        assert_eq!(clamp_to_scale(13.7, &mut evidence), 10.0);
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].label, "clamped");
        assert!(evidence[0].excerpt.contains("13.7"));

        assert_eq!(clamp_to_scale(-2.0, &mut evidence), 0.0);
        assert_eq!(evidence.len(), 2);
    }
}
