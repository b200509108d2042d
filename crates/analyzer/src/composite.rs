//! Composite weighting.
//!
//! The seven dimension values collapse into one drama score through a
//! fixed, versioned weight table. The table is data, threaded into every
//! call; there is no process-wide "latest weights" state, so two runs with
//! different tables can coexist and reproduce.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::score::{Dimension, DimensionScore};

/// Tolerance for the weights-sum-to-one invariant.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Versioned composite weight table.
///
/// `argument_quality` is the one inverse dimension: its stored value is a
/// quality reading (10 = evidence-rich and acknowledging), so the
/// combination step feeds `10 - value` into the weighted sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeWeights {
    /// Table version, persisted with every score for rerun keying
    pub version: String,
    pub sentiment: f64,
    pub face_threat: f64,
    pub subjectivity: f64,
    pub speech_act: f64,
    pub argument_quality: f64,
    pub fallacy: f64,
    pub special_pattern: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            sentiment: 0.20,
            face_threat: 0.20,
            subjectivity: 0.10,
            speech_act: 0.15,
            argument_quality: 0.10,
            fallacy: 0.15,
            special_pattern: 0.10,
        }
    }
}

impl CompositeWeights {
    /// Weight assigned to a dimension.
    pub fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Sentiment => self.sentiment,
            Dimension::FaceThreat => self.face_threat,
            Dimension::Subjectivity => self.subjectivity,
            Dimension::SpeechAct => self.speech_act,
            Dimension::ArgumentQuality => self.argument_quality,
            Dimension::Fallacy => self.fallacy,
            Dimension::SpecialPattern => self.special_pattern,
        }
    }

    /// Sum over all seven weights.
    pub fn sum(&self) -> f64 {
        Dimension::all().iter().map(|d| self.weight(*d)).sum()
    }

    /// Whether the table satisfies the sum-to-one invariant.
    pub fn is_convex(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_TOLERANCE
            && Dimension::all().iter().all(|d| self.weight(*d) >= 0.0)
    }

    /// Drama contribution of one dimension value on the 0–10 scale.
    fn contribution(dimension: Dimension, value: f64) -> f64 {
        match dimension {
            Dimension::ArgumentQuality => 10.0 - value,
            _ => value,
        }
    }

    /// Collapses a full dimension map into the composite drama score.
    ///
    /// With a convex table and in-range inputs the result is already in
    /// [0, 10]; the final clamp only absorbs float dust.
    pub fn compose(&self, dimensions: &BTreeMap<Dimension, DimensionScore>) -> f64 {
        let total: f64 = Dimension::all()
            .iter()
            .map(|d| {
                let value = dimensions.get(d).map_or(0.0, |s| s.value);
                self.weight(*d) * Self::contribution(*d, value)
            })
            .sum();
        total.clamp(0.0, 10.0)
    }
}

/// Weights for the neutrality companion score.
const NEUTRALITY_OBJECTIVITY: f64 = 0.30;
const NEUTRALITY_QUALITY: f64 = 0.30;
const NEUTRALITY_NON_THREAT: f64 = 0.20;
const NEUTRALITY_LOGIC: f64 = 0.10;
const NEUTRALITY_TONE: f64 = 0.10;

/// Neutrality score in [0, 10]: how objective, evidence-based, and
/// non-threatening a message reads. High drama with high neutrality is a
/// heated-but-fair exchange; high drama with low neutrality is toxic.
pub fn neutrality(dimensions: &BTreeMap<Dimension, DimensionScore>) -> f64 {
    let value = |d: Dimension| dimensions.get(&d).map_or(0.0, |s| s.value);
    let score = (10.0 - value(Dimension::Subjectivity)) * NEUTRALITY_OBJECTIVITY
        + value(Dimension::ArgumentQuality) * NEUTRALITY_QUALITY
        + (10.0 - value(Dimension::FaceThreat)) * NEUTRALITY_NON_THREAT
        + (10.0 - value(Dimension::Fallacy)) * NEUTRALITY_LOGIC
        + (10.0 - value(Dimension::Sentiment)) * NEUTRALITY_TONE;
    score.clamp(0.0, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with(values: &[(Dimension, f64)]) -> BTreeMap<Dimension, DimensionScore> {
        values
            .iter()
            .map(|(d, v)| (*d, DimensionScore::new(*d, *v, Vec::new())))
            .collect()
    }

    fn all_at(value: f64) -> BTreeMap<Dimension, DimensionScore> {
        map_with(
            &Dimension::all()
                .iter()
                .map(|d| (*d, value))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn default_weights_sum_to_one() {
        let weights = CompositeWeights::default();
        assert!((weights.sum() - 1.0).abs() <= WEIGHT_TOLERANCE);
        assert!(weights.is_convex());
    }

    #[test]
    fn perturbed_weights_fail_convexity() {
        let weights = CompositeWeights {
            sentiment: 0.25,
            ..CompositeWeights::default()
        };
        assert!(!weights.is_convex());
    }

    #[test]
    fn composite_of_uniform_drama_inputs() {
        let weights = CompositeWeights::default();
        // All dimensions at max drama: every value 10 except argument
        // quality at 0 (worst quality).
        let mut dimensions = all_at(10.0);
        dimensions.insert(
            Dimension::ArgumentQuality,
            DimensionScore::new(Dimension::ArgumentQuality, 0.0, Vec::new()),
        );
        assert!((weights.compose(&dimensions) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn composite_of_calm_inputs_is_zero() {
        let weights = CompositeWeights::default();
        let mut dimensions = all_at(0.0);
        dimensions.insert(
            Dimension::ArgumentQuality,
            DimensionScore::new(Dimension::ArgumentQuality, 10.0, Vec::new()),
        );
        assert_eq!(weights.compose(&dimensions), 0.0);
    }

    #[test]
    fn argument_quality_is_inverse() {
        let weights = CompositeWeights::default();
        let low_quality = map_with(&[(Dimension::ArgumentQuality, 0.0)]);
        let high_quality = map_with(&[(Dimension::ArgumentQuality, 10.0)]);
        let diff = weights.compose(&low_quality) - weights.compose(&high_quality);
        assert!((diff - 1.0).abs() < 1e-9, "0.10 weight over a 10-point swing");
    }

    #[test]
    fn composite_matches_hand_computation() {
        let weights = CompositeWeights::default();
        let dimensions = map_with(&[
            (Dimension::Sentiment, 6.0),
            (Dimension::Subjectivity, 4.0),
            (Dimension::FaceThreat, 8.0),
            (Dimension::SpeechAct, 9.0),
            (Dimension::ArgumentQuality, 2.0),
            (Dimension::Fallacy, 6.0),
            (Dimension::SpecialPattern, 0.0),
        ]);
        let expected = 6.0 * 0.20 + 8.0 * 0.20 + 4.0 * 0.10 + 9.0 * 0.15 + (10.0 - 2.0) * 0.10
            + 6.0 * 0.15 + 0.0 * 0.10;
        assert!((weights.compose(&dimensions) - expected).abs() < 1e-9);
    }

    #[test]
    fn neutrality_rewards_quality_and_objectivity() {
        let productive = map_with(&[
            (Dimension::Subjectivity, 1.0),
            (Dimension::ArgumentQuality, 9.0),
            (Dimension::FaceThreat, 0.0),
            (Dimension::Fallacy, 0.0),
            (Dimension::Sentiment, 0.0),
        ]);
        let toxic = map_with(&[
            (Dimension::Subjectivity, 9.0),
            (Dimension::ArgumentQuality, 1.0),
            (Dimension::FaceThreat, 8.0),
            (Dimension::Fallacy, 7.0),
            (Dimension::Sentiment, 8.0),
        ]);
        assert!(neutrality(&productive) > 8.0);
        assert!(neutrality(&toxic) < 3.0);
    }

    #[test]
    fn weights_round_trip_through_toml() {
        let weights = CompositeWeights::default();
        let toml = toml::to_string(&weights).unwrap();
        let parsed: CompositeWeights = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, weights);
    }
}
