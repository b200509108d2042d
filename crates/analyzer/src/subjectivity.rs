//! Opinion-vs-fact probe.
//!
//! Estimates how much of a text is opinion rather than checkable fact by
//! counting subjectivity cues (belief verbs, evaluative adjectives,
//! intensity adverbs, first-person stance) against total token count. The
//! [0, 1] ratio maps linearly onto [0, 10]. High subjectivity alone is not
//! drama; it is one input dimension.

use std::collections::HashMap;

use crate::sentiment::tokenize;

/// Scale factor applied to the cue-per-token ratio before clamping.
///
/// One cue in a 20-token message reads as substantially subjective; the
/// factor puts that at 0.25 rather than 0.05.
const RATIO_GAIN: f64 = 5.0;

/// Cue strengths in [0, 1].
const CUES: &[(&str, f64)] = &[
    // belief / stance verbs
    ("think", 0.8),
    ("believe", 0.8),
    ("feel", 0.8),
    ("guess", 0.7),
    ("suppose", 0.7),
    ("assume", 0.6),
    ("doubt", 0.7),
    ("hope", 0.6),
    ("prefer", 0.7),
    ("want", 0.5),
    ("wish", 0.6),
    // evaluative adjectives
    ("good", 0.6),
    ("bad", 0.6),
    ("best", 0.8),
    ("worst", 0.8),
    ("better", 0.6),
    ("worse", 0.6),
    ("great", 0.7),
    ("terrible", 0.9),
    ("awful", 0.9),
    ("amazing", 0.9),
    ("ridiculous", 0.9),
    ("absurd", 0.9),
    ("stupid", 0.9),
    ("ugly", 0.8),
    ("elegant", 0.7),
    ("beautiful", 0.8),
    ("horrible", 0.9),
    ("garbage", 0.9),
    ("useless", 0.8),
    ("pointless", 0.8),
    ("wonderful", 0.9),
    ("interesting", 0.6),
    ("important", 0.5),
    ("obvious", 0.7),
    ("odd", 0.6),
    ("weird", 0.7),
    // hedging / certainty adverbs
    ("maybe", 0.7),
    ("perhaps", 0.7),
    ("probably", 0.7),
    ("possibly", 0.7),
    ("apparently", 0.7),
    ("obviously", 0.8),
    ("clearly", 0.7),
    ("surely", 0.8),
    ("definitely", 0.8),
    ("certainly", 0.8),
    ("honestly", 0.8),
    ("frankly", 0.8),
    ("personally", 0.9),
    ("seems", 0.7),
    ("seemingly", 0.7),
    // intensity adverbs
    ("very", 0.5),
    ("really", 0.6),
    ("extremely", 0.7),
    ("totally", 0.7),
    ("completely", 0.6),
    ("absolutely", 0.7),
    ("utterly", 0.8),
    ("incredibly", 0.8),
    // stance nouns
    ("opinion", 0.9),
    ("feeling", 0.8),
    ("impression", 0.8),
    ("preference", 0.8),
];

/// Subjectivity cue probe.
pub struct SubjectivityProbe {
    cues: HashMap<&'static str, f64>,
}

impl SubjectivityProbe {
    /// Builds the probe with the built-in cue lexicon.
    pub fn new() -> Self {
        let mut cues = HashMap::new();
        for (word, strength) in CUES {
            cues.insert(*word, *strength);
        }
        Self { cues }
    }

    /// Opinion-vs-fact ratio in [0, 1].
    pub fn ratio(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }
        let cue_mass: f64 = tokens
            .iter()
            .filter_map(|t| self.cues.get(t.as_str()))
            .sum();
        (cue_mass * RATIO_GAIN / tokens.len() as f64).clamp(0.0, 1.0)
    }

    /// Maps the [0, 1] ratio linearly onto [0, 10].
    ///
    /// Empty or whitespace-only text yields 0, never an error.
    pub fn score_subjectivity(&self, text: &str) -> f64 {
        self.ratio(text) * 10.0
    }

    /// Cue words present in the text, in text order, for evidence.
    pub fn cue_terms(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .into_iter()
            .filter(|t| self.cues.contains_key(t.as_str()))
            .collect()
    }
}

impl Default for SubjectivityProbe {
    fn default() -> Self {
        Self::new()
    }
}
