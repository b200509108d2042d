//! Participant Profiler
//!
//! Folds every MessageScore for an author into a communication profile:
//! running per-dimension averages and a frequency-ranked speech-act
//! breakdown. Profiles are recomputed fresh from the full window on every
//! run; there is no incremental patching to drift out of sync with the
//! data or the catalog version.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::score::{Dimension, MessageScore};

/// Speech-act buckets in severity order, used for deterministic
/// tie-breaking when two buckets occur equally often.
const SPEECH_ACT_SEVERITY: &[&str] = &["accusation", "challenge", "directive", "expressive"];

/// Stonewalling incident count above which an author is flagged.
const DIFFICULT_STONEWALLING: usize = 3;

/// Composite / neutrality cut for the hostile-and-unfair flag.
const DIFFICULT_COMPOSITE: f64 = 6.0;
const DIFFICULT_NEUTRALITY: f64 = 4.0;

/// Accusation share of speech acts above which an author is flagged.
const DIFFICULT_ACCUSATION_SHARE: f64 = 0.20;

/// Communication profile for one author over the analyzed window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    pub author: String,
    pub message_count: usize,
    /// Mean dimension values over the author's messages
    pub dimension_averages: BTreeMap<Dimension, f64>,
    pub avg_composite: f64,
    pub avg_neutrality: f64,
    /// Speech-act buckets the author used, most frequent first
    pub dominant_speech_acts: Vec<String>,
    /// Messages where the stonewalling detector fired on this author
    pub stonewalling_total: usize,
    /// Heuristic flag for persistently hostile or obstructive behavior
    pub is_difficult: bool,
}

/// Builds participant profiles from a run's message scores.
pub fn build_profiles(scores: &[MessageScore]) -> Vec<ParticipantProfile> {
    let mut by_author: BTreeMap<&str, Vec<&MessageScore>> = BTreeMap::new();
    for score in scores {
        by_author.entry(score.author.as_str()).or_default().push(score);
    }

    let mut profiles: Vec<ParticipantProfile> = by_author
        .into_iter()
        .map(|(author, scores)| build_profile(author, &scores))
        .collect();

    profiles.sort_by(|a, b| {
        b.message_count
            .cmp(&a.message_count)
            .then_with(|| a.author.cmp(&b.author))
    });
    profiles
}

fn build_profile(author: &str, scores: &[&MessageScore]) -> ParticipantProfile {
    let n = scores.len() as f64;

    let mut dimension_averages = BTreeMap::new();
    for dimension in Dimension::all() {
        let sum: f64 = scores.iter().map(|s| s.dimension_value(*dimension)).sum();
        dimension_averages.insert(*dimension, sum / n);
    }

    let avg_composite = scores.iter().map(|s| s.composite).sum::<f64>() / n;
    let avg_neutrality = scores.iter().map(|s| s.neutrality).sum::<f64>() / n;

    // Speech-act usage, counted from the evidence the speech-act scorer
    // left behind (labels look like "accusation/blame").
    let mut bucket_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for score in scores {
        for item in score.evidence(Dimension::SpeechAct) {
            let bucket = item.label.split('/').next().unwrap_or("");
            if let Some(known) = SPEECH_ACT_SEVERITY.iter().find(|s| **s == bucket) {
                *bucket_counts.entry(*known).or_insert(0) += 1;
            }
        }
    }

    let total_speech_acts: usize = bucket_counts.values().sum();
    let accusation_share = if total_speech_acts == 0 {
        0.0
    } else {
        *bucket_counts.get("accusation").unwrap_or(&0) as f64 / total_speech_acts as f64
    };

    let mut dominant: Vec<(&str, usize)> = bucket_counts.into_iter().collect();
    dominant.sort_by(|a, b| {
        b.1.cmp(&a.1).then_with(|| {
            let rank = |name: &str| {
                SPEECH_ACT_SEVERITY
                    .iter()
                    .position(|s| *s == name)
                    .unwrap_or(usize::MAX)
            };
            rank(a.0).cmp(&rank(b.0))
        })
    });
    let dominant_speech_acts = dominant.into_iter().map(|(b, _)| b.to_string()).collect();

    let stonewalling_total = scores
        .iter()
        .filter(|s| {
            s.evidence(Dimension::SpecialPattern)
                .iter()
                .any(|e| e.label == "stonewalling")
        })
        .count();

    let is_difficult = stonewalling_total > DIFFICULT_STONEWALLING
        || (avg_composite > DIFFICULT_COMPOSITE && avg_neutrality < DIFFICULT_NEUTRALITY)
        || accusation_share > DIFFICULT_ACCUSATION_SHARE;

    ParticipantProfile {
        author: author.to_string(),
        message_count: scores.len(),
        dimension_averages,
        avg_composite,
        avg_neutrality,
        dominant_speech_acts,
        stonewalling_total,
        is_difficult,
    }
}
