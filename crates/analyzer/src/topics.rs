//! Hot topic extraction.
//!
//! Maps thread titles onto a fixed keyword table (topic -> keyword list)
//! and ranks topics by how often they show up and how hot the matching
//! threads run. Adding a topic is a table edit.

use comm_events::Source;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregate::ThreadScore;

/// Topic keyword table. Keywords are matched as substrings of the
/// lowercased thread title, which is the right granularity for titles
/// ("mempool" should catch "cluster mempool relay").
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("taproot", &["taproot", "bip340", "bip341", "bip342", "schnorr"]),
    ("mempool", &["mempool", "rbf", "package relay", "cluster mempool"]),
    ("wallet", &["wallet", "descriptor", "psbt"]),
    ("consensus", &["consensus", "soft fork", "hard fork", "activation"]),
    ("p2p", &["p2p", "peer", "relay", "connection"]),
    ("testing", &["test", "fuzzing", "ci ", "coverage"]),
    ("gui", &["gui", "qt", "interface"]),
    ("rpc", &["rpc", "rest", "api"]),
    ("validation", &["validation", "verify", "check"]),
    ("mining", &["mining", "block template", "getblocktemplate"]),
    ("fees", &["fee", "estimator", "estimation"]),
    ("bip-process", &["bip draft", "bip process", "bips repo"]),
];

/// Fallback topic for threads no keyword catches.
const GENERAL_TOPIC: &str = "general";

/// One ranked topic in the hot-topics report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotTopic {
    pub topic: String,
    /// Mean drama score of the matching threads, on the 0-10 scale
    pub heat_score: f64,
    /// Number of matching threads
    pub mentions: usize,
    /// Source contributing the most matching threads
    pub primary_source: Source,
}

/// Topics present in a thread title.
fn topics_for_title(title: &str) -> Vec<&'static str> {
    let lower = title.to_lowercase();
    let matched: Vec<&'static str> = TOPIC_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(topic, _)| *topic)
        .collect();
    if matched.is_empty() {
        vec![GENERAL_TOPIC]
    } else {
        matched
    }
}

/// Extracts ranked hot topics from a run's thread scores.
pub fn extract_hot_topics(threads: &[ThreadScore], limit: usize) -> Vec<HotTopic> {
    struct Tally {
        drama: Vec<f64>,
        sources: BTreeMap<Source, usize>,
    }

    let mut tallies: BTreeMap<&'static str, Tally> = BTreeMap::new();
    for thread in threads {
        for topic in topics_for_title(&thread.title) {
            let tally = tallies.entry(topic).or_insert_with(|| Tally {
                drama: Vec::new(),
                sources: BTreeMap::new(),
            });
            tally.drama.push(thread.drama_score);
            *tally.sources.entry(thread.source).or_insert(0) += 1;
        }
    }

    let mut topics: Vec<HotTopic> = tallies
        .into_iter()
        .map(|(topic, tally)| {
            let mentions = tally.drama.len();
            let heat_score =
                (tally.drama.iter().sum::<f64>() / mentions as f64).clamp(0.0, 10.0);
            let primary_source = tally
                .sources
                .iter()
                .max_by_key(|(_, count)| *count)
                .map(|(source, _)| *source)
                .expect("tally always has a source");
            HotTopic {
                topic: topic.to_string(),
                heat_score,
                mentions,
                primary_source,
            }
        })
        .collect();

    topics.sort_by(|a, b| {
        b.mentions
            .cmp(&a.mentions)
            .then_with(|| {
                b.heat_score
                    .partial_cmp(&a.heat_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.topic.cmp(&b.topic))
    });
    topics.truncate(limit);
    topics
}
