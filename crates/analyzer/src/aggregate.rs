//! Thread and daily aggregation.
//!
//! Message composites roll up in two directions: per thread (peak-weighted,
//! so one inflammatory message dominates without fully defining a thread)
//! and per calendar day (per-source means, an overall mean across sources
//! with data, and a trailing 7-day moving average). Days and sources with
//! no data are represented by absence, never by a zero: a consumer must be
//! able to tell "no drama" from "no data".

use chrono::{Duration, NaiveDate};
use comm_events::{Source, ThreadMeta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::AnalyzerConfig;
use crate::score::{Evidence, Health, MessageScore};

/// Days covered by the moving-average window, including the day itself.
const MOVING_AVERAGE_WINDOW_DAYS: i64 = 7;

/// Aggregate score for one discussion thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadScore {
    pub id: String,
    pub title: String,
    pub source: Source,
    /// Authors in order of first appearance
    pub participants: Vec<String>,
    pub ack_count: u32,
    pub nack_count: u32,
    /// Peak-weighted combination of the thread's message composites
    pub drama_score: f64,
    pub message_count: usize,
    pub max_message_score: f64,
    pub mean_message_score: f64,
    pub health: Health,
    /// Excerpts from the highest-scoring messages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_evidence: Vec<Evidence>,
}

/// Aggregate scores for one calendar day with data.
///
/// `overall` is the 7-day moving average, matching the published contract;
/// the instantaneous value lives in `raw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyScore {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bips: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailing_list: Option<f64>,
    /// 7-day moving average of the raw overall values
    pub overall: f64,
    /// Same-day overall value
    pub raw: f64,
    /// How many days fed the moving average; below 7 is the ramp-up regime
    pub days_in_average: usize,
    /// Moving average now minus moving average exactly one week ago
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_delta: Option<f64>,
    /// Whether the moving average crossed the alert cutoff
    pub alert: bool,
}

impl DailyScore {
    /// Per-source value by source tag.
    pub fn source_score(&self, source: Source) -> Option<f64> {
        match source {
            Source::GitHub => self.github,
            Source::Bips => self.bips,
            Source::Irc => self.irc,
            Source::MailingList => self.mailing_list,
        }
    }
}

/// Rolls message scores up into thread and daily aggregates.
pub struct Aggregator<'a> {
    config: &'a AnalyzerConfig,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Peak-weighted combination: `peak_weight * max + (1 - peak_weight) *
    /// mean` over a group of message composites.
    fn combine(&self, composites: &[f64]) -> f64 {
        if composites.is_empty() {
            return 0.0;
        }
        let max = composites.iter().cloned().fold(f64::MIN, f64::max);
        let mean = composites.iter().sum::<f64>() / composites.len() as f64;
        let peak = self.config.thresholds.thread_peak_weight;
        peak * max + (1.0 - peak) * mean
    }

    /// Scores one thread from its message scores.
    ///
    /// `scores` must all belong to the thread; order does not matter.
    pub fn thread_score(&self, meta: &ThreadMeta, scores: &[&MessageScore]) -> ThreadScore {
        let composites: Vec<f64> = scores.iter().map(|s| s.composite).collect();
        let drama_score = self.combine(&composites);
        let max = composites.iter().cloned().fold(0.0, f64::max);
        let mean = if composites.is_empty() {
            0.0
        } else {
            composites.iter().sum::<f64>() / composites.len() as f64
        };

        let participants = if meta.participants.is_empty() {
            let mut seen = Vec::new();
            let mut ordered: Vec<&&MessageScore> = scores.iter().collect();
            ordered.sort_by_key(|s| s.timestamp);
            for score in ordered {
                if !seen.contains(&score.author) {
                    seen.push(score.author.clone());
                }
            }
            seen
        } else {
            meta.participants.clone()
        };

        let neutrality_mean = if scores.is_empty() {
            5.0
        } else {
            scores.iter().map(|s| s.neutrality).sum::<f64>() / scores.len() as f64
        };

        ThreadScore {
            id: meta.thread_id.clone(),
            title: meta.title.clone(),
            source: meta.source,
            participants,
            ack_count: meta.ack_count,
            nack_count: meta.nack_count,
            drama_score,
            message_count: scores.len(),
            max_message_score: max,
            mean_message_score: mean,
            health: Health::assess(drama_score, neutrality_mean),
            top_evidence: self.top_evidence(scores),
        }
    }

    /// Evidence excerpts from the hottest messages, most dramatic first.
    fn top_evidence(&self, scores: &[&MessageScore]) -> Vec<Evidence> {
        let mut ranked: Vec<&&MessageScore> = scores.iter().collect();
        ranked.sort_by(|a, b| {
            b.composite
                .partial_cmp(&a.composite)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.message_id.cmp(&b.message_id))
        });

        let limit = self.config.limits.top_evidence_limit;
        let mut evidence = Vec::new();
        for score in ranked {
            for dim_score in score.dimensions.values() {
                for item in &dim_score.evidence {
                    if item.excerpt.is_empty() || item.label == "clamped" {
                        continue;
                    }
                    evidence.push(item.clone());
                    if evidence.len() >= limit {
                        return evidence;
                    }
                }
            }
        }
        evidence
    }

    /// Builds one DailyScore per day with data, in date order.
    ///
    /// Within a day, messages group by (source, thread); each group is
    /// combined peak-weighted, per-source values are group means, and the
    /// raw overall is the mean across sources with data that day. A thread
    /// spanning several days contributes to each of them, which keeps the
    /// omission invariant exact: a record exists for precisely the days
    /// that have at least one scored message.
    pub fn daily_scores(&self, scores: &[MessageScore]) -> Vec<DailyScore> {
        // (date, source, thread) -> composites
        let mut groups: BTreeMap<(NaiveDate, Source, &str), Vec<f64>> = BTreeMap::new();
        for score in scores {
            groups
                .entry((score.timestamp.date_naive(), score.source, score.thread_id.as_str()))
                .or_default()
                .push(score.composite);
        }

        // (date, source) -> thread-group scores
        let mut per_source: BTreeMap<(NaiveDate, Source), Vec<f64>> = BTreeMap::new();
        for ((date, source, _), composites) in &groups {
            per_source
                .entry((*date, *source))
                .or_default()
                .push(self.combine(composites));
        }

        // date -> per-source means
        let mut per_day: BTreeMap<NaiveDate, BTreeMap<Source, f64>> = BTreeMap::new();
        for ((date, source), thread_scores) in &per_source {
            let mean = thread_scores.iter().sum::<f64>() / thread_scores.len() as f64;
            per_day.entry(*date).or_default().insert(*source, mean);
        }

        let raw_overall: BTreeMap<NaiveDate, f64> = per_day
            .iter()
            .map(|(date, sources)| {
                let mean = sources.values().sum::<f64>() / sources.len() as f64;
                (*date, mean)
            })
            .collect();

        per_day
            .iter()
            .map(|(date, sources)| {
                let (moving_average, days_in_average) = moving_average(&raw_overall, *date);
                let week_ago = *date - Duration::days(MOVING_AVERAGE_WINDOW_DAYS);
                let week_delta = raw_overall
                    .contains_key(&week_ago)
                    .then(|| moving_average - moving_average_at(&raw_overall, week_ago));

                DailyScore {
                    date: *date,
                    github: sources.get(&Source::GitHub).copied(),
                    bips: sources.get(&Source::Bips).copied(),
                    irc: sources.get(&Source::Irc).copied(),
                    mailing_list: sources.get(&Source::MailingList).copied(),
                    overall: moving_average,
                    raw: raw_overall[date],
                    days_in_average,
                    week_delta,
                    alert: moving_average >= self.config.thresholds.alert_cutoff,
                }
            })
            .collect()
    }
}

/// Mean of the raw overall values over the trailing window of calendar
/// days that have data, and how many days contributed.
///
/// Fewer than 7 available days still average; callers read
/// `days_in_average` to recognize the ramp-up regime.
pub fn moving_average(
    raw_overall: &BTreeMap<NaiveDate, f64>,
    date: NaiveDate,
) -> (f64, usize) {
    let window_start = date - Duration::days(MOVING_AVERAGE_WINDOW_DAYS - 1);
    let window: Vec<f64> = raw_overall
        .range(window_start..=date)
        .map(|(_, v)| *v)
        .collect();
    if window.is_empty() {
        return (0.0, 0);
    }
    (window.iter().sum::<f64>() / window.len() as f64, window.len())
}

fn moving_average_at(raw_overall: &BTreeMap<NaiveDate, f64>, date: NaiveDate) -> f64 {
    moving_average(raw_overall, date).0
}
