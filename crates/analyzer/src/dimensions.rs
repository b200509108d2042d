//! Dimension Scorers
//!
//! Seven independent scorers, each reading one message (plus, for the
//! special-pattern dimension, a window of the surrounding thread) and the
//! pattern catalog, each producing a value in [0, 10] with the evidence
//! that produced it. All of them are pure functions of their inputs.

use comm_events::Message;
use std::collections::BTreeMap;

use crate::config::AnalyzerConfig;
use crate::patterns::{PatternCategory, PatternLibrary, PatternMatch};
use crate::score::{clamp_to_scale, Dimension, DimensionScore, Evidence};
use crate::sentiment::{tokenize, SentimentProbe};
use crate::subjectivity::SubjectivityProbe;

/// Gain applied to the face-threat density (weighted matches per 100
/// tokens) before clamping.
const FACE_THREAT_GAIN: f64 = 0.5;

/// Gain applied to the weighted fallacy sum before clamping.
const FALLACY_GAIN: f64 = 1.25;

/// Neutral baseline for the argument-quality dimension: a message with no
/// quality markers either way sits in the middle of the scale.
const NEUTRAL_QUALITY: f64 = 5.0;

/// Base score for a detected pile-on; each author past the threshold adds
/// one point.
const PILE_ON_BASE: f64 = 7.0;

/// Base score for detected stonewalling; each reply past the threshold
/// adds one point.
const STONEWALL_BASE: f64 = 6.0;

/// Evidence label used when a scorer skips a too-short message.
const INSUFFICIENT_SIGNAL: &str = "insufficient_signal";

/// Scores messages across all seven dimensions.
pub struct DimensionScorer<'a> {
    library: &'a PatternLibrary,
    sentiment: SentimentProbe,
    subjectivity: SubjectivityProbe,
    config: &'a AnalyzerConfig,
}

impl<'a> DimensionScorer<'a> {
    pub fn new(library: &'a PatternLibrary, config: &'a AnalyzerConfig) -> Self {
        Self {
            library,
            sentiment: SentimentProbe::new(),
            subjectivity: SubjectivityProbe::new(),
            config,
        }
    }

    /// Scores one message across all dimensions.
    ///
    /// `thread_window` is every message of the same thread, ordered by
    /// timestamp; only the special-pattern dimension reads it.
    pub fn score_message(
        &self,
        message: &Message,
        thread_window: &[&Message],
    ) -> BTreeMap<Dimension, DimensionScore> {
        let mut map = BTreeMap::new();
        map.insert(Dimension::Sentiment, self.score_sentiment(&message.body));
        map.insert(Dimension::Subjectivity, self.score_subjectivity(&message.body));
        map.insert(Dimension::FaceThreat, self.score_face_threat(&message.body));
        map.insert(Dimension::SpeechAct, self.score_speech_act(&message.body));
        map.insert(
            Dimension::ArgumentQuality,
            self.score_argument_quality(&message.body),
        );
        map.insert(Dimension::Fallacy, self.score_fallacy(&message.body));
        map.insert(
            Dimension::SpecialPattern,
            self.score_special_pattern(message, thread_window),
        );
        map
    }

    /// Negativity dimension: the sentiment probe's [0, 10] mapping.
    pub fn score_sentiment(&self, text: &str) -> DimensionScore {
        let polarity = self.sentiment.analyze(text);
        let value = ((-polarity.compound).max(0.0) * 10.0).min(10.0);
        let evidence = polarity
            .negative_terms
            .iter()
            .map(|term| Evidence::new("negative_term", term.clone()))
            .collect();
        DimensionScore::new(Dimension::Sentiment, value, evidence)
    }

    /// Opinion-vs-fact dimension.
    pub fn score_subjectivity(&self, text: &str) -> DimensionScore {
        if tokenize(text).len() < self.config.thresholds.min_tokens {
            return DimensionScore::zero(Dimension::Subjectivity, INSUFFICIENT_SIGNAL);
        }
        let value = self.subjectivity.score_subjectivity(text);
        let evidence = self
            .subjectivity
            .cue_terms(text)
            .into_iter()
            .map(|term| Evidence::new("subjectivity_cue", term))
            .collect();
        DimensionScore::new(Dimension::Subjectivity, value, evidence)
    }

    /// Face-threat dimension: weighted attack density per 100 tokens,
    /// dampened by politeness work.
    pub fn score_face_threat(&self, text: &str) -> DimensionScore {
        let token_count = tokenize(text).len();
        if token_count < self.config.thresholds.min_tokens {
            return DimensionScore::zero(Dimension::FaceThreat, INSUFFICIENT_SIGNAL);
        }

        let threats = self.find_all(
            text,
            &[
                PatternCategory::FaceThreatening,
                PatternCategory::IndirectAggression,
            ],
        );
        let dampeners = self.find_all(
            text,
            &[
                PatternCategory::Hedging,
                PatternCategory::PositivePoliteness,
                PatternCategory::NegativePoliteness,
            ],
        );

        let threat_load: f64 = threats.iter().map(|m| m.weight).sum();
        let damping: f64 = dampeners.iter().map(|m| m.weight).sum();
        let density = (threat_load - damping) * 100.0 / token_count as f64;

        let mut evidence: Vec<Evidence> = threats.iter().map(to_evidence).collect();
        let value = clamp_to_scale(density * FACE_THREAT_GAIN, &mut evidence);
        DimensionScore::new(Dimension::FaceThreat, value, evidence)
    }

    /// Speech-act dimension: severity of the most severe bucket present.
    pub fn score_speech_act(&self, text: &str) -> DimensionScore {
        let severities = &self.config.speech_acts;
        let buckets = [
            (PatternCategory::Accusation, severities.accusation),
            (PatternCategory::Challenge, severities.challenge),
            (PatternCategory::Directive, severities.directive),
            (PatternCategory::Expressive, severities.expressive),
        ];

        let mut value = 0.0f64;
        let mut evidence = Vec::new();
        for (category, severity) in buckets {
            let matches = self.library.find(text, category);
            if !matches.is_empty() {
                value = value.max(severity);
                evidence.extend(matches.iter().map(to_evidence));
            }
        }
        DimensionScore::new(Dimension::SpeechAct, value, evidence)
    }

    /// Argument-quality dimension. Stores quality, not drama: evidence
    /// citations, acknowledgments, and concrete proposals push it up,
    /// dismissals push it down, and the composite inverts it.
    pub fn score_argument_quality(&self, text: &str) -> DimensionScore {
        let positive = self.find_all(
            text,
            &[
                PatternCategory::EvidenceCitation,
                PatternCategory::Acknowledgment,
                PatternCategory::ConstructiveProposal,
            ],
        );
        let negative = self.find_all(text, &[PatternCategory::Dismissive]);

        let lift: f64 = positive.iter().map(|m| m.weight).sum();
        let drag: f64 = negative.iter().map(|m| m.weight).sum();

        let mut evidence: Vec<Evidence> =
            positive.iter().chain(negative.iter()).map(to_evidence).collect();
        let value = clamp_to_scale(NEUTRAL_QUALITY + lift - drag, &mut evidence);
        DimensionScore::new(Dimension::ArgumentQuality, value, evidence)
    }

    /// Fallacy dimension: weighted category matches with the ad-hominem
    /// escalation floor. Runs regardless of message length; "you're an
    /// idiot" is three tokens and still a strong signal.
    pub fn score_fallacy(&self, text: &str) -> DimensionScore {
        let matches = self.find_all(
            text,
            &[
                PatternCategory::AdHominem,
                PatternCategory::Strawman,
                PatternCategory::MovingGoalposts,
                PatternCategory::AppealToAuthority,
                PatternCategory::Whataboutism,
            ],
        );

        let weighted_sum: f64 = matches.iter().map(|m| m.weight).sum();
        let has_ad_hominem = matches
            .iter()
            .any(|m| m.category == PatternCategory::AdHominem);

        let mut evidence: Vec<Evidence> = matches.iter().map(to_evidence).collect();
        let mut value = clamp_to_scale(weighted_sum * FALLACY_GAIN, &mut evidence);

        let floor = self.config.thresholds.fallacy_floor;
        if has_ad_hominem && value < floor {
            evidence.push(Evidence::new(
                "escalation_floor",
                format!("ad hominem present, raised {:.2} to {:.2}", value, floor),
            ));
            value = floor;
        }
        DimensionScore::new(Dimension::Fallacy, value, evidence)
    }

    /// Special-pattern dimension: max of the three thread-level detectors.
    pub fn score_special_pattern(
        &self,
        message: &Message,
        thread_window: &[&Message],
    ) -> DimensionScore {
        let mut value = 0.0f64;
        let mut evidence = Vec::new();

        // Threat markers: hard escalation, never a weighted blend.
        let threats = self.library.find(&message.body, PatternCategory::ThreatMarker);
        if !threats.is_empty() {
            evidence.extend(threats.iter().map(to_evidence));
            evidence.push(Evidence::new(
                "threat_override",
                format!("score forced to {:.1}", self.config.thresholds.threat_override),
            ));
            value = value.max(self.config.thresholds.threat_override);
        }

        if let Some((authors, pile_on_score)) = self.detect_pile_on(message, thread_window) {
            evidence.push(Evidence::new(
                "pile_on",
                format!(
                    "{} distinct authors negative within {}s",
                    authors, self.config.thresholds.pile_on_window_secs
                ),
            ));
            value = value.max(pile_on_score);
        }

        if let Some((replies, stonewall_score)) = self.detect_stonewalling(message, thread_window) {
            evidence.push(Evidence::new(
                "stonewalling",
                format!("{} short dismissive replies from {}", replies, message.author),
            ));
            value = value.max(stonewall_score);
        }

        DimensionScore::new(Dimension::SpecialPattern, value, evidence)
    }

    /// Pile-on: enough distinct authors posting negatively in the same
    /// thread within the configured window ending at this message.
    fn detect_pile_on(
        &self,
        message: &Message,
        thread_window: &[&Message],
    ) -> Option<(usize, f64)> {
        let thresholds = &self.config.thresholds;
        let window_start =
            message.timestamp - chrono::Duration::seconds(thresholds.pile_on_window_secs);

        let mut negative_authors: Vec<&str> = thread_window
            .iter()
            .filter(|m| m.timestamp >= window_start && m.timestamp <= message.timestamp)
            .filter(|m| self.is_negative_reply(&m.body))
            .map(|m| m.author.as_str())
            .collect();
        negative_authors.sort_unstable();
        negative_authors.dedup();

        let count = negative_authors.len();
        if count < thresholds.pile_on_min_authors {
            return None;
        }
        let overflow = (count - thresholds.pile_on_min_authors) as f64;
        Some((count, (PILE_ON_BASE + overflow).min(10.0)))
    }

    /// Stonewalling: the message's author repeatedly answering the thread
    /// with short, dismissive, content-free replies.
    fn detect_stonewalling(
        &self,
        message: &Message,
        thread_window: &[&Message],
    ) -> Option<(usize, f64)> {
        let thresholds = &self.config.thresholds;
        let replies = thread_window
            .iter()
            .filter(|m| m.author == message.author)
            .filter(|m| tokenize(&m.body).len() <= thresholds.stonewall_max_tokens)
            .filter(|m| {
                !self
                    .library
                    .find(&m.body, PatternCategory::StonewallingMarker)
                    .is_empty()
            })
            .count();

        if replies < thresholds.stonewall_min_replies {
            return None;
        }
        let overflow = (replies - thresholds.stonewall_min_replies) as f64;
        Some((replies, (STONEWALL_BASE + overflow).min(10.0)))
    }

    /// A reply counts as negative for pile-on purposes when it carries an
    /// explicit rejection marker or the negativity probe reads it hot.
    /// The composite score is deliberately not consulted here; the
    /// special-pattern dimension cannot depend on its own output.
    fn is_negative_reply(&self, text: &str) -> bool {
        !self.library.find(text, PatternCategory::PileOnMarker).is_empty()
            || self.sentiment.score_negativity(text)
                > self.config.thresholds.pile_on_negativity_cutoff
    }

    fn find_all(&self, text: &str, categories: &[PatternCategory]) -> Vec<PatternMatch> {
        let mut matches: Vec<PatternMatch> = categories
            .iter()
            .flat_map(|c| self.library.find(text, *c))
            .collect();
        matches.sort_by_key(|m| m.span);
        matches
    }
}

fn to_evidence(m: &PatternMatch) -> Evidence {
    Evidence::new(
        format!("{}/{}", m.category, m.subcategory),
        m.excerpt.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use comm_events::Source;

    fn make_message(id: &str, author: &str, body: &str, minute: i64) -> Message {
        Message {
            id: id.to_string(),
            thread_id: "t-1".to_string(),
            author: author.to_string(),
            source: Source::GitHub,
            body: body.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 2, 18, 0, 0).unwrap()
                + Duration::minutes(minute),
        }
    }

    fn scorer_fixture() -> (PatternLibrary, AnalyzerConfig) {
        (PatternLibrary::new(), AnalyzerConfig::default())
    }

    const SAMPLE_TEXTS: &[&str] = &[
        "",
        "ok",
        "Thanks for the detailed writeup, I've attached benchmark data supporting this change.",
        "This proposal is garbage and you clearly don't understand Bitcoin, idiot",
        "NACK. If this merges I'll fork the project.",
        "I think maybe we could consider an alternative approach here?",
        "you're wrong you're wrong you're wrong you're wrong you're wrong",
        "Already discussed. Not worth my time. I'm done.",
        "According to the benchmarks in PR 28421, this is 3x faster.",
    ];

    #[test]
    fn every_dimension_stays_in_range_over_corpus() {
        let (library, config) = scorer_fixture();
        let scorer = DimensionScorer::new(&library, &config);
        for (i, text) in SAMPLE_TEXTS.iter().enumerate() {
            let message = make_message(&format!("m-{}", i), "author", text, i as i64);
            let scores = scorer.score_message(&message, &[&message]);
            assert_eq!(scores.len(), Dimension::all().len());
            for (dimension, score) in &scores {
                assert!(
                    (0.0..=10.0).contains(&score.value),
                    "dimension {} out of range for {:?}: {}",
                    dimension,
                    text,
                    score.value
                );
                assert!(!score.value.is_nan());
            }
        }
    }

    #[test]
    fn scoring_is_bit_identical_across_runs() {
        let (library, config) = scorer_fixture();
        let scorer = DimensionScorer::new(&library, &config);
        let message = make_message(
            "m-1",
            "carol",
            "This is ridiculous, you never test anything. NACK.",
            0,
        );
        let first = scorer.score_message(&message, &[&message]);
        let second = scorer.score_message(&message, &[&message]);
        assert_eq!(first, second);
    }

    #[test]
    fn ad_hominem_forces_fallacy_floor_regardless_of_length() {
        let (library, config) = scorer_fixture();
        let scorer = DimensionScorer::new(&library, &config);

        // A single weak marker would land below the floor on weight alone.
        let score = scorer.score_fallacy("coming from you.");
        assert!(
            score.value >= config.thresholds.fallacy_floor,
            "got {}",
            score.value
        );
        assert!(score.evidence.iter().any(|e| e.label == "escalation_floor"));

        let insult = scorer.score_fallacy("you're an idiot");
        assert!(insult.value >= config.thresholds.fallacy_floor);
    }

    #[test]
    fn heavy_fallacy_text_exceeds_floor_without_flag() {
        let (library, config) = scorer_fixture();
        let scorer = DimensionScorer::new(&library, &config);
        let score = scorer.score_fallacy(
            "Coming from you, that's rich. You're always like this. Typical of you. \
             People like you never listen.",
        );
        assert!(score.value >= config.thresholds.fallacy_floor);
        assert!(!score.evidence.iter().any(|e| e.label == "escalation_floor"));
    }

    #[test]
    fn threat_marker_forces_special_pattern_override() {
        let (library, config) = scorer_fixture();
        let scorer = DimensionScorer::new(&library, &config);
        let message = make_message("m-1", "dave", "If this merges I'll fork the project.", 0);
        let score = scorer.score_special_pattern(&message, &[&message]);
        assert!(score.value >= 9.0, "got {}", score.value);
        assert!(score.evidence.iter().any(|e| e.label == "threat_override"));
    }

    #[test]
    fn pile_on_needs_enough_distinct_authors() {
        let (library, config) = scorer_fixture();
        let scorer = DimensionScorer::new(&library, &config);

        let a = make_message("m-1", "erin", "NACK, this breaks relay.", 0);
        let b = make_message("m-2", "frank", "Strong NACK from me.", 5);
        let c = make_message("m-3", "carol", "NACK. This is a terrible, stupid idea.", 9);
        let window = [&a, &b, &c];

        let score = scorer.score_special_pattern(&c, &window);
        assert!(score.value >= 7.0, "three negative authors: got {}", score.value);
        assert!(score.evidence.iter().any(|e| e.label == "pile_on"));

        // Same messages from a single author: no pile-on.
        let d = make_message("m-4", "erin", "NACK, this breaks relay.", 0);
        let e = make_message("m-5", "erin", "Strong NACK from me.", 5);
        let f = make_message("m-6", "erin", "NACK. This is a terrible, stupid idea.", 9);
        let solo = scorer.score_special_pattern(&f, &[&d, &e, &f]);
        assert!(!solo.evidence.iter().any(|ev| ev.label == "pile_on"));
    }

    #[test]
    fn pile_on_ignores_messages_outside_window() {
        let (library, config) = scorer_fixture();
        let scorer = DimensionScorer::new(&library, &config);

        // Two of the three negative replies are hours old.
        let a = make_message("m-1", "erin", "NACK, this breaks relay.", -600);
        let b = make_message("m-2", "frank", "Strong NACK from me.", -500);
        let c = make_message("m-3", "carol", "NACK. This is a terrible, stupid idea.", 0);
        let score = scorer.score_special_pattern(&c, &[&a, &b, &c]);
        assert!(!score.evidence.iter().any(|e| e.label == "pile_on"));
    }

    #[test]
    fn stonewalling_detects_repeated_short_dismissals() {
        let (library, config) = scorer_fixture();
        let scorer = DimensionScorer::new(&library, &config);

        let a = make_message("m-1", "grace", "No.", 0);
        let b = make_message("m-2", "judy", "Could you expand on the objection?", 2);
        let c = make_message("m-3", "grace", "Already discussed. Wrong.", 4);
        let d = make_message("m-4", "grace", "Not worth my time.", 6);
        let window = [&a, &b, &c, &d];

        let score = scorer.score_special_pattern(&d, &window);
        assert!(score.value >= 6.0, "got {}", score.value);
        assert!(score.evidence.iter().any(|e| e.label == "stonewalling"));

        // A long, engaged reply is not stonewalling even with a marker.
        let engaged = make_message(
            "m-5",
            "judy",
            "This was already discussed, but here is the full reasoning again with links \
             and measurements so we can close the question properly.",
            8,
        );
        let engaged_score = scorer.score_special_pattern(&engaged, &[&engaged]);
        assert!(!engaged_score.evidence.iter().any(|e| e.label == "stonewalling"));
    }

    #[test]
    fn short_messages_skip_density_scorers() {
        let (library, config) = scorer_fixture();
        let scorer = DimensionScorer::new(&library, &config);

        let face = scorer.score_face_threat("you never");
        assert_eq!(face.value, 0.0);
        assert!(face.evidence.iter().any(|e| e.label == INSUFFICIENT_SIGNAL));

        let subjectivity = scorer.score_subjectivity("totally stupid");
        assert_eq!(subjectivity.value, 0.0);
    }

    #[test]
    fn speech_act_picks_most_severe_bucket() {
        let (library, config) = scorer_fixture();
        let scorer = DimensionScorer::new(&library, &config);

        let directive = scorer.score_speech_act("You should run the functional tests first.");
        assert_eq!(directive.value, config.speech_acts.directive);

        let mixed = scorer.score_speech_act(
            "You should run the tests. Do you even understand the change? You broke the relay.",
        );
        assert_eq!(mixed.value, config.speech_acts.accusation);

        let neutral = scorer.score_speech_act("The mempool limit is configurable.");
        assert_eq!(neutral.value, 0.0);
    }

    #[test]
    fn argument_quality_rises_with_evidence_and_falls_with_dismissal() {
        let (library, config) = scorer_fixture();
        let scorer = DimensionScorer::new(&library, &config);

        let quality = scorer.score_argument_quality(
            "Thanks for the detailed writeup, I've attached benchmark data supporting this change.",
        );
        assert!(quality.value >= 9.0, "got {}", quality.value);

        let dismissive =
            scorer.score_argument_quality("Pointless. This is a waste of time, already discussed.");
        assert!(dismissive.value < NEUTRAL_QUALITY, "got {}", dismissive.value);

        let neutral = scorer.score_argument_quality("The mempool limit is configurable at runtime.");
        assert_eq!(neutral.value, NEUTRAL_QUALITY);
    }

    #[test]
    fn face_threat_is_dampened_by_politeness() {
        let (library, config) = scorer_fixture();
        let scorer = DimensionScorer::new(&library, &config);

        let hostile = scorer.score_face_threat(
            "You're wrong about relay policy and you never read the actual code before commenting.",
        );
        let softened = scorer.score_face_threat(
            "I think you're wrong about relay policy, but correct me if I'm wrong, \
             maybe I misread the code. Thanks for looking at it.",
        );
        assert!(hostile.value > 0.0);
        assert!(softened.value < hostile.value);
    }

    #[test]
    fn insult_message_matches_spec_scenario() {
        let (library, config) = scorer_fixture();
        let scorer = DimensionScorer::new(&library, &config);
        let message = make_message(
            "m-1",
            "carol",
            "This proposal is garbage and you clearly don't understand Bitcoin, idiot",
            0,
        );
        let scores = scorer.score_message(&message, &[&message]);

        assert!(scores[&Dimension::Fallacy].value >= config.thresholds.fallacy_floor);
        assert!(scores[&Dimension::FaceThreat].value > 0.0);
        assert!(scores[&Dimension::Sentiment].value > 3.0);
    }
}
