//! Drama analyzer: deterministic scoring of developer-communication text.
//!
//! The analyzer sits between the scrapers and the dashboard. It reads raw
//! messages plus thread metadata and turns them into explainable drama
//! scores per message, thread, day, and participant. Everything here is
//! pure rule evaluation: pattern tables plus arithmetic, with the matched
//! evidence retained, so the same inputs always produce the same bytes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   messages.jsonl    ┌──────────┐   daily_scores_<date>.json
//! │ scrapers │ ──────────────────▶ │ analyzer │ ──────────────────────────▶
//! └──────────┘                     └──────────┘
//! ```
//!
//! # Modules
//!
//! - [`patterns`]: the declarative lexical cue catalog
//! - [`sentiment`] / [`subjectivity`]: scalar text probes
//! - [`dimensions`]: the seven per-message dimension scorers
//! - [`composite`]: the versioned weight table
//! - [`aggregate`]: thread scores, daily scores, moving averages
//! - [`profiler`]: per-participant communication profiles
//! - [`topics`]: keyword-table hot topics
//! - [`config`]: TOML configuration with fail-fast validation
//! - [`output`]: boundary records and file I/O

pub mod aggregate;
pub mod composite;
pub mod config;
pub mod dimensions;
pub mod output;
pub mod patterns;
pub mod profiler;
pub mod score;
pub mod sentiment;
pub mod subjectivity;
pub mod topics;

// Re-export pattern types
pub use patterns::{PatternCategory, PatternLibrary, PatternMatch, CATALOG_VERSION};

// Re-export probe types
pub use sentiment::{Polarity, SentimentProbe};
pub use subjectivity::SubjectivityProbe;

// Re-export score types
pub use score::{clamp_to_scale, Dimension, DimensionScore, Evidence, Health, MessageScore};

// Re-export scorer and aggregation types
pub use aggregate::{moving_average, Aggregator, DailyScore, ThreadScore};
pub use composite::{neutrality, CompositeWeights, WEIGHT_TOLERANCE};
pub use dimensions::DimensionScorer;
pub use profiler::{build_profiles, ParticipantProfile};
pub use topics::{extract_hot_topics, HotTopic};

// Re-export config types
pub use config::{
    default_config_toml, AnalyzerConfig, ConfigError, ReportLimits, ScoringThresholds,
    SpeechActWeights, TomlSerializeError,
};

// Re-export output types
pub use output::{AnalysisRun, DailyRecord, OutputError, OutputReader, OutputWriter, RunSummary};

use std::collections::BTreeMap;
use std::path::Path;

use comm_events::{Message, Source, ThreadMeta};

/// Errors that can occur in analyzer operations.
#[derive(Debug)]
pub enum AnalyzerError {
    /// Error loading or validating configuration
    Config(ConfigError),
    /// Error writing or reading output files
    Output(OutputError),
}

impl std::fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzerError::Config(e) => write!(f, "Config error: {}", e),
            AnalyzerError::Output(e) => write!(f, "Output error: {}", e),
        }
    }
}

impl std::error::Error for AnalyzerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalyzerError::Config(e) => Some(e),
            AnalyzerError::Output(e) => Some(e),
        }
    }
}

impl From<ConfigError> for AnalyzerError {
    fn from(e: ConfigError) -> Self {
        AnalyzerError::Config(e)
    }
}

impl From<OutputError> for AnalyzerError {
    fn from(e: OutputError) -> Self {
        AnalyzerError::Output(e)
    }
}

/// The multi-dimensional drama analyzer.
///
/// Holds the validated configuration and the pattern catalog, and exposes
/// the per-message, per-thread, and whole-run scoring entry points. All
/// state is immutable after construction; scoring never mutates anything,
/// so one analyzer can score any number of runs and two analyzers with
/// different configurations can coexist.
pub struct DramaAnalyzer {
    config: AnalyzerConfig,
    library: PatternLibrary,
}

impl DramaAnalyzer {
    /// Creates an analyzer with the given configuration.
    ///
    /// Fails fast on configuration problems: a weight table that does not
    /// sum to one or an empty pattern category would silently corrupt
    /// every downstream score.
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        config.validate()?;
        let library = PatternLibrary::new();
        if let Some(category) = library.missing_categories().first() {
            return Err(ConfigError::MissingCategory(category.to_string()).into());
        }
        Ok(Self { config, library })
    }

    /// Creates an analyzer from a configuration file.
    pub fn from_config_file(path: &Path) -> Result<Self, AnalyzerError> {
        let config = AnalyzerConfig::from_file(path)?;
        Self::new(config)
    }

    /// Creates an analyzer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(AnalyzerConfig::default()).expect("Default config should always work")
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Returns a reference to the pattern catalog.
    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Scores a single message.
    ///
    /// `thread_window` is the full message list of the same thread in
    /// timestamp order; only the special-pattern dimension reads it, and
    /// passing just the message itself degrades gracefully to the
    /// text-only detectors.
    pub fn score_message(&self, message: &Message, thread_window: &[&Message]) -> MessageScore {
        let scorer = DimensionScorer::new(&self.library, &self.config);
        let dimensions = scorer.score_message(message, thread_window);
        let composite = self.config.weights.compose(&dimensions);
        let neutrality = neutrality(&dimensions);
        MessageScore {
            message_id: message.id.clone(),
            thread_id: message.thread_id.clone(),
            author: message.author.clone(),
            source: message.source,
            timestamp: message.timestamp,
            dimensions,
            composite,
            neutrality,
            health: Health::assess(composite, neutrality),
        }
    }

    /// Runs one full analysis pass.
    ///
    /// This is the main entry point. It:
    /// 1. Validates messages, skipping (and logging) malformed ones
    /// 2. Groups the rest by thread and scores every message
    /// 3. Builds thread scores, joining supplied metadata where present
    /// 4. Aggregates daily scores with the 7-day moving average
    /// 5. Builds participant profiles and the hot-topic report
    pub fn run(&self, messages: &[Message], threads: &[ThreadMeta]) -> AnalysisRun {
        let mut skipped = 0usize;
        let mut by_thread: BTreeMap<&str, Vec<&Message>> = BTreeMap::new();
        for message in messages {
            if let Err(reason) = message.validate() {
                skipped += 1;
                tracing::warn!(message_id = %message.id, %reason, "skipping malformed message");
                continue;
            }
            by_thread
                .entry(message.thread_id.as_str())
                .or_default()
                .push(message);
        }

        let scorer = DimensionScorer::new(&self.library, &self.config);
        let aggregator = Aggregator::new(&self.config);

        let mut message_scores: Vec<MessageScore> = Vec::new();
        let mut thread_scores: Vec<ThreadScore> = Vec::new();

        for (thread_id, thread_messages) in &mut by_thread {
            thread_messages.sort_by(|a, b| {
                a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id))
            });

            let window: Vec<&Message> = thread_messages.clone();
            let scores: Vec<MessageScore> = thread_messages
                .iter()
                .map(|message| {
                    let dimensions = scorer.score_message(message, &window);
                    let composite = self.config.weights.compose(&dimensions);
                    let neutrality = neutrality(&dimensions);
                    MessageScore {
                        message_id: message.id.clone(),
                        thread_id: message.thread_id.clone(),
                        author: message.author.clone(),
                        source: message.source,
                        timestamp: message.timestamp,
                        dimensions,
                        composite,
                        neutrality,
                        health: Health::assess(composite, neutrality),
                    }
                })
                .collect();

            let meta = threads
                .iter()
                .find(|t| t.thread_id == *thread_id)
                .cloned()
                .unwrap_or_else(|| fallback_meta(thread_id, thread_messages));

            let refs: Vec<&MessageScore> = scores.iter().collect();
            thread_scores.push(aggregator.thread_score(&meta, &refs));
            message_scores.extend(scores);
        }

        let daily = aggregator.daily_scores(&message_scores);
        let profiles = build_profiles(&message_scores);

        let mut top_threads: Vec<ThreadScore> = thread_scores
            .iter()
            .filter(|t| t.drama_score >= self.config.limits.top_thread_min_score)
            .cloned()
            .collect();
        top_threads.sort_by(|a, b| {
            b.drama_score
                .partial_cmp(&a.drama_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        top_threads.truncate(self.config.limits.top_thread_limit);

        let hot_topics = extract_hot_topics(&thread_scores, self.config.limits.hot_topic_limit);

        tracing::info!(
            messages = message_scores.len(),
            skipped,
            threads = thread_scores.len(),
            days = daily.len(),
            "analysis run complete"
        );

        AnalysisRun {
            pattern_library_version: self.library.version().to_string(),
            weights_version: self.config.weights.version.clone(),
            message_count: message_scores.len(),
            skipped_count: skipped,
            daily,
            threads: thread_scores,
            top_threads,
            profiles,
            hot_topics,
        }
    }
}

impl Default for DramaAnalyzer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Metadata stand-in for threads the scrapers supplied no record for.
fn fallback_meta(thread_id: &str, messages: &[&Message]) -> ThreadMeta {
    let source = messages.first().map_or(Source::GitHub, |m| m.source);
    ThreadMeta {
        thread_id: thread_id.to_string(),
        title: thread_id.to_string(),
        source,
        ack_count: 0,
        nack_count: 0,
        participants: Vec::new(),
    }
}
