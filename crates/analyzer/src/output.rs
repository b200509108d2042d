//! Analyzer output types and file I/O.
//!
//! The analyzer's products are plain serializable records: one daily score
//! file per day with data, plus thread scores, participant profiles, and
//! hot topics for the run. The persistence and dashboard layers only ever
//! see these files.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::aggregate::{DailyScore, ThreadScore};
use crate::profiler::ParticipantProfile;
use crate::topics::HotTopic;

/// Everything one analysis pass produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    /// Catalog version the scores were computed with
    pub pattern_library_version: String,
    /// Composite weight table version
    pub weights_version: String,
    /// Messages scored
    pub message_count: usize,
    /// Malformed messages skipped
    pub skipped_count: usize,
    /// One record per day with data, in date order
    pub daily: Vec<DailyScore>,
    /// Every thread touched by the run
    pub threads: Vec<ThreadScore>,
    /// Threads over the report threshold, hottest first
    pub top_threads: Vec<ThreadScore>,
    /// One profile per author, most active first
    pub profiles: Vec<ParticipantProfile>,
    /// Ranked topic report
    pub hot_topics: Vec<HotTopic>,
}

/// Persisted form of one daily score file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(flatten)]
    pub score: DailyScore,
    /// Catalog version, so a reader can tell which rules produced this day
    pub pattern_library_version: String,
}

/// Writes analysis output files into a directory.
///
/// Layout:
/// - `daily_scores_<date>.json` - one per day with data
/// - `thread_scores.json` - all thread records for the run
/// - `top_threads.json` - the over-threshold shortlist
/// - `participants.json` - participant profiles
/// - `hot_topics.json` - ranked topics
/// - `run_summary.json` - counts and versions for the run
pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    /// Creates a writer rooted at the given directory, creating it if
    /// needed.
    pub fn new(output_dir: &Path) -> Result<Self, OutputError> {
        fs::create_dir_all(output_dir).map_err(OutputError::Io)?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Writes every output file for a run.
    pub fn write_all(&self, run: &AnalysisRun) -> Result<(), OutputError> {
        for day in &run.daily {
            let record = DailyRecord {
                score: day.clone(),
                pattern_library_version: run.pattern_library_version.clone(),
            };
            self.write_json(
                &format!("daily_scores_{}.json", day.date),
                &record,
            )?;
        }
        self.write_json("thread_scores.json", &run.threads)?;
        self.write_json("top_threads.json", &run.top_threads)?;
        self.write_json("participants.json", &run.profiles)?;
        self.write_json("hot_topics.json", &run.hot_topics)?;
        self.write_json("run_summary.json", &RunSummary::from(run))?;
        Ok(())
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), OutputError> {
        let file = File::create(self.output_dir.join(name)).map_err(OutputError::Io)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, value).map_err(OutputError::Json)?;
        Ok(())
    }
}

/// Reads analysis output files back.
pub struct OutputReader {
    output_dir: PathBuf,
}

impl OutputReader {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Loads one daily record by date, `Ok(None)` when no file exists for
    /// that day (which is how days without data look on disk).
    pub fn read_daily(&self, date: chrono::NaiveDate) -> Result<Option<DailyRecord>, OutputError> {
        let path = self.output_dir.join(format!("daily_scores_{}.json", date));
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path).map_err(OutputError::Io)?;
        let record = serde_json::from_reader(BufReader::new(file)).map_err(OutputError::Json)?;
        Ok(Some(record))
    }

    /// Loads the thread records for the run.
    pub fn read_threads(&self) -> Result<Vec<ThreadScore>, OutputError> {
        let file = File::open(self.output_dir.join("thread_scores.json")).map_err(OutputError::Io)?;
        serde_json::from_reader(BufReader::new(file)).map_err(OutputError::Json)
    }

    /// Loads the run summary.
    pub fn read_summary(&self) -> Result<RunSummary, OutputError> {
        let file = File::open(self.output_dir.join("run_summary.json")).map_err(OutputError::Io)?;
        serde_json::from_reader(BufReader::new(file)).map_err(OutputError::Json)
    }
}

/// Small summary record for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub pattern_library_version: String,
    pub weights_version: String,
    pub message_count: usize,
    pub skipped_count: usize,
    pub day_count: usize,
    pub thread_count: usize,
    pub participant_count: usize,
}

impl From<&AnalysisRun> for RunSummary {
    fn from(run: &AnalysisRun) -> Self {
        Self {
            pattern_library_version: run.pattern_library_version.clone(),
            weights_version: run.weights_version.clone(),
            message_count: run.message_count,
            skipped_count: run.skipped_count,
            day_count: run.daily.len(),
            thread_count: run.threads.len(),
            participant_count: run.profiles.len(),
        }
    }
}

/// Errors that can occur while writing or reading output files.
#[derive(Debug)]
pub enum OutputError {
    /// I/O error creating or accessing files
    Io(std::io::Error),
    /// JSON serialization error
    Json(serde_json::Error),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "I/O error: {}", e),
            OutputError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Json(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_run() -> AnalysisRun {
        AnalysisRun {
            pattern_library_version: "1.0.0".to_string(),
            weights_version: "1.0.0".to_string(),
            message_count: 3,
            skipped_count: 1,
            daily: vec![DailyScore {
                date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                github: Some(4.2),
                bips: None,
                irc: Some(6.0),
                mailing_list: None,
                overall: 5.1,
                raw: 5.1,
                days_in_average: 1,
                week_delta: None,
                alert: false,
            }],
            threads: Vec::new(),
            top_threads: Vec::new(),
            profiles: Vec::new(),
            hot_topics: Vec::new(),
        }
    }

    #[test]
    fn write_then_read_daily_record() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        let run = sample_run();
        writer.write_all(&run).unwrap();

        let reader = OutputReader::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let record = reader.read_daily(date).unwrap().expect("record exists");

        assert_eq!(record.score, run.daily[0]);
        assert_eq!(record.pattern_library_version, "1.0.0");
    }

    #[test]
    fn absent_day_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        writer.write_all(&sample_run()).unwrap();

        let reader = OutputReader::new(dir.path());
        let missing = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        assert!(reader.read_daily(missing).unwrap().is_none());
    }

    #[test]
    fn daily_file_omits_empty_sources_and_carries_contract_fields() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        writer.write_all(&sample_run()).unwrap();

        let raw = std::fs::read_to_string(
            dir.path().join("daily_scores_2026-03-02.json"),
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert!(json.get("date").is_some());
        assert!(json.get("overall").is_some());
        assert!(json.get("raw").is_some());
        assert!(json.get("github").is_some());
        assert!(json.get("bips").is_none());
        assert!(json.get("pattern_library_version").is_some());
    }

    #[test]
    fn run_summary_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        let run = sample_run();
        writer.write_all(&run).unwrap();

        let summary = OutputReader::new(dir.path()).read_summary().unwrap();
        assert_eq!(summary, RunSummary::from(&run));
        assert_eq!(summary.day_count, 1);
        assert_eq!(summary.skipped_count, 1);
    }
}
