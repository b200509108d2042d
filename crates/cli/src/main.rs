//! Drama analysis runner.
//!
//! Run with: cargo run -p drama-cli
//!
//! Examples:
//!   cargo run -p drama-cli -- --messages data/messages.jsonl --output-dir output
//!   cargo run -p drama-cli -- --messages data/messages.jsonl --threads data/threads.jsonl
//!   cargo run -p drama-cli -- --emit-default-config > analyzer.toml

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use analyzer::{default_config_toml, AnalyzerConfig, DramaAnalyzer, OutputWriter};
use comm_events::{Message, ThreadMeta};

/// Drama analysis over scraped developer-communication data
#[derive(Parser, Debug)]
#[command(name = "drama_report")]
#[command(about = "Scores scraped developer discussions for drama and writes daily reports")]
struct Args {
    /// Path to scraped messages, one JSON record per line
    #[arg(long, required_unless_present = "emit_default_config")]
    messages: Option<PathBuf>,

    /// Path to thread metadata, one JSON record per line
    #[arg(long)]
    threads: Option<PathBuf>,

    /// Analyzer configuration file (TOML); defaults are used when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the generated score files
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Print the built-in configuration to stdout and exit
    #[arg(long)]
    emit_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.emit_default_config {
        print!("{}", default_config_toml());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => AnalyzerConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    let analyzer = DramaAnalyzer::new(config).context("analyzer configuration rejected")?;

    let messages_path = args.messages.expect("clap enforces --messages");
    let messages = load_messages(&messages_path)
        .with_context(|| format!("reading messages from {}", messages_path.display()))?;
    let threads = match &args.threads {
        Some(path) => load_threads(path)
            .with_context(|| format!("reading thread metadata from {}", path.display()))?,
        None => Vec::new(),
    };

    tracing::info!(
        messages = messages.len(),
        threads = threads.len(),
        "starting analysis run"
    );
    let run = analyzer.run(&messages, &threads);

    let writer = OutputWriter::new(&args.output_dir)
        .with_context(|| format!("creating output directory {}", args.output_dir.display()))?;
    writer.write_all(&run).context("writing output files")?;

    println!("Analysis complete.");
    println!("  Messages scored:  {}", run.message_count);
    println!("  Messages skipped: {}", run.skipped_count);
    println!("  Threads:          {}", run.threads.len());
    println!("  Days with data:   {}", run.daily.len());
    if let Some(latest) = run.daily.last() {
        println!(
            "  Latest day:       {} overall {:.2} (raw {:.2}, {} days in average){}",
            latest.date,
            latest.overall,
            latest.raw,
            latest.days_in_average,
            if latest.alert { "  ** DRAMA ALERT **" } else { "" },
        );
    }
    for thread in run.top_threads.iter().take(3) {
        println!(
            "  Hot thread:       [{}] {} ({:.1}/10)",
            thread.source, thread.title, thread.drama_score
        );
    }

    Ok(())
}

/// Reads messages from a JSONL file.
///
/// Unparseable lines are skipped with a warning; a scraper hiccup on one
/// record must not take down the whole run.
fn load_messages(path: &PathBuf) -> anyhow::Result<Vec<Message>> {
    let content = std::fs::read_to_string(path)?;
    let mut messages = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match Message::from_jsonl(line) {
            Ok(message) => messages.push(message),
            Err(error) => {
                tracing::warn!(line = number + 1, %error, "skipping unparseable message line");
            }
        }
    }
    Ok(messages)
}

/// Reads thread metadata from a JSONL file.
fn load_threads(path: &PathBuf) -> anyhow::Result<Vec<ThreadMeta>> {
    let content = std::fs::read_to_string(path)?;
    let mut threads = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match ThreadMeta::from_jsonl(line) {
            Ok(meta) => threads.push(meta),
            Err(error) => {
                tracing::warn!(line = number + 1, %error, "skipping unparseable thread line");
            }
        }
    }
    Ok(threads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_messages_skips_bad_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"id":"m-1","thread_id":"t-1","author":"alice","source":"github","body":"fine","timestamp":"2026-03-02T14:05:00Z"}}"#
        )
        .unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file).unwrap();

        let messages = load_messages(&file.path().to_path_buf()).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, "m-1");
    }

    #[test]
    fn load_threads_reads_fixture_shaped_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"thread_id":"t-1","title":"relay limits","source":"irc"}}"#
        )
        .unwrap();

        let threads = load_threads(&file.path().to_path_buf()).unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].ack_count, 0);
    }

    #[test]
    fn args_parse_with_minimal_flags() {
        let args = Args::parse_from(["drama_report", "--messages", "data/messages.jsonl"]);
        assert_eq!(args.output_dir, PathBuf::from("output"));
        assert!(args.threads.is_none());
        assert!(!args.emit_default_config);
    }
}
