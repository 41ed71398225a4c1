//! Display Replay - Headless Transcript Player
//!
//! Feeds a transcript of raw agent responses (one JSON object per line)
//! through the display dispatcher and prints the final surface as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Replay a transcript file
//! display-replay session.jsonl
//!
//! # Read from stdin, keep the countdown running for 3s after the last line
//! cat session.jsonl | display-replay --hold-ms 3000 --pretty
//!
//! # Verbose logging (stderr)
//! RUST_LOG=debug display-replay session.jsonl
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use display_core::{
    load_config, load_config_from_path, ConfigOverrides, DisplayConfig, DisplayDispatcher,
    DisplaySurface, SessionLoop, SessionSummary,
};

/// Replay agent responses through the display dispatcher
#[derive(Parser, Debug)]
#[command(name = "display-replay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transcript file (JSON lines); stdin when omitted or "-"
    #[arg(value_name = "FILE")]
    transcript: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "AGENT_DISPLAY_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Countdown tick interval in milliseconds (overrides config)
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    /// Keep ticking this long after the transcript ends
    #[arg(long, value_name = "MS", default_value_t = 0)]
    hold_ms: u64,

    /// Pretty-print the JSON snapshot
    #[arg(long)]
    pretty: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "AGENT_DISPLAY_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

/// What gets printed when the replay finishes
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    summary: SessionSummary,
    timer_active: bool,
    timer_terminations: u64,
    surface: DisplaySurface,
}

/// Initialize logging on stderr; stdout carries the snapshot
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "display_replay={level},display_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn resolve_config(args: &Args) -> Result<DisplayConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = load_config_from_path(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?;
            ConfigOverrides::from_env()?.apply(&mut config);
            config
        }
        None => {
            let (config, source) = load_config()?;
            debug!(?source, "Resolved display config");
            config
        }
    };
    if let Some(ms) = args.tick_ms {
        config.tick_interval = Duration::from_millis(ms.max(1));
    }
    Ok(config)
}

async fn open_transcript(path: Option<&PathBuf>) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open transcript: {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}

/// Send every non-blank line, then hold the channel open for `hold`
async fn feed(
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
    tx: mpsc::Sender<String>,
    hold: Duration,
) -> Result<usize> {
    let mut lines = reader.lines();
    let mut sent = 0;
    while let Some(line) = lines.next_line().await.context("Failed to read transcript")? {
        if line.trim().is_empty() {
            continue;
        }
        if tx.send(line).await.is_err() {
            break;
        }
        sent += 1;
    }
    if !hold.is_zero() {
        tokio::time::sleep(hold).await;
    }
    Ok(sent)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = resolve_config(&args)?;
    let reader = open_transcript(args.transcript.as_ref()).await?;

    let (tx, rx) = mpsc::channel(64);
    let feeder = tokio::spawn(feed(reader, tx, Duration::from_millis(args.hold_ms)));

    let session = SessionLoop::new(DisplayDispatcher::with_config(&config), config.tick_interval);
    let (dispatcher, summary) = session.run(rx).await;
    let sent = feeder.await.context("Transcript reader panicked")??;
    info!(lines = sent, turns = summary.turns, "Replay finished");

    let timer = dispatcher.registry().timer_state();
    let snapshot = Snapshot {
        summary,
        timer_active: timer.is_active(),
        timer_terminations: timer.terminations(),
        surface: dispatcher.into_surface(),
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn reader(text: &'static str) -> Box<dyn AsyncBufRead + Unpin + Send> {
        Box::new(BufReader::new(text.as_bytes()))
    }

    #[tokio::test]
    async fn test_feed_skips_blank_lines_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let sent = feed(reader("{\"a\":1}\n\n   \n{\"b\":2}\n{\"c\":3}"), tx, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(sent, 3);
        let mut received = Vec::new();
        while let Some(line) = rx.recv().await {
            received.push(line);
        }
        assert_eq!(received, vec!["{\"a\":1}", "{\"b\":2}", "{\"c\":3}"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_holds_channel_open() {
        let (tx, mut rx) = mpsc::channel(8);
        let task = tokio::spawn(feed(reader("{}\n"), tx, Duration::from_secs(5)));

        assert_eq!(rx.recv().await.as_deref(), Some("{}"));
        let start = tokio::time::Instant::now();
        assert_eq!(rx.recv().await, None);
        assert!(start.elapsed() >= Duration::from_secs(5));
        assert_eq!(task.await.unwrap().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_feed_stops_when_session_ends() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sent = feed(reader("{}\n{}\n"), tx, Duration::ZERO).await.unwrap();
        assert_eq!(sent, 0);
    }

    #[test]
    fn test_resolve_config_reads_file_then_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timer]\ntick_interval_ms = 250\n\n[books]\npage_size = 7\n").unwrap();
        let path = file.path().to_str().unwrap();

        let args = Args::parse_from(["display-replay", "--config", path]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.book_page_size, 7);

        let args = Args::parse_from(["display-replay", "--config", path, "--tick-ms", "0"]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.tick_interval, Duration::from_millis(1));
        assert_eq!(config.book_page_size, 7);
    }

    #[test]
    fn test_resolve_config_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let args = Args::parse_from(["display-replay", "--config", path.to_str().unwrap()]);

        let err = resolve_config(&args).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["display-replay", "-", "--pretty"]);
        assert_eq!(args.transcript, Some(PathBuf::from("-")));
        assert_eq!(args.hold_ms, 0);
        assert!(args.pretty);
        assert!(args.tick_ms.is_none());
    }
}
