//! Agent TUI Entry Point
//!
//! Usage:
//!   agent-tui [OPTIONS]
//!
//! Options:
//!   -t, --transcript <FILE>   JSON-lines file of agent responses
//!   --autoplay-ms <MS>        Deliver responses automatically
//!   -c, --config <FILE>       Display configuration file
//!
//! Logging goes to the file named by `AGENT_TUI_LOG`, if set; the terminal
//! itself is never written to by the logger.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use agent_tui::{App, Transcript};
use display_core::{load_config, load_config_from_path, ConfigOverrides, DisplayConfig};

/// Terminal surface for the agent display dispatcher
#[derive(Parser, Debug)]
#[command(name = "agent-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transcript of agent responses (JSON lines)
    #[arg(short = 't', long, value_name = "FILE")]
    transcript: Option<PathBuf>,

    /// Deliver the next response every MS milliseconds
    #[arg(long, value_name = "MS")]
    autoplay_ms: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "AGENT_DISPLAY_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Log to `AGENT_TUI_LOG` when it is set
fn init_logging() -> anyhow::Result<()> {
    let Ok(path) = std::env::var("AGENT_TUI_LOG") else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {path}"))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("agent_tui=info,display_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn resolve_config(path: Option<&PathBuf>) -> anyhow::Result<DisplayConfig> {
    match path {
        Some(path) => {
            let mut config = load_config_from_path(path)?;
            ConfigOverrides::from_env()?.apply(&mut config);
            Ok(config)
        }
        None => Ok(load_config()?.0),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging()?;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: agent-tui requires a terminal (TTY)");
        eprintln!("Use display-replay for headless playback.");
        std::process::exit(1);
    }

    let config = resolve_config(args.config.as_ref())?;
    let transcript = match &args.transcript {
        Some(path) => Transcript::load(path)?,
        None => Transcript::default(),
    };
    let autoplay = args.autoplay_ms.map(|ms| Duration::from_millis(ms.max(1)));

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(transcript, &config, autoplay);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
