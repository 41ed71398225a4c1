//! Main Application
//!
//! The App struct is a terminal surface around a [`DisplayDispatcher`]:
//! - Event loop (keyboard, resize, autoplay)
//! - Transcript delivery, one response at a time
//! - Wall-clock countdown ticks
//! - Rendering of the surface's regions
//!
//! ```text
//! ┌ greeting ──────────────────────────────┐
//! │ conversation log          │ media      │
//! │ (scrollable)              │ (timers)   │
//! ├ status ────────────────────────────────┤
//! ```

use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::{Frame, Terminal};
use tokio::time::MissedTickBehavior;
use unicode_width::UnicodeWidthStr;

use display_core::{DisplayConfig, DisplayDispatcher, DisplayKind, TickOutcome};

use crate::theme::{DIM_GRAY, ERROR_RED, GREETING, TIMER_YELLOW};
use crate::transcript::Transcript;
use crate::widgets::{log_lines, media_panel, TextBlock, TextBlockState, MEDIA_WIDTH};

/// Frame pacing for redraws
const FRAME: Duration = Duration::from_millis(100);

/// Something worth showing in the status bar
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Informational
    Info(String),
    /// A response or widget was dropped
    Problem(String),
}

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// Dispatcher owning the in-memory surface
    dispatcher: DisplayDispatcher,
    /// Responses still to deliver
    transcript: Transcript,

    // === Timing ===
    /// Delay between automatic deliveries
    autoplay: Option<Duration>,
    /// How often the countdown advances
    tick_interval: Duration,
    /// Instant of the last countdown tick
    last_tick: Instant,

    // === UI State ===
    /// Conversation log scroll state
    log_state: TextBlockState,
    /// Last notice for the status bar
    notice: Option<Notice>,
}

impl App {
    /// Create an app over a transcript
    pub fn new(transcript: Transcript, config: &DisplayConfig, autoplay: Option<Duration>) -> Self {
        Self {
            running: true,
            dispatcher: DisplayDispatcher::with_config(config),
            transcript,
            autoplay,
            tick_interval: config.tick_interval,
            last_tick: Instant::now(),
            log_state: TextBlockState::default(),
            notice: None,
        }
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut autoplay = self.autoplay.map(|period| {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            let mut autoplay_done = false;

            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => match maybe_event {
                    // Only handle Press events (not Release or Repeat)
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Terminal event stream failed");
                        self.running = false;
                    }
                    None => self.running = false,
                },

                () = next_autoplay(autoplay.as_mut()) => {
                    autoplay_done = !self.deliver_next();
                }

                () = tokio::time::sleep(FRAME) => {}
            }

            if autoplay_done {
                autoplay = None;
            }

            self.update(Instant::now());
            terminal.draw(|frame| self.draw(frame))?;
        }

        Ok(())
    }

    /// Deliver the next transcript response; false once none are left
    pub fn deliver_next(&mut self) -> bool {
        let Some(raw) = self.transcript.next_response() else {
            self.notice = Some(Notice::Info("End of transcript".to_string()));
            return false;
        };

        match self.dispatcher.display_response(&raw) {
            Ok(outcome) => {
                self.notice = outcome
                    .failure
                    .as_ref()
                    .map(|e| Notice::Problem(format!("Widget skipped: {e}")));
                if outcome.kind == DisplayKind::Timer && outcome.handle.is_some() {
                    self.last_tick = Instant::now();
                }
            }
            Err(e) => {
                self.notice = Some(Notice::Problem(format!("Response dropped: {e}")));
            }
        }
        self.log_state.scroll_to_bottom();
        true
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }

            // Next response
            KeyCode::Enter => {
                self.deliver_next();
            }

            // Conversation scrolling
            KeyCode::PageUp => {
                let page = self.log_state.page();
                self.log_state.scroll(page as isize);
            }
            KeyCode::PageDown => {
                let page = self.log_state.page();
                self.log_state.scroll(-(page as isize));
            }
            KeyCode::End => self.log_state.scroll_to_bottom(),

            _ => {}
        }
    }

    /// Advance the countdown by wall-clock time
    pub fn update(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_tick);
        if elapsed < self.tick_interval {
            return;
        }
        self.last_tick = now;
        if self.dispatcher.tick(elapsed) == TickOutcome::Expired {
            self.notice = Some(Notice::Info("Timer finished".to_string()));
        }
    }

    /// Render the surface into a frame
    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        let [header, body, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let surface = self.dispatcher.surface();

        if let Some(greeting) = surface.greeting() {
            let style = Style::default().fg(GREETING).add_modifier(Modifier::BOLD);
            frame.render_widget(Line::styled(clip(greeting, header.width), style), header);
        }

        let timers = surface.timers();
        let (log_area, media_area) = if timers.is_empty() || body.width < MEDIA_WIDTH * 2 {
            (body, None)
        } else {
            let [log, media] =
                Layout::horizontal([Constraint::Min(10), Constraint::Length(MEDIA_WIDTH)])
                    .areas(body);
            (log, Some(media))
        };

        let lines = log_lines(
            surface.log_nodes(),
            log_area.width.saturating_sub(1) as usize,
            surface.more_affordance_visible(),
        );
        let log_area = Rect {
            width: log_area.width.saturating_sub(1),
            ..log_area
        };
        frame.render_stateful_widget(TextBlock::new(&lines), log_area, &mut self.log_state);

        if let Some(area) = media_area {
            frame.render_widget(media_panel(timers), area);
        }

        frame.render_widget(self.status_line(status.width), status);
    }

    fn status_line(&self, width: u16) -> Line<'static> {
        let (text, style) = match &self.notice {
            Some(Notice::Problem(message)) => (message.clone(), Style::default().fg(ERROR_RED)),
            Some(Notice::Info(message)) => (message.clone(), Style::default().fg(TIMER_YELLOW)),
            None => {
                let scroll = if self.log_state.scroll_offset > 0 {
                    format!(" [^{} lines]", self.log_state.scroll_offset)
                } else {
                    String::new()
                };
                let mode = if self.autoplay.is_some() { " | autoplay" } else { "" };
                (
                    format!(
                        " {}/{} responses | Enter next | PgUp/PgDn scroll | Esc quit{mode}{scroll}",
                        self.transcript.delivered(),
                        self.transcript.total(),
                    ),
                    Style::default().fg(DIM_GRAY),
                )
            }
        };
        Line::styled(clip(&text, width), style)
    }

    /// Is the app still running?
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The dispatcher behind this surface
    pub fn dispatcher(&self) -> &DisplayDispatcher {
        &self.dispatcher
    }

    /// Current status bar notice
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}

async fn next_autoplay(interval: Option<&mut tokio::time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Truncate to a display width
fn clip(text: &str, width: u16) -> String {
    let width = width as usize;
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}
