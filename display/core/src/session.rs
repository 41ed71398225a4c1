//! Session Loop
//!
//! Drives a [`DisplayDispatcher`] from a channel of raw responses and a
//! recurring tick, on one task. Responses are handled one at a time, to
//! completion; the countdown tick runs between them on the same task, so a
//! timer replacement always finishes before the new countdown is ticked.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::audio::AudioOutput;
use crate::classifier::DisplayKind;
use crate::dispatcher::DisplayDispatcher;
use crate::mount::MountPoint;
use crate::widgets::WidgetFactory;

/// Counters for a finished session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Responses rendered
    pub turns: u64,
    /// Responses dropped as unparseable
    pub parse_failures: u64,
    /// Responses whose widget was skipped
    pub widget_failures: u64,
    /// Widgets mounted (including timers)
    pub widgets_mounted: u64,
    /// Ticks delivered to the timer subsystem
    pub ticks: u64,
}

/// Event loop around a dispatcher
pub struct SessionLoop<M, F, A> {
    dispatcher: DisplayDispatcher<M, F, A>,
    tick_interval: Duration,
}

impl<M, F, A> SessionLoop<M, F, A>
where
    M: MountPoint,
    F: WidgetFactory,
    A: AudioOutput,
{
    /// Wrap a dispatcher; `tick_interval` paces the countdown
    pub fn new(dispatcher: DisplayDispatcher<M, F, A>, tick_interval: Duration) -> Self {
        Self {
            dispatcher,
            tick_interval: tick_interval.max(Duration::from_millis(1)),
        }
    }

    /// Run until the sender side closes
    ///
    /// Returns the dispatcher (with its final surface) and the counters.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<String>,
    ) -> (DisplayDispatcher<M, F, A>, SessionSummary) {
        let mut summary = SessionSummary::default();
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();

        loop {
            tokio::select! {
                biased;

                maybe_raw = rx.recv() => {
                    let Some(raw) = maybe_raw else {
                        tracing::debug!("Response channel closed, ending session");
                        break;
                    };
                    match self.dispatcher.display_response(&raw) {
                        Ok(outcome) => {
                            summary.turns += 1;
                            if outcome.widget_failed() {
                                summary.widget_failures += 1;
                            }
                            if outcome.handle.is_some() {
                                summary.widgets_mounted += 1;
                            }
                            // A new countdown starts now, not at the last tick
                            if outcome.kind == DisplayKind::Timer && outcome.handle.is_some() {
                                last_tick = Instant::now();
                            }
                        }
                        Err(_) => summary.parse_failures += 1,
                    }
                }

                now = ticker.tick() => {
                    let elapsed = now.saturating_duration_since(last_tick);
                    last_tick = now;
                    self.dispatcher.tick(elapsed);
                    summary.ticks += 1;
                }
            }
        }

        tracing::info!(
            turns = summary.turns,
            parse_failures = summary.parse_failures,
            widget_failures = summary.widget_failures,
            "Session ended"
        );
        (self.dispatcher, summary)
    }
}
