//! Countdown Timer Subsystem
//!
//! A countdown is a tiny state machine:
//!
//! ```text
//! Running --(remaining hits zero)--> Terminated(Expired)
//! Running --(terminate)-----------> Terminated(Replaced | Cancelled)
//! ```
//!
//! `Terminated` is absorbing. [`TimerWidgetState`] is the session's single
//! timer slot: it holds the one countdown that may be running, keeps its
//! mounted node's text current on every tick, and clears `active` by itself
//! when the countdown expires.

use std::time::Duration;

use serde::Serialize;

use crate::mount::{MountPoint, TimerNode, WidgetHandle};
use crate::widgets::TimerSpec;

/// Why a countdown stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminationCause {
    /// Remaining time reached zero
    Expired,
    /// A newer timer took its place
    Replaced,
    /// Stopped on request
    Cancelled,
}

/// Countdown lifecycle phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TimerPhase {
    /// Counting down
    Running,
    /// Stopped for good
    Terminated(TerminationCause),
}

/// Result of advancing a countdown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting
    Running {
        /// Time left after this tick
        remaining: Duration,
    },
    /// This tick brought it to zero
    Expired,
    /// Nothing is counting
    Inert,
}

/// A single countdown
#[derive(Clone, Debug, Serialize)]
pub struct CountdownTimer {
    handle: WidgetHandle,
    label: Option<String>,
    total: Duration,
    remaining: Duration,
    phase: TimerPhase,
}

impl CountdownTimer {
    /// Start a countdown
    pub fn new(handle: WidgetHandle, total: Duration, label: Option<String>) -> Self {
        Self {
            handle,
            label,
            total,
            remaining: total,
            phase: TimerPhase::Running,
        }
    }

    /// Start a countdown from a factory spec
    #[must_use]
    pub fn from_spec(handle: WidgetHandle, spec: &TimerSpec) -> Self {
        Self::new(handle, Duration::from_secs(spec.seconds), spec.label.clone())
    }

    /// Handle of the widget showing this countdown
    #[must_use]
    pub fn handle(&self) -> WidgetHandle {
        self.handle
    }

    /// Caption
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Original length
    #[must_use]
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Time left
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Whether the countdown is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    /// Advance by `elapsed`
    pub fn tick(&mut self, elapsed: Duration) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Inert;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            self.phase = TimerPhase::Terminated(TerminationCause::Expired);
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                remaining: self.remaining,
            }
        }
    }

    /// Stop the countdown; returns false if it had already stopped
    pub fn terminate(&mut self, cause: TerminationCause) -> bool {
        if !self.is_running() {
            return false;
        }
        self.phase = TimerPhase::Terminated(cause);
        true
    }

    /// Remaining time as `MM:SS`, or `H:MM:SS` past an hour
    ///
    /// Partial seconds round up, so a countdown only shows `00:00` once it
    /// has actually expired.
    #[must_use]
    pub fn display_text(&self) -> String {
        format_remaining(self.remaining)
    }

    /// Node for the media-display region
    #[must_use]
    pub fn node(&self) -> TimerNode {
        TimerNode {
            handle: self.handle,
            label: self.label.clone(),
            text: self.display_text(),
            running: self.is_running(),
        }
    }
}

/// Format a remaining duration for display
#[must_use]
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_millis().div_ceil(1000);
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// The session's timer slot
///
/// Invariant: at most one countdown is running, and when one is running
/// `active` is true and `node` is its handle.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TimerWidgetState {
    active: bool,
    node: Option<WidgetHandle>,
    timer: Option<CountdownTimer>,
    terminations: u64,
}

impl TimerWidgetState {
    /// Whether a countdown is running
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Handle of the current (or last) timer widget
    #[must_use]
    pub fn node(&self) -> Option<WidgetHandle> {
        self.node
    }

    /// The current (or last) countdown
    #[must_use]
    pub fn timer(&self) -> Option<&CountdownTimer> {
        self.timer.as_ref()
    }

    /// Explicit terminations issued so far (expiries are not counted)
    #[must_use]
    pub fn terminations(&self) -> u64 {
        self.terminations
    }

    /// Stop the countdown behind `handle`
    ///
    /// A replaced timer's node is detached; a cancelled one stays mounted,
    /// frozen. Returns false for unknown or already-stopped handles.
    pub fn terminate<M: MountPoint + ?Sized>(
        &mut self,
        handle: WidgetHandle,
        cause: TerminationCause,
        mount: &mut M,
    ) -> bool {
        let Some(timer) = self.timer.as_mut().filter(|t| t.handle() == handle) else {
            return false;
        };
        if !timer.terminate(cause) {
            return false;
        }
        self.active = false;
        self.terminations += 1;
        match cause {
            TerminationCause::Replaced => {
                mount.detach_timer(handle);
            }
            TerminationCause::Cancelled | TerminationCause::Expired => {
                mount.update_timer(handle, &timer.display_text(), false);
            }
        }
        tracing::debug!(handle = %handle, cause = ?cause, "Timer terminated");
        true
    }

    /// Put a freshly mounted countdown in the slot
    pub(crate) fn start(&mut self, timer: CountdownTimer) {
        debug_assert!(
            !self.timer.as_ref().is_some_and(CountdownTimer::is_running),
            "a running timer must be terminated before another starts"
        );
        self.active = true;
        self.node = Some(timer.handle());
        self.timer = Some(timer);
    }

    /// Advance the running countdown and refresh its node
    ///
    /// On expiry the slot goes inactive on its own; the expired node stays
    /// mounted showing `00:00` until the next timer swaps the region.
    pub fn tick<M: MountPoint + ?Sized>(&mut self, elapsed: Duration, mount: &mut M) -> TickOutcome {
        let Some(timer) = self.timer.as_mut() else {
            return TickOutcome::Inert;
        };
        let outcome = timer.tick(elapsed);
        match outcome {
            TickOutcome::Running { .. } => {
                mount.update_timer(timer.handle(), &timer.display_text(), true);
            }
            TickOutcome::Expired => {
                self.active = false;
                mount.update_timer(timer.handle(), &timer.display_text(), false);
                tracing::info!(handle = %timer.handle(), "Timer expired");
            }
            TickOutcome::Inert => {}
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mount::DisplaySurface;

    fn mounted(state: &mut TimerWidgetState, surface: &mut DisplaySurface, id: u64, secs: u64) {
        let timer = CountdownTimer::new(WidgetHandle(id), Duration::from_secs(secs), None);
        surface.mount_timer(timer.node()).unwrap();
        state.start(timer);
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::from_secs(300)), "05:00");
        assert_eq!(format_remaining(Duration::from_millis(59_001)), "01:00");
        assert_eq!(format_remaining(Duration::from_millis(400)), "00:01");
        assert_eq!(format_remaining(Duration::ZERO), "00:00");
        assert_eq!(format_remaining(Duration::from_secs(3725)), "1:02:05");
    }

    #[test]
    fn test_countdown_runs_then_expires() {
        let mut timer = CountdownTimer::new(WidgetHandle(1), Duration::from_secs(2), None);
        assert_eq!(
            timer.tick(Duration::from_secs(1)),
            TickOutcome::Running {
                remaining: Duration::from_secs(1)
            }
        );
        assert_eq!(timer.tick(Duration::from_secs(5)), TickOutcome::Expired);
        assert_eq!(
            timer.phase(),
            TimerPhase::Terminated(TerminationCause::Expired)
        );
        assert_eq!(timer.tick(Duration::from_secs(1)), TickOutcome::Inert);
    }

    #[test]
    fn test_terminated_is_absorbing() {
        let mut timer = CountdownTimer::new(WidgetHandle(1), Duration::from_secs(10), None);
        assert!(timer.terminate(TerminationCause::Cancelled));
        assert!(!timer.terminate(TerminationCause::Replaced));
        assert_eq!(
            timer.phase(),
            TimerPhase::Terminated(TerminationCause::Cancelled)
        );
        assert_eq!(timer.tick(Duration::from_secs(1)), TickOutcome::Inert);
        assert_eq!(timer.remaining(), Duration::from_secs(10));
    }

    #[test]
    fn test_state_expires_without_controller() {
        let mut surface = DisplaySurface::new();
        let mut state = TimerWidgetState::default();
        mounted(&mut state, &mut surface, 1, 3);
        assert!(state.is_active());

        state.tick(Duration::from_secs(1), &mut surface);
        assert_eq!(surface.timers()[0].text, "00:02");
        assert!(surface.timers()[0].running);

        assert_eq!(
            state.tick(Duration::from_secs(2), &mut surface),
            TickOutcome::Expired
        );
        assert!(!state.is_active());
        assert_eq!(state.terminations(), 0);
        assert_eq!(surface.timers()[0].text, "00:00");
        assert!(!surface.timers()[0].running);
    }

    #[test]
    fn test_replace_detaches_cancel_freezes() {
        let mut surface = DisplaySurface::new();
        let mut state = TimerWidgetState::default();

        mounted(&mut state, &mut surface, 1, 60);
        assert!(state.terminate(WidgetHandle(1), TerminationCause::Cancelled, &mut surface));
        assert_eq!(surface.timers().len(), 1);
        assert!(!surface.timers()[0].running);
        assert!(!state.is_active());

        surface.detach_timer(WidgetHandle(1));
        mounted(&mut state, &mut surface, 2, 60);
        assert!(state.terminate(WidgetHandle(2), TerminationCause::Replaced, &mut surface));
        assert!(surface.timers().is_empty());
        assert_eq!(state.terminations(), 2);
    }

    #[test]
    fn test_terminate_ignores_stale_handles() {
        let mut surface = DisplaySurface::new();
        let mut state = TimerWidgetState::default();
        mounted(&mut state, &mut surface, 5, 60);

        assert!(!state.terminate(WidgetHandle(4), TerminationCause::Cancelled, &mut surface));
        assert!(state.terminate(WidgetHandle(5), TerminationCause::Cancelled, &mut surface));
        assert!(!state.terminate(WidgetHandle(5), TerminationCause::Cancelled, &mut surface));
        assert_eq!(state.terminations(), 1);
    }
}
