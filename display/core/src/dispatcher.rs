//! Display Dispatcher
//!
//! The per-response pipeline:
//!
//! ```text
//! raw JSON -> parse -> render turn -> classify -> dispatch widget -> audio
//!               |                                     |
//!            abort turn                     log, keep text, skip widget
//! ```
//!
//! A parse failure drops the whole turn. Anything after the turn is rendered
//! degrades to "text shown, widget absent" and never stops audio or the next
//! response.

use std::time::Duration;

use crate::audio::{AudioOutput, NullAudio};
use crate::classifier::{classify_response, DisplayKind};
use crate::config::DisplayConfig;
use crate::error::{DisplayError, WidgetMountError};
use crate::mount::{DisplaySurface, MountPoint, WidgetHandle};
use crate::registry::WidgetRegistry;
use crate::response::AgentResponse;
use crate::timer::TickOutcome;
use crate::turn::TurnRenderer;
use crate::widgets::{JsonWidgetFactory, WidgetFactory};

/// What happened to one response
#[derive(Debug)]
pub struct DispatchOutcome {
    /// Kind the response classified as
    pub kind: DisplayKind,
    /// Widget mounted for it, if any
    pub handle: Option<WidgetHandle>,
    /// Widget failure, if the widget was skipped
    pub failure: Option<WidgetMountError>,
}

impl DispatchOutcome {
    /// Whether a widget was meant to render but did not
    #[must_use]
    pub fn widget_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Intent-driven display dispatcher for one session
#[derive(Debug)]
pub struct DisplayDispatcher<M = DisplaySurface, F = JsonWidgetFactory, A = NullAudio> {
    surface: M,
    factory: F,
    audio: A,
    registry: WidgetRegistry,
    renderer: TurnRenderer,
}

impl DisplayDispatcher {
    /// Headless dispatcher with default collaborators
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(DisplaySurface::new(), JsonWidgetFactory::new(), NullAudio)
    }

    /// Headless dispatcher configured from [`DisplayConfig`]
    #[must_use]
    pub fn with_config(config: &DisplayConfig) -> Self {
        Self::from_parts(
            DisplaySurface::new().with_max_log_nodes(config.max_log_nodes),
            JsonWidgetFactory::new().with_book_page_size(config.book_page_size),
            NullAudio,
        )
    }
}

impl Default for DisplayDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, F, A> DisplayDispatcher<M, F, A>
where
    M: MountPoint,
    F: WidgetFactory,
    A: AudioOutput,
{
    /// Assemble a dispatcher from its collaborators
    pub fn from_parts(surface: M, factory: F, audio: A) -> Self {
        Self {
            surface,
            factory,
            audio,
            registry: WidgetRegistry::new(),
            renderer: TurnRenderer,
        }
    }

    /// Process one raw response to completion
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError`] only when the response cannot be parsed, in
    /// which case nothing was rendered and no audio played. Widget failures
    /// are reported in [`DispatchOutcome::failure`] instead.
    pub fn display_response(&mut self, raw: &str) -> Result<DispatchOutcome, DisplayError> {
        let response = match AgentResponse::parse(raw) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping unparseable response");
                return Err(e);
            }
        };

        self.renderer.render(&response.turn(), &mut self.surface);

        let kind = classify_response(&response);
        let mut outcome = DispatchOutcome {
            kind,
            handle: None,
            failure: None,
        };

        if let Some(payload) = &response.display {
            match self.registry.dispatch(
                kind,
                payload,
                &response.intent,
                &mut self.surface,
                &self.factory,
            ) {
                Ok(handle) => outcome.handle = handle,
                Err(e) => {
                    tracing::warn!(
                        kind = kind.as_str(),
                        intent = %response.intent,
                        error = %e,
                        "Widget skipped"
                    );
                    outcome.failure = Some(e);
                }
            }
        }

        if let Err(e) = self.audio.play(raw) {
            tracing::warn!(error = %e, "Audio playback failed");
        }

        Ok(outcome)
    }

    /// Advance the running countdown by `elapsed`
    pub fn tick(&mut self, elapsed: Duration) -> TickOutcome {
        self.registry.tick(elapsed, &mut self.surface)
    }

    /// Stop the running countdown; false when none is running
    pub fn cancel_timer(&mut self) -> bool {
        self.registry.cancel_timer(&mut self.surface)
    }

    /// The surface being rendered to
    pub fn surface(&self) -> &M {
        &self.surface
    }

    /// Session widget state
    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    /// The audio collaborator
    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Take the surface back, ending the session
    pub fn into_surface(self) -> M {
        self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::error::AudioError;
    use crate::turn::Role;

    struct BrokenAudio;

    impl AudioOutput for BrokenAudio {
        fn play(&mut self, _raw: &str) -> Result<(), AudioError> {
            Err(AudioError("no speaker".to_string()))
        }
    }

    fn recording() -> DisplayDispatcher<DisplaySurface, JsonWidgetFactory, RecordingAudio> {
        DisplayDispatcher::from_parts(
            DisplaySurface::new(),
            JsonWidgetFactory::new(),
            RecordingAudio::default(),
        )
    }

    #[test]
    fn test_parse_error_renders_nothing() {
        let mut dispatcher = recording();
        assert!(dispatcher.display_response("{oops").is_err());
        assert!(dispatcher.surface().log_nodes().is_empty());
        assert!(dispatcher.audio().played().is_empty());
    }

    #[test]
    fn test_text_only_turn() {
        let mut dispatcher = recording();
        let raw = r#"{"userInput":"hi","fulfillmentText":"hello","intent":"maps.search"}"#;
        let outcome = dispatcher.display_response(raw).unwrap();

        assert_eq!(outcome.kind, DisplayKind::None);
        assert_eq!(outcome.handle, None);
        let entries: Vec<_> = dispatcher.surface().entries().collect();
        assert_eq!(entries, vec![(Role::User, "hi"), (Role::Agent, "hello")]);
        assert_eq!(dispatcher.audio().played(), &[raw.to_string()]);
    }

    #[test]
    fn test_widget_failure_keeps_text_and_audio() {
        let mut dispatcher = recording();
        let raw = r#"{"userInput":"map","fulfillmentText":"here","intent":"maps.search","display":"{\"label\":\"x\"}"}"#;
        let outcome = dispatcher.display_response(raw).unwrap();

        assert_eq!(outcome.kind, DisplayKind::MapSearch);
        assert!(outcome.widget_failed());
        assert_eq!(dispatcher.surface().entries().count(), 2);
        assert_eq!(dispatcher.surface().widgets().count(), 0);
        assert_eq!(dispatcher.audio().played().len(), 1);
    }

    #[test]
    fn test_audio_failure_is_not_fatal() {
        let mut dispatcher =
            DisplayDispatcher::from_parts(DisplaySurface::new(), JsonWidgetFactory::new(), BrokenAudio);
        let outcome = dispatcher
            .display_response(r#"{"userInput":"a","fulfillmentText":"b","intent":"x"}"#)
            .unwrap();
        assert!(!outcome.widget_failed());
        assert_eq!(dispatcher.surface().entries().count(), 2);
    }

    #[test]
    fn test_tick_and_cancel_reach_timer() {
        let mut dispatcher = DisplayDispatcher::new();
        dispatcher
            .display_response(
                r#"{"userInput":"snooze","fulfillmentText":"ok","intent":"reminders.snooze","display":"120"}"#,
            )
            .unwrap();
        assert!(matches!(
            dispatcher.tick(Duration::from_secs(30)),
            TickOutcome::Running { .. }
        ));
        assert_eq!(dispatcher.surface().timers()[0].text, "01:30");
        assert!(dispatcher.cancel_timer());
        assert_eq!(dispatcher.tick(Duration::from_secs(1)), TickOutcome::Inert);
    }
}
