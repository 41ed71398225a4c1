//! Audio Output
//!
//! Speech playback belongs to a collaborator. The dispatcher hands it the raw
//! response after the display work is done, whatever happened to the widget.

use crate::error::AudioError;

/// Plays the audio that accompanies a response
pub trait AudioOutput {
    /// Play the response
    ///
    /// # Errors
    ///
    /// Implementations report playback failures; the dispatcher logs them and
    /// carries on.
    fn play(&mut self, raw_response: &str) -> Result<(), AudioError>;
}

/// Audio output that does nothing (headless and terminal surfaces)
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudio;

impl AudioOutput for NullAudio {
    fn play(&mut self, _raw_response: &str) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Audio output that remembers what it was asked to play
#[derive(Clone, Debug, Default)]
pub struct RecordingAudio {
    played: Vec<String>,
}

impl RecordingAudio {
    /// Responses handed to playback, in order
    #[must_use]
    pub fn played(&self) -> &[String] {
        &self.played
    }
}

impl AudioOutput for RecordingAudio {
    fn play(&mut self, raw_response: &str) -> Result<(), AudioError> {
        self.played.push(raw_response.to_string());
        Ok(())
    }
}
