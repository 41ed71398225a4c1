//! Response Transcript
//!
//! A queue of raw agent responses, one JSON document per line. Blank lines
//! are skipped; everything else is handed to the dispatcher as-is, so a
//! malformed line shows up as a dropped response rather than a load error.

use std::collections::VecDeque;
use std::path::Path;

use anyhow::Context;

/// Responses waiting to be delivered
#[derive(Debug, Default)]
pub struct Transcript {
    pending: VecDeque<String>,
    total: usize,
}

impl Transcript {
    /// Parse a JSON-lines document
    pub fn from_lines(text: &str) -> Self {
        let pending: VecDeque<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            total: pending.len(),
            pending,
        }
    }

    /// Read a transcript file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript: {}", path.display()))?;
        let transcript = Self::from_lines(&text);
        tracing::info!(path = %path.display(), responses = transcript.total, "Transcript loaded");
        Ok(transcript)
    }

    /// Take the next response
    pub fn next_response(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    /// Responses already taken
    pub fn delivered(&self) -> usize {
        self.total - self.pending.len()
    }

    /// Responses in the transcript
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether everything has been delivered
    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_lines_skipped() {
        let mut transcript = Transcript::from_lines("{\"a\":1}\n\n   \n{\"b\":2}\n");
        assert_eq!(transcript.total(), 2);
        assert_eq!(transcript.next_response().as_deref(), Some("{\"a\":1}"));
        assert_eq!(transcript.delivered(), 1);
        assert!(!transcript.is_finished());
        assert_eq!(transcript.next_response().as_deref(), Some("{\"b\":2}"));
        assert!(transcript.is_finished());
        assert_eq!(transcript.next_response(), None);
    }

    #[test]
    fn test_missing_file() {
        let err = Transcript::load(Path::new("/nonexistent/transcript.jsonl")).unwrap_err();
        assert!(err.to_string().contains("Failed to read transcript"));
    }
}
