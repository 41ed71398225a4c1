//! Error Types
//!
//! Every failure the dispatcher can observe. None of these are fatal to a
//! session: the worst outcome of any turn is "text rendered, widget absent",
//! and a parse failure only drops the one malformed turn.

use thiserror::Error;

use crate::classifier::DisplayKind;
use crate::mount::{Region, WidgetHandle};

/// Errors surfaced by [`crate::DisplayDispatcher::display_response`]
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The raw response is not valid JSON
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The raw response parsed, but is not a JSON object
    #[error("response must be a JSON object, got {found}")]
    NotAnObject {
        /// JSON type that was received instead
        found: &'static str,
    },
}

impl DisplayError {
    /// Short category name for diagnostics
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) | Self::NotAnObject { .. } => "parse",
        }
    }
}

/// A widget could not be built or mounted
///
/// Caught at the dispatch boundary. The turn's text stays visible.
#[derive(Debug, Error)]
pub enum WidgetMountError {
    /// The payload does not have the shape the widget factory expects
    #[error("malformed {kind} payload: {source}")]
    MalformedPayload {
        /// Display kind whose factory rejected the payload
        kind: DisplayKind,
        /// Underlying deserialization failure
        #[source]
        source: serde_json::Error,
    },

    /// The payload has a JSON type the widget cannot use at all
    #[error("{kind} payload must be {expected}")]
    UnsupportedPayload {
        /// Display kind being rendered
        kind: DisplayKind,
        /// Human-readable description of what was expected
        expected: &'static str,
    },

    /// A region required by the widget is not present on the surface
    #[error("display region '{0}' is missing")]
    MissingRegion(Region),

    /// No mounted widget has this handle
    #[error("no mounted widget {0}")]
    UnknownWidget(WidgetHandle),

    /// A custom factory failed for its own reasons
    #[error("{kind} factory failed: {message}")]
    Factory {
        /// Display kind being rendered
        kind: DisplayKind,
        /// Factory-provided description
        message: String,
    },
}

/// Audio output collaborator failure
#[derive(Debug, Error)]
#[error("audio output failed: {0}")]
pub struct AudioError(pub String);

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::config::DisplayToml`]
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that was parsed
        path: String,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// An environment override holds an unusable value
    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv {
        /// Environment variable name
        var: &'static str,
        /// Raw value found
        value: String,
    },
}
