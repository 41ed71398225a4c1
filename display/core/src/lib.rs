//! Display Core - Headless Intent-Driven Display Dispatcher
//!
//! This crate renders the client side of a conversational agent without
//! knowing what it renders onto. Each agent response is turned into:
//!
//! 1. two conversation-log entries (what the user said, what the agent said)
//! 2. at most one specialized widget chosen by the response's intent
//!
//! # Architecture
//!
//! ```text
//!   raw response (JSON)
//!          │
//!          ▼
//!   ┌──────────────┐   ┌───────────────┐   ┌──────────────────────────┐
//!   │ AgentResponse│──▶│ TurnRenderer  │──▶│ conversation log         │
//!   └──────┬───────┘   └───────────────┘   │                          │
//!          │                               │      MountPoint          │
//!          ▼                               │  (DisplaySurface, TUI)   │
//!   ┌──────────────┐   ┌───────────────┐   │                          │
//!   │  classify()  │──▶│WidgetRegistry │──▶│ log / greeting / media   │
//!   └──────────────┘   │ timer slot    │   └──────────────────────────┘
//!                      │ more control  │
//!                      └───────┬───────┘
//!                              ▼
//!                       WidgetFactory (payload → widget)
//! ```
//!
//! # Key Types
//!
//! - [`DisplayDispatcher`]: the per-response pipeline
//! - [`DisplayKind`]: the closed set of widget categories
//! - [`WidgetRegistry`]: session state (one timer, one "more" control)
//! - [`MountPoint`]: the regions a surface exposes
//! - [`SessionLoop`]: async driver with a recurring countdown tick
//!
//! # Quick Start
//!
//! ```
//! use display_core::DisplayDispatcher;
//!
//! let mut dispatcher = DisplayDispatcher::new();
//! dispatcher
//!     .display_response(
//!         r#"{"userInput":"call me Sam","fulfillmentText":"Okay Sam",
//!             "intent":"name.user.change","display":"Sam"}"#,
//!     )
//!     .unwrap();
//! assert_eq!(
//!     dispatcher.surface().greeting(),
//!     Some("Hi Sam, what can I help you with?")
//! );
//! ```
//!
//! # No UI Dependencies
//!
//! Nothing here depends on a terminal or browser toolkit; surfaces implement
//! [`MountPoint`] and render what it holds.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod audio;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod mount;
pub mod registry;
pub mod response;
pub mod session;
pub mod timer;
pub mod turn;
pub mod widgets;

// Re-exports for convenience
pub use audio::{AudioOutput, NullAudio, RecordingAudio};
pub use classifier::{classify, classify_response, DisplayKind, IntentRule, INTENT_RULES};
pub use config::{
    default_config_path, load_config, load_config_from_path, log_cap, ConfigOverrides,
    ConfigSource, DisplayConfig, DisplayToml, MIN_LOG_NODES,
};
pub use dispatcher::{DispatchOutcome, DisplayDispatcher};
pub use error::{AudioError, ConfigError, DisplayError, WidgetMountError};
pub use mount::{
    greeting_text, DisplaySurface, LogNode, MountPoint, NodeId, Region, TimerNode, WidgetHandle,
    DEFAULT_GREETING,
};
pub use registry::{MoreAffordanceState, WidgetRegistry};
pub use response::{AgentResponse, DisplayPayload};
pub use session::{SessionLoop, SessionSummary};
pub use timer::{CountdownTimer, TerminationCause, TickOutcome, TimerPhase, TimerWidgetState};
pub use turn::{RenderedTurn, Role, Turn, TurnRenderer};
pub use widgets::{
    Book, BookInfo, BookInfoMode, BookList, JsonWidgetFactory, KeywordList, KeywordMatch,
    LocationMap, NearestPlaces, Place, TimerSpec, Widget, WidgetFactory, Workout, WorkoutList,
};
