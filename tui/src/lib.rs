//! Agent TUI - Terminal surface for the display dispatcher
//!
//! Plays a transcript of agent responses through
//! [`display_core::DisplayDispatcher`] and renders the resulting regions in a
//! full-screen terminal.
//!
//! # Architecture
//!
//! - **App**: event loop, transcript delivery, countdown ticks
//! - **Widgets**: conversation log, media column, scrollable text block
//! - **Transcript**: JSON-lines response queue
//! - **Theme**: colors per region

pub mod app;
pub mod theme;
pub mod transcript;
pub mod widgets;

pub use app::{App, Notice};
pub use transcript::Transcript;
