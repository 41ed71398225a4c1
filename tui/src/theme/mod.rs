//! Theme and Colors
//!
//! One palette for every region of the terminal surface.

use ratatui::style::{Color, Modifier, Style};

use display_core::Role;

// ============================================================================
// Conversation
// ============================================================================

/// User entries
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// Agent entries
pub const AGENT_MAGENTA: Color = Color::Magenta;

/// Widget headers in the log
pub const WIDGET_CYAN: Color = Color::Rgb(110, 200, 230);

/// Widget body text
pub const WIDGET_TEXT: Color = Color::Rgb(200, 200, 210);

// ============================================================================
// Chrome
// ============================================================================

/// Greeting header
pub const GREETING: Color = Color::Rgb(255, 182, 193);

/// Countdown digits
pub const TIMER_YELLOW: Color = Color::Rgb(255, 223, 128);

/// Status bar and hints
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Skipped widgets, unparseable responses
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Fade shades at the edges of a scrolled log
pub const FADE_FAR: Color = Color::Rgb(80, 80, 80);

/// Fade shade one line further in
pub const FADE_NEAR: Color = Color::Rgb(120, 120, 120);

/// Style for a conversation entry
#[must_use]
pub fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(USER_GREEN),
        Role::Agent => Style::default().fg(AGENT_MAGENTA),
    }
}

/// Style for the first line of a widget
#[must_use]
pub fn widget_header() -> Style {
    Style::default().fg(WIDGET_CYAN).add_modifier(Modifier::BOLD)
}

/// Style for the rest of a widget
#[must_use]
pub fn widget_body() -> Style {
    Style::default().fg(WIDGET_TEXT)
}
