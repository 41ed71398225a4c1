//! Media Panel
//!
//! The right-hand column that holds timer nodes.

use ratatui::layout::Alignment;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use display_core::TimerNode;

use crate::theme::{DIM_GRAY, TIMER_YELLOW, WIDGET_CYAN};

/// Width of the media column, borders included
pub const MEDIA_WIDTH: u16 = 24;

/// Lines for the timer nodes currently mounted
pub fn timer_lines(timers: &[TimerNode]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for node in timers {
        let label = node.label.clone().unwrap_or_else(|| "Timer".to_string());
        lines.push(Line::styled(label, Style::default().fg(WIDGET_CYAN)));
        lines.push(Line::styled(
            node.text.clone(),
            Style::default().fg(TIMER_YELLOW).add_modifier(Modifier::BOLD),
        ));
        let state = if node.running {
            "running"
        } else if node.text.trim_start_matches(['0', ':']).is_empty() {
            "time's up"
        } else {
            "stopped"
        };
        lines.push(Line::styled(state, Style::default().fg(DIM_GRAY)));
        lines.push(Line::default());
    }
    lines
}

/// The media column as a bordered paragraph
pub fn media_panel(timers: &[TimerNode]) -> Paragraph<'static> {
    Paragraph::new(timer_lines(timers))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::LEFT)
                .border_style(Style::default().fg(DIM_GRAY)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use display_core::WidgetHandle;
    use pretty_assertions::assert_eq;

    fn node(text: &str, running: bool) -> TimerNode {
        TimerNode {
            handle: WidgetHandle(1),
            label: None,
            text: text.to_string(),
            running,
        }
    }

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_running_timer() {
        assert_eq!(
            plain(&timer_lines(&[node("04:59", true)])),
            vec!["Timer", "04:59", "running", ""]
        );
    }

    #[test]
    fn test_finished_and_cancelled_timers() {
        assert_eq!(plain(&timer_lines(&[node("00:00", false)]))[2], "time's up");
        assert_eq!(plain(&timer_lines(&[node("01:10", false)]))[2], "stopped");
    }

    #[test]
    fn test_empty_region_has_no_lines() {
        assert!(timer_lines(&[]).is_empty());
    }
}
