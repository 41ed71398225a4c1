//! TextBlock Widget
//!
//! A borderless region of pre-wrapped lines, anchored to the bottom and
//! scrolled upward into history.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::StatefulWidget;

use crate::theme::{FADE_FAR, FADE_NEAR};

/// State for a scrollable text block
#[derive(Debug, Default)]
pub struct TextBlockState {
    /// Scroll offset (lines from bottom, 0 = latest)
    pub scroll_offset: usize,
    /// Total content lines at the last render
    pub total_lines: usize,
    /// Visible height at the last render
    pub height: usize,
}

impl TextBlockState {
    /// Scroll by delta (positive = back into history)
    pub fn scroll(&mut self, delta: isize) {
        self.scroll_offset = self
            .scroll_offset
            .saturating_add_signed(delta)
            .min(self.max_scroll());
    }

    /// Jump back to the latest line
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    /// Half the visible height, at least one line
    #[must_use]
    pub fn page(&self) -> usize {
        (self.height / 2).max(1)
    }

    fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.height)
    }
}

/// A borderless, bottom-anchored text block
pub struct TextBlock<'a> {
    lines: &'a [Line<'a>],
    fade: bool,
}

impl<'a> TextBlock<'a> {
    pub fn new(lines: &'a [Line<'a>]) -> Self {
        Self { lines, fade: true }
    }

    /// Dim the lines next to hidden content
    pub fn fade(mut self, fade: bool) -> Self {
        self.fade = fade;
        self
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let height = area.height as usize;
        state.total_lines = self.lines.len();
        state.height = height;
        state.scroll_offset = state.scroll_offset.min(state.max_scroll());

        let visible_end = state.total_lines - state.scroll_offset;
        let visible_start = visible_end.saturating_sub(height);
        let above = visible_start > 0;
        let below = state.scroll_offset > 0;
        let shown = visible_end - visible_start;

        for (i, line) in self.lines[visible_start..visible_end].iter().enumerate() {
            let y = area.y + i as u16;
            let shade = if !self.fade {
                None
            } else if above && i < 2 {
                Some(if i == 0 { FADE_FAR } else { FADE_NEAR })
            } else if below && i + 2 >= shown {
                Some(if i + 1 == shown { FADE_FAR } else { FADE_NEAR })
            } else {
                None
            };

            match shade {
                Some(color) => {
                    let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
                    buf.set_stringn(area.x, y, text, area.width as usize, Style::default().fg(color));
                }
                None => {
                    buf.set_line(area.x, y, line, area.width);
                }
            }
        }
    }
}
