//! Terminal widgets for the display surface

pub mod conversation;
pub mod media;
pub mod text_block;

pub use conversation::log_lines;
pub use media::{media_panel, timer_lines, MEDIA_WIDTH};
pub use text_block::{TextBlock, TextBlockState};
