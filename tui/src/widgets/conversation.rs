//! Conversation Log
//!
//! Flattens the log region into wrapped, styled lines: entries with their
//! speaker prefix, widgets as a header line plus an indented body.

use ratatui::style::Style;
use ratatui::text::Line;

use display_core::{BookInfoMode, BookList, LogNode, Widget};

use crate::theme::{role_style, widget_body, widget_header};

const INDENT: &str = "  ";

/// Build the lines for every node in the log
///
/// `more_visible` reflects the "more results" control; book lists only
/// advertise further pages while it is shown.
pub fn log_lines(nodes: &[LogNode], width: usize, more_visible: bool) -> Vec<Line<'static>> {
    let width = width.max(10);
    let mut lines = Vec::new();

    for node in nodes {
        match node {
            LogNode::Entry { role, text, .. } => {
                push_wrapped(&mut lines, &format!("{}{text}", role.prefix()), width, role_style(*role));
            }
            LogNode::Widget {
                widget, interactive, ..
            } => {
                let (header, body) = describe(widget, *interactive, more_visible);
                push_wrapped(&mut lines, &header, width, widget_header());
                for row in body {
                    push_wrapped(&mut lines, &format!("{INDENT}{row}"), width, widget_body());
                }
            }
        }
        lines.push(Line::default());
    }

    lines
}

fn push_wrapped(lines: &mut Vec<Line<'static>>, text: &str, width: usize, style: Style) {
    if text.is_empty() {
        lines.push(Line::default());
        return;
    }
    for row in textwrap::wrap(text, width) {
        lines.push(Line::styled(row.into_owned(), style));
    }
}

/// Header line and body rows for one widget
fn describe(widget: &Widget, interactive: bool, more_visible: bool) -> (String, Vec<String>) {
    match widget {
        Widget::LocationMap(map) => {
            let mut body = vec![format!("{:.4}, {:.4}", map.lat, map.lng)];
            if let Some(zoom) = map.zoom {
                body.push(format!("zoom {zoom}"));
            }
            (format!("[map] {}", fallback(&map.label, "Location")), body)
        }
        Widget::NearestPlaces(nearby) => {
            let header = if nearby.query.is_empty() {
                "[nearby]".to_string()
            } else {
                format!("[nearby] {}", nearby.query)
            };
            let body = nearby
                .places
                .iter()
                .enumerate()
                .map(|(i, place)| {
                    let mut row = format!("{}. {}", i + 1, place.name);
                    if let Some(address) = &place.address {
                        row.push_str(&format!(" - {address}"));
                    }
                    if let Some(rating) = place.rating {
                        row.push_str(&format!(" ({rating:.1})"));
                    }
                    row
                })
                .collect();
            (header, body)
        }
        Widget::BookList(list) => book_list(list, more_visible),
        Widget::BookInfo(info) => {
            let book = &info.book;
            let mut header = format!("[book] {}", book.title);
            if !book.authors.is_empty() {
                header.push_str(&format!(" by {}", book.authors.join(", ")));
            }
            let body = match info.mode {
                BookInfoMode::Description => vec![book
                    .description
                    .clone()
                    .unwrap_or_else(|| "No description available".to_string())],
                BookInfoMode::Preview => vec![match book.preview_link.as_ref().or(book.info_link.as_ref()) {
                    Some(link) => format!("Preview: {link}"),
                    None => "No preview available".to_string(),
                }],
            };
            (header, body)
        }
        Widget::WorkoutList(list) => {
            let body = list
                .workouts
                .iter()
                .map(|workout| {
                    let mut row = format!("- {}", workout.title);
                    if let Some(duration) = &workout.duration {
                        row.push_str(&format!(" ({duration})"));
                    }
                    if let Some(channel) = &workout.channel {
                        row.push_str(&format!(" / {channel}"));
                    }
                    row
                })
                .collect();
            ("[workouts]".to_string(), body)
        }
        Widget::KeywordList(list) => {
            let mut body = Vec::new();
            for found in &list.results {
                body.push(format!("- {}", found.text));
                // Context is only reachable once listeners are attached
                if interactive {
                    body.extend(found.context.iter().map(|ctx| format!("{INDENT}> {ctx}")));
                }
            }
            if list.results.is_empty() {
                body.push("Nothing remembered".to_string());
            }
            (format!("[memory] \"{}\"", list.keyword), body)
        }
    }
}

fn book_list(list: &BookList, more_visible: bool) -> (String, Vec<String>) {
    let header = match (list.books.len(), list.total_results) {
        (0, _) => "[books] no results".to_string(),
        (count, Some(total)) => format!(
            "[books] {}-{} of {total}",
            list.start_index + 1,
            list.start_index + count
        ),
        (count, None) => format!("[books] {count}"),
    };
    let mut body: Vec<String> = list
        .books
        .iter()
        .map(|book| {
            let mut row = format!("- {}", book.title);
            if let Some(author) = book.authors.first() {
                row.push_str(&format!(" by {author}"));
            }
            if let Some(date) = &book.published_date {
                row.push_str(&format!(" ({date})"));
            }
            row
        })
        .collect();
    if list.has_more() && more_visible {
        body.push("Say \"more\" for the next page".to_string());
    }
    (header, body)
}

fn fallback<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}
