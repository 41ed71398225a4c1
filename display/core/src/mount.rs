//! Display Mount Point
//!
//! The regions a surface exposes to the dispatcher:
//!
//! - **conversation log**: text entries and appended widgets, in order
//! - **greeting header**: one line of text
//! - **media display**: timer-tagged nodes, swapped rather than appended
//!
//! [`MountPoint`] is the seam between the dispatcher and whatever actually
//! draws (a terminal, a browser, a test). [`DisplaySurface`] is the in-memory
//! implementation used headless and by the TUI.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::log_cap;
use crate::error::WidgetMountError;
use crate::turn::Role;
use crate::widgets::Widget;

/// Greeting shown before any name is known
pub const DEFAULT_GREETING: &str = "Hi, what can I help you with?";

/// Build the greeting header text for a name
#[must_use]
pub fn greeting_text(name: &str) -> String {
    if name.is_empty() {
        DEFAULT_GREETING.to_string()
    } else {
        format!("Hi {name}, what can I help you with?")
    }
}

/// Named display regions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    /// The scrolling conversation log
    ConversationLog,
    /// The greeting header
    Greeting,
    /// The timer-tagged media-display region
    MediaDisplay,
}

impl Region {
    /// DOM-style region name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::ConversationLog => "conversation-log",
            Region::Greeting => "greeting",
            Region::MediaDisplay => "media-display",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a node in the conversation log
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Identity of a mounted widget
///
/// Allocated from a monotonic counter by the registry and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WidgetHandle(pub u64);

impl fmt::Display for WidgetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget_{}", self.0)
    }
}

/// A node in the conversation log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum LogNode {
    /// A line of conversation
    Entry {
        /// Node id
        id: NodeId,
        /// Speaker
        role: Role,
        /// Text as received (may be empty)
        text: String,
    },
    /// A specialized widget
    Widget {
        /// Node id
        id: NodeId,
        /// Handle the registry assigned
        handle: WidgetHandle,
        /// Rendered widget
        widget: Widget,
        /// Whether interaction listeners were attached
        interactive: bool,
    },
}

impl LogNode {
    /// Node id
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            LogNode::Entry { id, .. } | LogNode::Widget { id, .. } => *id,
        }
    }
}

/// A timer-tagged node in the media-display region
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerNode {
    /// Handle of the countdown this node shows
    pub handle: WidgetHandle,
    /// Optional caption
    pub label: Option<String>,
    /// Remaining time text (`MM:SS`)
    pub text: String,
    /// Whether the countdown is still running
    pub running: bool,
}

/// Where the dispatcher puts things
pub trait MountPoint {
    /// Whether a region exists on this surface
    fn has_region(&self, region: Region) -> bool;

    /// Append a conversation entry
    ///
    /// Never fails; returns `None` when there is no log to append to.
    fn append_entry(&mut self, role: Role, text: &str) -> Option<NodeId>;

    /// Append a widget to the conversation log
    ///
    /// # Errors
    ///
    /// Fails with [`WidgetMountError::MissingRegion`] if the log is absent.
    fn append_widget(
        &mut self,
        handle: WidgetHandle,
        widget: Widget,
    ) -> Result<NodeId, WidgetMountError>;

    /// Mark a mounted widget as interactive
    ///
    /// # Errors
    ///
    /// Fails if no widget with this handle is mounted.
    fn attach_listeners(&mut self, handle: WidgetHandle) -> Result<(), WidgetMountError>;

    /// Replace the greeting header text
    ///
    /// # Errors
    ///
    /// Fails with [`WidgetMountError::MissingRegion`] if there is no header.
    fn set_greeting(&mut self, text: String) -> Result<(), WidgetMountError>;

    /// Handles of the timer-tagged nodes currently mounted, oldest first
    fn timer_nodes(&self) -> Vec<WidgetHandle>;

    /// Mount a timer node in the media-display region
    ///
    /// # Errors
    ///
    /// Fails with [`WidgetMountError::MissingRegion`] if the region is absent.
    fn mount_timer(&mut self, node: TimerNode) -> Result<(), WidgetMountError>;

    /// Refresh a timer node's text; unknown handles are ignored
    fn update_timer(&mut self, handle: WidgetHandle, text: &str, running: bool);

    /// Remove a timer node; returns whether it was present
    fn detach_timer(&mut self, handle: WidgetHandle) -> bool;

    /// Show or hide the "more results" control
    fn set_more_affordance(&mut self, visible: bool);
}

/// In-memory display surface
#[derive(Clone, Debug, Serialize)]
pub struct DisplaySurface {
    log: Option<Vec<LogNode>>,
    greeting: Option<String>,
    media: Option<Vec<TimerNode>>,
    more_affordance_visible: bool,
    #[serde(skip)]
    next_node: u64,
    #[serde(skip)]
    max_log_nodes: usize,
}

impl Default for DisplaySurface {
    fn default() -> Self {
        Self {
            log: Some(Vec::new()),
            greeting: Some(DEFAULT_GREETING.to_string()),
            media: Some(Vec::new()),
            more_affordance_visible: true,
            next_node: 0,
            max_log_nodes: 0,
        }
    }
}

impl DisplaySurface {
    /// A surface with every region present
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the conversation log (0 = unlimited); oldest nodes go first
    ///
    /// Non-zero caps are raised to [`crate::config::MIN_LOG_NODES`] so a turn keeps both entries.
    #[must_use]
    pub fn with_max_log_nodes(mut self, max: usize) -> Self {
        self.max_log_nodes = log_cap(max);
        self
    }

    /// Remove a region, as a page without that element would
    #[must_use]
    pub fn without_region(mut self, region: Region) -> Self {
        match region {
            Region::ConversationLog => self.log = None,
            Region::Greeting => self.greeting = None,
            Region::MediaDisplay => self.media = None,
        }
        self
    }

    /// Conversation log nodes, oldest first
    #[must_use]
    pub fn log_nodes(&self) -> &[LogNode] {
        self.log.as_deref().unwrap_or_default()
    }

    /// Conversation entries as `(role, text)` pairs
    pub fn entries(&self) -> impl Iterator<Item = (Role, &str)> {
        self.log_nodes().iter().filter_map(|node| match node {
            LogNode::Entry { role, text, .. } => Some((*role, text.as_str())),
            LogNode::Widget { .. } => None,
        })
    }

    /// Widgets appended to the log, oldest first
    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.log_nodes().iter().filter_map(|node| match node {
            LogNode::Widget { widget, .. } => Some(widget),
            LogNode::Entry { .. } => None,
        })
    }

    /// Current greeting header text
    #[must_use]
    pub fn greeting(&self) -> Option<&str> {
        self.greeting.as_deref()
    }

    /// Timer nodes in the media-display region
    #[must_use]
    pub fn timers(&self) -> &[TimerNode] {
        self.media.as_deref().unwrap_or_default()
    }

    /// Whether the "more results" control is showing
    #[must_use]
    pub fn more_affordance_visible(&self) -> bool {
        self.more_affordance_visible
    }

    fn push_node(&mut self, build: impl FnOnce(NodeId) -> LogNode) -> Option<NodeId> {
        let log = self.log.as_mut()?;
        let id = NodeId(self.next_node);
        self.next_node += 1;
        log.push(build(id));
        if self.max_log_nodes > 0 && log.len() > self.max_log_nodes {
            let excess = log.len() - self.max_log_nodes;
            log.drain(..excess);
        }
        Some(id)
    }
}

impl MountPoint for DisplaySurface {
    fn has_region(&self, region: Region) -> bool {
        match region {
            Region::ConversationLog => self.log.is_some(),
            Region::Greeting => self.greeting.is_some(),
            Region::MediaDisplay => self.media.is_some(),
        }
    }

    fn append_entry(&mut self, role: Role, text: &str) -> Option<NodeId> {
        let id = self.push_node(|id| LogNode::Entry {
            id,
            role,
            text: text.to_string(),
        });
        if id.is_none() {
            tracing::warn!(role = ?role, "No conversation log region, entry dropped");
        }
        id
    }

    fn append_widget(
        &mut self,
        handle: WidgetHandle,
        widget: Widget,
    ) -> Result<NodeId, WidgetMountError> {
        self.push_node(|id| LogNode::Widget {
            id,
            handle,
            widget,
            interactive: false,
        })
        .ok_or(WidgetMountError::MissingRegion(Region::ConversationLog))
    }

    fn attach_listeners(&mut self, handle: WidgetHandle) -> Result<(), WidgetMountError> {
        let log = self
            .log
            .as_mut()
            .ok_or(WidgetMountError::MissingRegion(Region::ConversationLog))?;
        for node in log.iter_mut().rev() {
            if let LogNode::Widget {
                handle: h,
                interactive,
                ..
            } = node
            {
                if *h == handle {
                    *interactive = true;
                    return Ok(());
                }
            }
        }
        Err(WidgetMountError::UnknownWidget(handle))
    }

    fn set_greeting(&mut self, text: String) -> Result<(), WidgetMountError> {
        let greeting = self
            .greeting
            .as_mut()
            .ok_or(WidgetMountError::MissingRegion(Region::Greeting))?;
        *greeting = text;
        Ok(())
    }

    fn timer_nodes(&self) -> Vec<WidgetHandle> {
        self.timers().iter().map(|node| node.handle).collect()
    }

    fn mount_timer(&mut self, node: TimerNode) -> Result<(), WidgetMountError> {
        self.media
            .as_mut()
            .ok_or(WidgetMountError::MissingRegion(Region::MediaDisplay))?
            .push(node);
        Ok(())
    }

    fn update_timer(&mut self, handle: WidgetHandle, text: &str, running: bool) {
        if let Some(node) = self
            .media
            .as_mut()
            .and_then(|media| media.iter_mut().find(|node| node.handle == handle))
        {
            node.text = text.to_string();
            node.running = running;
        }
    }

    fn detach_timer(&mut self, handle: WidgetHandle) -> bool {
        let Some(media) = self.media.as_mut() else {
            return false;
        };
        let before = media.len();
        media.retain(|node| node.handle != handle);
        media.len() != before
    }

    fn set_more_affordance(&mut self, visible: bool) {
        self.more_affordance_visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{LocationMap, Widget};

    fn map() -> Widget {
        Widget::LocationMap(LocationMap {
            label: "Ferry Building".to_string(),
            lat: 37.7955,
            lng: -122.3937,
            zoom: None,
        })
    }

    fn timer_node(id: u64) -> TimerNode {
        TimerNode {
            handle: WidgetHandle(id),
            label: None,
            text: "05:00".to_string(),
            running: true,
        }
    }

    #[test]
    fn test_greeting_text() {
        assert_eq!(greeting_text("Sam"), "Hi Sam, what can I help you with?");
        assert_eq!(greeting_text(""), DEFAULT_GREETING);
        assert_eq!(DisplaySurface::new().greeting(), Some(DEFAULT_GREETING));
    }

    #[test]
    fn test_widgets_keep_log_order() {
        let mut surface = DisplaySurface::new();
        surface.append_entry(Role::User, "where is it");
        surface.append_widget(WidgetHandle(1), map()).unwrap();
        surface.append_entry(Role::Agent, "there");

        let ids: Vec<_> = surface.log_nodes().iter().map(LogNode::id).collect();
        assert_eq!(ids, vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(surface.widgets().count(), 1);
        assert_eq!(surface.entries().count(), 2);
    }

    #[test]
    fn test_log_cap_evicts_oldest() {
        let mut surface = DisplaySurface::new().with_max_log_nodes(3);
        for i in 0..5 {
            surface.append_entry(Role::User, &i.to_string());
        }
        let texts: Vec<_> = surface.entries().map(|(_, text)| text).collect();
        assert_eq!(texts, vec!["2", "3", "4"]);
    }

    #[test]
    fn test_log_cap_keeps_whole_turn() {
        let mut surface = DisplaySurface::new().with_max_log_nodes(1);
        surface.append_entry(Role::User, "hello");
        surface.append_entry(Role::Agent, "hi");
        let entries: Vec<_> = surface.entries().collect();
        assert_eq!(entries, vec![(Role::User, "hello"), (Role::Agent, "hi")]);
    }

    #[test]
    fn test_missing_regions() {
        let mut surface = DisplaySurface::new()
            .without_region(Region::ConversationLog)
            .without_region(Region::Greeting)
            .without_region(Region::MediaDisplay);

        assert_eq!(surface.append_entry(Role::User, "hi"), None);
        assert!(matches!(
            surface.append_widget(WidgetHandle(1), map()),
            Err(WidgetMountError::MissingRegion(Region::ConversationLog))
        ));
        assert!(matches!(
            surface.set_greeting("x".to_string()),
            Err(WidgetMountError::MissingRegion(Region::Greeting))
        ));
        assert!(matches!(
            surface.mount_timer(timer_node(2)),
            Err(WidgetMountError::MissingRegion(Region::MediaDisplay))
        ));
        assert!(!surface.detach_timer(WidgetHandle(2)));
    }

    #[test]
    fn test_timer_nodes_mount_update_detach() {
        let mut surface = DisplaySurface::new();
        surface.mount_timer(timer_node(1)).unwrap();
        surface.mount_timer(timer_node(2)).unwrap();
        assert_eq!(surface.timer_nodes(), vec![WidgetHandle(1), WidgetHandle(2)]);

        surface.update_timer(WidgetHandle(2), "04:59", true);
        assert_eq!(surface.timers()[1].text, "04:59");

        assert!(surface.detach_timer(WidgetHandle(1)));
        assert!(!surface.detach_timer(WidgetHandle(1)));
        assert_eq!(surface.timer_nodes(), vec![WidgetHandle(2)]);
    }

    #[test]
    fn test_attach_listeners_marks_widget() {
        let mut surface = DisplaySurface::new();
        surface.append_widget(WidgetHandle(7), map()).unwrap();
        surface.attach_listeners(WidgetHandle(7)).unwrap();
        assert!(matches!(
            surface.log_nodes()[0],
            LogNode::Widget { interactive: true, .. }
        ));
        assert!(matches!(
            surface.attach_listeners(WidgetHandle(8)),
            Err(WidgetMountError::UnknownWidget(WidgetHandle(8)))
        ));
    }
}
