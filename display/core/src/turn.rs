//! Turn Renderer
//!
//! Appends the textual half of every response to the conversation log: the
//! user's utterance first, then the agent's fulfillment text. This runs before
//! any widget work and cannot fail, so a broken widget never hides what was
//! said.

use serde::{Deserialize, Serialize};

use crate::mount::{MountPoint, NodeId};

/// One user-utterance / agent-response pair
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Turn {
    /// What the user said
    pub user_input: String,
    /// What the agent answered
    pub fulfillment_text: String,
}

impl Turn {
    /// Create a turn
    pub fn new(user_input: impl Into<String>, fulfillment_text: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            fulfillment_text: fulfillment_text.into(),
        }
    }
}

/// Who a log entry belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person talking to the agent
    User,
    /// The agent's reply
    Agent,
}

impl Role {
    /// Prefix used by text surfaces
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::User => "You: ",
            Role::Agent => "Agent: ",
        }
    }
}

/// Node ids produced by rendering one turn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderedTurn {
    /// The user entry, if the log region accepted it
    pub user: Option<NodeId>,
    /// The agent entry, if the log region accepted it
    pub agent: Option<NodeId>,
}

/// Stateless renderer for the textual part of a turn
#[derive(Clone, Copy, Debug, Default)]
pub struct TurnRenderer;

impl TurnRenderer {
    /// Append the user entry, then the agent entry
    pub fn render<M: MountPoint + ?Sized>(&self, turn: &Turn, mount: &mut M) -> RenderedTurn {
        let user = mount.append_entry(Role::User, &turn.user_input);
        let agent = mount.append_entry(Role::Agent, &turn.fulfillment_text);
        RenderedTurn { user, agent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mount::{DisplaySurface, LogNode};

    #[test]
    fn test_render_appends_user_then_agent() {
        let mut surface = DisplaySurface::new();
        let rendered = TurnRenderer.render(&Turn::new("hello", "hi there"), &mut surface);

        let nodes = surface.log_nodes();
        assert_eq!(nodes.len(), 2);
        assert!(matches!(&nodes[0], LogNode::Entry { role: Role::User, text, .. } if text == "hello"));
        assert!(matches!(&nodes[1], LogNode::Entry { role: Role::Agent, text, .. } if text == "hi there"));
        assert!(rendered.user.unwrap() < rendered.agent.unwrap());
    }

    #[test]
    fn test_empty_text_still_renders() {
        let mut surface = DisplaySurface::new();
        TurnRenderer.render(&Turn::default(), &mut surface);
        assert_eq!(surface.log_nodes().len(), 2);
    }

    #[test]
    fn test_role_prefix() {
        assert_eq!(Role::User.prefix(), "You: ");
        assert_eq!(Role::Agent.prefix(), "Agent: ");
    }
}
