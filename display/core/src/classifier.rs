//! Intent Classifier
//!
//! Maps an intent identifier to the widget category it should render.
//!
//! Matching is by substring containment over an ordered rule table. The first
//! rule with any matching needle wins, so the order of [`INTENT_RULES`] is the
//! precedence: an intent mentioning both `books.search` and `books.preview`
//! resolves to [`DisplayKind::BookList`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::response::AgentResponse;

/// Widget category selected for a response
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayKind {
    /// Countdown timer in the media-display region
    Timer,
    /// Greeting header update with the user's new name
    NameChange,
    /// Single-location map
    MapSearch,
    /// Nearest-places map
    MapFind,
    /// Paginated book results
    BookList,
    /// Description or preview of one book
    BookDetail,
    /// Workout video list
    WorkoutList,
    /// Past conversations matching a keyword
    MemoryKeyword,
    /// Text-only turn
    None,
}

impl DisplayKind {
    /// Stable name used in logs and error messages
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timer => "timer",
            Self::NameChange => "name-change",
            Self::MapSearch => "map-search",
            Self::MapFind => "map-find",
            Self::BookList => "book-list",
            Self::BookDetail => "book-detail",
            Self::WorkoutList => "workout-list",
            Self::MemoryKeyword => "memory-keyword",
            Self::None => "none",
        }
    }

    /// Whether this kind mounts or updates anything
    #[must_use]
    pub fn is_widget(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for DisplayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the classification table
#[derive(Clone, Copy, Debug)]
pub struct IntentRule {
    /// Substrings, any of which selects this rule
    pub needles: &'static [&'static str],
    /// Kind produced when the rule matches
    pub kind: DisplayKind,
}

impl IntentRule {
    /// Whether the intent contains any of this rule's needles
    #[must_use]
    pub fn matches(&self, intent: &str) -> bool {
        self.needles.iter().any(|needle| intent.contains(needle))
    }
}

/// Classification rules, highest precedence first
pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        needles: &["reminders.snooze"],
        kind: DisplayKind::Timer,
    },
    IntentRule {
        needles: &["name.user.change"],
        kind: DisplayKind::NameChange,
    },
    IntentRule {
        needles: &["maps.search"],
        kind: DisplayKind::MapSearch,
    },
    IntentRule {
        needles: &["maps.find"],
        kind: DisplayKind::MapFind,
    },
    IntentRule {
        needles: &[
            "books.search",
            "books.more",
            "books.previous",
            "books.results",
        ],
        kind: DisplayKind::BookList,
    },
    IntentRule {
        needles: &["books.description", "books.preview"],
        kind: DisplayKind::BookDetail,
    },
    IntentRule {
        needles: &["workout.find"],
        kind: DisplayKind::WorkoutList,
    },
    IntentRule {
        needles: &["memory.keyword"],
        kind: DisplayKind::MemoryKeyword,
    },
];

/// Classify an intent string
///
/// Total and pure: unknown intents resolve to [`DisplayKind::None`].
#[must_use]
pub fn classify(intent: &str) -> DisplayKind {
    INTENT_RULES
        .iter()
        .find(|rule| rule.matches(intent))
        .map_or(DisplayKind::None, |rule| rule.kind)
}

/// Classify a full response
///
/// A response without a display payload never mounts a widget, whatever its
/// intent says.
#[must_use]
pub fn classify_response(response: &AgentResponse) -> DisplayKind {
    if response.display.is_none() {
        return DisplayKind::None;
    }
    classify(&response.intent)
}
