//! Agent Responses
//!
//! The structured message the dialogue backend sends for every turn:
//!
//! ```json
//! {
//!   "userInput": "snooze for five minutes",
//!   "fulfillmentText": "Snoozing for 5 minutes.",
//!   "intent": "reminders.snooze",
//!   "display": "{\"seconds\":300}"
//! }
//! ```
//!
//! Parsing is strict about the envelope (it must be a JSON object) and
//! lenient about the fields inside it, because a turn with odd text must still
//! render and play audio.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DisplayError;

/// A parsed agent response
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    /// What the user said (as recognized upstream)
    pub user_input: String,
    /// What the agent answers
    pub fulfillment_text: String,
    /// Dot-delimited intent identifier
    pub intent: String,
    /// Widget payload, present only when a widget should render
    pub display: Option<DisplayPayload>,
    /// Redirect target emitted by some agents; carried but not acted on
    pub redirect: Option<String>,
}

impl AgentResponse {
    /// Parse a raw response
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError`] when `raw` is not JSON or not a JSON object.
    pub fn parse(raw: &str) -> Result<Self, DisplayError> {
        let value: Value = serde_json::from_str(raw)?;
        match value {
            Value::Object(map) => Ok(Self::from_object(map)),
            other => Err(DisplayError::NotAnObject {
                found: json_type(&other),
            }),
        }
    }

    fn from_object(mut map: Map<String, Value>) -> Self {
        let redirect = match map.remove("redirect") {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        };
        Self {
            user_input: text_field(&map, "userInput"),
            fulfillment_text: text_field(&map, "fulfillmentText"),
            intent: text_field(&map, "intent"),
            display: map.remove("display").and_then(DisplayPayload::from_value),
            redirect,
        }
    }

    /// The conversational part of this response
    #[must_use]
    pub fn turn(&self) -> crate::turn::Turn {
        crate::turn::Turn {
            user_input: self.user_input.clone(),
            fulfillment_text: self.fulfillment_text.clone(),
        }
    }
}

/// Read a field as display text, never failing
fn text_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Intent-specific widget payload
///
/// Opaque to the dispatcher; only widget factories look inside it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DisplayPayload(Value);

impl DisplayPayload {
    /// Wrap a JSON value, applying the front-end truthiness rule
    ///
    /// `null`, `false`, `0` and `""` mean "no payload".
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        let present = match &value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        };
        present.then_some(Self(value))
    }

    /// The payload exactly as received
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// The payload with one level of string encoding removed
    ///
    /// Agents serialize structured displays to a JSON string before the
    /// response is encoded. A string holding a JSON object or array is decoded;
    /// anything else (a plain name, a number) is returned unchanged.
    #[must_use]
    pub fn structured(&self) -> Value {
        if let Value::String(s) = &self.0 {
            let trimmed = s.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                if let Ok(decoded) = serde_json::from_str::<Value>(s) {
                    return decoded;
                }
            }
        }
        self.0.clone()
    }

    /// The payload as plain text, if it is a scalar
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match &self.0 {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<Value> for DisplayPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_response() {
        let response = AgentResponse::parse(
            r#"{"userInput":"find books","fulfillmentText":"Here's what I found.","intent":"books.search","display":"[{\"title\":\"Dune\"}]"}"#,
        )
        .unwrap();
        assert_eq!(response.user_input, "find books");
        assert_eq!(response.fulfillment_text, "Here's what I found.");
        assert_eq!(response.intent, "books.search");
        let display = response.display.unwrap();
        assert_eq!(display.structured(), json!([{"title": "Dune"}]));
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(
            AgentResponse::parse("not json"),
            Err(DisplayError::InvalidJson(_))
        ));
        assert!(matches!(
            AgentResponse::parse("[1, 2]"),
            Err(DisplayError::NotAnObject { found: "array" })
        ));
        assert!(matches!(
            AgentResponse::parse("null"),
            Err(DisplayError::NotAnObject { found: "null" })
        ));
    }

    #[test]
    fn test_missing_and_odd_fields_become_text() {
        let response = AgentResponse::parse(r#"{"fulfillmentText":null,"intent":42}"#).unwrap();
        assert_eq!(response.user_input, "");
        assert_eq!(response.fulfillment_text, "");
        assert_eq!(response.intent, "42");
        assert!(response.display.is_none());
    }

    #[test]
    fn test_falsy_display_is_absent() {
        for falsy in [json!(null), json!(false), json!(0), json!("")] {
            assert!(DisplayPayload::from_value(falsy.clone()).is_none(), "{falsy}");
        }
        for truthy in [json!("Sam"), json!(5), json!({}), json!([])] {
            assert!(DisplayPayload::from_value(truthy.clone()).is_some(), "{truthy}");
        }
    }

    #[test]
    fn test_plain_string_payload_stays_text() {
        let payload = DisplayPayload::from(json!("Sam"));
        assert_eq!(payload.structured(), json!("Sam"));
        assert_eq!(payload.as_text().as_deref(), Some("Sam"));

        // Looks like JSON but is not: kept verbatim
        let payload = DisplayPayload::from(json!("{not json"));
        assert_eq!(payload.structured(), json!("{not json"));
    }

    #[test]
    fn test_redirect_is_carried() {
        let response =
            AgentResponse::parse(r#"{"intent":"web.search","redirect":"https://example.com"}"#)
                .unwrap();
        assert_eq!(response.redirect.as_deref(), Some("https://example.com"));
    }
}
