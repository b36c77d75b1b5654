//! Conversation turns and per-conversation provenance.

use serde::{Deserialize, Serialize};

/// A single turn in a conversation.
///
/// Turns come off the wire in ShareGPT shape: a role name under `from` and
/// the message text under `value`. A turn may omit `value` only when it is
/// the last turn of the conversation, which asks the model to generate the
/// completion from that point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Role name, e.g. "human" or "gpt".
    pub from: String,
    /// Message text. Absent on a terminal completion turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Turn {
    /// Create a turn with a role and message text.
    pub fn new(from: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            value: Some(value.into()),
        }
    }

    /// Create a valueless turn requesting a completion for `from`.
    pub fn completion(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            value: None,
        }
    }

    /// Create a human turn.
    pub fn human(value: impl Into<String>) -> Self {
        Self::new("human", value)
    }

    /// Create an assistant ("gpt") turn.
    pub fn gpt(value: impl Into<String>) -> Self {
        Self::new("gpt", value)
    }
}

/// Provenance attached to a conversation.
///
/// Carried alongside the turns and handed to computed prefix and group
/// functions. Absent during pure inference, when provenance is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageProps {
    /// Whether the assistant turns were sourced from GPT-4.
    pub is_gpt4: bool,
}

impl MessageProps {
    /// Create provenance with the given GPT-4 flag.
    pub fn new(is_gpt4: bool) -> Self {
        Self { is_gpt4 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_constructors() {
        let turn = Turn::human("hi");
        assert_eq!(turn.from, "human");
        assert_eq!(turn.value.as_deref(), Some("hi"));

        let turn = Turn::gpt("yo");
        assert_eq!(turn.from, "gpt");

        let turn = Turn::completion("gpt");
        assert!(turn.value.is_none());
    }

    #[test]
    fn turn_deserializes_sharegpt_shape() {
        let turn: Turn = serde_json::from_str(r#"{"from": "human", "value": "hi"}"#).unwrap();
        assert_eq!(turn, Turn::human("hi"));

        // A completion turn carries no value.
        let turn: Turn = serde_json::from_str(r#"{"from": "gpt"}"#).unwrap();
        assert_eq!(turn, Turn::completion("gpt"));
    }

    #[test]
    fn turn_serializes_without_null_value() {
        let json = serde_json::to_string(&Turn::completion("gpt")).unwrap();
        assert_eq!(json, r#"{"from":"gpt"}"#);
    }
}
