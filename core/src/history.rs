//! Conversation history for a single guidance session.
//!
//! A [`Conversation`] lives exactly as long as the session that owns it. Nothing
//! here is persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// A turn is valid when its content has something besides whitespace.
    pub fn is_valid(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Append-only, ordered log of turns
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The full ordered history at call time.
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drops every turn, starting a fresh conversation.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_preserves_append_order() {
        let mut conversation = Conversation::new();
        let turns = vec![
            Turn::user("first"),
            Turn::assistant("second"),
            Turn::user("third"),
            Turn::assistant("fourth"),
        ];
        for turn in turns.clone() {
            conversation.append(turn);
        }

        assert_eq!(conversation.snapshot(), turns.as_slice());
    }

    #[test]
    fn test_append_lands_last_and_keeps_prior_turns() {
        let mut conversation = Conversation::new();
        conversation.append(Turn::user("a"));
        conversation.append(Turn::assistant("b"));
        let before = conversation.snapshot().to_vec();

        conversation.append(Turn::user("c"));

        let after = conversation.snapshot();
        assert_eq!(after.len(), 3);
        assert_eq!(&after[..2], before.as_slice());
        assert_eq!(after.last(), Some(&Turn::user("c")));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut conversation = Conversation::new();
        conversation.append(Turn::user("same"));
        conversation.append(Turn::user("same"));
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut conversation = Conversation::new();
        conversation.append(Turn::user("x"));
        conversation.clear();
        assert!(conversation.is_empty());
    }

    #[test]
    fn test_turn_wire_format() {
        let turn: Turn =
            serde_json::from_str(r#"{"role":"assistant","content":"Peace be upon you"}"#).unwrap();
        assert_eq!(turn, Turn::assistant("Peace be upon you"));
        assert!(serde_json::from_str::<Turn>(r#"{"role":"system","content":"x"}"#).is_err());
    }

    #[test]
    fn test_blank_turn_is_invalid() {
        assert!(!Turn::user(" \n\t").is_valid());
        assert!(Turn::assistant("ok").is_valid());
    }
}
