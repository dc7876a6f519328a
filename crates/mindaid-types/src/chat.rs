//! Conversation types for MindAid.
//!
//! These types model one anonymous chat session: the ordered conversation log
//! rendered by the front-end, the messages persisted by the message store, and
//! the session identifier that ties them together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::stream::WireMessage;

/// Id given to the synthetic greeting shown when a session has no history.
pub const WELCOME_MESSAGE_ID: &str = "welcome";

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// Identifier of an anonymous chat session.
///
/// Generated once per installation and reused across runs, so that history
/// can be reloaded without any account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Length of the random suffix appended after the timestamp.
    const SUFFIX_LEN: usize = 9;

    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier: `session_<unix-millis>_<9 random chars>`.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(Self::SUFFIX_LEN)
            .collect();
        Self(format!("session_{millis}_{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the conversation log as the front-end renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
}

impl ConversationMessage {
    pub fn new(id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
        }
    }

    /// A user message with a freshly generated id.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Uuid::now_v7().to_string(), MessageRole::User, content)
    }
}

/// Ordered conversation log of one session.
///
/// Append-only, except that the single in-progress assistant message is
/// replaced in place (same id) as stream fragments arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    messages: Vec<ConversationMessage>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<ConversationMessage>) -> Self {
        Self { messages }
    }

    /// A log holding only the greeting shown to sessions without history.
    pub fn welcome(text: impl Into<String>) -> Self {
        Self::from_messages(vec![ConversationMessage::new(
            WELCOME_MESSAGE_ID,
            MessageRole::Assistant,
            text,
        )])
    }

    pub fn push(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    /// Replace the content of the message with the given id.
    ///
    /// Returns `false` when no such message exists.
    pub fn replace_content(&mut self, id: &str, content: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.content.clear();
                message.content.push_str(content);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&ConversationMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Role/content pairs in order, as sent to the completion service.
    pub fn to_wire(&self) -> Vec<WireMessage> {
        self.messages
            .iter()
            .map(|m| WireMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }
}

/// A message as persisted by the message store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: Uuid,
    pub session_id: SessionId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    pub fn into_conversation_message(self) -> ConversationMessage {
        ConversationMessage {
            id: self.id.to_string(),
            role: self.role,
            content: self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            let parsed: MessageRole = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
        assert!("system".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_message_role_serde() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_session_id_format() {
        let id = SessionId::generate();
        let parts: Vec<&str> = id.as_str().splitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn test_replace_content_in_place() {
        let mut log = ConversationLog::new();
        log.push(ConversationMessage::new("a", MessageRole::User, "hi"));
        log.push(ConversationMessage::new("b", MessageRole::Assistant, "Hel"));

        assert!(log.replace_content("b", "Hello"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.get("b").unwrap().content, "Hello");
        assert_eq!(log.messages()[0].content, "hi");

        assert!(!log.replace_content("missing", "x"));
    }

    #[test]
    fn test_welcome_log() {
        let log = ConversationLog::welcome("Hello!");
        assert_eq!(log.len(), 1);
        let msg = log.last().unwrap();
        assert_eq!(msg.id, WELCOME_MESSAGE_ID);
        assert_eq!(msg.role, MessageRole::Assistant);
    }

    #[test]
    fn test_to_wire_preserves_order() {
        let mut log = ConversationLog::welcome("Hello!");
        log.push(ConversationMessage::user("I feel tired"));
        let wire = log.to_wire();
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].role, MessageRole::Assistant);
        assert_eq!(wire[1].content, "I feel tired");
    }

    #[test]
    fn test_stored_message_conversion() {
        let id = Uuid::now_v7();
        let stored = StoredMessage {
            id,
            session_id: SessionId::new("session_1_abc"),
            role: MessageRole::User,
            content: "hi".to_string(),
            created_at: Utc::now(),
        };
        let msg = stored.into_conversation_message();
        assert_eq!(msg.id, id.to_string());
        assert_eq!(msg.content, "hi");
    }
}
