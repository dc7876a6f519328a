//! Streaming completion types for MindAid.
//!
//! Wire shapes exchanged with the completion service, the per-line
//! classification produced while decoding its response, and the state and
//! outcome of one stream.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::chat::{ConversationMessage, MessageRole};
use crate::error::TransportError;

/// Lines starting with this marker are comments (keep-alives).
pub const COMMENT_MARKER: char = ':';

/// Prefix of a line carrying a JSON payload.
pub const DATA_PREFIX: &str = "data: ";

/// Payload literal that ends the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One prior turn sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Request body for a streaming completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<WireMessage>,
}

/// Classification of a single line of the response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    /// Comment, blank, or unrecognized line.
    Skip,
    /// The done sentinel: authoritative end of stream.
    Terminator,
    /// A data frame with its trimmed payload.
    Data(String),
}

/// Lifecycle phase of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamPhase {
    Idle,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl fmt::Display for StreamPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamPhase::Idle => write!(f, "idle"),
            StreamPhase::Streaming => write!(f, "streaming"),
            StreamPhase::Completed => write!(f, "completed"),
            StreamPhase::Failed => write!(f, "failed"),
            StreamPhase::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of a stream that reached `Completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedStream {
    /// The finalized assistant message, `None` when no text arrived.
    pub message: Option<ConversationMessage>,
    /// Whether the done sentinel was seen (vs. the connection just closing).
    pub saw_terminator: bool,
    /// Whether the assistant message was written to the message store.
    pub persisted: bool,
}

/// How a stream ended.
#[derive(Debug)]
pub enum StreamOutcome {
    Completed(CompletedStream),
    Failed(TransportError),
    Cancelled,
}

impl StreamOutcome {
    pub fn phase(&self) -> StreamPhase {
        match self {
            StreamOutcome::Completed(_) => StreamPhase::Completed,
            StreamOutcome::Failed(_) => StreamPhase::Failed,
            StreamOutcome::Cancelled => StreamPhase::Cancelled,
        }
    }

    /// The finalized assistant message of a completed stream.
    pub fn message(&self) -> Option<&ConversationMessage> {
        match self {
            StreamOutcome::Completed(done) => done.message.as_ref(),
            _ => None,
        }
    }
}
