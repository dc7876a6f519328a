//! In-memory collaborators shared by the unit tests of this crate.

use std::sync::Mutex;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use uuid::Uuid;

use mindaid_types::chat::{ConversationLog, MessageRole, SessionId, StoredMessage};
use mindaid_types::error::{RepositoryError, TransportError};
use mindaid_types::stream::CompletionRequest;

use crate::chat::notifier::ErrorNotifier;
use crate::chat::repository::MessageStore;
use crate::stream::subscriber::ConversationSubscriber;
use crate::stream::transport::{ByteStream, CompletionTransport};

/// One scripted item of a response body.
#[derive(Clone)]
pub enum Chunk {
    Bytes(Vec<u8>),
    ReadError(String),
}

pub fn text(s: &str) -> Chunk {
    Chunk::Bytes(s.as_bytes().to_vec())
}

/// Transport replaying a fixed script.
pub struct ScriptedTransport {
    status: Option<u16>,
    chunks: Vec<Chunk>,
    hang_after: bool,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedTransport {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            status: None,
            chunks,
            hang_after: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn from_text(chunks: &[&str]) -> Self {
        Self::new(chunks.iter().map(|c| text(c)).collect())
    }

    /// Fail at dispatch with the given HTTP status.
    pub fn failing_status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::new(Vec::new())
        }
    }

    /// Keep the connection open forever after the scripted chunks.
    pub fn hanging(mut self) -> Self {
        self.hang_after = true;
        self
    }
}

impl CompletionTransport for ScriptedTransport {
    async fn open(&self, request: &CompletionRequest) -> Result<ByteStream, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(status) = self.status {
            return Err(TransportError::Status {
                status,
                body: "scripted failure".to_string(),
            });
        }

        let items = stream::iter(self.chunks.clone()).map(|chunk| match chunk {
            Chunk::Bytes(bytes) => Ok(bytes),
            Chunk::ReadError(msg) => Err(TransportError::Read(msg)),
        });

        if self.hang_after {
            Ok(Box::pin(items.chain(stream::pending())))
        } else {
            Ok(Box::pin(items))
        }
    }
}

/// Message store backed by a vector.
#[derive(Default)]
pub struct MemoryStore {
    pub messages: Mutex<Vec<StoredMessage>>,
    pub fail_appends: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail_appends: true,
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Vec<(MessageRole, String)> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| (m.role, m.content.clone()))
            .collect()
    }
}

impl MessageStore for MemoryStore {
    async fn append(
        &self,
        session_id: &SessionId,
        role: MessageRole,
        content: &str,
    ) -> Result<StoredMessage, RepositoryError> {
        if self.fail_appends {
            return Err(RepositoryError::Connection);
        }
        let message = StoredMessage {
            id: Uuid::now_v7(),
            session_id: session_id.clone(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn list(&self, session_id: &SessionId) -> Result<Vec<StoredMessage>, RepositoryError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn clear(&self, session_id: &SessionId) -> Result<(), RepositoryError> {
        self.messages
            .lock()
            .unwrap()
            .retain(|m| &m.session_id != session_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub errors: Mutex<Vec<String>>,
}

impl ErrorNotifier for RecordingNotifier {
    fn notify_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingSubscriber {
    pub snapshots: Mutex<Vec<ConversationLog>>,
}

impl RecordingSubscriber {
    pub fn count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<ConversationLog> {
        self.snapshots.lock().unwrap().last().cloned()
    }
}

impl ConversationSubscriber for RecordingSubscriber {
    fn on_update(&self, log: &ConversationLog) {
        self.snapshots.lock().unwrap().push(log.clone());
    }
}
