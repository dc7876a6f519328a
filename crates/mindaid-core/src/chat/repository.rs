//! MessageStore trait definition.
//!
//! Append and list operations for persisted chat messages.

use mindaid_types::chat::{MessageRole, SessionId, StoredMessage};
use mindaid_types::error::RepositoryError;

/// Repository trait for chat message persistence.
///
/// Implementations live in mindaid-infra (e.g., `SqliteMessageStore`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait MessageStore: Send + Sync {
    /// Persist a new message at the end of a session.
    fn append(
        &self,
        session_id: &SessionId,
        role: MessageRole,
        content: &str,
    ) -> impl std::future::Future<Output = Result<StoredMessage, RepositoryError>> + Send;

    /// Get all messages for a session, ordered by created_at ASC.
    fn list(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Vec<StoredMessage>, RepositoryError>> + Send;

    /// Delete every message of a session.
    fn clear(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
