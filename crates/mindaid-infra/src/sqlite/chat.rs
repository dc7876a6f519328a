//! SQLite chat message store.
//!
//! Implements `MessageStore` from `mindaid-core` using sqlx with split
//! read/write pools. One row per conversation turn in `chat_messages`.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use mindaid_core::chat::repository::MessageStore;
use mindaid_types::chat::{MessageRole, SessionId, StoredMessage};
use mindaid_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageStore`.
pub struct SqliteMessageStore {
    pool: DatabasePool,
}

impl SqliteMessageStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Internal row types
// ---------------------------------------------------------------------------

struct ChatMessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<StoredMessage, RepositoryError> {
        let id = self
            .id
            .parse::<Uuid>()
            .map_err(|e| RepositoryError::Query(format!("invalid UUID: {e}")))?;
        let role = self
            .role
            .parse::<MessageRole>()
            .map_err(RepositoryError::Query)?;

        Ok(StoredMessage {
            id,
            session_id: SessionId::new(self.session_id),
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// MessageStore implementation
// ---------------------------------------------------------------------------

impl MessageStore for SqliteMessageStore {
    async fn append(
        &self,
        session_id: &SessionId,
        role: MessageRole,
        content: &str,
    ) -> Result<StoredMessage, RepositoryError> {
        let message = StoredMessage {
            id: Uuid::now_v7(),
            session_id: session_id.clone(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO chat_messages (id, session_id, role, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.session_id.as_str())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(message)
    }

    async fn list(&self, session_id: &SessionId) -> Result<Vec<StoredMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(session_id.as_str())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let r =
                ChatMessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(r.into_message()?);
        }
        Ok(messages)
    }

    async fn clear(&self, session_id: &SessionId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM chat_messages WHERE session_id = ?")
            .bind(session_id.as_str())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::database_url;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url(dir.path());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    #[tokio::test]
    async fn test_append_and_list_in_order() {
        let store = SqliteMessageStore::new(test_pool().await);
        let session = SessionId::new("session_1_aaaaaaaaa");

        store.append(&session, MessageRole::User, "hello").await.unwrap();
        store
            .append(&session, MessageRole::Assistant, "hi there")
            .await
            .unwrap();
        store.append(&session, MessageRole::User, "café 🙂").await.unwrap();

        let messages = store.list(&session).await.unwrap();
        let turns: Vec<(MessageRole, &str)> = messages
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            turns,
            vec![
                (MessageRole::User, "hello"),
                (MessageRole::Assistant, "hi there"),
                (MessageRole::User, "café 🙂"),
            ]
        );
        assert!(messages.iter().all(|m| m.session_id == session));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SqliteMessageStore::new(test_pool().await);
        let a = SessionId::new("session_1_aaaaaaaaa");
        let b = SessionId::new("session_2_bbbbbbbbb");

        store.append(&a, MessageRole::User, "from a").await.unwrap();
        store.append(&b, MessageRole::User, "from b").await.unwrap();

        let listed = store.list(&a).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content, "from a");
    }

    #[tokio::test]
    async fn test_clear_removes_only_that_session() {
        let store = SqliteMessageStore::new(test_pool().await);
        let a = SessionId::new("session_1_aaaaaaaaa");
        let b = SessionId::new("session_2_bbbbbbbbb");
        store.append(&a, MessageRole::User, "one").await.unwrap();
        store.append(&b, MessageRole::User, "two").await.unwrap();

        store.clear(&a).await.unwrap();

        assert!(store.list(&a).await.unwrap().is_empty());
        assert_eq!(store.list(&b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_unknown_session_is_empty() {
        let store = SqliteMessageStore::new(test_pool().await);
        let listed = store.list(&SessionId::new("nobody")).await.unwrap();
        assert!(listed.is_empty());
    }
}
