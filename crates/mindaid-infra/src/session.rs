//! Anonymous session identity persisted on disk.
//!
//! The session id lives in `{data_dir}/session_id` so history survives
//! restarts without any account.

use std::path::{Path, PathBuf};

use mindaid_types::chat::SessionId;

/// Reads and writes the current session id file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("session_id"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current session id, if one was stored.
    pub async fn load(&self) -> Result<Option<SessionId>, std::io::Error> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let id = content.trim();
                Ok((!id.is_empty()).then(|| SessionId::new(id)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Return the stored session id, generating and saving one if absent.
    pub async fn load_or_create(&self) -> Result<SessionId, std::io::Error> {
        if let Some(id) = self.load().await? {
            return Ok(id);
        }

        let id = SessionId::generate();
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, id.as_str()).await?;
        tracing::info!(session_id = %id, "created new chat session");
        Ok(id)
    }

    /// Forget the stored session; the next `load_or_create` starts fresh.
    pub async fn clear(&self) -> Result<(), std::io::Error> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
