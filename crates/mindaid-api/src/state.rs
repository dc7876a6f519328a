//! Application state wiring all services together.
//!
//! ChatService is generic over store/notifier/transport traits; AppState pins
//! it to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use mindaid_core::chat::service::ChatService;
use mindaid_infra::config::{load_chat_config, resolve_data_dir};
use mindaid_infra::http::HttpCompletionTransport;
use mindaid_infra::session::FileSessionStore;
use mindaid_infra::sqlite::chat::SqliteMessageStore;
use mindaid_infra::sqlite::pool::{database_url, DatabasePool};
use mindaid_types::config::ChatConfig;

use crate::cli::chat::renderer::TerminalNotifier;

pub type ConcreteChatService =
    ChatService<SqliteMessageStore, TerminalNotifier, HttpCompletionTransport>;

/// Shared application state used by every CLI command.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub sessions: Arc<FileSessionStore>,
    pub config: ChatConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_chat_config(&data_dir).await;

        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;
        let store = SqliteMessageStore::new(db_pool);
        let transport = HttpCompletionTransport::new(&config)?;
        let chat_service = ChatService::new(store, TerminalNotifier, transport, &config);

        tracing::debug!(
            data_dir = %data_dir.display(),
            endpoint = %config.endpoint_url,
            "application state initialized"
        );

        Ok(Self {
            chat_service: Arc::new(chat_service),
            sessions: Arc::new(FileSessionStore::new(&data_dir)),
            config,
            data_dir,
        })
    }
}
