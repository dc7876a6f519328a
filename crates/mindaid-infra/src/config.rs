//! Chat configuration loader for MindAid.
//!
//! Reads `config.toml` from the data directory (`~/.mindaid/` in production)
//! and deserializes it into [`ChatConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed, then applies environment overrides.

use std::path::{Path, PathBuf};

use mindaid_types::config::ChatConfig;

/// Overrides `endpoint_url`.
pub const CHAT_URL_ENV: &str = "MINDAID_CHAT_URL";
/// Overrides `api_key`.
pub const API_KEY_ENV: &str = "MINDAID_API_KEY";
/// Overrides the data directory.
pub const DATA_DIR_ENV: &str = "MINDAID_DATA_DIR";

/// Resolve the MindAid data directory.
///
/// Priority:
/// 1. `MINDAID_DATA_DIR` environment variable
/// 2. `~/.mindaid`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".mindaid");
    }

    // Last resort: current directory
    PathBuf::from(".mindaid")
}

/// Load chat configuration from `{data_dir}/config.toml` plus environment.
pub async fn load_chat_config(data_dir: &Path) -> ChatConfig {
    let config = read_config_file(data_dir).await;
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Parse `{data_dir}/config.toml`, or return [`ChatConfig::default()`].
///
/// - If the file does not exist, returns the default.
/// - If the file exists but fails to parse, logs a warning and returns the default.
async fn read_config_file(data_dir: &Path) -> ChatConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ChatConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ChatConfig::default();
        }
    };

    match toml::from_str::<ChatConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ChatConfig::default()
        }
    }
}

/// Apply non-empty environment overrides on top of the file config.
fn apply_env_overrides(
    mut config: ChatConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ChatConfig {
    if let Some(url) = lookup(CHAT_URL_ENV).filter(|v| !v.is_empty()) {
        tracing::debug!(url = %url, "chat endpoint overridden from environment");
        config.endpoint_url = url;
    }
    if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
        config.api_key = Some(key);
    }
    config
}
