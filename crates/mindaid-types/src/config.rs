//! Configuration types for MindAid.
//!
//! `ChatConfig` represents `config.toml` in the data directory: where the
//! completion service lives, how long to wait for it, and what to greet new
//! sessions with.

use serde::{Deserialize, Serialize};

/// Top-level configuration. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Streaming completion endpoint.
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// Bearer token sent with completion requests.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Overall timeout for one completion request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Greeting shown when a session has no history yet.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    /// Message shown to the user when a stream fails.
    #[serde(default = "default_failure_message")]
    pub failure_message: String,
}

fn default_endpoint_url() -> String {
    "http://localhost:54321/functions/v1/chat".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_welcome_message() -> String {
    "Hello! I'm your MindAid assistant. How are you feeling today? Remember, our chat is anonymous and secure.".to_string()
}

fn default_failure_message() -> String {
    "Failed to get response. Please try again.".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            welcome_message: default_welcome_message(),
            failure_message: default_failure_message(),
        }
    }
}
