//! Shared domain types for MindAid.
//!
//! Conversation and stream types, error enums, and configuration used across
//! the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod stream;
