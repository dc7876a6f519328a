//! Infrastructure layer for MindAid.
//!
//! Contains implementations of the traits defined in `mindaid-core`: the
//! reqwest chat transport, SQLite message storage, the on-disk session id,
//! and the configuration loader.

pub mod config;
pub mod http;
pub mod session;
pub mod sqlite;
