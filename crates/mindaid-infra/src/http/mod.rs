//! HTTP client for the chat completion endpoint.

pub mod transport;

pub use transport::HttpCompletionTransport;
