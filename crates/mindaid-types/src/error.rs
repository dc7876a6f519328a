use thiserror::Error;

/// Failures talking to the completion service. Fatal to the current stream.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Connect(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response has no body")]
    MissingBody,

    #[error("response body read failed: {0}")]
    Read(String),
}

/// A data frame whose payload could not be decoded. Recovered locally.
#[derive(Debug, Error)]
pub enum FrameDecodeError {
    #[error("invalid frame payload: {0}")]
    InvalidJson(String),
}

/// Errors from message store operations (used by trait definitions in mindaid-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors from the chat use cases.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyInput,

    #[error("a response is still streaming")]
    StreamInProgress,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
