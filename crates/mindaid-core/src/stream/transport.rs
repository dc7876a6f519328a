//! CompletionTransport trait definition.
//!
//! The completion service is an opaque byte-stream producer. Implementations
//! live in mindaid-infra (e.g., `HttpCompletionTransport`); tests use an
//! in-memory stream of chunks.

use std::pin::Pin;

use futures_util::Stream;

use mindaid_types::error::TransportError;
use mindaid_types::stream::CompletionRequest;

/// Raw response body as a stream of chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, TransportError>> + Send + 'static>>;

/// Opens streaming completion requests.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). The returned
/// stream is boxed so the consumer does not depend on the concrete client.
pub trait CompletionTransport: Send + Sync {
    /// Dispatch `request` and return the response body once the status is known.
    ///
    /// Non-success statuses and missing bodies are reported here, before any
    /// byte is read.
    fn open(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<ByteStream, TransportError>> + Send;
}
