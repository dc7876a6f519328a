//! Stream consumer orchestrating one assistant response.
//!
//! Drives `FrameSplitter` -> `classify` -> `extract` -> `MessageAccumulator`
//! over the transport's byte stream and turns the result into subscriber
//! updates, a single persistence call, or a single error notification.
//!
//! State machine:
//!
//! ```text
//! Idle -> Streaming -> Completed   (done sentinel, or the body just ends)
//!                   -> Failed      (connect/status/read error)
//!                   -> Cancelled   (token cancelled by the caller)
//! ```
//!
//! Parsing is synchronous; the only await points are opening the request,
//! reading the next chunk and the final store call.

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mindaid_types::chat::{ConversationLog, MessageRole, SessionId};
use mindaid_types::error::TransportError;
use mindaid_types::stream::{
    CompletedStream, CompletionRequest, DecodedEvent, StreamOutcome, StreamPhase,
};

use crate::chat::notifier::ErrorNotifier;
use crate::chat::repository::MessageStore;

use super::accumulator::MessageAccumulator;
use super::decoder::classify;
use super::delta::extract;
use super::splitter::FrameSplitter;
use super::subscriber::ConversationSubscriber;
use super::transport::{ByteStream, CompletionTransport};

/// Message shown to the user when a stream fails and none was configured.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to get response. Please try again.";

/// How the read loop stopped.
enum Drained {
    Terminated,
    EndOfInput,
    Cancelled,
}

/// Consumes one streaming completion into the conversation log.
///
/// Splitter and accumulator state belong to a single `run`; nothing is
/// shared between streams.
pub struct StreamConsumer<'a, M, N, S> {
    store: &'a M,
    notifier: &'a N,
    subscriber: &'a S,
    cancel: CancellationToken,
    failure_message: String,
    phase: StreamPhase,
    splitter: FrameSplitter,
    accumulator: MessageAccumulator,
}

impl<'a, M, N, S> StreamConsumer<'a, M, N, S>
where
    M: MessageStore,
    N: ErrorNotifier,
    S: ConversationSubscriber,
{
    pub fn new(store: &'a M, notifier: &'a N, subscriber: &'a S, cancel: CancellationToken) -> Self {
        Self {
            store,
            notifier,
            subscriber,
            cancel,
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
            phase: StreamPhase::Idle,
            splitter: FrameSplitter::new(),
            accumulator: MessageAccumulator::new(),
        }
    }

    /// Override the text passed to the notifier on failure.
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// Request a completion for `log` and fold the response into it.
    ///
    /// Content rendered before a failure stays in the log. The assistant
    /// message is persisted only when the stream completes with text.
    #[tracing::instrument(name = "consume_stream", skip_all, fields(session_id = %session_id))]
    pub async fn run<T: CompletionTransport>(
        &mut self,
        transport: &T,
        session_id: &SessionId,
        log: &mut ConversationLog,
    ) -> StreamOutcome {
        self.splitter = FrameSplitter::new();
        self.accumulator = MessageAccumulator::new();
        self.phase = StreamPhase::Streaming;

        let request = CompletionRequest {
            messages: log.to_wire(),
        };
        debug!(turns = request.messages.len(), "dispatching completion request");

        let opened = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            opened = transport.open(&request) => Some(opened),
        };
        let body = match opened {
            None => return self.cancelled(),
            Some(Err(e)) => return self.fail(e),
            Some(Ok(body)) => body,
        };

        match self.drive(body, log).await {
            Ok(Drained::Terminated) => self.complete(session_id, true).await,
            Ok(Drained::EndOfInput) => self.complete(session_id, false).await,
            Ok(Drained::Cancelled) => self.cancelled(),
            Err(e) => self.fail(e),
        }
    }

    /// Read chunks until the sentinel, end of input, cancellation or an error.
    async fn drive(
        &mut self,
        mut body: ByteStream,
        log: &mut ConversationLog,
    ) -> Result<Drained, TransportError> {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                next = body.next() => Some(next),
            };
            let Some(next) = next else {
                return Ok(Drained::Cancelled);
            };

            let Some(chunk) = next else {
                if let Some(dropped) = self.splitter.finish() {
                    warn!(
                        len = dropped.len(),
                        "stream closed mid-line, dropping unterminated frame"
                    );
                }
                debug!("stream closed without done sentinel");
                return Ok(Drained::EndOfInput);
            };
            let chunk = chunk?;

            for line in self.splitter.feed(&chunk) {
                match classify(&line) {
                    DecodedEvent::Skip => {}
                    DecodedEvent::Terminator => {
                        debug!(
                            discarded = self.splitter.buffered_len(),
                            "done sentinel received"
                        );
                        return Ok(Drained::Terminated);
                    }
                    DecodedEvent::Data(payload) => {
                        let fragment = match extract(&payload) {
                            Ok(fragment) => fragment,
                            Err(e) => {
                                warn!(error = %e, "skipping malformed frame");
                                continue;
                            }
                        };
                        if self.cancel.is_cancelled() {
                            return Ok(Drained::Cancelled);
                        }
                        if self.accumulator.apply(&fragment, log) {
                            self.subscriber.on_update(log);
                        }
                    }
                }
            }
        }
    }

    async fn complete(&mut self, session_id: &SessionId, saw_terminator: bool) -> StreamOutcome {
        let message = self.accumulator.finish();
        if self.cancel.is_cancelled() {
            return self.cancelled();
        }
        self.phase = StreamPhase::Completed;

        let mut persisted = false;
        if let Some(message) = &message {
            match self
                .store
                .append(session_id, MessageRole::Assistant, &message.content)
                .await
            {
                Ok(stored) => {
                    persisted = true;
                    debug!(stored_id = %stored.id, "assistant message persisted");
                }
                Err(e) => warn!(error = %e, "failed to persist assistant message"),
            }
        }

        info!(
            chars = message.as_ref().map_or(0, |m| m.content.chars().count()),
            saw_terminator, persisted, "stream completed"
        );
        StreamOutcome::Completed(CompletedStream {
            message,
            saw_terminator,
            persisted,
        })
    }

    fn fail(&mut self, error: TransportError) -> StreamOutcome {
        self.accumulator.finish();
        if self.cancel.is_cancelled() {
            return self.cancelled();
        }
        self.phase = StreamPhase::Failed;
        warn!(error = %error, "completion stream failed");
        self.notifier.notify_error(&self.failure_message);
        StreamOutcome::Failed(error)
    }

    fn cancelled(&mut self) -> StreamOutcome {
        self.accumulator.finish();
        self.phase = StreamPhase::Cancelled;
        debug!("stream cancelled by caller");
        StreamOutcome::Cancelled
    }
}
