//! Incremental consumption of a streamed chat completion.
//!
//! Bytes flow through `FrameSplitter` (lines), `classify` (frame kinds),
//! `extract` (text fragments) and `MessageAccumulator` (the growing assistant
//! message). `StreamConsumer` drives the pipeline over a `CompletionTransport`
//! and reports progress to a `ConversationSubscriber`.

pub mod accumulator;
pub mod consumer;
pub mod decoder;
pub mod delta;
pub mod splitter;
pub mod subscriber;
pub mod transport;
