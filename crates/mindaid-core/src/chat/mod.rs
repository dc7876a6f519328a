//! Chat session orchestration and the persistence/notification seams.
//!
//! `MessageStore` and `ErrorNotifier` are the ports the infrastructure and
//! front-end layers implement; `ChatService` wires them to the stream
//! consumer.

pub mod notifier;
pub mod repository;
pub mod service;
