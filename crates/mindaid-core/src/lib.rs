//! Streaming pipeline and collaborator trait definitions for MindAid.
//!
//! This crate defines the "ports" (store, notifier, transport and subscriber
//! traits) that the infrastructure and front-end layers implement. It depends
//! only on `mindaid-types` -- never on `mindaid-infra` or any network or
//! database crate.

pub mod chat;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;
