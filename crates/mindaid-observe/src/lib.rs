//! Observability setup for MindAid: structured logging plus optional
//! OpenTelemetry span export.

pub mod tracing_setup;
