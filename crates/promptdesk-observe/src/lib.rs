//! Observability setup shared by the promptdesk binary.

pub mod tracing_setup;
