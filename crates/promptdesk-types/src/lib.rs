//! Shared domain types for promptdesk.
//!
//! This crate contains the types used across the workspace: completion
//! requests and errors, request-session phases and snapshots, and the
//! global configuration.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod session;
