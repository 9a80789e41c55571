//! Session logic and provider trait definitions for promptdesk.
//!
//! This crate defines the "ports" (provider and credential traits) that the
//! infrastructure layer implements. It depends only on `promptdesk-types`,
//! never on `promptdesk-infra` or any HTTP crate.

pub mod credential;
pub mod llm;
pub mod session;
