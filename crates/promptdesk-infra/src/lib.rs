//! Infrastructure layer for promptdesk.
//!
//! Contains implementations of the traits defined in `promptdesk-core`:
//! the Gemini completion client, the environment credential source, and
//! the config file loader.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod secret;
