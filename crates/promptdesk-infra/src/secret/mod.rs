//! Credential sources.

pub mod env;

pub use env::EnvCredentialSource;
