use thiserror::Error;

/// Errors from credential lookups (used by trait definitions in promptdesk-core).
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential '{0}' is not valid unicode")]
    NotUnicode(String),
}
