//! Credential source trait definition.

use promptdesk_types::error::CredentialError;

/// Read-only lookup of a named credential (e.g. "GEMINI_API_KEY").
///
/// Resolved once at startup when the provider is built. Sessions never
/// consult a credential source directly.
pub trait CredentialSource: Send + Sync {
    /// Returns `None` if the credential is absent or blank.
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;
}
