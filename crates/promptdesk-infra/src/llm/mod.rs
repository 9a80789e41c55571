//! Completion provider implementations.
//!
//! Contains the concrete [`LlmProvider`](promptdesk_core::llm::provider::LlmProvider)
//! implementation for Gemini and the startup factory that turns a
//! [`ProviderConfig`] plus a credential source into the shared provider handle.

pub mod gemini;

use std::sync::Arc;

use secrecy::SecretString;

use promptdesk_core::credential::CredentialSource;
use promptdesk_core::llm::box_provider::BoxLlmProvider;
use promptdesk_core::session::ProviderHandle;
use promptdesk_types::config::ProviderConfig;
use promptdesk_types::llm::{LlmError, ProviderType};
use promptdesk_types::session::SessionError;

use self::gemini::GeminiProvider;

/// Create a [`BoxLlmProvider`] from a [`ProviderConfig`] and a resolved key.
///
/// # Errors
///
/// `MissingCredential` when no key was resolved, or whatever the concrete
/// provider's constructor rejects.
pub fn create_provider(
    config: &ProviderConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.ok_or_else(|| LlmError::MissingCredential(config.api_key_env.clone()))?;
    match config.provider_type {
        ProviderType::Gemini => Ok(BoxLlmProvider::new(GeminiProvider::new(key, config)?)),
    }
}

/// Resolve the credential named by `config.api_key_env` and build the
/// process-wide provider handle.
///
/// Never fails outright: every problem becomes
/// [`SessionError::Initialization`], which sessions surface through
/// `last_error`.
pub fn init_provider(config: &ProviderConfig, credentials: &dyn CredentialSource) -> ProviderHandle {
    let api_key = credentials
        .get(&config.api_key_env)
        .map_err(|e| SessionError::initialization(&LlmError::Configuration(e.to_string())))?
        .map(SecretString::from);

    match create_provider(config, api_key) {
        Ok(provider) => {
            tracing::info!(
                provider = provider.name(),
                model = provider.model(),
                "completion provider ready"
            );
            Ok(Arc::new(provider))
        }
        Err(err) => {
            tracing::warn!(error = %err, "completion provider unavailable");
            Err(SessionError::initialization(&err))
        }
    }
}
