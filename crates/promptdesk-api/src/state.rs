//! Application state wiring configuration, the provider and sessions together.
//!
//! AppState is built once at startup and used by the CLI commands, the
//! terminal form and the HTTP handlers alike.

use std::sync::Arc;

use promptdesk_core::session::{ProviderHandle, RequestSession, SessionRegistry};
use promptdesk_infra::config::{apply_overrides, load_global_config};
use promptdesk_infra::filesystem::resolve_data_dir;
use promptdesk_infra::llm::init_provider;
use promptdesk_infra::secret::EnvCredentialSource;
use promptdesk_types::config::GlobalConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GlobalConfig>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Load config, apply CLI overrides and initialize the provider once.
    ///
    /// A missing API key does not fail startup; it surfaces through each
    /// session's `last_error`.
    pub async fn init(model: Option<String>, settle_delay_ms: Option<u64>) -> Self {
        let data_dir = resolve_data_dir();
        let config = apply_overrides(load_global_config(&data_dir).await, model, settle_delay_ms);
        let provider = init_provider(&config.provider, &EnvCredentialSource::new());
        Self::from_parts(config, provider)
    }

    pub fn from_parts(config: GlobalConfig, provider: ProviderHandle) -> Self {
        let sessions = SessionRegistry::new(provider, config.session.clone());
        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
        }
    }

    /// A session outside the registry, for the terminal bindings.
    pub fn new_session(&self) -> RequestSession {
        RequestSession::new(self.sessions.provider().clone(), &self.config.session)
    }
}
