//! Process-wide map of live sessions, one per page instance.

use dashmap::DashMap;
use uuid::Uuid;

use promptdesk_types::config::SessionSettings;

use super::controller::{ProviderHandle, RequestSession};

/// Sessions keyed by UUID v7. Every session shares the same provider handle.
pub struct SessionRegistry {
    provider: ProviderHandle,
    settings: SessionSettings,
    sessions: DashMap<Uuid, RequestSession>,
}

impl SessionRegistry {
    pub fn new(provider: ProviderHandle, settings: SessionSettings) -> Self {
        Self {
            provider,
            settings,
            sessions: DashMap::new(),
        }
    }

    pub fn create(&self) -> (Uuid, RequestSession) {
        let id = Uuid::now_v7();
        let session = RequestSession::new(self.provider.clone(), &self.settings);
        self.sessions.insert(id, session.clone());
        tracing::debug!(session_id = %id, "session created");
        (id, session)
    }

    pub fn get(&self, id: &Uuid) -> Option<RequestSession> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Remove and close a session. In-flight work is cancelled.
    pub fn remove(&self, id: &Uuid) -> bool {
        match self.sessions.remove(id) {
            Some((_, session)) => {
                session.close();
                tracing::debug!(session_id = %id, "session removed");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn provider(&self) -> &ProviderHandle {
        &self.provider
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .field("settings", &self.settings)
            .finish()
    }
}
