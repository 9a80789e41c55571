//! Render-ready view of a session snapshot.
//!
//! Both the terminal form and the HTML page derive their controls from this
//! so the enable/label rules live in one place.

use serde::Serialize;

use promptdesk_types::session::{Phase, SessionSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub prompt: String,
    pub answer: Option<String>,
    pub error: Option<String>,
    pub phase: Phase,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    pub clear_enabled: bool,
    pub clear_label: &'static str,
}

impl SessionView {
    pub fn show_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn show_answer(&self) -> bool {
        self.answer.is_some()
    }
}

impl From<&SessionSnapshot> for SessionView {
    fn from(snapshot: &SessionSnapshot) -> Self {
        let phase = snapshot.phase;
        Self {
            prompt: snapshot.prompt.clone(),
            answer: (!snapshot.answer.is_empty()).then(|| snapshot.answer.clone()),
            error: snapshot.last_error.as_ref().map(|e| e.to_string()),
            phase,
            submit_enabled: phase == Phase::Idle,
            submit_label: match phase {
                Phase::Submitting => "Sending...",
                _ => "Send",
            },
            clear_enabled: phase != Phase::Clearing,
            clear_label: match phase {
                Phase::Clearing => "Clearing...",
                _ => "Clear",
            },
        }
    }
}
