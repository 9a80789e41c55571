//! Request session types for promptdesk.
//!
//! A session is the mutable state behind one form instance: the prompt
//! being edited, the last answer, the last error, and the lifecycle
//! phase. These are the observable values; the state machine that drives
//! them lives in `promptdesk-core::session`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::llm::LlmError;

/// Lifecycle phase of a request session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No request in flight and no clear pending. The only phase that accepts `submit`.
    #[default]
    Idle,
    /// One external completion call is in flight.
    Submitting,
    /// The form was just cleared; returns to `Idle` after the settle delay.
    Clearing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Submitting => write!(f, "submitting"),
            Phase::Clearing => write!(f, "clearing"),
        }
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(Phase::Idle),
            "submitting" => Ok(Phase::Submitting),
            "clearing" => Ok(Phase::Clearing),
            other => Err(format!("invalid phase: '{other}'")),
        }
    }
}

/// Monotonically increasing tag of an accepted submit within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Classified failure shown in the form's error area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionError {
    /// The completion client could not be constructed (missing or invalid credential, bad config).
    #[error("error initializing model: {reason}")]
    Initialization { reason: String },

    /// The completion call was made and failed.
    #[error("error generating response: {reason}")]
    Completion { reason: String },
}

impl SessionError {
    /// Classify a construction-time provider error.
    pub fn initialization(err: &LlmError) -> Self {
        SessionError::Initialization {
            reason: short_reason(err),
        }
    }

    /// Classify a failure returned by an in-flight completion call.
    pub fn completion(err: &LlmError) -> Self {
        SessionError::Completion {
            reason: short_reason(err),
        }
    }

    /// The human-readable reason without the kind prefix.
    pub fn reason(&self) -> &str {
        match self {
            SessionError::Initialization { reason } | SessionError::Completion { reason } => reason,
        }
    }

    pub fn is_initialization(&self) -> bool {
        matches!(self, SessionError::Initialization { .. })
    }
}

fn short_reason(err: &LlmError) -> String {
    match err {
        LlmError::AuthenticationFailed => "the API key was rejected".to_string(),
        LlmError::RateLimited { .. } => "the service is rate limiting requests".to_string(),
        LlmError::Overloaded(_) => "the service is temporarily overloaded".to_string(),
        LlmError::Timeout => "the service did not answer in time".to_string(),
        LlmError::Network(_) => "could not reach the service".to_string(),
        LlmError::Blocked { reason } => format!("the prompt was blocked ({reason})"),
        LlmError::EmptyCompletion => "the service returned an empty answer".to_string(),
        LlmError::MissingCredential(name) => format!("no API key found in {name}"),
        LlmError::Provider { message } => message.clone(),
        LlmError::InvalidRequest(msg)
        | LlmError::Deserialization(msg)
        | LlmError::Configuration(msg) => msg.clone(),
    }
}

/// Point-in-time, fully consistent view of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub prompt: String,
    pub answer: String,
    pub last_error: Option<SessionError>,
    pub phase: Phase,
}

impl SessionSnapshot {
    /// True when prompt, answer and error are all empty.
    pub fn is_blank(&self) -> bool {
        self.prompt.is_empty() && self.answer.is_empty() && self.last_error.is_none()
    }
}

/// Result of a `submit` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The call succeeded and the answer was applied.
    Completed { request_id: RequestId },
    /// The call failed and `last_error` was set.
    Failed { request_id: RequestId },
    /// Not accepted because the session was not idle. Nothing changed.
    Rejected { phase: Phase },
    /// The completion client never initialized; only `last_error` changed.
    Unavailable,
    /// The call was cancelled or its result arrived after it was invalidated.
    Superseded { request_id: RequestId },
}

impl SubmitOutcome {
    /// Whether this submit resulted in an external call being issued.
    pub fn issued_call(&self) -> bool {
        matches!(
            self,
            SubmitOutcome::Completed { .. }
                | SubmitOutcome::Failed { .. }
                | SubmitOutcome::Superseded { .. }
        )
    }
}

/// Result of a `clear` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClearOutcome {
    /// Cleared; `Clearing` until the settle delay elapses (or `Idle` right away with no delay).
    Cleared,
    /// Already clearing; nothing rescheduled.
    AlreadyClearing,
    /// Cleared while a request was in flight; that request was cancelled.
    CancelledInFlight { request_id: RequestId },
}
