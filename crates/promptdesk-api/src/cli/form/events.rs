//! What changed between two snapshots, as the terminal form reports it.

use promptdesk_core::session::SessionView;
use promptdesk_types::session::{Phase, SessionSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Entered `Submitting` or `Clearing`; carries the control label.
    Busy(&'static str),
    /// Back to `Idle` after a clear.
    Ready,
    Answer(String),
    Error(String),
}

/// Events implied by moving from `previous` to `current`.
///
/// The watch channel may coalesce intermediate states, so this compares
/// whole snapshots rather than assuming one step at a time.
pub fn diff(previous: &SessionSnapshot, current: &SessionSnapshot) -> Vec<FormEvent> {
    let view = SessionView::from(current);
    let mut events = Vec::new();

    if previous.phase != current.phase {
        match current.phase {
            Phase::Submitting => events.push(FormEvent::Busy(view.submit_label)),
            Phase::Clearing => events.push(FormEvent::Busy(view.clear_label)),
            Phase::Idle if previous.phase == Phase::Clearing => events.push(FormEvent::Ready),
            Phase::Idle => {}
        }
    }

    if current.answer != previous.answer {
        if let Some(answer) = view.answer {
            events.push(FormEvent::Answer(answer));
        }
    }

    if current.last_error != previous.last_error {
        if let Some(error) = view.error {
            events.push(FormEvent::Error(error));
        }
    }

    events
}
