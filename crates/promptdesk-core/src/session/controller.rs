//! The request session state machine.
//!
//! ```text
//! Idle --submit()--> Submitting --success/failure--> Idle
//! Idle --clear()--> Clearing --(settle delay)--> Idle
//! Submitting --clear()--> Clearing   (in-flight call cancelled, late result dropped)
//! Clearing --clear()--> Clearing     (no second timer)
//! ```
//!
//! All mutations happen under one mutex and publish a full snapshot on a
//! `watch` channel before the lock is released, so observers only ever see
//! complete transitions.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use promptdesk_types::config::SessionSettings;
use promptdesk_types::llm::{CompletionRequest, CompletionResponse, LlmError};
use promptdesk_types::session::{
    ClearOutcome, Phase, RequestId, SessionError, SessionSnapshot, SubmitOutcome,
};

use crate::llm::box_provider::BoxLlmProvider;

/// Outcome of provider initialization, shared by every session in the process.
pub type ProviderHandle = Result<Arc<BoxLlmProvider>, SessionError>;

struct InFlight {
    id: RequestId,
    cancel: CancellationToken,
}

struct State {
    snapshot: SessionSnapshot,
    next_request_id: u64,
    in_flight: Option<InFlight>,
}

struct Shared {
    provider: ProviderHandle,
    settle_delay: Duration,
    state: Mutex<State>,
    publisher: watch::Sender<SessionSnapshot>,
}

/// Controller for one form instance.
///
/// Cheap to clone; clones share the same state. Bindings call
/// [`submit`](Self::submit), [`clear`](Self::clear) and
/// [`set_prompt`](Self::set_prompt), and render what
/// [`subscribe`](Self::subscribe) publishes.
#[derive(Clone)]
pub struct RequestSession {
    shared: Arc<Shared>,
}

impl RequestSession {
    /// Create a session bound to the process-wide provider handle.
    ///
    /// If the provider failed to initialize, the failure is shown in
    /// `last_error` right away and every submit reports it without
    /// calling out.
    pub fn new(provider: ProviderHandle, settings: &SessionSettings) -> Self {
        Self::with_settle_delay(provider, Duration::from_millis(settings.settle_delay_ms))
    }

    pub fn with_settle_delay(provider: ProviderHandle, settle_delay: Duration) -> Self {
        let snapshot = SessionSnapshot {
            last_error: provider.as_ref().err().cloned(),
            ..SessionSnapshot::default()
        };
        let (publisher, _) = watch::channel(snapshot.clone());

        Self {
            shared: Arc::new(Shared {
                provider,
                settle_delay,
                state: Mutex::new(State {
                    snapshot,
                    next_request_id: 0,
                    in_flight: None,
                }),
                publisher,
            }),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.publisher.borrow().clone()
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.publisher.subscribe()
    }

    /// Wait until the session is `Idle` and return that snapshot.
    pub async fn settled(&self) -> SessionSnapshot {
        let mut rx = self.subscribe();
        match rx.wait_for(|snapshot| snapshot.phase == Phase::Idle).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// The shared provider, if it initialized.
    pub fn provider(&self) -> Option<&BoxLlmProvider> {
        self.shared.provider.as_deref().ok()
    }

    /// The initialization failure, if the provider did not initialize.
    pub fn initialization_error(&self) -> Option<&SessionError> {
        self.shared.provider.as_ref().err()
    }

    pub fn settle_delay(&self) -> Duration {
        self.shared.settle_delay
    }

    /// Replace the prompt text. Allowed in every phase.
    pub fn set_prompt(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|state| state.snapshot.prompt = text);
    }

    /// Send `prompt` to the provider unmodified and apply the result.
    ///
    /// Only accepted while `Idle`; otherwise nothing changes and no call is
    /// made. The switch to `Submitting` happens before the first await.
    pub async fn submit(&self, prompt: &str) -> SubmitOutcome {
        self.run_submit(prompt, false).await
    }

    /// Like [`submit`](Self::submit), but also records `prompt` as the form
    /// text. The prompt is written in the same update that enters
    /// `Submitting`, so a rejected call leaves the session untouched.
    pub async fn submit_prompt(&self, prompt: &str) -> SubmitOutcome {
        self.run_submit(prompt, true).await
    }

    #[tracing::instrument(name = "session.submit", skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn run_submit(&self, prompt: &str, record_prompt: bool) -> SubmitOutcome {
        let recorded = record_prompt.then_some(prompt);
        let (request_id, cancel, provider) = match self.begin_submit(recorded) {
            Ok(started) => started,
            Err(outcome) => {
                debug!(?outcome, "submit not accepted");
                return outcome;
            }
        };

        let mut guard = AbandonOnDrop {
            session: self,
            request_id,
            armed: true,
        };

        let request = CompletionRequest::new(prompt);
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = provider.complete(&request) => Some(result),
        };
        guard.armed = false;

        match result {
            Some(result) => self.finish_submit(request_id, result),
            None => {
                debug!(%request_id, "in-flight request cancelled");
                SubmitOutcome::Superseded { request_id }
            }
        }
    }

    /// Reset prompt, answer and error, then settle back to `Idle`.
    ///
    /// Cancels an in-flight request. While already clearing, only the
    /// (idempotent) reset happens and no second timer is scheduled.
    pub fn clear(&self) -> ClearOutcome {
        let settle_delay = self.shared.settle_delay;
        let (outcome, needs_timer) = self.update(|state| {
            state.snapshot.prompt.clear();
            state.snapshot.answer.clear();
            state.snapshot.last_error = None;

            if state.snapshot.phase == Phase::Clearing {
                return (ClearOutcome::AlreadyClearing, false);
            }

            let outcome = match state.in_flight.take() {
                Some(in_flight) => {
                    in_flight.cancel.cancel();
                    ClearOutcome::CancelledInFlight {
                        request_id: in_flight.id,
                    }
                }
                None => ClearOutcome::Cleared,
            };

            if settle_delay.is_zero() {
                state.snapshot.phase = Phase::Idle;
                (outcome, false)
            } else {
                state.snapshot.phase = Phase::Clearing;
                (outcome, true)
            }
        });

        if needs_timer {
            self.schedule_settle();
        }
        info!(?outcome, "session cleared");
        outcome
    }

    /// Tear down: cancel any in-flight request so its result is never applied.
    pub fn close(&self) {
        self.update(|state| {
            if let Some(in_flight) = state.in_flight.take() {
                in_flight.cancel.cancel();
                state.snapshot.phase = Phase::Idle;
                debug!(request_id = %in_flight.id, "closed session with request in flight");
            }
        });
    }

    fn begin_submit(
        &self,
        prompt: Option<&str>,
    ) -> Result<(RequestId, CancellationToken, Arc<BoxLlmProvider>), SubmitOutcome> {
        self.update(|state| {
            if state.snapshot.phase != Phase::Idle {
                return Err(SubmitOutcome::Rejected {
                    phase: state.snapshot.phase,
                });
            }
            if let Some(prompt) = prompt {
                state.snapshot.prompt = prompt.to_owned();
            }

            let provider = match &self.shared.provider {
                Ok(provider) => Arc::clone(provider),
                Err(err) => {
                    warn!(error = %err, "submit without an initialized provider");
                    state.snapshot.last_error = Some(err.clone());
                    return Err(SubmitOutcome::Unavailable);
                }
            };

            state.next_request_id += 1;
            let request_id = RequestId(state.next_request_id);
            let cancel = CancellationToken::new();
            state.in_flight = Some(InFlight {
                id: request_id,
                cancel: cancel.clone(),
            });
            state.snapshot.phase = Phase::Submitting;
            state.snapshot.answer.clear();
            state.snapshot.last_error = None;

            info!(%request_id, provider = provider.name(), "request started");
            Ok((request_id, cancel, provider))
        })
    }

    fn finish_submit(
        &self,
        request_id: RequestId,
        result: Result<CompletionResponse, LlmError>,
    ) -> SubmitOutcome {
        self.update(|state| {
            if state.in_flight.as_ref().map(|f| f.id) != Some(request_id) {
                debug!(%request_id, "dropping result of invalidated request");
                return SubmitOutcome::Superseded { request_id };
            }

            state.in_flight = None;
            state.snapshot.phase = Phase::Idle;

            match result.and_then(reject_empty) {
                Ok(response) => {
                    info!(
                        %request_id,
                        output_tokens = response.usage.output_tokens,
                        "request completed"
                    );
                    state.snapshot.answer = response.text;
                    SubmitOutcome::Completed { request_id }
                }
                Err(err) => {
                    warn!(%request_id, error = %err, "request failed");
                    state.snapshot.last_error = Some(SessionError::completion(&err));
                    SubmitOutcome::Failed { request_id }
                }
            }
        })
    }

    /// The submit future was dropped before the call finished.
    fn abandon(&self, request_id: RequestId) {
        self.update(|state| {
            if state.in_flight.as_ref().map(|f| f.id) == Some(request_id) {
                state.in_flight = None;
                state.snapshot.phase = Phase::Idle;
                debug!(%request_id, "submit dropped before completion");
            }
        });
    }

    fn schedule_settle(&self) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let shared = Arc::downgrade(&self.shared);
                let delay = self.shared.settle_delay;
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(session) = upgrade(&shared) {
                        session.finish_clear();
                    }
                });
            }
            // No runtime to host the timer: settle immediately.
            Err(_) => self.finish_clear(),
        }
    }

    fn finish_clear(&self) {
        self.update(|state| {
            if state.snapshot.phase == Phase::Clearing {
                state.snapshot.phase = Phase::Idle;
            }
        });
    }

    /// Mutate under the lock and publish the resulting snapshot before unlocking.
    fn update<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self
            .shared
            .state
            .lock()
            .expect("session state lock poisoned");
        let result = f(&mut *state);
        let snapshot = &state.snapshot;
        self.shared.publisher.send_if_modified(|published| {
            if *published == *snapshot {
                false
            } else {
                *published = snapshot.clone();
                true
            }
        });
        result
    }
}

/// Returns the session to `Idle` if a submit future is dropped mid-call.
struct AbandonOnDrop<'a> {
    session: &'a RequestSession,
    request_id: RequestId,
    armed: bool,
}

impl Drop for AbandonOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.session.abandon(self.request_id);
        }
    }
}

fn upgrade(shared: &Weak<Shared>) -> Option<RequestSession> {
    shared.upgrade().map(|shared| RequestSession { shared })
}

fn reject_empty(response: CompletionResponse) -> Result<CompletionResponse, LlmError> {
    if response.text.trim().is_empty() {
        Err(LlmError::EmptyCompletion)
    } else {
        Ok(response)
    }
}

impl std::fmt::Debug for RequestSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSession")
            .field("snapshot", &self.snapshot())
            .field("settle_delay", &self.shared.settle_delay)
            .finish()
    }
}
