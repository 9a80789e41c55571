//! Session HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions              - Create a session (one per page instance)
//! - GET    /api/v1/sessions/{id}         - Current view
//! - PUT    /api/v1/sessions/{id}/prompt  - Replace the prompt text
//! - POST   /api/v1/sessions/{id}/submit  - Submit and wait for the outcome
//! - POST   /api/v1/sessions/{id}/clear   - Clear the form
//! - DELETE /api/v1/sessions/{id}         - Close the session

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use promptdesk_core::session::{RequestSession, SessionView};
use promptdesk_types::session::{ClearOutcome, SubmitOutcome};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// A session's id together with its render-ready view.
#[derive(Debug, Serialize)]
pub struct SessionBody {
    pub id: Uuid,
    #[serde(flatten)]
    pub view: SessionView,
}

impl SessionBody {
    fn of(id: Uuid, session: &RequestSession) -> Self {
        Self {
            id,
            view: SessionView::from(&session.snapshot()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitBody {
    pub outcome: SubmitOutcome,
    pub session: SessionBody,
}

#[derive(Debug, Serialize)]
pub struct ClearBody {
    pub outcome: ClearOutcome,
    pub session: SessionBody,
}

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

/// Body of a submit. Without `prompt`, the session's current prompt is sent.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

fn lookup(state: &AppState, raw_id: &str) -> Result<(Uuid, RequestSession), AppError> {
    let id = parse_uuid(raw_id)?;
    let session = state
        .sessions
        .get(&id)
        .ok_or(AppError::SessionNotFound(id))?;
    Ok((id, session))
}

fn self_link(id: Uuid) -> String {
    format!("/api/v1/sessions/{id}")
}

/// POST /api/v1/sessions - Create a session.
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<SessionBody>>) {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (id, session) = state.sessions.create();
    tracing::info!(session_id = %id, live = state.sessions.len(), "session opened");

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(SessionBody::of(id, &session), request_id, elapsed)
        .with_link("self", &self_link(id));

    (StatusCode::CREATED, Json(resp))
}

/// GET /api/v1/sessions/{id} - Current view of a session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionBody>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (id, session) = lookup(&state, &session_id)?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(SessionBody::of(id, &session), request_id, elapsed)
            .with_link("self", &self_link(id)),
    ))
}

/// PUT /api/v1/sessions/{id}/prompt - Replace the prompt text.
pub async fn set_prompt(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<PromptRequest>,
) -> Result<Json<ApiResponse<SessionBody>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (id, session) = lookup(&state, &session_id)?;
    session.set_prompt(body.prompt);

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        SessionBody::of(id, &session),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/sessions/{id}/submit - Submit and wait for the outcome.
///
/// A rejected submit is not an HTTP error: the outcome says `rejected` and
/// the session is unchanged.
pub async fn submit(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<SubmitRequest>,
) -> Result<Json<ApiResponse<SubmitBody>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (id, session) = lookup(&state, &session_id)?;
    let outcome = match body.prompt {
        Some(prompt) => session.submit_prompt(&prompt).await,
        None => {
            let prompt = session.snapshot().prompt;
            session.submit(&prompt).await
        }
    };
    tracing::info!(session_id = %id, ?outcome, "submit handled");

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        SubmitBody {
            outcome,
            session: SessionBody::of(id, &session),
        },
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/sessions/{id}/clear - Clear the form.
pub async fn clear(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<ClearBody>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (id, session) = lookup(&state, &session_id)?;
    let outcome = session.clear();

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        ClearBody {
            outcome,
            session: SessionBody::of(id, &session),
        },
        request_id,
        elapsed,
    )))
}

/// DELETE /api/v1/sessions/{id} - Close a session, cancelling in-flight work.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_uuid(&session_id)?;
    if state.sessions.remove(&id) {
        tracing::info!(session_id = %id, live = state.sessions.len(), "session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound(id))
    }
}
