//! Axum router configuration with middleware.
//!
//! The form page is served at `/`, the session API under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/sessions", post(handlers::session::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::session::get_session).delete(handlers::session::delete_session),
        )
        .route("/sessions/{id}/prompt", put(handlers::session::set_prompt))
        .route("/sessions/{id}/submit", post(handlers::session::submit))
        .route("/sessions/{id}/clear", post(handlers::session::clear));

    Router::new()
        .route("/", get(handlers::page::form_page))
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness plus whether the completion provider initialized.
async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::Json<serde_json::Value> {
    let provider = match state.sessions.provider() {
        Ok(provider) => serde_json::json!({
            "status": "ready",
            "name": provider.name(),
            "model": provider.model(),
        }),
        Err(err) => serde_json::json!({
            "status": "unavailable",
            "reason": err.to_string(),
        }),
    };

    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": provider,
        "sessions": state.sessions.len(),
    }))
}
