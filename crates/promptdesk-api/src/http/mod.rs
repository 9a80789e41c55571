//! HTTP binding for promptdesk.
//!
//! Serves the HTML form at `/` and the session API under `/api/v1/`, with
//! envelope response format and CORS support.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
