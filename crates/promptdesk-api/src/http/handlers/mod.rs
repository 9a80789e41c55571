//! HTTP request handlers.

pub mod page;
pub mod session;
