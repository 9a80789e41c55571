//! LlmProvider trait definition.
//!
//! This is the "external completion client" capability: hand it a prompt,
//! eventually get text or an error back. Uses RPITIT for `complete`.

use promptdesk_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for completion provider backends (Gemini today).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Implementations
/// live in promptdesk-infra (e.g., `GeminiProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// The model used when a request leaves `model` empty.
    fn model(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
