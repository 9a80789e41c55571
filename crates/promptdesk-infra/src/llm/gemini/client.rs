//! GeminiProvider -- concrete [`LlmProvider`] implementation for Google Gemini.
//!
//! Sends one `generateContent` call per completion. The API key is wrapped
//! in [`secrecy::SecretString`] and is only exposed when building the
//! request header; it never appears in `Debug` output or tracing logs.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::{Instrument, debug, field, info_span, warn};

use promptdesk_core::llm::provider::LlmProvider;
use promptdesk_types::config::ProviderConfig;
use promptdesk_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use super::types::{GeminiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

/// Google Gemini completion provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    const API_KEY_HEADER: &'static str = "x-goog-api-key";

    /// Create a provider from a resolved API key and the provider config.
    ///
    /// Fails with `MissingCredential` for a blank key and `Configuration`
    /// if the HTTP client cannot be built.
    pub fn new(api_key: SecretString, config: &ProviderConfig) -> Result<Self, LlmError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(LlmError::MissingCredential(config.api_key_env.clone()));
        }

        let mut builder = reqwest::Client::builder();
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    fn transport_error(err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }

    /// Map a non-2xx response to an [`LlmError`].
    fn status_error(status: StatusCode, retry_after: Option<&str>, body: &str) -> LlmError {
        let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
            .map(|env| env.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {status}"));

        match status.as_u16() {
            400 if body.contains("API_KEY_INVALID") => LlmError::AuthenticationFailed,
            401 | 403 => LlmError::AuthenticationFailed,
            429 => LlmError::RateLimited {
                retry_after_ms: retry_after
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map(|secs| secs.saturating_mul(1000)),
            },
            503 => LlmError::Overloaded(message),
            _ => LlmError::Provider { message },
        }
    }
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };

        let span = info_span!(
            "gen_ai.generate_content",
            gen_ai.system = "gemini",
            gen_ai.request.model = %model,
            gen_ai.usage.input_tokens = field::Empty,
            gen_ai.usage.output_tokens = field::Empty,
            http.response.status_code = field::Empty,
        );

        async {
            let response = self
                .client
                .post(self.url(model))
                .header(Self::API_KEY_HEADER, self.api_key.expose_secret())
                .json(&GenerateContentRequest::user_text(&request.prompt))
                .send()
                .await
                .map_err(Self::transport_error)?;

            let status = response.status();
            tracing::Span::current().record("http.response.status_code", status.as_u16());

            if !status.is_success() {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                let body = response.text().await.unwrap_or_default();
                let err = Self::status_error(status, retry_after.as_deref(), &body);
                warn!(status = status.as_u16(), error = %err, "generateContent failed");
                return Err(err);
            }

            let body: GenerateContentResponse = response.json().await.map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Deserialization(format!("failed to parse response: {e}"))
                }
            })?;

            if let Some(reason) = body.block_reason() {
                return Err(LlmError::Blocked {
                    reason: reason.to_string(),
                });
            }

            let usage = body
                .usage_metadata
                .as_ref()
                .map(|u| Usage {
                    input_tokens: u.prompt_token_count,
                    output_tokens: u.candidates_token_count,
                })
                .unwrap_or_default();
            let span = tracing::Span::current();
            span.record("gen_ai.usage.input_tokens", usage.input_tokens);
            span.record("gen_ai.usage.output_tokens", usage.output_tokens);

            let text = body.text();
            if text.trim().is_empty() {
                debug!(finish_reason = %body.finish_reason(), "no text in first candidate");
                return Err(LlmError::EmptyCompletion);
            }

            Ok(CompletionResponse {
                text,
                model: body.model_version.clone().unwrap_or_else(|| model.to_string()),
                finish_reason: body.finish_reason(),
                usage,
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::HeaderMap;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use promptdesk_types::llm::FinishReason;

    fn config(base_url: &str) -> ProviderConfig {
        ProviderConfig {
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
            ..ProviderConfig::default()
        }
    }

    fn provider(base_url: &str) -> GeminiProvider {
        GeminiProvider::new(SecretString::from("test-key-not-real"), &config(base_url)).unwrap()
    }

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn fake_gemini(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn echo(
        Path(call): Path<String>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        let key = headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let prompt = body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let role = body["contents"][0]["role"].as_str().unwrap_or_default().to_string();
        Json(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": format!("{call}|{key}|{role}|")},
                    {"text": prompt}
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 7}
        }))
    }

    #[test]
    fn test_blank_key_is_missing_credential() {
        let err = GeminiProvider::new(SecretString::from("   "), &ProviderConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, LlmError::MissingCredential(ref name) if name == "GEMINI_API_KEY"));
    }

    #[test]
    fn test_url_and_identity() {
        let provider = provider("http://localhost:9999/");
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), "gemini-2.5-flash");
        assert_eq!(
            provider.url("gemini-pro"),
            "http://localhost:9999/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_status_error_mapping() {
        let invalid_key = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#;
        assert!(matches!(
            GeminiProvider::status_error(StatusCode::BAD_REQUEST, None, invalid_key),
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(
            GeminiProvider::status_error(StatusCode::FORBIDDEN, None, ""),
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(
            GeminiProvider::status_error(StatusCode::TOO_MANY_REQUESTS, Some("7"), ""),
            LlmError::RateLimited { retry_after_ms: Some(7000) }
        ));
        assert!(matches!(
            GeminiProvider::status_error(StatusCode::SERVICE_UNAVAILABLE, None, ""),
            LlmError::Overloaded(_)
        ));

        let bad_model = r#"{"error":{"code":404,"message":"models/nope is not found","status":"NOT_FOUND"}}"#;
        match GeminiProvider::status_error(StatusCode::NOT_FOUND, None, bad_model) {
            LlmError::Provider { message } => assert_eq!(message, "models/nope is not found"),
            other => panic!("unexpected error: {other:?}"),
        }

        match GeminiProvider::status_error(StatusCode::INTERNAL_SERVER_ERROR, None, "<html>") {
            LlmError::Provider { message } => assert!(message.contains("500")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_huge_retry_after_saturates() {
        assert!(matches!(
            GeminiProvider::status_error(
                StatusCode::TOO_MANY_REQUESTS,
                Some("18446744073709551615"),
                ""
            ),
            LlmError::RateLimited { retry_after_ms: Some(u64::MAX) }
        ));
        assert!(matches!(
            GeminiProvider::status_error(StatusCode::TOO_MANY_REQUESTS, Some("soon"), ""),
            LlmError::RateLimited { retry_after_ms: None }
        ));
    }

    #[tokio::test]
    async fn test_complete_sends_prompt_key_and_model() {
        let base = fake_gemini(Router::new().route("/v1beta/models/{call}", post(echo))).await;
        let provider = provider(&base);

        let resp = provider
            .complete(&CompletionRequest::new("What is 2+2?"))
            .await
            .unwrap();

        assert_eq!(
            resp.text,
            "gemini-2.5-flash:generateContent|test-key-not-real|user|What is 2+2?"
        );
        assert_eq!(resp.model, "gemini-2.5-flash");
        assert_eq!(resp.finish_reason, FinishReason::Stop);
        assert_eq!(resp.usage, Usage { input_tokens: 5, output_tokens: 7 });
    }

    #[tokio::test]
    async fn test_request_model_overrides_default() {
        let base = fake_gemini(Router::new().route("/v1beta/models/{call}", post(echo))).await;
        let provider = provider(&base);

        let request = CompletionRequest {
            model: "gemini-pro".into(),
            prompt: "hi".into(),
        };
        let resp = provider.complete(&request).await.unwrap();
        assert!(resp.text.starts_with("gemini-pro:generateContent|"));
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let router = Router::new().route(
            "/v1beta/models/{call}",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [("retry-after", "3")],
                    Json(serde_json::json!({"error": {"code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED"}})),
                )
                    .into_response()
            }),
        );
        let provider = provider(&fake_gemini(router).await);

        let err = provider.complete(&CompletionRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { retry_after_ms: Some(3000) }));
    }

    #[tokio::test]
    async fn test_blocked_prompt() {
        let router = Router::new().route(
            "/v1beta/models/{call}",
            post(|| async { Json(serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}})) }),
        );
        let provider = provider(&fake_gemini(router).await);

        let err = provider.complete(&CompletionRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, LlmError::Blocked { ref reason } if reason == "SAFETY"));
    }

    #[tokio::test]
    async fn test_empty_candidate_is_empty_completion() {
        let router = Router::new().route(
            "/v1beta/models/{call}",
            post(|| async {
                Json(serde_json::json!({"candidates": [{"finishReason": "MAX_TOKENS"}]}))
            }),
        );
        let provider = provider(&fake_gemini(router).await);

        let err = provider.complete(&CompletionRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_malformed_body_is_deserialization_error() {
        let router = Router::new().route("/v1beta/models/{call}", post(|| async { "not json" }));
        let provider = provider(&fake_gemini(router).await);

        let err = provider.complete(&CompletionRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, LlmError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = provider(&format!("http://{addr}"));
        let err = provider.complete(&CompletionRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, LlmError::Network(_)));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let router = Router::new().route(
            "/v1beta/models/{call}",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(serde_json::json!({}))
            }),
        );
        let base = fake_gemini(router).await;
        let provider = GeminiProvider::new(
            SecretString::from("k"),
            &ProviderConfig {
                base_url: base,
                request_timeout_secs: 1,
                ..ProviderConfig::default()
            },
        )
        .unwrap();

        let err = provider.complete(&CompletionRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout));
    }
}
