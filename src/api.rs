//! Summarizer interaction over an OpenAI-compatible chat API.
//!
//! This module defines the contract between the pipeline and the external
//! summarization model, plus the HTTP implementation used in production.
//!
//! # Architecture
//!
//! - [`SummaryRequest`]: everything one summarizer call needs
//! - [`Summarizer`]: the seam the pipeline depends on; tests implement it
//!   with in-memory fakes
//! - [`OpenAiSummarizer`]: `POST {base}/chat/completions` over `reqwest`
//!
//! # Errors
//!
//! The client does not retry. A failed call surfaces as a
//! [`SummarizerError`] whose message is inspected by the summary builder
//! to decide whether a smaller request is worth one more attempt.

use crate::error::SummarizerError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Default API root for OpenAI.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// One call to the summarizer.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    /// Fully substituted system instruction.
    pub system_prompt: String,
    /// User instruction with the rendered articles embedded.
    pub user_prompt: String,
    /// Model identifier passed through to the API.
    pub model: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Something that can turn a [`SummaryRequest`] into summary text.
///
/// Implementors of this trait send the instructions to a model and return
/// the generated text, or an error whose message describes the failure.
pub trait Summarizer {
    /// Generate text for `request`.
    ///
    /// # Returns
    ///
    /// The model's reply, or a [`SummarizerError`] if the call failed or
    /// produced no content.
    fn summarize(
        &self,
        request: &SummaryRequest,
    ) -> impl Future<Output = Result<String, SummarizerError>> + Send;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Works against OpenAI itself or any server exposing the same API
/// (local inference servers, proxies) by pointing `base_url` at it.
#[derive(Debug, Clone)]
pub struct OpenAiSummarizer {
    http: reqwest::Client,
    /// Bearer token; omitted from the request when absent.
    api_key: Option<String>,
    /// API root without the trailing `/chat/completions`.
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl OpenAiSummarizer {
    /// Create a client for `base_url` (for example [`DEFAULT_API_BASE`]).
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be built.
    pub fn new(api_key: Option<String>, base_url: &str) -> Result<Self, SummarizerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            match HeaderValue::from_str(&format!("Bearer {key}")) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(e) => warn!(
                    error = %e,
                    "API key is not a valid header value; sending without it"
                ),
            }
        }
        headers
    }
}

/// Pull a readable message out of an error response body.
///
/// OpenAI-style bodies look like `{"error": {"message": ..., "code": ...}}`;
/// anything else is returned verbatim.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => match parsed.error.code {
            Some(serde_json::Value::String(code)) => {
                format!("{} [{}]", parsed.error.message, code)
            }
            _ => parsed.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}

impl Summarizer for OpenAiSummarizer {
    #[instrument(level = "info", skip_all, fields(model = %request.model))]
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizerError> {
        let t0 = Instant::now();
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };
        debug!(
            %url,
            prompt_bytes = request.user_prompt.len(),
            max_tokens = request.max_tokens,
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(&url)
            .headers(self.headers())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text);
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                error = %message,
                "Summarizer API call failed"
            );
            return Err(SummarizerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(SummarizerError::EmptyResponse)?;

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = content.len(),
            "Summarizer call succeeded"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_openai_body() {
        let body = r#"{"error":{"message":"This model's maximum context length is 8192 tokens.","type":"invalid_request_error","code":"context_length_exceeded"}}"#;
        let message = error_message(body);
        assert!(message.starts_with("This model's maximum context length"));
        assert!(message.ends_with("[context_length_exceeded]"));
    }

    #[test]
    fn test_error_message_without_code() {
        let body = r#"{"error":{"message":"Invalid API key","code":null}}"#;
        assert_eq!(error_message(body), "Invalid API key");
    }

    #[test]
    fn test_error_message_plain_text() {
        assert_eq!(error_message("  Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn test_request_serialization() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "usr",
                },
            ],
            max_tokens: 100,
            temperature: 0.5,
        };
        let json: serde_json::Value = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert_eq!(json["max_tokens"], 100);
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Hello"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenAiSummarizer::new(None, "http://localhost:8080/v1/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/v1");
        assert!(client.headers().get(AUTHORIZATION).is_none());
    }
}
