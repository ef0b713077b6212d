use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::StudioError;
use crate::retry::{run_with_backoff, CallError, RetryPolicy};

/// Returned when a success payload carries no readable text. The call is
/// still considered successful.
pub const FALLBACK_TEXT: &str = "No response generated.";

/// A source of single-turn completions.
///
/// Implementations receive the prompt and the active agent's system
/// instruction. No prior conversation turns are involved; the remote
/// service has no memory of past calls.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str, system_instruction: &str)
        -> Result<String, StudioError>;
}

/// HTTP client for a generateContent-style REST endpoint, masking transient
/// failures (HTTP 429, transport errors) with exponential backoff.
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
    policy: RetryPolicy,
}

impl GeminiClient {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("agent-studio/0.1")
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_base: api_base.into(),
            model: model.into(),
            api_key: api_key.into(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(&config.api_base, &config.model, config.resolved_api_key()).with_policy(
            RetryPolicy {
                max_retries: config.max_retries,
                ..RetryPolicy::default()
            },
        )
    }

    /// Override the retry schedule after construction.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn request_url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        )
    }

    async fn attempt(
        &self,
        url: &str,
        request: &GenerateContentRequest,
        attempt: u32,
    ) -> Result<String, CallError> {
        debug!("generateContent attempt {}", attempt + 1);

        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|err| CallError::Retryable {
                status: None,
                message: format!("Request failed: {err}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error_status(status, &body));
        }

        // Failures while reading or decoding the body count as transport
        // failures, like any other mid-call exception.
        let payload: GenerateContentResponse =
            response.json().await.map_err(|err| CallError::Retryable {
                status: None,
                message: format!("Failed to decode response: {err}"),
            })?;

        Ok(extract_text(payload))
    }
}

#[async_trait]
impl CompletionBackend for GeminiClient {
    async fn complete(
        &self,
        prompt: &str,
        system_instruction: &str,
    ) -> Result<String, StudioError> {
        let url = self.request_url();
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            },
        };

        let url = url.as_str();
        let request = &request;
        run_with_backoff(&self.policy, tokio::time::sleep, move |attempt| {
            self.attempt(url, request, attempt)
        })
        .await
    }
}

/// HTTP 429 is retryable. Any other error status is terminal on the spot:
/// the backoff budget only masks rate limits and transport-level failures.
fn classify_error_status(status: StatusCode, body: &str) -> CallError {
    let message = parse_error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    });

    if status == StatusCode::TOO_MANY_REQUESTS {
        CallError::Retryable {
            status: Some(status.as_u16()),
            message,
        }
    } else {
        CallError::Terminal {
            status: Some(status.as_u16()),
            message,
        }
    }
}

fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| wrapper.error.message)
}

/// Only `candidates[0].content.parts[0].text` is read; anything else in the
/// payload is ignored.
fn extract_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .unwrap_or_else(|| FALLBACK_TEXT.to_string())
}

// ── Wire types ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}
