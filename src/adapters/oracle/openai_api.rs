//! OpenAI-compatible chat completions oracle.
//!
//! Talks to either the public OpenAI endpoint or an Azure OpenAI deployment.
//! Requests are throttled with a token bucket and transient failures
//! (429, 5xx, timeouts) are retried with exponential backoff.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{OracleConfig, OracleProvider, RateLimitConfig, RetryConfig};
use crate::domain::ports::{ContentOracle, OracleRequest};

/// System prompt shared by every request.
pub const SYSTEM_PROMPT: &str = "You are a professional AI consultant writing assessment reports \
with precise formatting and plain, natural language. Avoid consultant clichés. \
Answer in plain text without markdown code blocks.";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// Request body for `/chat/completions`.
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verbosity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
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

/// Outcome of one HTTP attempt.
enum AttemptError {
    Transient(DomainError),
    Permanent(DomainError),
}

pub struct OpenAiOracle {
    client: Client,
    config: OracleConfig,
    api_key: String,
    retry: RetryConfig,
    limiter: DefaultDirectRateLimiter,
}

impl OpenAiOracle {
    /// Build the oracle, resolving the API key from config or environment.
    pub fn new(
        config: OracleConfig,
        rate_limit: &RateLimitConfig,
        retry: RetryConfig,
    ) -> DomainResult<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            DomainError::ValidationFailed("no API key configured for the oracle".to_string())
        })?;
        if config.provider == OracleProvider::Azure && config.azure_endpoint.is_none() {
            return Err(DomainError::ValidationFailed(
                "azure provider requires oracle.azure_endpoint".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                DomainError::ValidationFailed(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            api_key,
            retry,
            limiter: build_limiter(rate_limit),
        })
    }

    fn endpoint(&self) -> String {
        match (&self.config.provider, &self.config.azure_endpoint) {
            (OracleProvider::Azure, Some(endpoint)) => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint.trim_end_matches('/'),
                self.config.resolved_model(),
                self.config.api_version
            ),
            _ => format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ),
        }
    }

    fn build_body(&self, request: &OracleRequest) -> ChatRequest {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            },
        ];
        let model = (self.config.provider != OracleProvider::Azure)
            .then(|| self.config.resolved_model());
        let response_format = request.expect_json.then_some(ResponseFormat {
            format_type: "json_object",
        });

        if self.config.is_reasoning_model() {
            ChatRequest {
                model,
                messages,
                temperature: None,
                max_completion_tokens: Some(self.config.max_completion_tokens),
                reasoning_effort: Some(self.config.reasoning_effort.clone()),
                verbosity: Some(self.config.verbosity.clone()),
                response_format,
            }
        } else {
            ChatRequest {
                model,
                messages,
                temperature: Some(0.0),
                max_completion_tokens: None,
                reasoning_effort: None,
                verbosity: None,
                response_format,
            }
        }
    }

    async fn send_once(&self, body: &ChatRequest) -> Result<String, AttemptError> {
        let builder = self
            .client
            .post(self.endpoint())
            .header(header::CONTENT_TYPE, "application/json");
        let builder = match self.config.provider {
            OracleProvider::Azure => builder.header("api-key", &self.api_key),
            _ => builder.bearer_auth(&self.api_key),
        };

        let response = builder.json(body).send().await.map_err(|e| {
            let err = DomainError::OracleFailed(format!("API request failed: {e}"));
            if e.is_timeout() || e.is_connect() {
                AttemptError::Transient(err)
            } else {
                AttemptError::Permanent(err)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = DomainError::OracleFailed(format!("API error {status}: {text}"));
            return Err(if is_retryable(status) {
                AttemptError::Transient(err)
            } else {
                AttemptError::Permanent(err)
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            AttemptError::Permanent(DomainError::OracleFailed(format!(
                "Failed to parse response: {e}"
            )))
        })?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AttemptError::Permanent(DomainError::OracleFailed(
                    "response contained no message content".to_string(),
                ))
            })
    }
}

fn build_limiter(config: &RateLimitConfig) -> DefaultDirectRateLimiter {
    let rps = if config.requests_per_second.is_finite() && config.requests_per_second > 0.0 {
        config.requests_per_second
    } else {
        1.0
    };
    let burst = NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN);
    let quota = Quota::with_period(Duration::from_secs_f64(1.0 / rps))
        .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
        .allow_burst(burst);
    RateLimiter::direct(quota)
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl ContentOracle for OpenAiOracle {
    fn name(&self) -> &'static str {
        match self.config.provider {
            OracleProvider::Azure => "azure-openai",
            _ => "openai",
        }
    }

    async fn generate(&self, request: OracleRequest) -> DomainResult<String> {
        let body = self.build_body(&request);
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.retry.initial_backoff_ms))
            .with_max_interval(Duration::from_millis(self.retry.max_backoff_ms))
            .with_max_elapsed_time(None)
            .build();
        let attempts = AtomicU32::new(0);

        tracing::debug!(kind = request.kind.as_str(), section = ?request.section, "oracle request");
        backoff::future::retry(policy, || {
            let body = &body;
            let attempts = &attempts;
            async move {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                self.limiter.until_ready().await;
                match self.send_once(body).await {
                    Ok(text) => Ok(text),
                    Err(AttemptError::Transient(err)) if attempt < self.retry.max_retries => {
                        tracing::warn!(attempt = attempt + 1, error = %err, "transient oracle failure, retrying");
                        Err(backoff::Error::transient(err))
                    }
                    Err(AttemptError::Transient(err) | AttemptError::Permanent(err)) => {
                        Err(backoff::Error::permanent(err))
                    }
                }
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::RequestKind;

    fn oracle(config: OracleConfig) -> OpenAiOracle {
        OpenAiOracle::new(config, &RateLimitConfig::default(), RetryConfig::default()).unwrap()
    }

    fn keyed() -> OracleConfig {
        OracleConfig {
            api_key: Some("test-key".to_string()),
            ..OracleConfig::default()
        }
    }

    #[test]
    fn test_standard_model_uses_temperature() {
        let body = oracle(keyed()).build_body(&OracleRequest::new(RequestKind::ReviseSection, "p"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4.1-2025-04-14");
        assert_eq!(json["temperature"], 0.0);
        assert!(json.get("max_completion_tokens").is_none());
        assert!(json.get("response_format").is_none());
        assert_eq!(json["messages"][0]["content"], SYSTEM_PROMPT);
    }

    #[test]
    fn test_reasoning_model_parameters() {
        let config = OracleConfig {
            model: "gpt-5.1".to_string(),
            ..keyed()
        };
        let body = oracle(config).build_body(&OracleRequest::new(RequestKind::Verify, "p"));
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["max_completion_tokens"], 4000);
        assert_eq!(json["reasoning_effort"], "low");
        assert_eq!(json["verbosity"], "low");
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_azure_endpoint() {
        let config = OracleConfig {
            provider: OracleProvider::Azure,
            azure_endpoint: Some("https://example.openai.azure.com/".to_string()),
            ..keyed()
        };
        let oracle = oracle(config);
        assert_eq!(
            oracle.endpoint(),
            "https://example.openai.azure.com/openai/deployments/gpt-4.1-2025-04-14/chat/completions?api-version=2025-03-01-preview"
        );
        let body = oracle.build_body(&OracleRequest::new(RequestKind::Verify, "p"));
        assert!(body.model.is_none());
    }

    #[test]
    fn test_azure_requires_endpoint() {
        let config = OracleConfig {
            provider: OracleProvider::Azure,
            ..keyed()
        };
        let result = OpenAiOracle::new(config, &RateLimitConfig::default(), RetryConfig::default());
        assert!(matches!(result, Err(DomainError::ValidationFailed(_))));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::UNAUTHORIZED));
    }
}
