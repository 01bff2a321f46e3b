use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::OracleConfig;
use crate::errors::OracleError;
use crate::oracle::{Oracle, OracleRequest, OracleResponse};

/// Chat oracle speaking the OpenAI-compatible chat-completions protocol.
#[derive(Debug)]
pub struct ChatOracle {
    /// HTTP client for API requests
    client: Client,
    /// Chat-completions endpoint URL
    endpoint: String,
    /// API key for bearer authentication
    api_key: String,
    /// Model name
    model: String,
    /// Completion token ceiling per request
    max_completion_tokens: u32,
    /// Request timeout, kept for error reporting
    timeout_secs: u64,
}

/// Chat-completions request body
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_completion_tokens: u32,
    stream: bool,
}

/// Chat message format
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    /// Role of the message sender (system, user)
    role: String,
    /// Content of the message
    content: String,
}

/// Chat-completions response body
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Token usage information
#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl ChatOracle {
    /// Create a new chat oracle from the run configuration
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_completion_tokens: config.max_completion_tokens,
            timeout_secs: config.timeout_secs,
        }
    }
}

#[async_trait]
impl Oracle for ChatOracle {
    async fn complete(&self, request: OracleRequest) -> Result<OracleResponse, OracleError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.instructions,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.payload,
                },
            ],
            temperature: request.temperature,
            max_completion_tokens: self.max_completion_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout(self.timeout_secs)
                } else {
                    OracleError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Oracle API error ({}): {}", status, message);
            return Err(OracleError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| OracleError::ParseError(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Oracle usage: {} prompt + {} completion tokens",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        let text = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(OracleError::EmptyResponse);
        }

        Ok(OracleResponse { text })
    }
}
