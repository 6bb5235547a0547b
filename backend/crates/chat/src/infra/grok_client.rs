//! Grok Completion Client
//!
//! Single-turn chat completion over HTTPS. One POST per query, no retry,
//! no streaming.

use kernel::error::app_error::{AppResult, ResultExt};
use kernel::error::kind::ErrorKind;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::application::config::ChatConfig;
use crate::domain::client::CompletionClient;
use crate::domain::services::ResponseValidator;
use crate::domain::value_objects::{ApiConfig, Temperature, UserInput};
use crate::error::{ChatError, ChatResult};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    model: &'a str,
    stream: bool,
    temperature: f32,
}

/// HTTP implementation of [`CompletionClient`]
#[derive(Debug, Clone)]
pub struct GrokClient {
    http: reqwest::Client,
    system_prompt: String,
}

impl GrokClient {
    pub fn new(timeout: Duration, system_prompt: impl Into<String>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_app_err(ErrorKind::InternalServerError, "Failed to build HTTP client")?;

        Ok(Self {
            http,
            system_prompt: system_prompt.into(),
        })
    }

    pub fn from_config(config: &ChatConfig) -> AppResult<Self> {
        Self::new(config.request_timeout, config.system_prompt.clone())
    }

    fn request_body<'a>(
        &'a self,
        input: &'a UserInput,
        temperature: Temperature,
        config: &'a ApiConfig,
    ) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: input.as_str(),
                },
            ],
            model: &config.model,
            stream: false,
            temperature: temperature.value(),
        }
    }
}

impl CompletionClient for GrokClient {
    async fn send(
        &self,
        input: &UserInput,
        temperature: Temperature,
        config: &ApiConfig,
    ) -> ChatResult<String> {
        let body = self.request_body(input, temperature, config);
        tracing::debug!(
            model = %config.model,
            input_len = input.char_len(),
            "Sending request to Grok API"
        );

        let response = self
            .http
            .post(&config.api_url)
            .bearer_auth(config.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_builder() {
                    ChatError::Unexpected(err.to_string())
                } else {
                    ChatError::ConnectionFailed(err)
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "API response status");
            // Status alone decides the error kind; an unreadable body is logged as empty
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        tracing::debug!(status = status.as_u16(), "API response status");

        let text = response.text().await.map_err(ChatError::ConnectionFailed)?;

        let payload: Value = serde_json::from_str(&text)
            .map_err(|source| ChatError::MalformedResponse { source, body: text })?;

        let content = ResponseValidator::extract(&payload)?;
        tracing::debug!(response_len = content.chars().count(), "Response extracted");

        Ok(content)
    }
}
