//! Submit Query Use Case
//!
//! validate -> admit -> load config -> send -> record -> report

use chrono::{DateTime, Utc};
use kernel::error::kind::ErrorKind;
use platform::rate_limit::Admission;
use std::sync::Arc;

use crate::application::config::{ApiConfigLoader, ChatConfig};
use crate::application::session::SessionContext;
use crate::application::usage::log_usage_stats;
use crate::domain::client::CompletionClient;
use crate::domain::value_objects::UserInput;
use crate::error::{ChatError, ChatResult, UserFacingError};

/// Outcome of one submission, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayResult {
    pub success: bool,
    /// Response text, or the user-facing error message
    pub message: String,
    /// Failure class, `None` on success
    pub error: Option<ErrorKind>,
}

impl DisplayResult {
    fn success(message: String) -> Self {
        Self {
            success: true,
            message,
            error: None,
        }
    }

    fn failure(err: UserFacingError) -> Self {
        Self {
            success: false,
            message: err.message,
            error: Some(err.kind),
        }
    }
}

/// Submit Query Use Case
pub struct SubmitQueryUseCase<C>
where
    C: CompletionClient,
{
    client: Arc<C>,
    api_config: Arc<ApiConfigLoader>,
    config: Arc<ChatConfig>,
}

impl<C> SubmitQueryUseCase<C>
where
    C: CompletionClient + Sync,
{
    pub fn new(client: Arc<C>, api_config: Arc<ApiConfigLoader>, config: Arc<ChatConfig>) -> Self {
        Self {
            client,
            api_config,
            config,
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Run one query against the session
    ///
    /// Rejected input and rate-limited attempts return early and leave the
    /// history untouched; invalid input does not consume quota. Once admitted,
    /// the attempt is recorded in history whether it succeeds or not.
    pub async fn execute(
        &self,
        session: &mut SessionContext,
        text: &str,
        now: DateTime<Utc>,
    ) -> DisplayResult {
        let input = match UserInput::with_bounds(
            text,
            self.config.min_input_length,
            self.config.max_input_length,
        ) {
            Ok(input) => input,
            Err(err) => return DisplayResult::failure(ChatError::from(err).to_user_facing()),
        };

        if let Admission::Rejected(rejection) = session.try_admit(now) {
            return DisplayResult::failure(ChatError::RateLimited(rejection).to_user_facing());
        }

        tracing::info!(input_len = input.char_len(), "Processing request");

        let result = match self.complete(&input).await {
            Ok(response) => DisplayResult::success(response),
            Err(err) => DisplayResult::failure(err.to_user_facing()),
        };

        session
            .history_mut()
            .append(input, result.message.clone(), now);
        log_usage_stats(&session.usage_stats(now));

        result
    }

    async fn complete(&self, input: &UserInput) -> ChatResult<String> {
        let api = self
            .api_config
            .load()
            .map_err(ChatError::Configuration)?;

        self.client
            .send(input, self.config.temperature, &api)
            .await
    }
}
