//! Chat Error Types
//!
//! This module provides chat-specific error variants that integrate
//! with the unified `kernel::error::AppError` system, and the single
//! conversion from an internal failure to what the user is shown.

use kernel::correlation::CorrelationId;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::rate_limit::{RejectReason, Rejection};
use std::time::Duration;
use thiserror::Error;

use crate::domain::services::ShapeError;
use crate::domain::value_objects::InputError;

/// Chat-specific result type alias
pub type ChatResult<T> = Result<T, ChatError>;

/// Chat-specific error variants
#[derive(Debug, Error)]
pub enum ChatError {
    /// Input failed local validation
    #[error("Input validation failed: {0}")]
    InvalidInput(#[from] InputError),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {}", .0.reason)]
    RateLimited(Rejection),

    /// API configuration could not be resolved
    #[error("API configuration unavailable: {0}")]
    Configuration(#[source] AppError),

    /// Transport failure (connection, timeout, DNS)
    #[error("Connection to completion API failed: {0}")]
    ConnectionFailed(#[source] reqwest::Error),

    /// Upstream answered with a non-200 status
    #[error("API request failed with status {status}")]
    Upstream { status: u16, body: String },

    /// Body is not valid JSON
    #[error("Failed to parse API response as JSON: {source}")]
    MalformedResponse {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// Body is JSON but not shaped like a chat completion
    #[error(transparent)]
    InvalidShape(#[from] ShapeError),

    /// Anything else
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Failure classes hidden behind one opaque message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    Configuration,
    ConnectionFailed,
    UpstreamError,
    MalformedResponse,
    InvalidShape,
    Unexpected,
}

impl ClientErrorKind {
    pub const fn user_message(&self) -> &'static str {
        match self {
            ClientErrorKind::Configuration => "Failed to load API configuration",
            ClientErrorKind::ConnectionFailed => "Failed to connect to Grok API",
            ClientErrorKind::UpstreamError | ClientErrorKind::InvalidShape => {
                "API request failed"
            }
            ClientErrorKind::MalformedResponse => "Failed to parse API response",
            ClientErrorKind::Unexpected => "An unexpected error occurred",
        }
    }
}

/// What the user sees for a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFacingError {
    pub kind: ErrorKind,
    pub message: String,
    /// Present for failures that are only described in the logs
    pub correlation_id: Option<CorrelationId>,
}

impl ChatError {
    /// Opaque failure class, `None` for errors reported to the user directly
    pub fn client_kind(&self) -> Option<ClientErrorKind> {
        match self {
            ChatError::InvalidInput(_) | ChatError::RateLimited(_) => None,
            ChatError::Configuration(_) => Some(ClientErrorKind::Configuration),
            ChatError::ConnectionFailed(_) => Some(ClientErrorKind::ConnectionFailed),
            ChatError::Upstream { .. } => Some(ClientErrorKind::UpstreamError),
            ChatError::MalformedResponse { .. } => Some(ClientErrorKind::MalformedResponse),
            ChatError::InvalidShape(_) => Some(ClientErrorKind::InvalidShape),
            ChatError::Unexpected(_) => Some(ClientErrorKind::Unexpected),
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::InvalidInput(_) => ErrorKind::BadRequest,
            ChatError::RateLimited(_) => ErrorKind::TooManyRequests,
            ChatError::ConnectionFailed(_) => ErrorKind::ServiceUnavailable,
            ChatError::Upstream { .. }
            | ChatError::MalformedResponse { .. }
            | ChatError::InvalidShape(_) => ErrorKind::BadGateway,
            ChatError::Configuration(_) | ChatError::Unexpected(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to the user-facing form, logging the full detail
    ///
    /// Validation and rate-limit errors get a specific message. Every other
    /// error gets its opaque message plus a fresh correlation id, and the
    /// detail is only written to the log under that id.
    pub fn to_user_facing(&self) -> UserFacingError {
        match self.client_kind() {
            None => {
                self.log(None);
                UserFacingError {
                    kind: self.kind(),
                    message: self.direct_message(),
                    correlation_id: None,
                }
            }
            Some(client_kind) => {
                let correlation_id = CorrelationId::generate();
                self.log(Some(&correlation_id));
                UserFacingError {
                    kind: self.kind(),
                    message: format!("{} (Error ID: {})", client_kind.user_message(), correlation_id),
                    correlation_id: Some(correlation_id),
                }
            }
        }
    }

    fn direct_message(&self) -> String {
        match self {
            ChatError::InvalidInput(err) => err.to_string(),
            ChatError::RateLimited(rejection) => rate_limit_message(rejection),
            other => other.to_string(),
        }
    }

    /// Log the error with appropriate level
    fn log(&self, correlation_id: Option<&CorrelationId>) {
        let correlation_id = correlation_id.map(CorrelationId::as_str).unwrap_or("-");
        match self {
            ChatError::InvalidInput(err) => {
                tracing::debug!(error = %err, "Input rejected");
            }
            ChatError::RateLimited(rejection) => {
                tracing::warn!(
                    reason = %rejection.reason,
                    retry_after_secs = rejection.retry_after_secs(),
                    "Rate limit exceeded"
                );
            }
            ChatError::Configuration(err) => {
                let cause = std::iter::successors(std::error::Error::source(err), |&e| e.source())
                    .last()
                    .map(ToString::to_string);
                tracing::error!(
                    correlation_id,
                    error = %err,
                    cause = cause.as_deref().unwrap_or("-"),
                    "API configuration error"
                );
            }
            ChatError::ConnectionFailed(err) => {
                tracing::error!(
                    correlation_id,
                    error = %err,
                    timeout = err.is_timeout(),
                    "API connection error"
                );
            }
            ChatError::Upstream { status, body } => {
                tracing::error!(correlation_id, status, response = %body, "API error");
            }
            ChatError::MalformedResponse { source, body } => {
                tracing::error!(
                    correlation_id,
                    error = %source,
                    response = %body,
                    "API response is not JSON"
                );
            }
            ChatError::InvalidShape(err) => {
                tracing::error!(
                    correlation_id,
                    violation = %err.violation,
                    response = %err.detail,
                    "Invalid API response"
                );
            }
            ChatError::Unexpected(msg) => {
                tracing::error!(correlation_id, message = %msg, "Unexpected error");
            }
        }
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        AppError::new(kind, message).with_source(err)
    }
}

/// User-facing text for a rate-limit rejection
pub fn rate_limit_message(rejection: &Rejection) -> String {
    let wait = format_wait_time(rejection.retry_after);
    match rejection.reason {
        RejectReason::PerMinute => format!("Rate limit exceeded. Please wait {}.", wait),
        RejectReason::PerHour => format!("Hourly limit exceeded. Please wait {}.", wait),
    }
}

/// "N seconds" under a minute, otherwise whole minutes
pub fn format_wait_time(wait: Duration) -> String {
    let seconds = wait.as_secs();
    if seconds < 60 {
        return format!("{} seconds", seconds);
    }
    let minutes = seconds / 60;
    format!("{} minute{}", minutes, if minutes > 1 { "s" } else { "" })
}
