//! Domain Entities
//!
//! Core business entities for the chat domain.

use chrono::{DateTime, Timelike, Utc};

use crate::domain::value_objects::UserInput;

/// One processed query and its displayed response
///
/// Immutable once created. The timestamp has second precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    timestamp: DateTime<Utc>,
    user_input: String,
    response: String,
}

impl ConversationEntry {
    /// Create a new entry
    pub fn new(user_input: UserInput, response: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now.with_nanosecond(0).unwrap_or(now),
            user_input: user_input.into_inner(),
            response: response.into(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    /// Case-insensitive substring match on input or response
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn contains_lowercase(&self, needle: &str) -> bool {
        self.user_input.to_lowercase().contains(needle)
            || self.response.to_lowercase().contains(needle)
    }
}
