//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use platform::rate_limit::UsageStats;
use platform::time_format::TimestampFormatter;
use serde::{Deserialize, Serialize};

use crate::application::history::{HistoryPage, NumberedEntry};
use crate::application::submit_query::DisplayResult;

/// Request for POST /api/chat/query
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub text: String,
}

/// Response for POST /api/chat/query
#[derive(Debug, Clone, Serialize)]
pub struct DisplayResponse {
    pub success: bool,
    pub message: String,
}

impl From<DisplayResult> for DisplayResponse {
    fn from(result: DisplayResult) -> Self {
        Self {
            success: result.success,
            message: result.message,
        }
    }
}

/// Query string for GET /api/chat/history
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryDto {
    pub number: usize,
    pub timestamp: DateTime<Utc>,
    /// Local time, e.g. "Jan 05, 2025 03:04 PM"
    pub display_time: String,
    pub user_input: String,
    pub response: String,
}

impl HistoryEntryDto {
    pub fn from_entry(numbered: &NumberedEntry, formatter: &TimestampFormatter) -> Self {
        let entry = &numbered.entry;
        Self {
            number: numbered.number,
            timestamp: entry.timestamp(),
            display_time: formatter.format_local(entry.timestamp()),
            user_input: entry.user_input().to_owned(),
            response: entry.response().to_owned(),
        }
    }
}

/// Response for GET /api/chat/history
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub total: usize,
    pub matched: usize,
    pub entries: Vec<HistoryEntryDto>,
}

impl HistoryResponse {
    pub fn from_page(page: &HistoryPage, formatter: &TimestampFormatter) -> Self {
        Self {
            total: page.total,
            matched: page.matched,
            entries: page
                .entries
                .iter()
                .map(|entry| HistoryEntryDto::from_entry(entry, formatter))
                .collect(),
        }
    }
}

/// Response for GET /api/chat/usage
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub requests_this_minute: usize,
    pub minute_limit: u32,
    pub requests_this_hour: usize,
    pub hour_limit: u32,
    pub session_started_at: DateTime<Utc>,
}

impl UsageResponse {
    pub fn new(stats: UsageStats, session_started_at: DateTime<Utc>) -> Self {
        Self {
            requests_this_minute: stats.requests_this_minute,
            minute_limit: stats.minute_limit,
            requests_this_hour: stats.requests_this_hour,
            hour_limit: stats.hour_limit,
            session_started_at,
        }
    }
}
