//! Usage Statistics

use chrono::{DateTime, Utc};
use platform::rate_limit::UsageStats;

use crate::application::session::SessionContext;

/// Current window usage; purges expired entries but never changes counts otherwise
pub fn usage_stats(session: &mut SessionContext, now: DateTime<Utc>) -> UsageStats {
    session.usage_stats(now)
}

/// Forget every recorded request so both windows start empty
pub fn reset_usage(session: &mut SessionContext) {
    session.reset_limits();
    tracing::info!("Usage limits reset");
}

/// Emit a usage snapshot to the log
pub fn log_usage_stats(stats: &UsageStats) {
    tracing::info!(
        requests_this_minute = stats.requests_this_minute,
        minute_limit = stats.minute_limit,
        requests_this_hour = stats.requests_this_hour,
        hour_limit = stats.hour_limit,
        "Usage stats"
    );
}
