//! Timestamp Formatting
//!
//! Display formatting for conversation timestamps, memoized in a small
//! bounded cache since the same timestamps are rendered on every refresh.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use moka::sync::Cache;

/// Display format, e.g. `Jan 05, 2025 03:04 PM`
pub const DISPLAY_FORMAT: &str = "%b %d, %Y %I:%M %p";

/// Default number of memoized timestamps
pub const DEFAULT_CACHE_CAPACITY: u64 = 100;

/// Memoizing timestamp formatter
///
/// Entries are evicted by size only (no TTL): a formatted timestamp
/// never goes stale.
#[derive(Clone)]
pub struct TimestampFormatter {
    cache: Cache<NaiveDateTime, String>,
}

impl Default for TimestampFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl TimestampFormatter {
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::new(capacity),
        }
    }

    /// Format a wall-clock timestamp
    pub fn format(&self, timestamp: NaiveDateTime) -> String {
        self.cache
            .get_with(timestamp, || timestamp.format(DISPLAY_FORMAT).to_string())
    }

    /// Format a UTC instant in the local time zone
    pub fn format_local(&self, timestamp: DateTime<Utc>) -> String {
        self.format(timestamp.with_timezone(&Local).naive_local())
    }
}

impl std::fmt::Debug for TimestampFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimestampFormatter")
            .field("cached", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 5)
            .unwrap()
            .and_hms_opt(h, m, 9)
            .unwrap()
    }

    #[test]
    fn test_format() {
        let formatter = TimestampFormatter::default();
        assert_eq!(formatter.format(at(15, 4)), "Jan 05, 2025 03:04 PM");
        assert_eq!(formatter.format(at(0, 30)), "Jan 05, 2025 12:30 AM");
    }

    #[test]
    fn test_repeated_format_is_stable() {
        let formatter = TimestampFormatter::new(2);
        let first = formatter.format(at(9, 0));
        for minute in 0..10 {
            formatter.format(at(10, minute));
        }
        assert_eq!(formatter.format(at(9, 0)), first);
    }
}
