//! Rate Limiting Infrastructure
//!
//! Sliding-window admission control over two overlapping windows
//! (per minute and per hour).
//!
//! ## Model
//! - Each [`RateWindow`] keeps the timestamps of admitted requests, oldest first
//! - Entries are purged lazily on every check, never proactively
//! - Admission records the timestamp in both windows or in neither
//! - The minute limit is checked before the hour limit

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

/// Default per-minute request limit
pub const DEFAULT_MINUTE_LIMIT: u32 = 10;

/// Default per-hour request limit
pub const DEFAULT_HOUR_LIMIT: u32 = 100;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(DEFAULT_MINUTE_LIMIT)
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, 60)
    }

    pub fn per_hour(max_requests: u32) -> Self {
        Self::new(max_requests, 3600)
    }

    fn window_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.window).unwrap_or(TimeDelta::MAX)
    }
}

// ============================================================================
// Rate window
// ============================================================================

/// Ordered timestamps of recent requests for one window
///
/// Storage capacity is independent of the limit: the limit check looks at
/// the purged length, while capacity only bounds memory. Capacity is never
/// below the limit, so an auto-evicting queue can never hide a full window.
#[derive(Debug, Clone)]
pub struct RateWindow {
    config: RateLimitConfig,
    capacity: usize,
    timestamps: VecDeque<DateTime<Utc>>,
}

impl RateWindow {
    /// Create a window whose storage capacity equals its limit
    pub fn new(config: RateLimitConfig) -> Self {
        let capacity = config.max_requests as usize;
        Self::with_capacity(config, capacity)
    }

    /// Create a window with an explicit storage capacity (clamped to the limit)
    pub fn with_capacity(config: RateLimitConfig, capacity: usize) -> Self {
        let capacity = capacity.max(config.max_requests as usize);
        Self {
            config,
            capacity,
            timestamps: VecDeque::with_capacity(capacity),
        }
    }

    /// Drop every timestamp older than the window relative to `now`
    pub fn purge(&mut self, now: DateTime<Utc>) {
        let Some(cutoff) = now.checked_sub_signed(self.config.window_delta()) else {
            return;
        };
        while self.timestamps.front().is_some_and(|&t| t < cutoff) {
            self.timestamps.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn limit(&self) -> u32 {
        self.config.max_requests
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the window has reached its limit (call after [`purge`](Self::purge))
    pub fn is_full(&self) -> bool {
        self.timestamps.len() >= self.config.max_requests as usize
    }

    pub fn oldest(&self) -> Option<DateTime<Utc>> {
        self.timestamps.front().copied()
    }

    /// Time until the oldest entry leaves the window, clamped at zero
    pub fn retry_after(&self, now: DateTime<Utc>) -> Duration {
        self.oldest()
            .and_then(|oldest| oldest.checked_add_signed(self.config.window_delta()))
            .and_then(|available_at| (available_at - now).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }

    fn record(&mut self, now: DateTime<Utc>) {
        if self.timestamps.len() >= self.capacity {
            self.timestamps.pop_front();
        }
        self.timestamps.push_back(now);
    }

    pub fn clear(&mut self) {
        self.timestamps.clear();
    }
}

// ============================================================================
// Admission results
// ============================================================================

/// Which limit rejected a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    PerMinute,
    PerHour,
}

impl RejectReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RejectReason::PerMinute => "per-minute limit exceeded",
            RejectReason::PerHour => "per-hour limit exceeded",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected admission with the exact time until a slot frees up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: RejectReason,
    pub retry_after: Duration,
}

impl Rejection {
    /// Retry delay in seconds (fractional part kept)
    pub fn retry_after_secs(&self) -> f64 {
        self.retry_after.as_secs_f64()
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected(Rejection),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Snapshot of current window usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageStats {
    pub requests_this_minute: usize,
    pub requests_this_hour: usize,
    pub minute_limit: u32,
    pub hour_limit: u32,
}

// ============================================================================
// Limiter
// ============================================================================

/// Two-window sliding limiter (minute + hour)
#[derive(Debug, Clone)]
pub struct SlidingWindowLimiter {
    minute: RateWindow,
    hour: RateWindow,
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MINUTE_LIMIT, DEFAULT_HOUR_LIMIT)
    }
}

impl SlidingWindowLimiter {
    pub fn new(minute_limit: u32, hour_limit: u32) -> Self {
        Self {
            minute: RateWindow::new(RateLimitConfig::per_minute(minute_limit)),
            hour: RateWindow::new(RateLimitConfig::per_hour(hour_limit)),
        }
    }

    /// Admit or reject a request at `now`
    ///
    /// A rejected request leaves both windows untouched (apart from purge).
    pub fn try_admit(&mut self, now: DateTime<Utc>) -> Admission {
        self.purge(now);

        if self.minute.is_full() {
            return Admission::Rejected(Rejection {
                reason: RejectReason::PerMinute,
                retry_after: self.minute.retry_after(now),
            });
        }

        if self.hour.is_full() {
            return Admission::Rejected(Rejection {
                reason: RejectReason::PerHour,
                retry_after: self.hour.retry_after(now),
            });
        }

        self.minute.record(now);
        self.hour.record(now);
        Admission::Admitted
    }

    /// Purge, then report window sizes
    pub fn usage_stats(&mut self, now: DateTime<Utc>) -> UsageStats {
        self.purge(now);
        UsageStats {
            requests_this_minute: self.minute.len(),
            requests_this_hour: self.hour.len(),
            minute_limit: self.minute.limit(),
            hour_limit: self.hour.limit(),
        }
    }

    /// Clear both windows
    pub fn reset(&mut self) {
        self.minute.clear();
        self.hour.clear();
    }

    fn purge(&mut self, now: DateTime<Utc>) {
        self.minute.purge(now);
        self.hour.purge(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap()
    }

    fn secs(n: i64) -> TimeDelta {
        TimeDelta::seconds(n)
    }

    #[test]
    fn test_admits_up_to_minute_limit() {
        let mut limiter = SlidingWindowLimiter::new(3, 100);
        for i in 0..3 {
            assert!(limiter.try_admit(t0() + secs(i)).is_admitted());
        }

        let admission = limiter.try_admit(t0() + secs(10));
        match admission {
            Admission::Rejected(rejection) => {
                assert_eq!(rejection.reason, RejectReason::PerMinute);
                assert_eq!(rejection.retry_after, Duration::from_secs(50));
            }
            Admission::Admitted => panic!("fourth request should be rejected"),
        }
    }

    #[test]
    fn test_rejection_leaves_windows_unchanged() {
        let mut limiter = SlidingWindowLimiter::new(2, 100);
        limiter.try_admit(t0());
        limiter.try_admit(t0() + secs(1));

        let before = limiter.usage_stats(t0() + secs(2));
        assert!(!limiter.try_admit(t0() + secs(2)).is_admitted());
        let after = limiter.usage_stats(t0() + secs(2));

        assert_eq!(before, after);
        assert_eq!(after.requests_this_minute, 2);
        assert_eq!(after.requests_this_hour, 2);
    }

    #[test]
    fn test_window_slides() {
        let mut limiter = SlidingWindowLimiter::new(2, 100);
        limiter.try_admit(t0());
        limiter.try_admit(t0() + secs(30));
        assert!(!limiter.try_admit(t0() + secs(59)).is_admitted());

        // First entry is now older than 60s
        assert!(limiter.try_admit(t0() + secs(61)).is_admitted());
    }

    #[test]
    fn test_boundary_entry_is_retained() {
        let mut window = RateWindow::new(RateLimitConfig::per_minute(5));
        window.record(t0());
        window.purge(t0() + secs(60));
        assert_eq!(window.len(), 1);
        assert_eq!(window.retry_after(t0() + secs(60)), Duration::ZERO);

        window.purge(t0() + secs(61));
        assert!(window.is_empty());
    }

    #[test]
    fn test_hour_limit() {
        let mut limiter = SlidingWindowLimiter::new(10, 3);
        limiter.try_admit(t0());
        limiter.try_admit(t0() + secs(120));
        limiter.try_admit(t0() + secs(240));

        match limiter.try_admit(t0() + secs(600)) {
            Admission::Rejected(rejection) => {
                assert_eq!(rejection.reason, RejectReason::PerHour);
                assert_eq!(rejection.retry_after, Duration::from_secs(3000));
                assert_eq!(rejection.reason.to_string(), "per-hour limit exceeded");
            }
            Admission::Admitted => panic!("hour limit should reject"),
        }
    }

    #[test]
    fn test_minute_limit_takes_priority() {
        let mut limiter = SlidingWindowLimiter::new(2, 2);
        limiter.try_admit(t0());
        limiter.try_admit(t0() + secs(1));

        match limiter.try_admit(t0() + secs(2)) {
            Admission::Rejected(rejection) => {
                assert_eq!(rejection.reason, RejectReason::PerMinute)
            }
            Admission::Admitted => panic!("both limits exceeded"),
        }
    }

    #[test]
    fn test_retry_after_never_negative_with_clock_skew() {
        let mut limiter = SlidingWindowLimiter::new(1, 100);
        limiter.try_admit(t0() + secs(120));

        // Clock moved backwards: the stored entry lies in the future
        match limiter.try_admit(t0()) {
            Admission::Rejected(rejection) => {
                assert_eq!(rejection.retry_after, Duration::from_secs(180));
            }
            Admission::Admitted => panic!("window is full"),
        }

        let window = RateWindow::new(RateLimitConfig::per_minute(1));
        assert_eq!(window.retry_after(t0()), Duration::ZERO);
    }

    #[test]
    fn test_trailing_window_never_exceeds_limits() {
        let minute_limit = 10;
        let hour_limit = 100;
        let mut limiter = SlidingWindowLimiter::new(minute_limit, hour_limit);
        let mut admitted: Vec<DateTime<Utc>> = Vec::new();

        // One attempt every 2 seconds for two hours
        for step in 0..3600 {
            let now = t0() + secs(step * 2);
            if limiter.try_admit(now).is_admitted() {
                admitted.push(now);
            }

            let in_minute = admitted.iter().filter(|&&t| t >= now - secs(60)).count();
            let in_hour = admitted.iter().filter(|&&t| t >= now - secs(3600)).count();
            assert!(in_minute <= minute_limit as usize);
            assert!(in_hour <= hour_limit as usize);
        }

        assert!(!admitted.is_empty());
    }

    #[test]
    fn test_usage_stats_purges() {
        let mut limiter = SlidingWindowLimiter::default();
        limiter.try_admit(t0());
        limiter.try_admit(t0() + secs(30));

        let stats = limiter.usage_stats(t0() + secs(75));
        assert_eq!(stats.requests_this_minute, 1);
        assert_eq!(stats.requests_this_hour, 2);
        assert_eq!(stats.minute_limit, DEFAULT_MINUTE_LIMIT);
        assert_eq!(stats.hour_limit, DEFAULT_HOUR_LIMIT);

        // Idempotent
        assert_eq!(stats, limiter.usage_stats(t0() + secs(75)));
    }

    #[test]
    fn test_reset() {
        let mut limiter = SlidingWindowLimiter::new(1, 1);
        limiter.try_admit(t0());
        limiter.reset();
        assert!(limiter.try_admit(t0() + secs(1)).is_admitted());
    }

    #[test]
    fn test_capacity_is_decoupled_from_limit() {
        let window = RateWindow::with_capacity(RateLimitConfig::per_hour(100), 10);
        assert_eq!(window.capacity(), 100);

        let mut window = RateWindow::with_capacity(RateLimitConfig::per_minute(2), 4);
        for i in 0..5 {
            window.record(t0() + secs(i));
        }
        assert_eq!(window.len(), 4);
        assert_eq!(window.oldest(), Some(t0() + secs(1)));
        assert!(window.is_full());
    }
}
