//! Session Context
//!
//! All mutable state of one user session, created once at session start
//! and passed explicitly to every use case. Nothing here is process-global:
//! serving several sessions means one context per session.

use chrono::{DateTime, Utc};
use platform::rate_limit::{Admission, SlidingWindowLimiter, UsageStats};

use crate::application::config::ChatConfig;
use crate::domain::history::ConversationStore;

#[derive(Debug, Clone)]
pub struct SessionContext {
    limiter: SlidingWindowLimiter,
    history: ConversationStore,
    started_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(config: &ChatConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            limiter: SlidingWindowLimiter::new(config.minute_limit, config.hour_limit),
            history: ConversationStore::new(config.max_history),
            started_at,
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn try_admit(&mut self, now: DateTime<Utc>) -> Admission {
        self.limiter.try_admit(now)
    }

    pub fn usage_stats(&mut self, now: DateTime<Utc>) -> UsageStats {
        self.limiter.usage_stats(now)
    }

    /// Administrative hook: forget all recorded requests
    pub fn reset_limits(&mut self) {
        self.limiter.reset();
    }

    pub fn history(&self) -> &ConversationStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut ConversationStore {
        &mut self.history
    }
}
