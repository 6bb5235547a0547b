//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Sliding-window rate limiting (admission control)
//! - Memoized timestamp formatting for display

pub mod rate_limit;
pub mod time_format;
