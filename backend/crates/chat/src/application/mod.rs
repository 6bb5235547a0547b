//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Contains use case implementations and per-session state.

pub mod config;
pub mod history;
pub mod session;
pub mod submit_query;
pub mod usage;
