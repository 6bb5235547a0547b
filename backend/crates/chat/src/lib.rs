//! Chat Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Conversation entities, input rules, response validation, client port
//! - `application/` - Configuration, per-session state, use cases
//! - `infra/` - HTTP implementation of the completion client
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Request Governance
//! - Input is validated before anything else (never consumes rate-limit quota)
//! - Admission control runs over a minute and an hour window
//! - Exactly one upstream attempt per query, no retry
//! - Upstream failures reach the user as one opaque message plus a correlation id;
//!   the full detail only goes to the logs

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{ApiConfigLoader, ChatConfig};
pub use application::session::SessionContext;
pub use error::{ChatError, ChatResult};
pub use infra::grok_client::GrokClient;
pub use presentation::router::chat_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}
