//! Presentation Layer
//!
//! HTTP handlers and DTOs for the chat API.

pub mod dto;
pub mod handlers;
pub mod router;
