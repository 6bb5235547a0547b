//! Infrastructure Layer
//!
//! Outbound HTTP implementation of the completion client port.

pub mod grok_client;
