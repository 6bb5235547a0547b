//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (ConversationEntry)
//! - Domain value objects (UserInput, Temperature, ApiConfig)
//! - Conversation history aggregate (ConversationStore)
//! - Domain services (response validation)
//! - Client port (interface to the completion API)

pub mod client;
pub mod entities;
pub mod history;
pub mod services;
pub mod value_objects;
