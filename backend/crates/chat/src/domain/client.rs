//! Client Port
//!
//! Interface to the remote completion API. Implementation is in infrastructure layer.

use crate::domain::value_objects::{ApiConfig, Temperature, UserInput};
use crate::error::ChatResult;

/// Completion client trait
#[trait_variant::make(CompletionClient: Send)]
pub trait LocalCompletionClient {
    /// Send one single-turn query and return the validated response text
    ///
    /// Exactly one attempt; no retry.
    async fn send(
        &self,
        input: &UserInput,
        temperature: Temperature,
        config: &ApiConfig,
    ) -> ChatResult<String>;
}
