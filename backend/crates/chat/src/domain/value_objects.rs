//! Domain Value Objects
//!
//! Immutable value types for the chat domain.

use std::fmt;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Minimum input length in characters
pub const MIN_INPUT_LENGTH: usize = 1;

/// Maximum input length in characters
pub const MAX_INPUT_LENGTH: usize = 4000;

// ============================================================================
// User input
// ============================================================================

/// Input validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Input is empty or whitespace only
    #[error("Input cannot be empty")]
    Empty,

    /// Input is shorter than the minimum
    #[error("Input must be at least {min} character long")]
    TooShort { min: usize, actual: usize },

    /// Input is longer than the maximum
    #[error("Input exceeds maximum length of {max} characters")]
    TooLong { max: usize, actual: usize },
}

/// Validated query text
///
/// Length is counted in Unicode scalar values, not bytes.
/// The text is kept verbatim (no trimming).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput(String);

impl UserInput {
    /// Validate against the default bounds
    pub fn new(raw: impl Into<String>) -> Result<Self, InputError> {
        Self::with_bounds(raw, MIN_INPUT_LENGTH, MAX_INPUT_LENGTH)
    }

    /// Validate against explicit bounds
    pub fn with_bounds(raw: impl Into<String>, min: usize, max: usize) -> Result<Self, InputError> {
        let raw = raw.into();

        if raw.trim().is_empty() {
            return Err(InputError::Empty);
        }

        let char_count = raw.chars().count();

        if char_count < min {
            return Err(InputError::TooShort {
                min,
                actual: char_count,
            });
        }

        if char_count > max {
            return Err(InputError::TooLong {
                max,
                actual: char_count,
            });
        }

        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserInput {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Temperature
// ============================================================================

/// Sampling temperature passed through to the completion API
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature(f32);

impl Temperature {
    pub const DEFAULT: Temperature = Temperature(0.7);
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 2.0;

    pub fn new(value: f32) -> Option<Self> {
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<Temperature> for f32 {
    fn from(t: Temperature) -> Self {
        t.0
    }
}

// ============================================================================
// API configuration
// ============================================================================

/// Resolved completion API configuration
///
/// Immutable once resolved. `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    api_key: String,
    pub api_url: String,
    pub model: String,
}

impl ApiConfig {
    pub fn new(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: api_url.into(),
            model: model.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}
