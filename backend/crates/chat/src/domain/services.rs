//! Domain Services
//!
//! Defensive parsing of the completion API response.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Which structural check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeViolation {
    MissingChoices,
    ChoiceNotObject,
    MessageNotObject,
    MissingContent,
}

impl ShapeViolation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ShapeViolation::MissingChoices => "missing or empty choices",
            ShapeViolation::ChoiceNotObject => "first choice is not an object",
            ShapeViolation::MessageNotObject => "message is not an object",
            ShapeViolation::MissingContent => "missing content in message",
        }
    }
}

impl fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response payload did not have the expected shape
///
/// `detail` holds the offending payload serialized, for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid API response: {violation}")]
pub struct ShapeError {
    pub violation: ShapeViolation,
    pub detail: String,
}

impl ShapeError {
    fn new(violation: ShapeViolation, payload: &Value) -> Self {
        Self {
            violation,
            detail: payload.to_string(),
        }
    }
}

/// Extracts `choices[0].message.content` from a chat completion payload
pub struct ResponseValidator;

impl ResponseValidator {
    /// Validate the payload and return the content verbatim
    ///
    /// Checks short-circuit in order: choices, first choice, message, content.
    /// A missing `message` key is treated as an empty message, so it fails
    /// on the content check. Non-string content is returned as its JSON text.
    pub fn extract(payload: &Value) -> Result<String, ShapeError> {
        let first_choice = payload
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .ok_or_else(|| ShapeError::new(ShapeViolation::MissingChoices, payload))?;

        let choice = first_choice
            .as_object()
            .ok_or_else(|| ShapeError::new(ShapeViolation::ChoiceNotObject, payload))?;

        let content = match choice.get("message") {
            None => None,
            Some(message) => message
                .as_object()
                .ok_or_else(|| ShapeError::new(ShapeViolation::MessageNotObject, payload))?
                .get("content"),
        };

        match content {
            None | Some(Value::Null) => {
                Err(ShapeError::new(ShapeViolation::MissingContent, payload))
            }
            Some(Value::String(text)) => Ok(text.clone()),
            Some(other) => Ok(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violation(payload: Value) -> ShapeViolation {
        ResponseValidator::extract(&payload).unwrap_err().violation
    }

    #[test]
    fn test_extracts_content() {
        let payload = json!({"choices": [{"message": {"content": "hi"}}]});
        assert_eq!(ResponseValidator::extract(&payload).unwrap(), "hi");
    }

    #[test]
    fn test_content_is_verbatim() {
        let payload = json!({"choices": [{"message": {"content": "  **bold**\n<b>x</b>  "}}]});
        assert_eq!(
            ResponseValidator::extract(&payload).unwrap(),
            "  **bold**\n<b>x</b>  "
        );
    }

    #[test]
    fn test_missing_or_empty_choices() {
        assert_eq!(violation(json!({"choices": []})), ShapeViolation::MissingChoices);
        assert_eq!(violation(json!({})), ShapeViolation::MissingChoices);
        assert_eq!(violation(json!({"choices": "nope"})), ShapeViolation::MissingChoices);
        assert_eq!(violation(json!([1, 2])), ShapeViolation::MissingChoices);
    }

    #[test]
    fn test_first_choice_not_object() {
        assert_eq!(
            violation(json!({"choices": ["text"]})),
            ShapeViolation::ChoiceNotObject
        );
    }

    #[test]
    fn test_message_not_object() {
        assert_eq!(
            violation(json!({"choices": [{"message": "hello"}]})),
            ShapeViolation::MessageNotObject
        );
        assert_eq!(
            violation(json!({"choices": [{"message": null}]})),
            ShapeViolation::MessageNotObject
        );
    }

    #[test]
    fn test_missing_content() {
        assert_eq!(
            violation(json!({"choices": [{"message": {}}]})),
            ShapeViolation::MissingContent
        );
        assert_eq!(
            violation(json!({"choices": [{"message": {"content": null}}]})),
            ShapeViolation::MissingContent
        );
        assert_eq!(
            violation(json!({"choices": [{"finish_reason": "stop"}]})),
            ShapeViolation::MissingContent
        );
    }

    #[test]
    fn test_error_carries_payload_detail() {
        let payload = json!({"choices": []});
        let err = ResponseValidator::extract(&payload).unwrap_err();
        assert_eq!(err.detail, r#"{"choices":[]}"#);
        assert_eq!(err.to_string(), "Invalid API response: missing or empty choices");
    }

    #[test]
    fn test_non_string_content() {
        let payload = json!({"choices": [{"message": {"content": 42}}]});
        assert_eq!(ResponseValidator::extract(&payload).unwrap(), "42");
    }
}
