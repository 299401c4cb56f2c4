//! Error types for MathFluent core operations.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type for MathFluent core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// A single failed form constraint, reported inline next to its field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur while talking to collaborators or validating input.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    #[error("Validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Tutor error: {0}")]
    Tutor(String),

    #[error("Subscription error: {0}")]
    Subscription(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::Store(format!("{:#}", err))
    }
}

impl CoreError {
    /// Shorthand for a single-field validation failure.
    pub fn invalid(field: &str, message: &str) -> Self {
        CoreError::Validation(vec![FieldError::new(field, message)])
    }

    /// Field errors carried by a validation failure, empty otherwise.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            CoreError::Validation(fields) => fields,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = CoreError::Validation(vec![
            FieldError::new("room_name", "too short"),
            FieldError::new("description", "too long"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: room_name: too short; description: too long"
        );
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn test_anyhow_becomes_store_error() {
        let err: CoreError = anyhow::anyhow!("disk full").into();
        assert!(matches!(err, CoreError::Store(ref m) if m == "disk full"));
        assert!(err.field_errors().is_empty());
    }
}
