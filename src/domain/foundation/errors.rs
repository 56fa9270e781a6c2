//! Error types shared across the domain layer.

use thiserror::Error;

/// Errors that occur during value object construction and input validation.
///
/// Validation always happens before any write; a `ValidationError` guarantees
/// no document was touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be at least {min}, got {actual}")]
    BelowMinimum { field: String, min: i64, actual: i64 },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates a below-minimum validation error.
    pub fn below_minimum(field: impl Into<String>, min: i64, actual: i64) -> Self {
        ValidationError::BelowMinimum {
            field: field.into(),
            min,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the document stores.
///
/// Store errors propagate unchanged to the application layer; only the HTTP
/// boundary translates them for callers.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The referenced document does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A document with the same identity already exists.
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// A stored document does not match the expected shape.
    #[error("Invalid {entity} document {id}: {reason}")]
    InvalidDocument {
        entity: &'static str,
        id: String,
        reason: String,
    },

    /// The backing store failed.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn already_exists(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::AlreadyExists {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid_document(
        entity: &'static str,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        StoreError::InvalidDocument {
            entity,
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("title");
        assert_eq!(format!("{}", err), "Field 'title' cannot be empty");
    }

    #[test]
    fn validation_error_below_minimum_displays_correctly() {
        let err = ValidationError::below_minimum("grace_period_days", 0, -3);
        assert_eq!(
            format!("{}", err),
            "Field 'grace_period_days' must be at least 0, got -3"
        );
    }

    #[test]
    fn store_error_not_found_displays_entity_and_id() {
        let err = StoreError::not_found("plan", "abc");
        assert_eq!(format!("{}", err), "plan not found: abc");
    }
}
