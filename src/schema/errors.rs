//! Validation error types.
//!
//! A `ValidationError` is raised when an insert payload or update patch
//! violates the table's field contract. It carries the offending field,
//! what the contract expected, and what was actually supplied.

use std::fmt;

/// Error code attached to every validation failure.
pub const VALIDATION_FAILED: &str = "SUBRA_VALIDATION_FAILED";

/// Details of a single contract violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Offending field name
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "field to be present", "missing")
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(field, expected, actual)
    }

    pub fn null_value(field: impl Into<String>) -> Self {
        Self::new(field, "non-null value", "null")
    }

    pub fn non_finite(field: impl Into<String>) -> Self {
        Self::new(field, "finite number", "non-finite number")
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field '{}': expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Schema contract violation on an insert payload or update patch.
#[derive(Debug, Clone)]
pub struct ValidationError {
    message: String,
    details: Option<ValidationDetails>,
}

impl ValidationError {
    /// A required field was left out of an insert payload.
    pub fn required_missing(field: impl Into<String>) -> Self {
        let details = ValidationDetails::missing_field(field);
        Self {
            message: format!("required {}", details),
            details: Some(details),
        }
    }

    /// A present field's runtime type does not match its declared type.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let details = ValidationDetails::type_mismatch(field, expected, actual);
        Self {
            message: details.to_string(),
            details: Some(details),
        }
    }

    /// Null supplied for a field whose declared type is not null.
    pub fn null_forbidden(field: impl Into<String>) -> Self {
        let details = ValidationDetails::null_value(field);
        Self {
            message: details.to_string(),
            details: Some(details),
        }
    }

    /// NaN or an infinity supplied for a number or date field.
    pub fn non_finite(field: impl Into<String>) -> Self {
        let details = ValidationDetails::non_finite(field);
        Self {
            message: details.to_string(),
            details: Some(details),
        }
    }

    /// A typed record could not be encoded as a JSON object payload.
    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        Self {
            message: format!("payload is not a JSON object: {}", reason.into()),
            details: None,
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the violation details if the failure is tied to one field.
    pub fn details(&self) -> Option<&ValidationDetails> {
        self.details.as_ref()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", VALIDATION_FAILED, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;
