//! Common error types for OpenETS

use thiserror::Error;

/// Error raised while turning input records into entities, or when a
/// guarded division is asked to divide by a non-positive quantity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A required field is absent from an input record
    #[error("Missing field '{field}' on entity {entity}")]
    MissingField { entity: String, field: &'static str },

    /// A field is present but its value is out of range
    #[error("Invalid value for '{field}' on entity {entity}: {message}")]
    InvalidValue {
        entity: String,
        field: &'static str,
        message: String,
    },

    /// Division by a non-positive denominator
    #[error("Division error: {numerator} / {denominator}")]
    Division { numerator: f64, denominator: f64 },
}

/// Result type alias using the common Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a missing field error
    pub fn missing_field(entity: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            entity: entity.into(),
            field,
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        entity: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            entity: entity.into(),
            field,
            message: message.into(),
        }
    }

    /// Name of the offending field, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field, .. } | Self::InvalidValue { field, .. } => Some(field),
            Self::Division { .. } => None,
        }
    }
}
