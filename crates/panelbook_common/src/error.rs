use std::fmt;
use thiserror::Error;

/// The base error type for cross-cutting Panelbook failures.
///
/// Feature crates define their own thiserror enums for domain failures; this
/// type covers the shared infrastructure cases and gives handlers a uniform
/// HTTP mapping through [`HttpStatusCode`].
#[derive(Error, Debug)]
pub enum PanelbookError {
    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred due to a conflict (e.g., slot already taken)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
///
/// Implemented by error types so handlers can map domain failures to
/// responses without per-handler match blocks.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for PanelbookError {
    fn status_code(&self) -> u16 {
        match self {
            PanelbookError::ParseError(_) => 400,
            PanelbookError::ConfigError(_) => 500,
            PanelbookError::ValidationError(_) => 400,
            PanelbookError::DatabaseError(_) => 500,
            PanelbookError::ConflictError(_) => 409,
            PanelbookError::NotFoundError(_) => 404,
            PanelbookError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<serde_json::Error> for PanelbookError {
    fn from(err: serde_json::Error) -> Self {
        PanelbookError::ParseError(err.to_string())
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> PanelbookError {
    PanelbookError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> PanelbookError {
    PanelbookError::NotFoundError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_taxonomy() {
        assert_eq!(validation_error("bad input").status_code(), 400);
        assert_eq!(not_found("no such booking").status_code(), 404);
        assert_eq!(
            PanelbookError::ConflictError("slot taken".to_string()).status_code(),
            409
        );
        assert_eq!(
            PanelbookError::DatabaseError("down".to_string()).status_code(),
            500
        );
    }

    #[test]
    fn json_errors_convert_to_parse_errors() {
        let err = serde_json::from_str::<Vec<String>>("not json").unwrap_err();
        assert!(matches!(
            PanelbookError::from(err),
            PanelbookError::ParseError(_)
        ));
    }
}
