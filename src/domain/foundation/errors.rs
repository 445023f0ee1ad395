//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Not found errors
    GameNotFound,

    // State errors
    InvalidStateTransition,
    DuplicateDraw,
    PoolExhausted,

    // Infrastructure errors
    StorageError,
    PublishError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::GameNotFound => "GAME_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::DuplicateDraw => "DUPLICATE_DRAW",
            ErrorCode::PoolExhausted => "POOL_EXHAUSTED",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::PublishError => "PUBLISH_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Creates a storage error wrapping an underlying I/O failure.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Creates a publish error for a failed sink delivery.
    pub fn publish(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PublishError, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::GameNotFound, "Game not found");
        assert_eq!(format!("{}", err), "[GAME_NOT_FOUND] Game not found");
    }

    #[test]
    fn storage_helper_sets_code() {
        let err = DomainError::storage("connection reset");
        assert_eq!(err.code, ErrorCode::StorageError);
    }

    #[test]
    fn publish_helper_sets_code() {
        let err = DomainError::publish("sink returned 503");
        assert_eq!(err.code, ErrorCode::PublishError);
    }

    #[test]
    fn with_detail_adds_detail() {
        let err = DomainError::validation("starts_at", "not half-hour aligned")
            .with_detail("value", "2024-05-20T14:17:00Z");

        assert_eq!(err.details.get("field"), Some(&"starts_at".to_string()));
        assert_eq!(
            err.details.get("value"),
            Some(&"2024-05-20T14:17:00Z".to_string())
        );
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::StorageError), "STORAGE_ERROR");
        assert_eq!(format!("{}", ErrorCode::PublishError), "PUBLISH_ERROR");
    }
}
