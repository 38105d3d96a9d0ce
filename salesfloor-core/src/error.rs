//! Error types for sales floor operations

use crate::EntityKind;
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: EntityKind, key: String },

    #[error("Storage backend failure: {reason}")]
    Backend { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn already_exists(entity: EntityKind, key: impl ToString) -> Self {
        Self::AlreadyExists {
            entity,
            key: key.to_string(),
        }
    }

    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

/// Input validation errors. These are raised before any store access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Field {field} is too long (max {max} characters)")]
    TooLong { field: String, max: usize },
}

impl ValidationError {
    pub fn missing(field: &str) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures talking to the third-party quote provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("Quote provider unreachable: {reason}")]
    Unavailable { reason: String },

    #[error("Quote provider returned status {status}")]
    BadStatus { status: u16 },

    #[error("Invalid response from quote provider: {reason}")]
    Malformed { reason: String },
}

/// Master error type for all sales floor errors.
#[derive(Debug, Clone, Error)]
pub enum FloorError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("State conflict: {0}")]
    StateConflict(String),
}

impl FloorError {
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::Storage(StorageError::not_found(entity, id))
    }

    /// True when the error is a store-level "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(StorageError::NotFound { .. }))
    }

    /// True when the error is a unique-constraint violation.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Storage(StorageError::AlreadyExists { .. }))
    }
}

/// Result type alias for sales floor operations.
pub type FloorResult<T> = Result<T, FloorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::not_found(EntityKind::PassUp, "abc");
        let msg = err.to_string();
        assert!(msg.contains("PassUp"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_validation_error_display_too_long() {
        let err = ValidationError::TooLong {
            field: "content".to_string(),
            max: 1000,
        };
        assert_eq!(
            err.to_string(),
            "Field content is too long (max 1000 characters)"
        );
    }

    #[test]
    fn test_floor_error_classification() {
        let err: FloorError = StorageError::not_found(EntityKind::Agent, "x").into();
        assert!(err.is_not_found());
        assert!(!err.is_already_exists());

        let err: FloorError = StorageError::already_exists(EntityKind::BreakSchedule, "x").into();
        assert!(err.is_already_exists());

        let err: FloorError = ValidationError::missing("agentId").into();
        assert!(matches!(err, FloorError::Validation(_)));
    }
}
