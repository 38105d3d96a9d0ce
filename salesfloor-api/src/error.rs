//! Error Types for the Sales Floor API
//!
//! Every handler failure leaves the service as an [`ApiError`]: a stable
//! [`ErrorCode`] the floor UI can branch on, a message for people, and
//! optional details. Domain [`FloorError`]s and driver errors convert in via
//! `From`, so services can use `?` throughout.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use salesfloor_core::{EntityKind, FloorError, StorageError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether backend failure details are attached to 500 responses.
/// Switched on at startup in the development environment only.
static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Enable or disable backend details on internal errors.
pub fn set_expose_details(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

pub fn expose_details() -> bool {
    EXPOSE_DETAILS.load(Ordering::Relaxed)
}

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Machine-readable failure category. Serialized as `SCREAMING_SNAKE_CASE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Ownership Errors (403)
    // ========================================================================
    /// Caller does not own the record
    Forbidden,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Field format is incorrect
    InvalidFormat,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested entity does not exist
    EntityNotFound,

    /// Requested agent does not exist
    AgentNotFound,

    /// Requested break does not exist
    BreakNotFound,

    /// Requested pass-up does not exist
    PassUpNotFound,

    /// No route matches the request path
    RouteNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Entity with the same key already exists
    EntityAlreadyExists,

    /// Operation conflicts with current state
    StateConflict,

    // ========================================================================
    // Server Errors (500, 503, 504)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Database operation failed
    DatabaseError,

    /// The quote provider failed and nothing was cached
    UpstreamError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    /// Database connection pool exhausted
    ConnectionPoolExhausted,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,

            // Validation errors
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,

            // Not found errors
            ErrorCode::EntityNotFound
            | ErrorCode::AgentNotFound
            | ErrorCode::BreakNotFound
            | ErrorCode::PassUpNotFound
            | ErrorCode::RouteNotFound => StatusCode::NOT_FOUND,

            // Conflict errors
            ErrorCode::EntityAlreadyExists | ErrorCode::StateConflict => StatusCode::CONFLICT,

            // Server errors
            ErrorCode::ServiceUnavailable | ErrorCode::ConnectionPoolExhausted => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            ErrorCode::InternalError | ErrorCode::DatabaseError | ErrorCode::UpstreamError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Forbidden => "Not authorized to modify this record",

            // Validation
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Missing required fields",
            ErrorCode::InvalidFormat => "Invalid format",

            // Not Found
            ErrorCode::EntityNotFound => "Entity not found",
            ErrorCode::AgentNotFound => "Agent not found",
            ErrorCode::BreakNotFound => "Break not found",
            ErrorCode::PassUpNotFound => "Pass-up not found",
            ErrorCode::RouteNotFound => "Route not found",

            // Conflict
            ErrorCode::EntityAlreadyExists => "Entity already exists",
            ErrorCode::StateConflict => "Operation conflicts with current state",

            // Server
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::UpstreamError => "Failed to fetch stock quote",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
            ErrorCode::ConnectionPoolExhausted => "Connection pool exhausted",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// JSON error body: `{code, message, details?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,

    /// Optional additional details (backend reason in development)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Error carrying the code's canned message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// 400 naming the absent field, e.g. `agentId` on a pass-up PATCH.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
    }

    pub fn entity_not_found(entity_type: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityNotFound,
            format!("{} with id {} not found", entity_type, id),
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EntityNotFound, message)
    }

    pub fn agent_not_found(agent_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::AgentNotFound,
            format!("Agent {} not found", agent_id),
        )
    }

    pub fn break_not_found(break_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::BreakNotFound,
            format!("Break {} not found", break_id),
        )
    }

    pub fn pass_up_not_found(pass_up_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::PassUpNotFound,
            format!("Pass-up {} not found", pass_up_id),
        )
    }

    pub fn route_not_found(path: &str) -> Self {
        Self::new(ErrorCode::RouteNotFound, format!("No route for {}", path))
    }

    /// 409 for a unique-key collision (agent name, schedule per agent).
    pub fn entity_already_exists(entity_type: &str, key: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityAlreadyExists,
            format!("{} {} already exists", entity_type, key),
        )
    }

    /// 409 for a break that is already closed or already open.
    pub fn state_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StateConflict, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn upstream_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn connection_pool_exhausted() -> Self {
        Self::from_code(ErrorCode::ConnectionPoolExhausted)
    }

    /// Attach `reason` as details when running in development.
    fn with_backend_reason(self, reason: impl fmt::Display) -> Self {
        if expose_details() {
            self.with_details(serde_json::json!({ "reason": reason.to_string() }))
        } else {
            self
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Handlers return `ApiResult<T>` and the error half renders itself:
/// ```ignore
/// async fn delete(...) -> ApiResult<Json<DeleteResponse>> {
///     Err(ApiError::forbidden("Not your pass-up"))
/// }
/// ```
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match &err {
            ValidationError::RequiredFieldMissing { field } => ApiError::new(
                ErrorCode::MissingField,
                format!("Missing required fields: {}", field),
            ),
            ValidationError::InvalidValue { .. } => ApiError::invalid_input(err.to_string()),
            ValidationError::TooLong { .. } => ApiError::validation_failed(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => match entity {
                EntityKind::Agent => ApiError::agent_not_found(id),
                EntityKind::Break => ApiError::break_not_found(id),
                EntityKind::PassUp => ApiError::pass_up_not_found(id),
                other => ApiError::entity_not_found(&other.to_string(), id),
            },
            StorageError::AlreadyExists { entity, key } => {
                ApiError::entity_already_exists(&entity.to_string(), key)
            }
            StorageError::Backend { reason } => {
                tracing::error!(reason = %reason, "Storage backend failure");
                ApiError::database_error("Database operation failed").with_backend_reason(reason)
            }
            StorageError::LockPoisoned => {
                tracing::error!("Storage lock poisoned");
                ApiError::internal_error("Internal server error")
                    .with_backend_reason("storage lock poisoned")
            }
        }
    }
}

impl From<FloorError> for ApiError {
    fn from(err: FloorError) -> Self {
        match err {
            FloorError::Storage(e) => e.into(),
            FloorError::Validation(e) => e.into(),
            FloorError::Upstream(e) => {
                tracing::warn!(error = %e, "Quote upstream failed with nothing cached");
                ApiError::upstream_error(format!("Failed to fetch stock quote: {}", e))
            }
            FloorError::Forbidden(message) => ApiError::forbidden(message),
            FloorError::StateConflict(message) => ApiError::state_conflict(message),
        }
    }
}

// ============================================================================
// CONVERSIONS FROM STANDARD ERRORS
// ============================================================================

/// Schema bootstrap failures.
impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        tracing::error!("Database error: {:?}", err);

        ApiError::database_error("Database operation failed").with_backend_reason(err)
    }
}

impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!("Connection pool error: {:?}", err);

        match err {
            deadpool_postgres::PoolError::Timeout(_) => ApiError::connection_pool_exhausted(),
            deadpool_postgres::PoolError::Closed => {
                ApiError::service_unavailable("Database connection pool is closed")
            }
            _ => ApiError::database_error("Failed to acquire database connection"),
        }
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
