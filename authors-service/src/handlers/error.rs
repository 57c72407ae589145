//! API error types for handler operations
//!
//! Structured request-level errors with HTTP status mapping via
//! `IntoResponse`. Field validation failures render as
//! `{"errors": {field: [message, ...]}}`; every other kind renders as
//! `{"message": "..."}`.
//!
//! # Example
//!
//! ```rust
//! use authors_service::handlers::{ApiError, ApiErrorKind};
//!
//! let error = ApiError::not_found("Author", "42");
//! assert!(matches!(error.kind, ApiErrorKind::NotFound));
//! assert_eq!(error.message, "Nenhum resultado encontrado.");
//! ```

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::response::json_response;
use crate::error::ErrorResponse;
use crate::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
use crate::validation::{FieldErrors, ValidationError};

/// Message returned for a missing record and for an empty listing
pub const NO_RESULTS_MESSAGE: &str = "Nenhum resultado encontrado.";

/// Operation being performed when the API error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Listing entities
    List,
    /// Getting a single entity by ID
    Get,
    /// Creating a new entity
    Create,
    /// Updating an existing entity
    Update,
    /// Deleting an entity
    Delete,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Get => write!(f, "get"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Entity was not found, or a listing came back empty
    NotFound,
    /// One or more request fields failed validation
    ValidationFailed,
    /// Invalid request format or parameters
    BadRequest,
    /// Operation conflicts with stored state
    Conflict,
    /// Internal server error
    InternalError,
    /// Service temporarily unavailable
    ServiceUnavailable,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::Conflict => write!(f, "conflict"),
            Self::InternalError => write!(f, "internal_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ValidationFailed | Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Server-side faults are logged at error level; client faults at debug
    const fn is_server_fault(&self) -> bool {
        matches!(self, Self::InternalError | Self::ServiceUnavailable)
    }
}

/// Structured API error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The operation being performed when the error occurred
    pub operation: ApiOperation,
    /// The category of error
    pub kind: ApiErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Per-field messages, set only for `ValidationFailed`
    pub errors: Option<FieldErrors>,
    /// The type of entity involved (e.g., "Author")
    pub entity_type: Option<String>,
    /// The ID of the entity involved
    pub entity_id: Option<String>,
    /// Underlying failure; logged, never sent to the client
    pub cause: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            errors: None,
            entity_type: None,
            entity_id: None,
            cause: None,
        }
    }

    /// Create a "not found" error with entity context
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self::new(ApiOperation::Get, ApiErrorKind::NotFound, NO_RESULTS_MESSAGE)
            .with_entity(entity_type, entity_id)
    }

    /// Create the "not found" error used for an empty listing
    pub fn no_results() -> Self {
        Self::new(ApiOperation::List, ApiErrorKind::NotFound, NO_RESULTS_MESSAGE)
    }

    /// Create a validation failed error carrying per-field messages
    ///
    /// ```rust
    /// use authors_service::handlers::ApiError;
    /// use authors_service::validation::FieldErrors;
    ///
    /// let mut errors = FieldErrors::new();
    /// errors.add("name", "The name field is required.");
    /// let error = ApiError::validation_failed(errors);
    /// assert!(error.errors.is_some());
    /// ```
    pub fn validation_failed(errors: FieldErrors) -> Self {
        Self {
            errors: Some(errors),
            ..Self::new(
                ApiOperation::Create,
                ApiErrorKind::ValidationFailed,
                "The given data was invalid.",
            )
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiOperation::Create, ApiErrorKind::BadRequest, message)
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiOperation::Get, ApiErrorKind::InternalError, message)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: ApiOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Check if this error is retriable (transient errors that may succeed on retry)
    pub fn is_retriable(&self) -> bool {
        matches!(self.kind, ApiErrorKind::ServiceUnavailable)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Response body for validation failures
#[derive(Debug, Serialize)]
struct ValidationErrorResponse {
    errors: FieldErrors,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        if self.kind.is_server_fault() {
            tracing::error!(
                operation = %self.operation,
                kind = %self.kind,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                retriable = self.is_retriable(),
                cause = ?self.cause,
                "API error: {}", self.message
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                kind = %self.kind,
                entity_id = ?self.entity_id,
                cause = ?self.cause,
                "Request rejected: {}", self.message
            );
        }

        match self.errors {
            Some(errors) => json_response(&ValidationErrorResponse { errors }, status),
            None => json_response(&ErrorResponse::new(self.message), status),
        }
    }
}

/// Convert RepositoryOperation to ApiOperation
fn repository_operation_to_api_operation(op: RepositoryOperation) -> ApiOperation {
    match op {
        RepositoryOperation::FindById | RepositoryOperation::Exists => ApiOperation::Get,
        RepositoryOperation::FindAll
        | RepositoryOperation::Paginate
        | RepositoryOperation::Count
        | RepositoryOperation::BatchLoad
        | RepositoryOperation::HealthCheck => ApiOperation::List,
        RepositoryOperation::Create => ApiOperation::Create,
        RepositoryOperation::Update => ApiOperation::Update,
        RepositoryOperation::Delete => ApiOperation::Delete,
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let operation = repository_operation_to_api_operation(err.operation);

        let kind = match err.kind {
            RepositoryErrorKind::NotFound => ApiErrorKind::NotFound,
            RepositoryErrorKind::AlreadyExists | RepositoryErrorKind::ConstraintViolation => {
                ApiErrorKind::Conflict
            }
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout => {
                ApiErrorKind::ServiceUnavailable
            }
            RepositoryErrorKind::DatabaseError | RepositoryErrorKind::Other => {
                ApiErrorKind::InternalError
            }
        };

        let cause = Some(err.to_string());
        let message = match kind {
            ApiErrorKind::NotFound => NO_RESULTS_MESSAGE,
            ApiErrorKind::ServiceUnavailable => "Service temporarily unavailable",
            ApiErrorKind::Conflict => "The request conflicts with stored data",
            _ => "An internal error occurred",
        }
        .to_string();

        Self {
            operation,
            kind,
            message,
            errors: None,
            entity_type: err.entity_type,
            entity_id: err.entity_id,
            cause,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Failed(errors) => Self::validation_failed(errors),
            ValidationError::Lookup(err) => err.into(),
        }
    }
}
