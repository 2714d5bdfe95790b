// src/application/error_handling.rs
//
// Boundary error reports
//
// ARCHITECTURE:
// - Maps internal errors → client-visible reports
// - Validation failures list every field violation, never a single message
// - Never exposes storage details
// - Logs the errors it hides

use serde::{Deserialize, Serialize};

use crate::domain::FieldViolation;
use crate::error::AppError;

/// Standard error report for callers of the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldViolation>,
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Movie or rating not found (404)
    NotFound,

    /// One or more field violations (400)
    Validation,

    /// Write refused because the row changed or is taken (409)
    Conflict,

    /// Caller gave up before the operation finished
    Cancelled,

    /// Storage or connection failure (500)
    Database,

    /// Other/unknown error (500)
    Internal,
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Create error response from AppError
    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::Validation(errors) => Self {
                errors: errors.violations,
                ..Self::new(ErrorType::Validation, "Validation failed")
            },

            AppError::Conflict(message) => Self::new(ErrorType::Conflict, message),

            AppError::Cancelled => Self::new(ErrorType::Cancelled, "Operation was cancelled"),

            AppError::Database(db_error) => {
                log::error!("Database error: {:?}", db_error);
                Self::new(ErrorType::Database, "Database operation failed")
            }

            AppError::Pool(pool_error) => {
                log::error!("Connection pool error: {}", pool_error);
                Self::new(ErrorType::Database, "Database connection failed")
            }

            AppError::Serialization(serde_error) => {
                log::error!("Serialization error: {:?}", serde_error);
                Self::new(ErrorType::Internal, "Data serialization failed")
            }

            AppError::Io(io_error) => {
                log::error!("IO error: {:?}", io_error);
                Self::new(ErrorType::Internal, "File system operation failed")
            }

            AppError::Other(message) => {
                log::error!("Other error: {}", message);
                Self::new(ErrorType::Internal, "Internal error")
            }
        }
    }

    /// Create not found error
    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorType::NotFound, format!("{} not found", resource))
    }
}

/// Helper trait to convert Results to ErrorResponse
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, ErrorResponse>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> Result<T, ErrorResponse> {
        self.map_err(ErrorResponse::from_app_error)
    }
}

/// Absence becomes a `not_found` report for `resource`
pub trait OrNotFound<T> {
    fn or_not_found(self, resource: &str) -> Result<T, ErrorResponse>;
}

impl<T> OrNotFound<T> for Result<Option<T>, AppError> {
    fn or_not_found(self, resource: &str) -> Result<T, ErrorResponse> {
        self.to_error_response()?
            .ok_or_else(|| ErrorResponse::not_found(resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationErrors;

    #[test]
    fn test_validation_lists_every_violation() {
        let mut errors = ValidationErrors::new();
        errors.push("page_size", "Page size must be between 1 and 25");
        errors.push("sort_field", "Sort field must be 'title' or 'year'");

        let response = ErrorResponse::from_app_error(AppError::Validation(errors));
        assert_eq!(response.error_type, ErrorType::Validation);
        assert_eq!(response.errors.len(), 2);
        assert_eq!(response.errors[0].field, "page_size");
    }

    #[test]
    fn test_storage_details_are_withheld() {
        let response = ErrorResponse::from_app_error(AppError::Pool("timed out at 10.0.0.3".into()));
        assert_eq!(response.error_type, ErrorType::Database);
        assert!(!response.message.contains("10.0.0.3"));
    }

    #[test]
    fn test_conflict_and_cancelled() {
        let conflict = ErrorResponse::from_app_error(AppError::Conflict("slug taken".into()));
        assert_eq!(conflict.error_type, ErrorType::Conflict);
        assert_eq!(conflict.message, "slug taken");

        let cancelled = ErrorResponse::from_app_error(AppError::Cancelled);
        assert_eq!(cancelled.error_type, ErrorType::Cancelled);
    }

    #[test]
    fn test_or_not_found() {
        let absent: Result<Option<u8>, AppError> = Ok(None);
        let response = absent.or_not_found("Movie").unwrap_err();
        assert_eq!(response.error_type, ErrorType::NotFound);
        assert_eq!(response.message, "Movie not found");

        let present: Result<Option<u8>, AppError> = Ok(Some(7));
        assert_eq!(present.or_not_found("Movie").unwrap(), 7);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&ErrorResponse::not_found("Movie")).unwrap();
        assert!(json.contains("not_found"));
        assert!(json.contains("Movie not found"));
        assert!(!json.contains("\"errors\""));
    }
}
