//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for all layers of Chronicle.
///
/// This enum covers domain, infrastructure, and presentation layer errors.
/// Cache errors carry their own variant so callers can treat them as
/// non-fatal and fall back to the store instead of failing the request.
#[derive(Error, Debug)]
pub enum ChronicleError {
    // ============ Domain Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    // ============ Infrastructure Errors ============
    /// Document store error
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Cache layer error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Message queue error
    #[error("Queue error: {0}")]
    Queue(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChronicleError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Persistence(_)
            | Self::Cache(_)
            | Self::Queue(_)
            | Self::Configuration(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Queue(_) => "QUEUE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the message safe to expose to API clients.
    ///
    /// Infrastructure failures keep their detail in logs only; clients see
    /// a generic message.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::NotFound { .. } | Self::Validation(_) => self.to_string(),
            Self::Persistence(_)
            | Self::Cache(_)
            | Self::Queue(_)
            | Self::Configuration(_)
            | Self::Internal(_)
            | Self::Other(_) => "Internal server error".to_string(),
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a persistence error.
    #[must_use]
    pub fn persistence<T: Into<String>>(message: T) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates a cache error.
    #[must_use]
    pub fn cache<T: Into<String>>(message: T) -> Self {
        Self::Cache(message.into())
    }

    /// Creates a queue error.
    #[must_use]
    pub fn queue<T: Into<String>>(message: T) -> Self {
        Self::Queue(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error is retriable.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Cache(_) | Self::Queue(_))
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for ChronicleError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            _ => Self::Persistence(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ChronicleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-level validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `ChronicleError`.
    ///
    /// Uses `client_message` so infrastructure detail never reaches the wire.
    #[must_use]
    pub fn from_error(error: &ChronicleError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.client_message(),
            details: None,
        }
    }

    /// Sets field-level validation errors.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&ChronicleError> for ErrorResponse {
    fn from(error: &ChronicleError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ChronicleError::not_found("Post", 1).status_code(), 404);
        assert_eq!(ChronicleError::validation("title is empty").status_code(), 400);
        assert_eq!(ChronicleError::persistence("connection lost").status_code(), 500);
        assert_eq!(ChronicleError::cache("pool exhausted").status_code(), 500);
        assert_eq!(ChronicleError::queue("broker down").status_code(), 500);
        assert_eq!(ChronicleError::internal("oops").status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ChronicleError::not_found("Post", 1).error_code(), "NOT_FOUND");
        assert_eq!(ChronicleError::validation("bad input").error_code(), "VALIDATION_ERROR");
        assert_eq!(ChronicleError::persistence("db").error_code(), "PERSISTENCE_ERROR");
        assert_eq!(ChronicleError::cache("redis").error_code(), "CACHE_ERROR");
        assert_eq!(ChronicleError::queue("broker").error_code(), "QUEUE_ERROR");
        assert_eq!(ChronicleError::internal("err").error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_retriable_errors() {
        assert!(ChronicleError::persistence("connection lost").is_retriable());
        assert!(ChronicleError::cache("timeout").is_retriable());
        assert!(ChronicleError::queue("broker unreachable").is_retriable());
        assert!(!ChronicleError::not_found("Post", 1).is_retriable());
        assert!(!ChronicleError::validation("bad input").is_retriable());
    }

    #[test]
    fn test_error_constructors() {
        let not_found = ChronicleError::not_found("Post", "123");
        assert!(not_found.to_string().contains("Post"));

        let validation = ChronicleError::validation("invalid field");
        assert!(validation.to_string().contains("invalid field"));

        let persistence = ChronicleError::persistence("insert failed");
        assert!(persistence.to_string().contains("insert failed"));

        let internal = ChronicleError::internal("panic");
        assert!(internal.to_string().contains("panic"));
    }

    #[test]
    fn test_client_message_sanitizes_infrastructure_detail() {
        let err = ChronicleError::persistence("connect refused at 10.0.0.5:5432");
        assert_eq!(err.client_message(), "Internal server error");

        let err = ChronicleError::cache("NOAUTH Authentication required");
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_client_message_keeps_domain_detail() {
        let err = ChronicleError::validation("title must not be blank");
        assert!(err.client_message().contains("title must not be blank"));

        let err = ChronicleError::not_found("Post", "abc");
        assert!(err.client_message().contains("abc"));
    }

    #[test]
    fn test_error_response_from_error() {
        let err = ChronicleError::not_found("Post", 1);
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.code, "NOT_FOUND");
        assert!(!response.message.is_empty());
        assert!(response.details.is_none());
    }

    #[test]
    fn test_error_response_hides_persistence_detail() {
        let err = ChronicleError::persistence("relation \"posts\" does not exist");
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.code, "PERSISTENCE_ERROR");
        assert_eq!(response.message, "Internal server error");
    }

    #[test]
    fn test_error_response_with_details() {
        let err = ChronicleError::validation("bad input");
        let details = vec![FieldError {
            field: "title".to_string(),
            message: "must not be blank".to_string(),
            code: "not_blank".to_string(),
        }];
        let response = ErrorResponse::from_error(&err).with_details(details);
        assert!(response.details.is_some());
        assert_eq!(response.details.unwrap().len(), 1);
    }

    #[test]
    fn test_error_response_from_ref() {
        let err = ChronicleError::not_found("Post", 42);
        let response: ErrorResponse = ErrorResponse::from(&err);
        assert_eq!(response.code, "NOT_FOUND");
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ChronicleError = json_err.into();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }
}
