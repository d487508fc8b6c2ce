//! Unified error types for the Quillboard API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Entity invariant violations and persistence failures
//! - `CacheError`, `LockError`, `PublishError`, `NotificationError`: output port failures
//! - `ConfigError`: startup configuration problems
//! - `AppError`: Use-case errors (what the transport maps to status codes)

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        DomainError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }
}

/// Cache port errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Invalid cache pattern: {0}")]
    Pattern(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Distributed lock port errors
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Failed to acquire lock: {key}")]
    Acquisition { key: String },

    #[error("Lock backend error: {0}")]
    Backend(String),
}

/// Event publisher port errors (synchronous publish path only)
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to serialize event of type: {event_type}")]
    Serialization {
        event_type: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to publish event to topic: {topic}")]
    Transport {
        topic: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Broker rejected event for topic {topic}: {status}")]
    Rejected { topic: String, status: u16 },
}

/// Notification port errors
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Failed to deliver notification")]
    Transport(#[source] reqwest::Error),

    #[error("Notification webhook rejected message: {status}")]
    Rejected { status: u16 },
}

/// Configuration errors raised at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Application layer errors - returned by use-case services
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", validation_message(field.as_deref(), reason))]
    Validation {
        field: Option<String>,
        reason: String,
    },

    #[error("{resource} with id {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    LockAcquisition(#[from] LockError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn validation_message(field: Option<&str>, reason: &str) -> String {
    match field {
        Some(field) => format!("Validation failed for field '{}': {}", field, reason),
        None => reason.to_string(),
    }
}

impl AppError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: Some(field.into()),
            reason: reason.into(),
        }
    }

    pub fn not_found(resource: &'static str, id: i64) -> Self {
        AppError::NotFound { resource, id }
    }

    /// Field named by a validation failure, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            AppError::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidArgument { field, reason } => AppError::Validation {
                field: Some(field.to_string()),
                reason,
            },
            DomainError::Database(msg) => AppError::Database(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation {
            field: None,
            reason: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation {
            field: None,
            reason: rejection.body_text(),
        }
    }
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Validation { .. } => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(self.to_string()),
            ),
            AppError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, "Not found", Some(self.to_string()))
            }
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::LockAcquisition(e) => {
                tracing::error!("Lock error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Publish(e) => {
                tracing::error!("Publish error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Cache(e) => {
                tracing::error!("Cache error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_invalid_argument_becomes_validation() {
        let err: AppError = DomainError::invalid("title", "Post title cannot be empty").into();

        assert_eq!(err.field(), Some("title"));
        assert_eq!(
            err.to_string(),
            "Validation failed for field 'title': Post title cannot be empty"
        );
    }

    #[test]
    fn validation_without_field_uses_reason() {
        let err = AppError::Validation {
            field: None,
            reason: "CreateUserCommand cannot be null".to_string(),
        };
        assert_eq!(err.to_string(), "CreateUserCommand cannot be null");
        assert_eq!(err.field(), None);
    }

    #[test]
    fn not_found_message_names_resource_and_id() {
        let err = AppError::not_found("Post", 42);
        assert_eq!(err.to_string(), "Post with id 42 not found");
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            AppError::validation("id", "cannot be null")
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::not_found("User", 1).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("nope".to_string())
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::LockAcquisition(LockError::Acquisition {
                key: "order:1".to_string()
            })
            .into_response()
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Database("boom".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
