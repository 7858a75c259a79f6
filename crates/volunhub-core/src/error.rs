//! Unified application error types for VolunHub.
//!
//! Every store operation maps its failures into [`AppError`] so callers
//! can branch on [`ErrorKind`] without inspecting driver errors.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested entity does not exist or does not belong to the caller.
    NotFound,
    /// Malformed input reached the store layer.
    Validation,
    /// A uniqueness constraint was violated (duplicate email, etc.).
    Conflict,
    /// A statement inside a multi-step transaction failed; the
    /// transaction has already been rolled back.
    TransactionAborted,
    /// The connection pool could not supply a connection in time.
    ResourceExhausted,
    /// The operation exceeded its time budget and was rolled back.
    Timeout,
    /// A single statement outside a transaction failed.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::TransactionAborted => write!(f, "TRANSACTION_ABORTED"),
            Self::ResourceExhausted => write!(f, "RESOURCE_EXHAUSTED"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout VolunHub.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Map a driver error from a single statement.
    ///
    /// Pool acquisition timeouts become [`ErrorKind::ResourceExhausted`];
    /// everything else is [`ErrorKind::Database`].
    pub fn from_sqlx(context: impl Into<String>, err: sqlx::Error) -> Self {
        let context = context.into();
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => Self::with_source(
                ErrorKind::ResourceExhausted,
                format!("{context}: no database connection available"),
                err,
            ),
            _ => Self::with_source(ErrorKind::Database, context, err),
        }
    }

    /// Re-tag an error raised inside a transaction body.
    ///
    /// Database failures become [`ErrorKind::TransactionAborted`]; domain
    /// outcomes such as `NotFound`, `Validation` or `Conflict` keep their
    /// kind.
    pub fn into_aborted(self, operation: &str) -> Self {
        match self.kind {
            ErrorKind::Database | ErrorKind::Internal => Self {
                kind: ErrorKind::TransactionAborted,
                message: format!("{operation} rolled back: {}", self.message),
                source: self.source,
            },
            _ => self,
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::with_source(
            ErrorKind::Validation,
            format!("Invalid input: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_resource_exhausted() {
        let err = AppError::from_sqlx("Failed to load user", sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind, ErrorKind::ResourceExhausted);
        assert!(err.message.starts_with("Failed to load user"));
    }

    #[test]
    fn test_statement_failure_is_database() {
        let err = AppError::from_sqlx("Failed to load user", sqlx::Error::RowNotFound);
        assert_eq!(err.kind, ErrorKind::Database);
    }

    #[test]
    fn test_into_aborted_only_retags_store_failures() {
        let db = AppError::new(ErrorKind::Database, "insert failed").into_aborted("send_message");
        assert_eq!(db.kind, ErrorKind::TransactionAborted);
        assert!(db.message.contains("send_message"));

        let missing = AppError::not_found("Conversation gone").into_aborted("send_message");
        assert_eq!(missing.kind, ErrorKind::NotFound);

        let invalid = AppError::validation("bad rating").into_aborted("record");
        assert_eq!(invalid.kind, ErrorKind::Validation);

        let duplicate = AppError::conflict("Email already in use").into_aborted("create_user");
        assert_eq!(duplicate.kind, ErrorKind::Conflict);
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::timeout("record_volunteer_performance exceeded 30s");
        assert_eq!(
            err.to_string(),
            "TIMEOUT: record_volunteer_performance exceeded 30s"
        );
    }
}
