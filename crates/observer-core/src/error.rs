//! Error types for observer.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using observer's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for observer operations.
///
/// There is no "not found" variant: repositories report missing rows as
/// `None` or `false`.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request log was already finalized and handed to the sink.
    #[error("No active request context")]
    NoActiveRequestContext,

    /// The request was cancelled before the operation completed.
    #[error("Operation cancelled")]
    Cancelled,

    /// The request deadline expired before the operation completed.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_no_active_request_context() {
        let err = Error::NoActiveRequestContext;
        assert_eq!(err.to_string(), "No active request context");
    }

    #[test]
    fn test_error_display_cancelled() {
        assert_eq!(Error::Cancelled.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_error_display_timeout() {
        let err = Error::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "Operation timed out after 5s");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("negative stock".to_string());
        assert_eq!(err.to_string(), "Invalid input: negative stock");
    }

    #[test]
    fn test_error_display_internal() {
        let err = Error::Internal("unexpected state".to_string());
        assert_eq!(err.to_string(), "Internal error: unexpected state");
    }

    #[test]
    fn test_error_display_database() {
        let err = Error::Database(sqlx::Error::PoolTimedOut);
        assert!(err.to_string().starts_with("Database error:"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
