//! Common error types used throughout toolcrib.
//!
//! This module provides a unified error type that covers common failure cases
//! such as missing records, rejected credentials, state conflicts, database
//! errors, and I/O failures.

/// Common error type for toolcrib.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested record was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller is not authenticated.
    #[error("Unauthorized")]
    Unauthorized,

    /// The operation does not fit the current state of the record.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Conflict error.
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code this error should be reported with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Unauthorized => 401,
            Self::Conflict(_) => 409,
            Self::InvalidInput(_) => 400,
            Self::Database(_) | Self::Io(_) | Self::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Conflict(_) => "conflict",
            Self::Database(_) => "database_error",
            Self::Io(_) => "io_error",
            Self::InvalidInput(_) => "validation_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("tool 3");
        assert_eq!(err.to_string(), "Not found: tool 3");

        let err = Error::Unauthorized;
        assert_eq!(err.to_string(), "Unauthorized");

        let err = Error::conflict("already checked out");
        assert_eq!(err.to_string(), "Conflict: already checked out");

        let err = Error::database("locked");
        assert_eq!(err.to_string(), "Database error: locked");

        let err = Error::invalid_input("name is required");
        assert_eq!(err.to_string(), "Invalid input: name is required");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(Error::not_found("x").http_status(), 404);
        assert_eq!(Error::Unauthorized.http_status(), 401);
        assert_eq!(Error::conflict("x").http_status(), 409);
        assert_eq!(Error::invalid_input("x").http_status(), 400);
        assert_eq!(Error::internal("x").http_status(), 500);
    }

    #[test]
    fn test_codes() {
        assert_eq!(Error::not_found("x").code(), "not_found");
        assert_eq!(Error::invalid_input("x").code(), "validation_error");
        assert_eq!(Error::database("x").code(), "database_error");
    }
}
