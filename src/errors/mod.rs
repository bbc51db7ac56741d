//! Error handling utilities for the emodiary service.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the service, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! The variants map onto the four failure classes a caller can observe:
//! input validation, upstream augmentation, storage, and not-found (a
//! `DatabaseError` variant kept apart from connectivity failures).

use thiserror::Error;

/// Represents specific error cases that can occur during database operations.
///
/// # Examples
///
/// ```
/// use emodiary::errors::DatabaseError;
///
/// let error = DatabaseError::NotFound("No diary entries for u1 on 2024-05-01".to_string());
/// assert!(format!("{}", error).contains("not found"));
/// ```
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLite database error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}")]
    Pool(#[from] r2d2::Error),

    /// No rows matched the query.
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// A unique constraint rejected the row.
    #[error("Already exists: {0}")]
    Duplicate(String),

    /// A row referenced a member that does not exist.
    #[error("Unknown member: {0}")]
    UnknownMember(String),
}

impl DatabaseError {
    /// Returns true for the not-found condition, as opposed to a storage failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }
}

/// Represents specific error cases that can occur when calling the text
/// augmentation service.
///
/// # Examples
///
/// ```
/// use emodiary::errors::AIError;
///
/// let error = AIError::RateLimited { attempts: 3 };
/// assert!(format!("{}", error).contains("3"));
/// ```
#[derive(Debug, Error)]
pub enum AIError {
    /// The augmentation endpoint could not be reached or timed out.
    #[error("Augmentation service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// The endpoint kept answering 429 until retries ran out.
    #[error("Augmentation service rate limited the request after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },

    /// The endpoint answered with a non-success HTTP status.
    #[error("Augmentation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Invalid or unexpected response payload.
    #[error("Invalid response from augmentation service: {0}")]
    InvalidResponse(String),
}

impl AIError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AIError::Unreachable(_) | AIError::RateLimited { .. } => true,
            AIError::Status { status, .. } => *status >= 500,
            AIError::InvalidResponse(_) => false,
        }
    }
}

/// Represents authentication failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown member id or wrong password. The two are deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token was supplied where one is required.
    #[error("Missing bearer token")]
    MissingToken,

    /// The token failed to parse or its signature did not verify.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The token was well formed but past its expiry.
    #[error("Token expired")]
    TokenExpired,

    /// The token subject does not own the requested resource.
    #[error("Token subject does not match member '{0}'")]
    Forbidden(String),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Represents all possible errors that can occur in the emodiary service.
///
/// Note: This type does not implement `Clone` to avoid losing error context when
/// cloning the wrapped library errors.
///
/// # Examples
///
/// ```
/// use emodiary::errors::AppError;
///
/// let error = AppError::Validation("detail must not be empty".to_string());
/// assert_eq!(format!("{}", error), "Invalid input: detail must not be empty");
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or malformed request input. Raised before any side effect.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Input/output errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors related to database operations.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Errors related to the augmentation service.
    #[error("AI error: {0}")]
    AI(#[from] AIError),

    /// Authentication and token errors.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// A background task panicked or was cancelled.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Database(DatabaseError::Sqlite(err))
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Database(DatabaseError::Pool(err))
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use emodiary::errors::{AppResult, AppError};
///
/// fn might_fail(detail: &str) -> AppResult<&str> {
///     if detail.is_empty() {
///         return Err(AppError::Validation("detail must not be empty".to_string()));
///     }
///     Ok(detail)
/// }
/// assert!(might_fail("").is_err());
/// ```
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");

        let app_error: AppError = io_error.into();

        match app_error {
            AppError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }

    #[test]
    fn test_app_error_display() {
        let config_error = AppError::Config("OPENAI_API_KEY is not set".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: OPENAI_API_KEY is not set"
        );

        let validation_error = AppError::Validation("member_id is required".to_string());
        assert_eq!(
            format!("{}", validation_error),
            "Invalid input: member_id is required"
        );

        let db_error = AppError::Database(DatabaseError::NotFound("u1".to_string()));
        assert!(format!("{}", db_error).contains("Database error"));
        assert!(format!("{}", db_error).contains("not found"));

        let auth_error = AppError::Auth(AuthError::InvalidCredentials);
        assert_eq!(
            format!("{}", auth_error),
            "Authentication error: Invalid credentials"
        );
    }

    #[test]
    fn test_rusqlite_error_converts_to_database_variant() {
        let app_error: AppError = rusqlite::Error::QueryReturnedNoRows.into();
        match app_error {
            AppError::Database(DatabaseError::Sqlite(rusqlite::Error::QueryReturnedNoRows)) => {}
            other => panic!("Expected AppError::Database(Sqlite), got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_is_distinct_from_storage_failure() {
        assert!(DatabaseError::NotFound("x".to_string()).is_not_found());
        assert!(!DatabaseError::Sqlite(rusqlite::Error::InvalidQuery).is_not_found());
        assert!(!DatabaseError::Duplicate("x".to_string()).is_not_found());
    }

    #[test]
    fn test_ai_error_transience() {
        assert!(AIError::RateLimited { attempts: 1 }.is_transient());
        assert!(AIError::Status {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!AIError::Status {
            status: 401,
            body: String::new()
        }
        .is_transient());
        assert!(!AIError::InvalidResponse("no choices".to_string()).is_transient());
    }

    #[test]
    fn test_app_error_source_chaining() {
        let app_error = AppError::Database(DatabaseError::Sqlite(rusqlite::Error::InvalidQuery));
        let source = app_error
            .source()
            .expect("AppError::Database should have a source");
        assert!(source.downcast_ref::<DatabaseError>().is_some());
    }
}
