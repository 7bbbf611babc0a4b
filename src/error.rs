//! Error types for stash.

use thiserror::Error;

/// Common error type for stash.
#[derive(Error, Debug)]
pub enum StashError {
    /// Missing, invalid or expired session token, or bad credentials.
    ///
    /// Deliberately carries no detail so that "unknown user" and
    /// "wrong password" look the same to a client.
    #[error("unauthorized")]
    Unauthorized,

    /// Malformed client input; the message is returned to the client verbatim.
    #[error("{0}")]
    BadRequest(String),

    /// Missing record, private record of another user, or missing content.
    #[error("not found")]
    NotFound,

    /// Database error.
    ///
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Session cache error.
    #[error("cache error: {0}")]
    Cache(String),

    /// Job queue error.
    #[error("queue error: {0}")]
    Queue(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StashError {
    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        StashError::BadRequest(message.into())
    }

    /// Whether this error is caused by the client rather than the infrastructure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StashError::Unauthorized | StashError::BadRequest(_) | StashError::NotFound
        )
    }
}

// Conversion from sqlx errors
impl From<sqlx::Error> for StashError {
    fn from(e: sqlx::Error) -> Self {
        StashError::Database(e.to_string())
    }
}

/// Result type alias for stash operations.
pub type Result<T> = std::result::Result<T, StashError>;
