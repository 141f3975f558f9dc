//! Error types for the currency rate service.
//!
//! Feed-side errors live next to the fetcher port in `ports::feed`.

/// Domain-level errors (validation of values entering the system).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("invalid currency format: {0:?} must be 3 letters")]
    InvalidCurrencyCode(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),

    /// A stored row could not be turned back into a domain value.
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes. The messages are shown to clients, so
/// `Internal` must only ever carry a generic description; the underlying cause
/// is logged where it is caught.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidCurrencyCode(_) => {
                AppError::BadRequest("invalid currency format".into())
            }
        }
    }
}
