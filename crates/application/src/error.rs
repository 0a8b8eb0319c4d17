//! Application error types

use authgate_domain::DomainError;
use thiserror::Error;

use crate::ports::StorageError;

/// Errors raised while starting a login.
///
/// Failures of the callback itself are not errors of this kind; they are
/// reported through the authorization view.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The client settings are unusable.
    #[error("invalid settings: {0}")]
    Domain(#[from] DomainError),

    /// The CSRF record could not be stored.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The validity window does not fit the clock's range.
    #[error("login validity window is out of range")]
    ValidityOutOfRange,
}

/// Result type alias for login operations.
pub type LoginResult<T> = Result<T, LoginError>;
