//! Service authorization API port

use async_trait::async_trait;
use authgate_domain::UserAuthorization;
use thiserror::Error;

/// Errors returned by the authorization endpoints.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The service answered with a non-2xx status.
    #[error("{status_text}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Reason phrase of the status.
        status_text: String,
    },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),

    /// The response body is not a valid authorization.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// The service's `/api/v1/auth` endpoints.
///
/// Calls may be dropped mid-flight; implementations must tolerate that.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges a one-time authorization code for a credential.
    ///
    /// # Errors
    ///
    /// Returns an error on any non-2xx answer or transport failure.
    async fn exchange_code(&self, code: &str) -> Result<UserAuthorization, ApiError>;

    /// Extends an existing credential.
    ///
    /// # Errors
    ///
    /// Returns an error on any non-2xx answer or transport failure.
    async fn refresh(&self, access_token: &str) -> Result<UserAuthorization, ApiError>;
}
