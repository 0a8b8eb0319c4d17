//! Errors surfaced through the authorization view.

use thiserror::Error;

/// Failure of a login attempt or of a credential refresh.
///
/// Every variant is terminal for the current attempt. The manager never
/// retries on its own; the user starts a new login.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The callback arrived but no CSRF record was stored for this session.
    #[error("No CSRF token found in browser storage")]
    MissingCsrfRecord,

    /// The CSRF record outlived its validity window.
    #[error("Login attempt expired. (You took too long to complete the login)")]
    CsrfExpired,

    /// The callback carried no `state` parameter.
    #[error("State parameter not present on request")]
    MissingState,

    /// The callback `state` does not match the stored CSRF token.
    #[error("CSRF tokens do not match")]
    CsrfMismatch,

    /// The identity provider reported an error other than `access_denied`.
    #[error(
        "Authorization completed with error code {code}{}",
        description.as_ref().map(|d| format!(" (Description: {d})")).unwrap_or_default()
    )]
    Provider {
        /// OAuth error code.
        code: String,
        /// Optional human-readable description.
        description: Option<String>,
    },

    /// The callback carried neither an error nor a `code` parameter.
    #[error("Missing code parameter in query string")]
    MissingCode,

    /// Exchanging the authorization code for a credential failed.
    #[error("{0}")]
    ExchangeFailed(String),

    /// Refreshing an existing credential failed.
    #[error("{0}")]
    RefreshFailed(String),
}

impl AuthError {
    /// Returns true if the error came from a network round trip rather than
    /// from callback validation.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::ExchangeFailed(_) | Self::RefreshFailed(_))
    }
}
