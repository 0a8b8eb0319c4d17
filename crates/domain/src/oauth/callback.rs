//! Redirect callback parameters and their validation.

use chrono::{DateTime, Utc};
use url::Url;

use super::CsrfState;
use crate::auth::AuthError;

/// Error code the provider sends when the user declines the authorization.
const ACCESS_DENIED: &str = "access_denied";

/// Query parameters the identity provider appends to the redirect URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    /// Echo of the CSRF token sent with the authorize request.
    pub state: Option<String>,
    /// OAuth error code.
    pub error: Option<String>,
    /// Human-readable description of `error`.
    pub error_description: Option<String>,
    /// One-time authorization code.
    pub code: Option<String>,
    /// Granted scopes.
    pub scope: Option<String>,
}

/// What the caller should do with a validated callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackDecision {
    /// Exchange this code for a credential.
    Exchange(String),
    /// The user declined at the provider. Not an error.
    Denied,
}

impl CallbackParams {
    /// Parses the parameters from a raw query string (without the leading `?`).
    ///
    /// Unknown keys are ignored. When a key repeats, the first value wins.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                "code" => &mut params.code,
                "scope" => &mut params.scope,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// Parses the parameters from the full redirect URL.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        url.query().map(Self::from_query).unwrap_or_default()
    }

    /// Checks the callback against the stored CSRF record.
    ///
    /// Checks run in a fixed order: record expiry, presence of `state`,
    /// token match, provider error, presence of `code`.
    ///
    /// # Errors
    ///
    /// Returns the first check that fails.
    pub fn validate(
        &self,
        csrf: &CsrfState,
        now: DateTime<Utc>,
    ) -> Result<CallbackDecision, AuthError> {
        if csrf.is_expired_at(now) {
            return Err(AuthError::CsrfExpired);
        }

        let Some(state) = self.state.as_deref() else {
            return Err(AuthError::MissingState);
        };

        if state != csrf.token {
            return Err(AuthError::CsrfMismatch);
        }

        match self.error.as_deref() {
            Some(ACCESS_DENIED) => return Ok(CallbackDecision::Denied),
            Some(code) => {
                return Err(AuthError::Provider {
                    code: code.to_string(),
                    description: self.error_description.clone(),
                });
            }
            None => {}
        }

        self.code
            .clone()
            .map(CallbackDecision::Exchange)
            .ok_or(AuthError::MissingCode)
    }
}
