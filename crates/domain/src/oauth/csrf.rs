//! CSRF record kept across the provider redirect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of random bytes in a CSRF token (256 bits).
pub const CSRF_TOKEN_BYTES: usize = 32;

/// Session-scoped record written when a login starts and consumed by the
/// redirect callback.
///
/// Serialized with camelCase keys: `{"token", "validUntil", "returnTo"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfState {
    /// Hex-encoded random token, echoed back by the provider as `state`.
    pub token: String,
    /// Unix timestamp in milliseconds.
    pub valid_until: i64,
    /// Where the user lands after the login completes.
    pub return_to: String,
}

impl CsrfState {
    /// Creates a record that expires at `valid_until`.
    pub fn new(
        token: impl Into<String>,
        valid_until: DateTime<Utc>,
        return_to: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            valid_until: valid_until.timestamp_millis(),
            return_to: return_to.into(),
        }
    }

    /// Returns true once `now` is strictly past `valid_until`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() > self.valid_until
    }
}
